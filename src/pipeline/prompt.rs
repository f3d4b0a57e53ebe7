//! Prompt templates for the text transforms.
//!
//! Templates live in `src/pipeline/prompts/` and are embedded at compile
//! time. Placeholders are `{name}` and are filled in a single pass, so input
//! text that happens to contain a placeholder is never expanded.

/// The four model-backed transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformOp {
    Summarize,
    Extend,
    ExtendCustom,
    Translate,
}

impl TransformOp {
    /// Operation identity used in cache fingerprints.
    pub fn name(&self) -> &'static str {
        match self {
            TransformOp::Summarize => "summarize_text",
            TransformOp::Extend => "extend_summary",
            TransformOp::ExtendCustom => "extend_summary_custom",
            TransformOp::Translate => "translate_text",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            TransformOp::Summarize => include_str!("prompts/summarize.txt"),
            TransformOp::Extend => include_str!("prompts/extend.txt"),
            TransformOp::ExtendCustom => include_str!("prompts/extend_custom.txt"),
            TransformOp::Translate => include_str!("prompts/translate.txt"),
        }
    }

    /// Message when the model returns nothing.
    pub fn empty_message(&self) -> &'static str {
        match self {
            TransformOp::Summarize => "Summarization failed.",
            TransformOp::Extend => "Could not extend summary.",
            TransformOp::ExtendCustom => "Could not extend summary with custom details.",
            TransformOp::Translate => "Translation failed.",
        }
    }

    /// Prefix for a failed model call, followed by the error.
    pub fn error_prefix(&self) -> &'static str {
        match self {
            TransformOp::Summarize => "Summarization error",
            TransformOp::Extend => "Extend summary error",
            TransformOp::ExtendCustom => "Custom extend summary error",
            TransformOp::Translate => "Translation error",
        }
    }
}

pub fn summarize_prompt(text: &str) -> String {
    render(TransformOp::Summarize.template(), &[("text", text)])
}

pub fn extend_prompt(summary: &str) -> String {
    render(TransformOp::Extend.template(), &[("summary", summary)])
}

pub fn extend_custom_prompt(summary: &str, focus: &str) -> String {
    render(
        TransformOp::ExtendCustom.template(),
        &[("summary", summary), ("focus", focus)],
    )
}

pub fn translate_prompt(text: &str, language: &str) -> String {
    render(
        TransformOp::Translate.template(),
        &[("text", text), ("language", language)],
    )
}

/// Fill `{name}` placeholders. Unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .and_then(|close| vars.iter().find(|(k, _)| *k == &after[..close]).map(|(_, v)| (close, *v)));
        match value {
            Some((close, v)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
