//! CLI definitions for sume
//!
//! Kept apart from main.rs so the command tree can be handed to
//! clap_complete and inspected in tests.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use sume::{ExtendMode, PipelineRequest, SourceDescriptor};

/// Build clap styles.
///
/// - Green: headers, usage, command names
/// - White: descriptions, placeholders
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "sume")]
#[command(about = "[ sume ] - summarize, extend and translate text, documents, web pages and media")]
#[command(
    long_about = "sume - Smart summarizer for text, documents, web pages and media.

Content is acquired from the chosen source, summarized by a generative model
CLI (gemini or claude), and optionally extended and translated. Every
expensive call is memoized for the lifetime of the process.

QUICK START:
    sume text \"Long article ...\"          Summarize pasted text
    sume file report.pdf                   Summarize a document chunk by chunk
    sume web example.com/post --extend     Summarize a page, then expand it
    sume media-url https://youtu.be/xyz    Transcribe and summarize a video
    sume media-file talk.mp3 --translate French

Failures are printed as a line starting with ⚠️ and exit with status 1."
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of ~/.config/sume/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Optional stages after the summary.
#[derive(Args, Debug, Clone, Default)]
pub struct StageArgs {
    /// Expand the summary into more detail
    #[arg(long, conflicts_with = "focus")]
    pub extend: bool,

    /// Expand the summary with a specific focus (5-500 characters)
    #[arg(long, value_name = "DETAILS")]
    pub focus: Option<String>,

    /// Translate the final output into this language
    #[arg(long, value_name = "LANGUAGE")]
    pub translate: Option<String>,

    /// Print cache statistics to stderr when done
    #[arg(long)]
    pub stats: bool,
}

impl StageArgs {
    pub fn extend_mode(&self) -> ExtendMode {
        match (&self.focus, self.extend) {
            (Some(focus), _) => ExtendMode::Focus(focus.clone()),
            (None, true) => ExtendMode::Detailed,
            (None, false) => ExtendMode::None,
        }
    }

    pub fn request(&self, source: SourceDescriptor) -> PipelineRequest {
        PipelineRequest {
            source,
            extend: self.extend_mode(),
            translate: self.translate.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize text given on the command line or stdin
    #[command(long_about = "Summarize text given as an argument, or read from stdin with '-'.

EXAMPLES:
    sume text \"Solar capacity doubled last year ...\"
    pbpaste | sume text - --translate Spanish")]
    Text {
        /// Text to summarize, or '-' for stdin
        input: String,
        #[command(flatten)]
        stages: StageArgs,
    },

    /// Summarize a .txt, .md, .pdf or .docx document
    File {
        /// Path to the document
        path: PathBuf,
        #[command(flatten)]
        stages: StageArgs,
    },

    /// Summarize the main text of a web page
    Web {
        /// Page URL (http:// is assumed when no scheme is given)
        url: String,
        #[command(flatten)]
        stages: StageArgs,
    },

    /// Download, transcribe and summarize remote audio or video
    #[command(name = "media-url")]
    MediaUrl {
        /// Video page or direct media URL
        url: String,
        #[command(flatten)]
        stages: StageArgs,
    },

    /// Transcribe and summarize a local audio or video file
    #[command(name = "media-file")]
    MediaFile {
        /// Path to the media file
        path: PathBuf,
        #[command(flatten)]
        stages: StageArgs,
    },

    /// Expand an existing summary
    Extend {
        /// Summary text, or '-' for stdin
        summary: String,
        /// Focus the expansion on these details
        #[arg(long, value_name = "DETAILS")]
        focus: Option<String>,
    },

    /// Translate text into another language
    Translate {
        /// Text to translate, or '-' for stdin
        text: String,
        /// Target language (see `sume languages`)
        #[arg(long, value_name = "LANGUAGE")]
        to: String,
    },

    /// Run many requests sharing one cache
    #[command(long_about = "Run one request per line, all sharing the same cache.

Each line is '<kind> <value>' where kind is text, file, web, media-url or
media-file. Blank lines and lines starting with # are skipped.
'!stats' prints cache statistics and '!clear' empties the cache.

EXAMPLE:
    printf 'web example.com\\n!stats\\n' | sume batch")]
    Batch {
        /// Request file; stdin when omitted
        file: Option<PathBuf>,
        #[command(flatten)]
        stages: StageArgs,
    },

    /// List translation target languages
    Languages,

    /// Check that the external tools are installed
    Doctor,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}
