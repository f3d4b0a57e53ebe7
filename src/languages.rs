//! Translation target names offered to users.
//!
//! Free-form names are still accepted by translation; this list only
//! drives suggestions.

pub const LANGUAGES: &[&str] = &[
    "Afrikaans", "Albanian", "Amharic", "Arabic", "Armenian", "Azerbaijani", "Basque",
    "Belarusian", "Bengali", "Bosnian", "Bulgarian", "Catalan",
    "Chinese (Simplified)", "Chinese (Traditional)", "Croatian", "Czech", "Danish",
    "Dutch", "English", "Estonian", "Filipino", "Finnish", "French", "Galician",
    "Georgian", "German", "Greek", "Gujarati", "Haitian Creole", "Hausa", "Hebrew",
    "Hindi", "Hungarian", "Icelandic", "Igbo", "Indonesian", "Irish", "Italian",
    "Japanese", "Kannada", "Kazakh", "Khmer", "Korean", "Kurdish", "Lao",
    "Latvian", "Lithuanian", "Luxembourgish", "Macedonian", "Malay", "Malayalam",
    "Maltese", "Marathi", "Mongolian", "Nepali", "Norwegian", "Pashto", "Persian",
    "Polish", "Portuguese", "Punjabi", "Romanian", "Russian", "Scots Gaelic",
    "Serbian", "Sinhala", "Slovak", "Slovenian", "Somali", "Spanish", "Swahili",
    "Swedish", "Tajik", "Tamil", "Tatar", "Telugu", "Thai", "Turkish",
    "Turkmen", "Ukrainian", "Urdu", "Uzbek", "Vietnamese", "Welsh", "Xhosa",
    "Yoruba", "Zulu",
];

/// Case-insensitive membership check.
pub fn is_known_language(name: &str) -> bool {
    let name = name.trim();
    LANGUAGES.iter().any(|l| l.eq_ignore_ascii_case(name))
}

/// Canonical spelling of a known language, e.g. "french" -> "French".
pub fn canonical_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    LANGUAGES.iter().copied().find(|l| l.eq_ignore_ascii_case(name))
}
