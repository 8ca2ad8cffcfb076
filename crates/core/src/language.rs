//! Language labels for prompt construction
//!
//! Replies are generated in the customer's language; prompts carry the human
//! readable label ("Spanish"), not the ISO code.

/// Map an ISO-639-1 code to the label used inside system prompts.
///
/// Unknown codes pass through unchanged so the model still gets a usable hint.
pub fn language_label(code: &str) -> &str {
    match code {
        "en" => "English",
        "es" => "Spanish",
        "pt" => "Portuguese",
        "fr" => "French",
        "ht" => "Haitian Creole",
        "zh" => "Chinese",
        "ko" => "Korean",
        "vi" => "Vietnamese",
        "ja" => "Japanese",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(language_label("en"), "English");
        assert_eq!(language_label("ht"), "Haitian Creole");
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(language_label("tl"), "tl");
    }
}
