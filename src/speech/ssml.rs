//! SSML generation
//!
//! Short skill names sound rushed at the rate that suits longer phrases,
//! so when the rate is left at its default it is picked per text.

use crate::config::SpeechRate;

/// Rate to use for `text` under the configured `rate`
///
/// An explicitly chosen rate is used unchanged. At the default, texts of
/// at most two characters (after trimming) get the short-text rate and
/// everything else the long-text rate.
pub fn derive_rate(text: &str, rate: &SpeechRate) -> String {
    if !rate.is_default() {
        return rate.as_str().to_string();
    }

    if text.trim().chars().count() <= SpeechRate::SHORT_TEXT_CHARS {
        SpeechRate::SHORT_TEXT_RATE.to_string()
    } else {
        SpeechRate::LONG_TEXT_RATE.to_string()
    }
}

/// Wrap `text` in a speak/voice/prosody document
pub fn build_ssml(text: &str, voice: &str, language: &str, rate: &str) -> String {
    format!(
        r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="{}">
    <voice name="{}">
        <prosody rate="{}">{}</prosody>
    </voice>
</speak>"#,
        escape_xml(language),
        escape_xml(voice),
        escape_xml(rate),
        escape_xml(text)
    )
}

/// Escape the characters XML treats specially
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_gets_short_rate() {
        let rate = SpeechRate::default();
        assert_eq!(derive_rate("冲锋", &rate), "1.2");
        assert_eq!(derive_rate("斩", &rate), "1.2");
        assert_eq!(derive_rate("  冲锋  ", &rate), "1.2");
        assert_eq!(derive_rate("", &rate), "1.2");
    }

    #[test]
    fn test_long_text_gets_long_rate() {
        let rate = SpeechRate::default();
        assert_eq!(derive_rate("爆炸性打击", &rate), "1.5");
        assert_eq!(derive_rate("盾牌猛击", &rate), "1.5");
        assert_eq!(derive_rate("abc", &rate), "1.5");
    }

    #[test]
    fn test_explicit_rate_ignores_length() {
        let rate = SpeechRate::parse("1.8").unwrap();
        assert_eq!(derive_rate("冲锋", &rate), "1.8");
        assert_eq!(derive_rate("爆炸性打击", &rate), "1.8");

        let rate = SpeechRate::parse("fast").unwrap();
        assert_eq!(derive_rate("斩", &rate), "fast");
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Two CJK characters are six bytes but still a short text
        assert_eq!("冲锋".len(), 6);
        assert_eq!(derive_rate("冲锋", &SpeechRate::default()), "1.2");
    }

    #[test]
    fn test_build_ssml() {
        let ssml = build_ssml("冲锋", "zh-CN-XiaoxiaoNeural", "zh-CN", "1.2");
        assert!(ssml.starts_with("<speak version=\"1.0\""));
        assert!(ssml.contains("xml:lang=\"zh-CN\""));
        assert!(ssml.contains("<voice name=\"zh-CN-XiaoxiaoNeural\">"));
        assert!(ssml.contains("<prosody rate=\"1.2\">冲锋</prosody>"));
        assert!(ssml.trim_end().ends_with("</speak>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let ssml = build_ssml("Fire & <Ice>", "v", "en-US", "1.5");
        assert!(ssml.contains(">Fire &amp; &lt;Ice&gt;</prosody>"));
    }
}
