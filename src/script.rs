/// Returns true when `text` contains hiragana, katakana, CJK ideographs or
/// half-width katakana.
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(is_japanese_char)
}

fn is_japanese_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{3040}'..='\u{30ff}'
            | '\u{3400}'..='\u{4dbf}'
            | '\u{4e00}'..='\u{9fff}'
            | '\u{f900}'..='\u{faff}'
            | '\u{ff66}'..='\u{ff9f}'
    )
}

#[cfg(test)]
mod tests {
    use super::contains_japanese;

    #[test]
    fn detects_kana_and_kanji() {
        assert!(contains_japanese("こんにちは"));
        assert!(contains_japanese("カタカナ"));
        assert!(contains_japanese("日本語"));
        assert!(contains_japanese("ｶﾀｶﾅ"));
        assert!(contains_japanese("mixed テキスト here"));
    }

    #[test]
    fn ignores_latin_and_punctuation() {
        assert!(!contains_japanese("hello"));
        assert!(!contains_japanese(""));
        assert!(!contains_japanese("Grüße, ¿qué tal?"));
        assert!(!contains_japanese("https://example.com/#anchor"));
        // full-width latin is outside the half-width katakana range
        assert!(!contains_japanese("ＡＢＣ"));
    }
}
