//! Heuristic language detection for incoming messages.

use super::LanguageCode;

/// Lowercase diacritics that only show up in Vietnamese among the supported languages.
const VIETNAMESE_CHARS: &[char] = &['ă', 'â', 'đ', 'ê', 'ô', 'ơ', 'ư', 'á', 'à', 'ả', 'ã', 'ạ'];

/// CJK Unified Ideographs block.
const CJK_RANGE: std::ops::RangeInclusive<char> = '\u{4E00}'..='\u{9FFF}';

/// Classify `text` as one of the supported languages.
///
/// Detection order, first match wins:
/// 1. Any Vietnamese diacritic (case-insensitive) → Vietnamese
/// 2. Any CJK ideograph → Chinese
/// 3. Anything else → English
///
/// Empty text carries no signal and resolves to `default`.
pub fn detect_language(text: &str, default: LanguageCode) -> LanguageCode {
    if text.is_empty() {
        return default;
    }

    if text.to_lowercase().chars().any(|c| VIETNAMESE_CHARS.contains(&c)) {
        return LanguageCode::Vi;
    }

    if text.chars().any(|c| CJK_RANGE.contains(&c)) {
        return LanguageCode::Zh;
    }

    LanguageCode::En
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vietnamese_diacritics() {
        assert_eq!(detect_language("Thời tiết hôm nay thế nào?", LanguageCode::En), LanguageCode::Vi);
        assert_eq!(detect_language("đi đâu", LanguageCode::En), LanguageCode::Vi);
        for c in VIETNAMESE_CHARS {
            assert_eq!(detect_language(&format!("x{}y", c), LanguageCode::Zh), LanguageCode::Vi);
        }
    }

    #[test]
    fn test_uppercase_vietnamese_diacritics() {
        assert_eq!(detect_language("ĐÀ NẴNG", LanguageCode::En), LanguageCode::Vi);
        assert_eq!(detect_language("Ă", LanguageCode::En), LanguageCode::Vi);
    }

    #[test]
    fn test_vietnamese_wins_over_chinese() {
        assert_eq!(detect_language("天气 hôm nay", LanguageCode::En), LanguageCode::Vi);
    }

    #[test]
    fn test_chinese_ideographs() {
        assert_eq!(detect_language("今天天气怎么样", LanguageCode::Vi), LanguageCode::Zh);
        assert_eq!(detect_language("price of 一 thing", LanguageCode::Vi), LanguageCode::Zh);
        assert_eq!(detect_language("\u{9FFF}", LanguageCode::Vi), LanguageCode::Zh);
        // Just outside the block
        assert_eq!(detect_language("\u{4DFF}", LanguageCode::Vi), LanguageCode::En);
    }

    #[test]
    fn test_everything_else_is_english() {
        assert_eq!(detect_language("what is the weather today", LanguageCode::Vi), LanguageCode::En);
        assert_eq!(detect_language("Bonjour, ça va?", LanguageCode::Vi), LanguageCode::En);
        assert_eq!(detect_language("   ", LanguageCode::Vi), LanguageCode::En);
    }

    #[test]
    fn test_empty_text_uses_default() {
        assert_eq!(detect_language("", LanguageCode::Vi), LanguageCode::Vi);
        assert_eq!(detect_language("", LanguageCode::Zh), LanguageCode::Zh);
    }
}
