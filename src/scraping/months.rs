//! Localized month names and day-of-month extraction.
//!
//! Month words are matched as substrings of lower-cased label text such as
//! `"15 ноября, сб"`. Tokens are scanned longest first; tokens of equal length
//! keep table order (Russian genitive, Russian nominative, Belarusian genitive,
//! Belarusian nominative, January to December within each group).

use once_cell::sync::Lazy;
use regex::Regex;

use super::base;

const MONTH_TABLE: [(&str, &str); 48] = [
    ("января", "01"),
    ("февраля", "02"),
    ("марта", "03"),
    ("апреля", "04"),
    ("мая", "05"),
    ("июня", "06"),
    ("июля", "07"),
    ("августа", "08"),
    ("сентября", "09"),
    ("октября", "10"),
    ("ноября", "11"),
    ("декабря", "12"),
    ("январь", "01"),
    ("февраль", "02"),
    ("март", "03"),
    ("апрель", "04"),
    ("май", "05"),
    ("июнь", "06"),
    ("июль", "07"),
    ("август", "08"),
    ("сентябрь", "09"),
    ("октябрь", "10"),
    ("ноябрь", "11"),
    ("декабрь", "12"),
    ("студзеня", "01"),
    ("лютага", "02"),
    ("сакавіка", "03"),
    ("красавіка", "04"),
    ("траўня", "05"),
    ("чэрвеня", "06"),
    ("ліпеня", "07"),
    ("жніўня", "08"),
    ("верасня", "09"),
    ("кастрычніка", "10"),
    ("лістапада", "11"),
    ("снежня", "12"),
    ("студзень", "01"),
    ("люты", "02"),
    ("сакавік", "03"),
    ("красавік", "04"),
    ("травень", "05"),
    ("чэрвень", "06"),
    ("ліпень", "07"),
    ("жнівень", "08"),
    ("верасень", "09"),
    ("кастрычнік", "10"),
    ("лістапад", "11"),
    ("снежань", "12"),
];

static SCAN_ORDER: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut tokens = MONTH_TABLE.to_vec();
    // stable sort keeps table order among equal lengths
    tokens.sort_by_key(|(word, _)| std::cmp::Reverse(word.chars().count()));
    tokens
});

static DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([0-9]{1,2})\b").expect("valid day regex"));

/// First standalone one- or two-digit number, unpadded.
pub fn extract_day(text: &str) -> Option<String> {
    let cleaned = base::normalize_lower(text);
    DAY_RE
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn extract_month_word(text: &str) -> Option<&'static str> {
    let cleaned = base::normalize_lower(text);
    if cleaned.is_empty() {
        return None;
    }
    SCAN_ORDER
        .iter()
        .find(|(word, _)| cleaned.contains(word))
        .map(|(word, _)| *word)
}

/// Two-digit month number for a month word, case-insensitive.
pub fn resolve_month(word: &str) -> Option<&'static str> {
    let lowered = base::normalize_lower(word);
    MONTH_TABLE
        .iter()
        .find(|(token, _)| *token == lowered)
        .map(|(_, number)| *number)
}

pub fn pad_day(day: &str) -> String {
    if day.chars().count() == 1 {
        format!("0{day}")
    } else {
        day.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_day_and_month_from_card_label() {
        let label = "15 Ноября, Сб";
        assert_eq!(extract_day(label).as_deref(), Some("15"));
        let word = extract_month_word(label).expect("month word");
        assert_eq!(resolve_month(word), Some("11"));
    }

    #[test]
    fn day_requires_a_standalone_number() {
        assert_eq!(extract_day("2025, Ср"), None);
        assert_eq!(extract_day("Сб,\u{00A0}5"), Some("5".to_string()));
        assert_eq!(extract_day(""), None);
    }

    #[test]
    fn only_ascii_digits_count_as_a_day() {
        assert_eq!(extract_day("\u{FF15} Ноября"), None);
        assert_eq!(extract_day("\u{FF15} 7 Ноября"), Some("7".to_string()));
    }

    #[test]
    fn genitive_form_wins_over_its_nominative_prefix() {
        // "март" is a prefix of "марта"; both resolve to March either way
        assert_eq!(extract_month_word("8 марта, Вс"), Some("марта"));
        assert_eq!(extract_month_word("Март"), Some("март"));
    }

    #[test]
    fn belarusian_labels_resolve() {
        let word = extract_month_word("21 лістапада, Пт").expect("belarusian month");
        assert_eq!(resolve_month(word), Some("11"));
        assert_eq!(resolve_month("ЖНІЎНЯ"), Some("08"));
    }

    #[test]
    fn missing_month_word_is_none() {
        assert_eq!(extract_month_word("5, Ср"), None);
        assert_eq!(resolve_month("brumaire"), None);
    }

    #[test]
    fn pads_single_digit_days_only() {
        assert_eq!(pad_day("5"), "05");
        assert_eq!(pad_day("15"), "15");
    }

    #[test]
    fn scan_order_is_longest_first() {
        let lengths: Vec<usize> = SCAN_ORDER.iter().map(|(w, _)| w.chars().count()).collect();
        assert!(lengths.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(SCAN_ORDER.len(), MONTH_TABLE.len());
    }
}
