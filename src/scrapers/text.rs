use once_cell::sync::Lazy;
use regex::Regex;

/// Digit runs joined by single grouping or decimal separators
static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+(?:[\s\u{a0}\u{202f}'.,][0-9]+)*").expect("valid number token regex")
});

/// Extract the first well-formed number from noisy text.
///
/// Returns `None` when the text contains no digit at all.
pub fn extract_float(text: &str) -> Option<f64> {
    let token = NUMBER_TOKEN.find(text)?.as_str();
    normalize_number(token).parse().ok()
}

/// Extract the first number from noisy text and keep its integral part.
///
/// `"3 pièces"` gives `3`, `"2,5 rum"` gives `2`.
pub fn extract_int(text: &str) -> Option<u32> {
    let value = extract_float(text)?;
    if value > u32::MAX as f64 {
        return None;
    }
    Some(value.trunc() as u32)
}

/// Case-insensitive substring search for any of `keywords`
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Collapse every whitespace run into a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn a raw number token into something `f64::from_str` accepts.
///
/// Whitespace and apostrophes only ever group thousands, and a whitespace
/// group must be exactly three digits long or the token ends there (so
/// `"3 2"` reads as `3`). For `.` and `,` the last separator is the decimal
/// mark when both kinds appear; a lone separator is decimal unless it is
/// followed by exactly three digits.
fn normalize_number(token: &str) -> String {
    let mut groups: Vec<(Option<char>, &str)> = Vec::new();
    let mut rest = token;
    let mut separator = None;

    loop {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = &rest[..end];
        if let Some(sep) = separator {
            if is_group_space(sep) && digits.len() != 3 {
                break;
            }
        }
        groups.push((separator, digits));

        let mut tail = rest[end..].chars();
        match tail.next() {
            Some(sep) => {
                separator = Some(sep);
                rest = tail.as_str();
            }
            None => break,
        }
    }

    let marks: Vec<char> = groups
        .iter()
        .filter_map(|(sep, _)| *sep)
        .filter(|sep| matches!(*sep, '.' | ','))
        .collect();

    let decimal_mark = match marks.as_slice() {
        [] => None,
        [only] => {
            let (_, digits) = groups
                .iter()
                .rev()
                .find(|(sep, _)| *sep == Some(*only))
                .copied()
                .unwrap_or((None, ""));
            let leading_zero = groups.first().map(|(_, d)| *d == "0").unwrap_or(false);
            (digits.len() != 3 || leading_zero).then_some(*only)
        }
        [.., last] => {
            let mixed = marks.iter().any(|m| m != last);
            mixed.then_some(*last)
        }
    };

    let decimal_index = decimal_mark.and_then(|mark| {
        groups
            .iter()
            .rposition(|(sep, _)| *sep == Some(mark))
    });

    let mut number = String::with_capacity(token.len());
    for (index, (_, digits)) in groups.iter().enumerate() {
        if Some(index) == decimal_index {
            number.push('.');
        }
        number.push_str(digits);
    }
    number
}

fn is_group_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{a0}' || c == '\u{202f}' || c == '\''
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_float_with_currency_and_grouping() {
        assert_eq!(extract_float("1 250,50 €"), Some(1250.50));
        assert_eq!(extract_float("Prix : 349\u{a0}000 €"), Some(349000.0));
        assert_eq!(extract_float("1.250.000 €"), Some(1250000.0));
        assert_eq!(extract_float("1,234,567.89 USD"), Some(1234567.89));
        assert_eq!(extract_float("CHF 1'250'000"), Some(1250000.0));
    }

    #[test]
    fn test_extract_float_decimal_marks() {
        assert_eq!(extract_float("45,5 m²"), Some(45.5));
        assert_eq!(extract_float("72.25 m2"), Some(72.25));
        assert_eq!(extract_float("0,125 ha"), Some(0.125));
        assert_eq!(extract_float("1,250 m²"), Some(1250.0));
    }

    #[test]
    fn test_extract_float_stops_at_first_token() {
        assert_eq!(extract_float("45 m² - 3 pièces"), Some(45.0));
        assert_eq!(extract_float("3 2 1"), Some(3.0));
        assert_eq!(extract_float("Surface: 12."), Some(12.0));
    }

    #[test]
    fn test_extract_float_without_digits() {
        assert_eq!(extract_float("Prix sur demande"), None);
        assert_eq!(extract_float(""), None);
    }

    #[test]
    fn test_extract_int() {
        assert_eq!(extract_int("3 pièces"), Some(3));
        assert_eq!(extract_int("T4 - 2 chambres"), Some(4));
        assert_eq!(extract_int("2,5 rum"), Some(2));
        assert_eq!(extract_int("Studio"), None);
        assert_eq!(extract_int("\u{ff13} pièces, 4 chambres"), Some(4));
    }

    #[test]
    fn test_contains_any_ignores_case() {
        assert!(contains_any("Appartement NEUF", &["neuf"]));
        assert!(contains_any("Livraison 2025", &["neuf", "livraison"]));
        assert!(!contains_any("Appartement ancien", &["neuf", "livraison"]));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Paris \n  11e\t"), "Paris 11e");
        assert_eq!(normalize_whitespace(" \n "), "");
    }
}
