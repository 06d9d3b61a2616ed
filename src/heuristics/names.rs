/// Generational suffixes ignored when locating a surname
pub const NAME_SUFFIXES: &[&str] = &["JR", "SR", "II", "III", "IV", "V"];

/// State names used by the "STATE, SURNAME" intro fallback
pub const US_STATES: &[&str] = &[
    "alabama",
    "alaska",
    "arizona",
    "arkansas",
    "california",
    "colorado",
    "connecticut",
    "delaware",
    "district of columbia",
    "florida",
    "georgia",
    "hawaii",
    "idaho",
    "illinois",
    "indiana",
    "iowa",
    "kansas",
    "kentucky",
    "louisiana",
    "maine",
    "maryland",
    "massachusetts",
    "michigan",
    "minnesota",
    "mississippi",
    "missouri",
    "montana",
    "nebraska",
    "nevada",
    "new hampshire",
    "new jersey",
    "new mexico",
    "new york",
    "north carolina",
    "north dakota",
    "ohio",
    "oklahoma",
    "oregon",
    "pennsylvania",
    "rhode island",
    "south carolina",
    "south dakota",
    "tennessee",
    "texas",
    "utah",
    "vermont",
    "virginia",
    "washington",
    "west virginia",
    "wisconsin",
    "wyoming",
];

/// Title-case every alphabetic run: the first letter after a non-letter is
/// upper-cased, the rest lower-cased ("O'BRIEN" -> "O'Brien").
pub fn titleize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

/// Upper-cased last word of a label with surrounding punctuation removed
pub fn surname_token(label: &str) -> String {
    label
        .split_whitespace()
        .last()
        .map(strip_punctuation)
        .unwrap_or_default()
        .to_uppercase()
}

/// Name words without parenthesized qualifiers or generational suffixes
pub fn name_words(full: &str) -> Vec<&str> {
    let mut depth = 0usize;
    let mut words = Vec::new();

    for word in full.split_whitespace() {
        let opens = word.matches('(').count();
        let closes = word.matches(')').count();
        let inside = depth > 0 || opens > 0;
        depth = (depth + opens).saturating_sub(closes);
        if inside {
            continue;
        }
        let word = strip_punctuation(word);
        if !word.is_empty() {
            words.push(word);
        }
    }

    while words.len() > 1 && is_suffix(words[words.len() - 1]) {
        words.pop();
    }

    words
}

/// (first, last) words of a full name; `None` for single-word names
pub fn name_parts(full: &str) -> Option<(&str, &str)> {
    let words = name_words(full);
    match words.as_slice() {
        [first, .., last] => Some((*first, *last)),
        _ => None,
    }
}

/// Upper-cased surname of a display name
pub fn surname_of(full: &str) -> Option<String> {
    name_words(full).last().map(|w| w.to_uppercase())
}

/// Whether every cased character is upper-case and at least one exists
pub fn is_all_caps(s: &str) -> bool {
    s.chars().any(char::is_alphabetic)
        && s.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
}

fn is_suffix(word: &str) -> bool {
    let upper = word.trim_end_matches('.').to_uppercase();
    NAME_SUFFIXES.contains(&upper.as_str())
}

fn strip_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titleize() {
        assert_eq!(titleize("JOHN SMITH"), "John Smith");
        assert_eq!(titleize("o'brien"), "O'Brien");
        assert_eq!(titleize("Mr. SMITH of texas"), "Mr. Smith Of Texas");
        assert_eq!(titleize("THE CHAIRMAN"), "The Chairman");
    }

    #[test]
    fn test_surname_token() {
        assert_eq!(surname_token("Mr. Smith."), "SMITH");
        assert_eq!(surname_token("The CHAIRMAN"), "CHAIRMAN");
        assert_eq!(surname_token("Senator O'BRIEN"), "O'BRIEN");
        assert_eq!(surname_token(""), "");
    }

    #[test]
    fn test_name_parts_ignores_suffix_and_qualifier() {
        assert_eq!(name_parts("John Q. Smith Jr."), Some(("John", "Smith")));
        assert_eq!(name_parts("John Smith (Politician)"), Some(("John", "Smith")));
        assert_eq!(name_parts("Cher"), None);
        assert_eq!(surname_of("Cher"), Some("CHER".to_string()));
        assert_eq!(surname_of("Henry Cabot Lodge III"), Some("LODGE".to_string()));
    }

    #[test]
    fn test_is_all_caps() {
        assert!(is_all_caps("SMITH"));
        assert!(is_all_caps("O'BRIEN JR."));
        assert!(!is_all_caps("Smith"));
        assert!(!is_all_caps("123"));
    }
}
