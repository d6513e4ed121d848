//! Article number parsing for clause headings.
//!
//! Converts the numeral captured from a heading (e.g. "3", "십이", "twenty-one")
//! into an integer so candidates can be cross-referenced by article number.
//!
//! # Heading numeral conventions
//!
//! - Arabic digits: 제3조, Article 12
//! - Sino-Korean numerals: 제삼조 (3), 제십이조 (12), 제이십조 (20), 제백오조 (105)
//! - English number words: Article Five, Article Twenty-One

const KO_DIGITS: [(char, u32); 9] = [
    ('일', 1),
    ('이', 2),
    ('삼', 3),
    ('사', 4),
    ('오', 5),
    ('육', 6),
    ('칠', 7),
    ('팔', 8),
    ('구', 9),
];

const KO_UNITS: [(char, u32); 3] = [('십', 10), ('백', 100), ('천', 1000)];

const EN_ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const EN_TENS: [&str; 8] = [
    "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Parse a heading numeral into an article number.
///
/// Returns `None` when the input is not a recognised numeral.
///
/// # Algorithm
///
/// 1. All ASCII digits → decimal parse
/// 2. All Sino-Korean numeral characters → positional accumulation: a digit sets
///    the pending multiplier, a unit (십/백/천) adds `pending × unit` (a bare
///    unit counts as 1 × unit), trailing digit is added last
/// 3. Otherwise English words, optionally hyphen/space compounded ("twenty-one")
pub fn parse_article_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok();
    }

    if s.chars().all(is_korean_numeral) {
        return Some(parse_korean(s));
    }

    parse_english(s)
}

/// Whether `c` is a Sino-Korean numeral character used in headings.
pub fn is_korean_numeral(c: char) -> bool {
    KO_DIGITS.iter().any(|(d, _)| *d == c) || KO_UNITS.iter().any(|(u, _)| *u == c)
}

fn parse_korean(s: &str) -> u32 {
    let mut total = 0u32;
    let mut pending = 0u32;

    for c in s.chars() {
        if let Some((_, d)) = KO_DIGITS.iter().find(|(k, _)| *k == c) {
            pending = *d;
        } else if let Some((_, unit)) = KO_UNITS.iter().find(|(k, _)| *k == c) {
            let multiplier = if pending == 0 { 1 } else { pending };
            total += multiplier * unit;
            pending = 0;
        }
    }

    total + pending
}

fn parse_english(s: &str) -> Option<u32> {
    let lower = s.to_ascii_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect();

    match words.as_slice() {
        [one] => english_ones(one).or_else(|| english_tens(one)),
        [tens, one] => {
            let t = english_tens(tens)?;
            let o = english_ones(one)?;
            (1..10).contains(&o).then_some(t + o)
        }
        _ => None,
    }
}

fn english_ones(w: &str) -> Option<u32> {
    EN_ONES.iter().position(|x| *x == w).map(|i| i as u32)
}

fn english_tens(w: &str) -> Option<u32> {
    EN_TENS
        .iter()
        .position(|x| *x == w)
        .map(|i| (i as u32 + 2) * 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_digits() {
        assert_eq!(parse_article_number("1"), Some(1));
        assert_eq!(parse_article_number(" 12 "), Some(12));
        assert_eq!(parse_article_number("007"), Some(7));
    }

    #[test]
    fn korean_single_digits() {
        assert_eq!(parse_article_number("일"), Some(1));
        assert_eq!(parse_article_number("구"), Some(9));
    }

    #[test]
    fn korean_compound_numerals() {
        assert_eq!(parse_article_number("십"), Some(10));
        assert_eq!(parse_article_number("십이"), Some(12));
        assert_eq!(parse_article_number("이십"), Some(20));
        assert_eq!(parse_article_number("이십삼"), Some(23));
        assert_eq!(parse_article_number("백오"), Some(105));
        assert_eq!(parse_article_number("천이백삼십사"), Some(1234));
    }

    #[test]
    fn english_words() {
        assert_eq!(parse_article_number("One"), Some(1));
        assert_eq!(parse_article_number("nineteen"), Some(19));
        assert_eq!(parse_article_number("Twenty"), Some(20));
        assert_eq!(parse_article_number("twenty-one"), Some(21));
        assert_eq!(parse_article_number("Ninety Nine"), Some(99));
    }

    #[test]
    fn rejects_non_numerals() {
        assert_eq!(parse_article_number(""), None);
        assert_eq!(parse_article_number("Test"), None);
        assert_eq!(parse_article_number("twenty-ten"), None);
        assert_eq!(parse_article_number("3A"), None);
    }
}
