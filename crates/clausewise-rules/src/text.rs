//! Pre-segmentation text cleanup: layout-noise removal and PII masking.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Lines repeated at least this often are treated as running headers/footers.
const REPEAT_THRESHOLD: usize = 3;
/// Only lines shorter than this (in chars) can be running headers/footers.
const REPEAT_MAX_CHARS: usize = 50;

static PAGE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:\d+[ \t]*/[ \t]*\d+|page[ \t]+\d+|페이지[ \t]*\d+)[ \t]*$")
        .expect("valid page-number regex")
});

static TOC_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:목차|차례|table of contents|index)\b[^\n]*$")
        .expect("valid toc regex")
});

static HORIZONTAL_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}|\t").expect("valid space regex"));

static TRAILING_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+\n").expect("valid trailing-space regex"));

static EXCESS_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

static SSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{6}-?\d{7}").expect("valid ssn regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"01[016789]-?\d{3,4}-?\d{4}").expect("valid phone regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

static ACCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2,4}-\d{2,4}-\d{3,6}").expect("valid account regex"));

static BANK_ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:국민|신한|우리|하나|농협|기업|카카오|토스|KB|NH|IBK)(?:은행)?[ \t]*\d{8,14}")
        .expect("valid bank account regex")
});

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:서울|부산|대구|인천|광주|대전|울산|세종|경기|강원|충북|충남|전북|전남|경북|경남|제주)[^\n]{0,30}(?:구|군|시|읍|면|동|로|길)\b|아파트[ \t]*\d+[ \t]*동[ \t]*\d+[ \t]*호",
    )
    .expect("valid address regex")
});

pub const MASKED_SSN: &str = "******-*******";
pub const MASKED_EMAIL: &str = "***@***.***";
pub const MASKED_ACCOUNT: &str = "***-***-******";
pub const MASKED_ADDRESS: &str = "***";

/// Strip layout noise left over from text extraction.
///
/// Removes page-number lines, table-of-contents header lines and short lines
/// repeated three or more times; maps NBSP to a space and drops zero-width
/// spaces and BOMs; collapses runs of spaces/tabs and of blank lines; trims.
/// Blank input yields an empty string.
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let s = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{00A0}', " ")
        .replace(['\u{200B}', '\u{FEFF}'], "");
    let s = PAGE_NUMBER_RE.replace_all(&s, "").into_owned();
    let s = TOC_HEADER_RE.replace_all(&s, "").into_owned();
    let s = remove_repeated_lines(&s);
    let s = HORIZONTAL_SPACE_RE.replace_all(&s, " ").into_owned();
    let s = TRAILING_SPACE_RE.replace_all(&s, "\n").into_owned();
    let s = EXCESS_NEWLINES_RE.replace_all(&s, "\n\n");
    s.trim().to_string()
}

fn remove_repeated_lines(text: &str) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for line in text.lines() {
        let key = line.trim();
        if !key.is_empty() && key.chars().count() < REPEAT_MAX_CHARS {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    if counts.values().all(|n| *n < REPEAT_THRESHOLD) {
        return text.to_string();
    }

    text.lines()
        .filter(|line| counts.get(line.trim()).is_none_or(|n| *n < REPEAT_THRESHOLD))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mask personal data before any text leaves the process.
///
/// Digit patterns are only masked when the match is not part of a longer
/// digit run.
pub fn mask_pii(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    let s = replace_digit_bounded(&SSN_RE, text, |_| MASKED_SSN.to_string());
    let s = replace_digit_bounded(&PHONE_RE, &s, mask_phone);
    let s = EMAIL_RE.replace_all(&s, MASKED_EMAIL).into_owned();
    let s = replace_digit_bounded(&BANK_ACCOUNT_RE, &s, |_| MASKED_ACCOUNT.to_string());
    let s = replace_digit_bounded(&ACCOUNT_RE, &s, |_| MASKED_ACCOUNT.to_string());
    ADDRESS_RE.replace_all(&s, MASKED_ADDRESS).into_owned()
}

/// `010-1234-5678` → `010-****-5678`.
fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let prefix = &digits[..3];
    let last4 = &digits[digits.len() - 4..];
    format!("{prefix}-****-{last4}")
}

fn replace_digit_bounded(re: &Regex, text: &str, mask: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in re.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
        {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(&mask(m.as_str()));
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}
