//! Clause segmentation.
//!
//! Splits a normalized contract into [`ClauseCandidate`]s. Documents with
//! article headings (`제3조 …`, `Article 3 …`) are cut at each heading;
//! documents without any fall back to blank-line paragraphs. Oversized
//! candidates are then split further at sentence boundaries.
//!
//! Offsets are byte offsets into the input text. Each candidate's `text` is
//! exactly `input[start_index..end_index]`.

use std::sync::LazyLock;

use clausewise_core::candidate::candidate_id;
use clausewise_core::{ClauseCandidate, Language, parse_article_number};
use regex::Regex;
use tracing::debug;

pub const DEFAULT_MAX_SEGMENT_CHARS: usize = 6000;
pub const DEFAULT_MIN_PARAGRAPH_CHARS: usize = 50;

const EN_NUMBER_WORDS: &str = "(?:twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety)(?:[- ](?:one|two|three|four|five|six|seven|eight|nine))?\
|zero|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?mi)^[ \t]*(?:제[ \t]*(?:(?P<ko>\d+)[ \t]*조|(?P<kn>[일이삼사오육칠팔구십백천]+)조(?:의|[^가-힣\n]|$))|article[ \t]+(?P<en>\d+|{EN_NUMBER_WORDS})\b)[^\n]*"
    ))
    .expect("valid heading regex")
});

/// Paragraph separator: a newline followed by at least one more (blank) line.
static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("valid paragraph regex"));

/// End of a sentence: ASCII terminators need trailing whitespace, full-width ones do not.
static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+\s+|[。！？]+\s*").expect("valid sentence regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Candidates longer than this (in chars) are split into parts.
    pub max_segment_chars: usize,
    /// Paragraph-mode spans must be strictly longer than this (in chars).
    pub min_paragraph_chars: usize,
    /// Language of generated titles ("조항 3" / "Clause 3", part suffixes).
    pub language: Language,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_segment_chars: DEFAULT_MAX_SEGMENT_CHARS,
            min_paragraph_chars: DEFAULT_MIN_PARAGRAPH_CHARS,
            language: Language::default(),
        }
    }
}

/// How a document was segmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    Headings,
    Paragraphs,
}

impl SegmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headings => "headings",
            Self::Paragraphs => "paragraphs",
        }
    }
}

/// Heading-or-paragraph clause splitter.
#[derive(Debug, Clone, Default)]
pub struct ClauseSegmenter {
    config: SegmenterConfig,
}

/// A trimmed region of the source text before it becomes a candidate.
struct Span<'a> {
    start: usize,
    text: &'a str,
    title: String,
    article_number: Option<u32>,
}

impl ClauseSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment `text` into ordered, non-overlapping candidates.
    ///
    /// Blank input yields an empty vector. A document whose paragraphs are all
    /// below the minimum length also yields an empty vector.
    pub fn segment(&self, text: &str) -> Vec<ClauseCandidate> {
        self.segment_with_mode(text).0
    }

    /// As [`segment`](Self::segment), also reporting which mode was used.
    pub fn segment_with_mode(&self, text: &str) -> (Vec<ClauseCandidate>, SegmentMode) {
        if text.trim().is_empty() {
            return (Vec::new(), SegmentMode::Paragraphs);
        }

        let (spans, mode) = match heading_spans(text) {
            spans if !spans.is_empty() => (spans, SegmentMode::Headings),
            _ => (self.paragraph_spans(text), SegmentMode::Paragraphs),
        };

        let mut out = Vec::with_capacity(spans.len());
        for span in spans {
            self.push_span(&mut out, span);
        }

        debug!(mode = mode.as_str(), clauses = out.len(), "segmented document");
        (out, mode)
    }

    fn paragraph_spans<'a>(&self, text: &'a str) -> Vec<Span<'a>> {
        let mut spans = Vec::new();
        let mut from = 0;
        let breaks = PARAGRAPH_BREAK_RE
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .chain(std::iter::once((text.len(), text.len())));

        for (brk_start, brk_end) in breaks {
            if let Some((start, body)) = trimmed(text, from, brk_start)
                && body.chars().count() > self.config.min_paragraph_chars
            {
                spans.push(Span {
                    start,
                    text: body,
                    // placeholder; numbered when pushed
                    title: String::new(),
                    article_number: None,
                });
            }
            from = brk_end;
        }
        spans
    }

    fn push_span(&self, out: &mut Vec<ClauseCandidate>, span: Span<'_>) {
        let lang = self.config.language;
        let title = if span.title.is_empty() {
            lang.clause_title(out.len() + 1)
        } else {
            span.title
        };

        if span.text.chars().count() <= self.config.max_segment_chars {
            out.push(
                ClauseCandidate::new(
                    candidate_id(out.len() + 1),
                    title,
                    span.text,
                    span.start,
                    span.start + span.text.len(),
                )
                .with_article_number(span.article_number),
            );
            return;
        }

        let parts = split_sentences(span.text, self.config.max_segment_chars);
        debug!(title = %title, parts = parts.len(), "split oversized clause");
        for (k, (offset, part)) in parts.into_iter().enumerate() {
            let start = span.start + offset;
            out.push(
                ClauseCandidate::new(
                    candidate_id(out.len() + 1),
                    format!("{title} {}", lang.part_suffix(k + 1)),
                    part,
                    start,
                    start + part.len(),
                )
                .with_article_number(span.article_number),
            );
        }
    }
}

fn heading_spans(text: &str) -> Vec<Span<'_>> {
    let headings: Vec<(usize, Option<u32>)> = HEADING_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let numeral = caps
                .name("ko")
                .or_else(|| caps.name("kn"))
                .or_else(|| caps.name("en"))?;
            Some((whole.start(), parse_article_number(numeral.as_str())))
        })
        .collect();

    let mut spans = Vec::with_capacity(headings.len());
    for (i, (start, article_number)) in headings.iter().enumerate() {
        let end = headings.get(i + 1).map_or(text.len(), |(next, _)| *next);
        if let Some((start, body)) = trimmed(text, *start, end) {
            let title = body.lines().next().unwrap_or_default().trim().to_string();
            spans.push(Span {
                start,
                text: body,
                title,
                article_number: *article_number,
            });
        }
    }
    spans
}

/// `text[from..to]` with surrounding whitespace removed, plus its new start
/// offset. `None` when nothing but whitespace remains.
fn trimmed(text: &str, from: usize, to: usize) -> Option<(usize, &str)> {
    let raw = &text[from..to];
    let body = raw.trim();
    if body.is_empty() {
        return None;
    }
    let lead = raw.len() - raw.trim_start().len();
    Some((from + lead, body))
}

/// Split `body` into parts of at most `max_chars` chars at sentence ends.
///
/// Returns `(byte offset within body, part)`. A single sentence longer than
/// `max_chars` is kept whole.
fn split_sentences(body: &str, max_chars: usize) -> Vec<(usize, &str)> {
    let mut sentences = Vec::new();
    let mut from = 0;
    for m in SENTENCE_END_RE.find_iter(body) {
        sentences.push((from, m.end()));
        from = m.end();
    }
    if from < body.len() {
        sentences.push((from, body.len()));
    }

    let mut parts = Vec::new();
    let mut part_start = 0;
    let mut part_end = 0;
    let mut part_chars = 0;
    for (start, end) in sentences {
        let chars = body[start..end].chars().count();
        if part_chars > 0 && part_chars + chars > max_chars {
            parts.extend(trimmed(body, part_start, part_end));
            part_start = start;
            part_chars = 0;
        }
        part_end = end;
        part_chars += chars;
    }
    parts.extend(trimmed(body, part_start, part_end));
    parts
}
