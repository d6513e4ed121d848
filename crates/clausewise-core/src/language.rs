//! Output language: canonical disclaimer, neutral placeholders, and the
//! absolute phrasing the report must never contain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::rule::ParseTagError;

/// Language the analysis report is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "ko-KR")]
    Korean,
    #[serde(rename = "en-US")]
    English,
}

const KO_FORBIDDEN: &[&str] = &[
    "불법",
    "위법",
    "무효",
    "반드시",
    "확실히",
    "100%",
    "절대",
    "무조건",
    "틀림없이",
    "확정적으로",
    "원천적으로",
    "법적으로",
];

const EN_FORBIDDEN: &[&str] = &[
    "illegal",
    "unlawful",
    "void",
    "must",
    "certainly",
    "100%",
    "absolutely",
    "unconditionally",
    "definitely",
    "guaranteed",
    "without doubt",
];

impl Language {
    pub const ALL: [Language; 2] = [Self::Korean, Self::English];

    /// BCP 47 tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Korean => "ko-KR",
            Self::English => "en-US",
        }
    }

    /// The only disclaimer a report may carry. Byte-exact.
    pub fn disclaimer(&self) -> &'static str {
        match self {
            Self::Korean => {
                "Clausewise는 법률 자문이 아니며, 정보 제공 목적입니다. 중요한 계약은 전문가 상담을 권장드립니다."
            }
            Self::English => {
                "Clausewise is not legal advice and is provided for information only. Please consult a professional before signing important contracts."
            }
        }
    }

    /// Absolute or definitive terms for this language, lower-case.
    pub fn forbidden_phrases(&self) -> &'static [&'static str] {
        match self {
            Self::Korean => KO_FORBIDDEN,
            Self::English => EN_FORBIDDEN,
        }
    }

    /// Generic title for a paragraph-mode clause.
    pub fn clause_title(&self, n: usize) -> String {
        match self {
            Self::Korean => format!("조항 {n}"),
            Self::English => format!("Clause {n}"),
        }
    }

    /// Title suffix for the `k`-th piece of an oversized clause.
    pub fn part_suffix(&self, k: usize) -> String {
        match self {
            Self::Korean => format!("(부분 {k})"),
            Self::English => format!("(part {k})"),
        }
    }

    pub fn key_point_placeholder(&self) -> &'static str {
        match self {
            Self::Korean => "추가 확인이 필요한 부분이 있어요.",
            Self::English => "Some parts of this contract may need a closer look.",
        }
    }

    pub fn title_placeholder(&self) -> &'static str {
        match self {
            Self::Korean => "추가 확인이 필요한 조항",
            Self::English => "Clause that may need a closer look",
        }
    }

    pub fn risk_reason_placeholder(&self) -> &'static str {
        match self {
            Self::Korean => "추가 확인이 필요해요.",
            Self::English => "This clause may need additional review.",
        }
    }

    /// Used for both per-item and contract-wide suggestions.
    pub fn suggestion_placeholder(&self) -> &'static str {
        match self {
            Self::Korean => "일반적으로 주의가 필요할 수 있어요.",
            Self::English => "It may be worth reviewing this point carefully.",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ko" | "ko-kr" | "korean" => Ok(Self::Korean),
            "en" | "en-us" | "en-gb" | "english" => Ok(Self::English),
            _ => Err(ParseTagError {
                kind: "language",
                value: s.to_string(),
            }),
        }
    }
}
