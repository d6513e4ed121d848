//! Typed view of the analysis report returned to API clients.
//!
//! The repair pipeline works on an untyped JSON tree; once a tree has been
//! sanitized, guarded and post-processed it deserializes into these types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trigger tag appended to an item whose text the phrase guard rewrote.
pub const FORBIDDEN_PHRASE_TAG: &str = "FORBIDDEN_PHRASE";

/// Per-clause verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Warning,
    Check,
    Ok,
}

impl Label {
    pub const ALL: [Label; 3] = [Self::Warning, Self::Check, Self::Ok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Check => "CHECK",
            Self::Ok => "OK",
        }
    }

    /// Exact, case-sensitive match against the wire values.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub warning_count: u64,
    pub check_count: u64,
    pub ok_count: u64,
    #[serde(default)]
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    pub clause_id: String,
    pub title: String,
    pub label: Label,
    pub risk_reason: String,
    #[serde(default)]
    pub what_to_confirm: Vec<String>,
    #[serde(default)]
    pub soft_suggestion: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
}

impl ReportItem {
    pub fn was_guarded(&self) -> bool {
        self.triggers.iter().any(|t| t == FORBIDDEN_PHRASE_TAG)
    }
}

/// Final, schema-conformant analysis report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub overall_summary: OverallSummary,
    #[serde(default)]
    pub items: Vec<ReportItem>,
    #[serde(default)]
    pub negotiation_suggestions: Vec<String>,
    pub disclaimer: String,
}

impl AnalysisReport {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Number of items carrying `label`.
    pub fn count(&self, label: Label) -> usize {
        self.items.iter().filter(|i| i.label == label).count()
    }

    /// Whether the summary counts agree with the item labels.
    pub fn counts_consistent(&self) -> bool {
        let s = &self.overall_summary;
        s.warning_count == self.count(Label::Warning) as u64
            && s.check_count == self.count(Label::Check) as u64
            && s.ok_count == self.count(Label::Ok) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_wire_values_are_case_sensitive() {
        assert_eq!(Label::from_wire("WARNING"), Some(Label::Warning));
        assert_eq!(Label::from_wire("OK"), Some(Label::Ok));
        assert_eq!(Label::from_wire("warning"), None);
        assert_eq!(Label::from_wire("DANGER"), None);
    }

    #[test]
    fn report_from_value() {
        let value = json!({
            "overall_summary": {
                "warning_count": 1, "check_count": 0, "ok_count": 1,
                "key_points": ["point"]
            },
            "items": [
                {
                    "clause_id": "C-001", "title": "제8조 손해배상", "label": "WARNING",
                    "risk_reason": "r", "what_to_confirm": [], "soft_suggestion": [],
                    "triggers": ["R-W-DMG-001", "FORBIDDEN_PHRASE"]
                },
                {
                    "clause_id": "C-002", "title": "제9조", "label": "OK",
                    "risk_reason": "", "what_to_confirm": [], "soft_suggestion": [], "triggers": []
                }
            ],
            "negotiation_suggestions": [],
            "disclaimer": "d"
        });
        let report = AnalysisReport::from_value(value).unwrap();
        assert_eq!(report.items.len(), 2);
        assert!(report.items[0].was_guarded());
        assert!(!report.items[1].was_guarded());
        assert!(report.counts_consistent());
    }

    #[test]
    fn inconsistent_counts_detected() {
        let report = AnalysisReport {
            overall_summary: OverallSummary {
                warning_count: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!report.counts_consistent());
    }
}
