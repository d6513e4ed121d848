//! Clause candidates and the rule hits attached to them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::rule::{RuleCategory, Severity};

/// One concrete regex match of a rule inside a clause.
///
/// `start_index`/`end_index` are byte offsets into the owning candidate's `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTrigger {
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    /// Base weight plus the contract-type boost in effect for the request.
    pub weight: u32,
    pub matched_text: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// A contiguous span of contract text analysed as one unit.
///
/// `start_index`/`end_index` are byte offsets into the segmented document.
/// Scores are only ever set through [`ClauseCandidate::attach_triggers`], which
/// keeps `total_score` and `category_scores` consistent with `rule_triggers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseCandidate {
    pub id: String,
    pub title: String,
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Number parsed from the clause heading, when the document has headings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_number: Option<u32>,
    #[serde(default)]
    pub rule_triggers: Vec<RuleTrigger>,
    #[serde(default)]
    pub category_scores: BTreeMap<RuleCategory, u32>,
    #[serde(default)]
    pub total_score: u32,
}

/// Sequential candidate id: 1 → `C-001`.
pub fn candidate_id(seq: usize) -> String {
    format!("C-{seq:03}")
}

impl ClauseCandidate {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        start_index: usize,
        end_index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            start_index,
            end_index,
            article_number: None,
            rule_triggers: Vec::new(),
            category_scores: BTreeMap::new(),
            total_score: 0,
        }
    }

    pub fn with_article_number(mut self, number: Option<u32>) -> Self {
        self.article_number = number;
        self
    }

    /// Replace this candidate's triggers and recompute its scores from them.
    pub fn attach_triggers(&mut self, triggers: Vec<RuleTrigger>) {
        let mut category_scores = BTreeMap::new();
        for t in &triggers {
            let score = category_scores.entry(t.category).or_insert(0u32);
            *score = score.saturating_add(t.weight);
        }
        self.total_score = triggers
            .iter()
            .fold(0u32, |acc, t| acc.saturating_add(t.weight));
        self.category_scores = category_scores;
        self.rule_triggers = triggers;
    }

    /// Number of triggers from WARNING-severity rules.
    pub fn warning_count(&self) -> usize {
        self.rule_triggers
            .iter()
            .filter(|t| t.severity == Severity::Warning)
            .count()
    }

    /// Distinct categories among this candidate's triggers.
    pub fn categories(&self) -> BTreeSet<RuleCategory> {
        self.rule_triggers.iter().map(|t| t.category).collect()
    }

    /// Distinct rule ids, in first-trigger order.
    pub fn rule_ids(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.rule_triggers
            .iter()
            .map(|t| t.rule_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn has_triggers(&self) -> bool {
        !self.rule_triggers.is_empty()
    }

    /// Text length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Output of one rule-engine pass over a document's candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRunResult {
    pub candidates: Vec<ClauseCandidate>,
    /// Document-wide sum of trigger weights per category.
    pub category_scores: BTreeMap<RuleCategory, u32>,
    pub total_triggers: usize,
}

impl RuleRunResult {
    /// Categories ordered by descending document score (ties by category order).
    pub fn ranked_categories(&self) -> Vec<(RuleCategory, u32)> {
        let mut ranked: Vec<_> = self.category_scores.iter().map(|(k, v)| (*k, *v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(rule_id: &str, category: RuleCategory, severity: Severity, weight: u32) -> RuleTrigger {
        RuleTrigger {
            rule_id: rule_id.into(),
            category,
            severity,
            weight,
            matched_text: "x".into(),
            start_index: 0,
            end_index: 1,
        }
    }

    #[test]
    fn candidate_ids_are_zero_padded() {
        assert_eq!(candidate_id(1), "C-001");
        assert_eq!(candidate_id(42), "C-042");
        assert_eq!(candidate_id(1234), "C-1234");
    }

    #[test]
    fn attach_triggers_recomputes_scores() {
        let mut c = ClauseCandidate::new("C-001", "t", "x", 0, 1);
        c.attach_triggers(vec![
            trigger("R-1", RuleCategory::Penalty, Severity::Warning, 3),
            trigger("R-1", RuleCategory::Penalty, Severity::Warning, 3),
            trigger("R-2", RuleCategory::Payment, Severity::Check, 2),
        ]);
        assert_eq!(c.total_score, 8);
        assert_eq!(c.category_scores[&RuleCategory::Penalty], 6);
        assert_eq!(c.category_scores[&RuleCategory::Payment], 2);
        assert_eq!(c.warning_count(), 2);
        assert_eq!(c.rule_ids(), vec!["R-1", "R-2"]);
    }

    #[test]
    fn attach_empty_triggers_resets_scores() {
        let mut c = ClauseCandidate::new("C-001", "t", "x", 0, 1);
        c.attach_triggers(vec![trigger("R-1", RuleCategory::Penalty, Severity::Warning, 3)]);
        c.attach_triggers(Vec::new());
        assert_eq!(c.total_score, 0);
        assert!(c.category_scores.is_empty());
        assert!(!c.has_triggers());
    }

    #[test]
    fn ranked_categories_descending() {
        let mut result = RuleRunResult::default();
        result.category_scores.insert(RuleCategory::Payment, 2);
        result.category_scores.insert(RuleCategory::Penalty, 9);
        result.category_scores.insert(RuleCategory::Termination, 2);
        let ranked = result.ranked_categories();
        assert_eq!(ranked[0], (RuleCategory::Penalty, 9));
        assert_eq!(ranked[1], (RuleCategory::Payment, 2));
        assert_eq!(ranked[2], (RuleCategory::Termination, 2));
    }
}
