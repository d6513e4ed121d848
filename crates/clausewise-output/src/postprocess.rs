//! Final authority over server-owned report fields.
//!
//! Counts are recomputed from the item labels and the disclaimer is always
//! overwritten with the canonical text; whatever the model said about either
//! is discarded.

use std::collections::HashSet;

use clausewise_core::{ClauseCandidate, Label, Language};
use serde_json::{Map, Value};
use tracing::warn;

use crate::schema::normalize_label;

/// Label totals written into `overall_summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub warning: u64,
    pub check: u64,
    pub ok: u64,
}

impl LabelCounts {
    pub fn total(&self) -> u64 {
        self.warning + self.check + self.ok
    }

    fn add(&mut self, label: Label) {
        match label {
            Label::Warning => self.warning += 1,
            Label::Check => self.check += 1,
            Label::Ok => self.ok += 1,
        }
    }
}

/// Recount labels and pin the disclaimer.
///
/// Items whose `clause_id` does not name one of `candidates` are kept but
/// logged. Labels that are not exactly WARNING/CHECK/OK become OK first so
/// the counts always add up to the number of items.
pub fn post_process(root: &mut Value, candidates: &[ClauseCandidate], language: Language) -> LabelCounts {
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    let Some(map) = root.as_object_mut() else {
        return LabelCounts::default();
    };

    let known: HashSet<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    let mut counts = LabelCounts::default();

    if !map.get("items").is_some_and(Value::is_array) {
        map.insert("items".into(), Value::Array(Vec::new()));
    }
    if let Some(items) = map.get_mut("items").and_then(Value::as_array_mut) {
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            let raw = item.get("label").and_then(Value::as_str).unwrap_or_default();
            let label = match Label::from_wire(raw) {
                Some(label) => label,
                None => {
                    let label = normalize_label(raw);
                    item.insert("label".into(), Value::String(label.as_str().into()));
                    label
                }
            };
            counts.add(label);

            let clause_id = item.get("clause_id").and_then(Value::as_str).unwrap_or_default();
            if !known.contains(clause_id) {
                warn!(clause_id, "report item does not match any selected clause");
            }
        }
    }

    if !map.get("overall_summary").is_some_and(Value::is_object) {
        map.insert("overall_summary".into(), Value::Object(Map::new()));
    }
    if let Some(summary) = map.get_mut("overall_summary").and_then(Value::as_object_mut) {
        summary.insert("warning_count".into(), Value::from(counts.warning));
        summary.insert("check_count".into(), Value::from(counts.check));
        summary.insert("ok_count".into(), Value::from(counts.ok));
    }

    map.insert(
        "disclaimer".into(),
        Value::String(language.disclaimer().into()),
    );

    counts
}
