//! Report schema: validation and sanitization of the untyped JSON tree.
//!
//! [`validate`] collects every violation without touching the tree.
//! [`sanitize`] turns any JSON value into a schema-conformant report, filling
//! defaults and truncating over-long strings. Sanitizing is idempotent.

use clausewise_core::{Label, Language};
use serde_json::{Map, Value};

pub const MAX_RISK_REASON_CHARS: usize = 300;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_KEY_POINT_CHARS: usize = 200;
pub const MAX_NEGOTIATION_SUGGESTION_CHARS: usize = 200;

const COUNT_FIELDS: [&str; 3] = ["warning_count", "check_count", "ok_count"];
const ITEM_STRING_FIELDS: [&str; 4] = ["clause_id", "title", "label", "risk_reason"];
const ITEM_ARRAY_FIELDS: [&str; 3] = ["what_to_confirm", "soft_suggestion", "triggers"];

/// Outcome of [`validate`]. A report with violations is still usable after
/// [`sanitize`]; violations are diagnostic only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check `root` against the report schema, collecting every violation.
pub fn validate(root: &Value) -> ValidationReport {
    let mut v = Vec::new();

    let Some(root) = root.as_object() else {
        v.push("root is not an object".to_string());
        return ValidationReport { violations: v };
    };

    match root.get("overall_summary").and_then(Value::as_object) {
        Some(summary) => {
            for field in COUNT_FIELDS {
                match summary.get(field) {
                    None => v.push(format!("overall_summary.{field} is missing")),
                    Some(n) if n.as_u64().is_none() => {
                        v.push(format!("overall_summary.{field} is not a non-negative integer"))
                    }
                    Some(_) => {}
                }
            }
            if let Some(points) = summary.get("key_points") {
                check_string_array(&mut v, "overall_summary.key_points", points, Some(MAX_KEY_POINT_CHARS));
            }
        }
        None => v.push("overall_summary is missing or not an object".to_string()),
    }

    match root.get("items").and_then(Value::as_array) {
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                validate_item(&mut v, i, item);
            }
        }
        None => v.push("items is missing or not an array".to_string()),
    }

    match root.get("negotiation_suggestions") {
        Some(s) => check_string_array(
            &mut v,
            "negotiation_suggestions",
            s,
            Some(MAX_NEGOTIATION_SUGGESTION_CHARS),
        ),
        None => v.push("negotiation_suggestions is missing".to_string()),
    }

    match root.get("disclaimer") {
        Some(Value::String(_)) => {}
        Some(_) => v.push("disclaimer is not a string".to_string()),
        None => v.push("disclaimer is missing".to_string()),
    }

    ValidationReport { violations: v }
}

fn validate_item(v: &mut Vec<String>, i: usize, item: &Value) {
    let Some(item) = item.as_object() else {
        v.push(format!("items[{i}] is not an object"));
        return;
    };

    for field in ITEM_STRING_FIELDS {
        match item.get(field) {
            None => v.push(format!("items[{i}].{field} is missing")),
            Some(Value::String(_)) => {}
            Some(_) => v.push(format!("items[{i}].{field} is not a string")),
        }
    }
    for field in ITEM_ARRAY_FIELDS {
        match item.get(field) {
            None => v.push(format!("items[{i}].{field} is missing")),
            Some(value) => check_string_array(v, &format!("items[{i}].{field}"), value, None),
        }
    }

    if let Some(label) = item.get("label").and_then(Value::as_str)
        && Label::from_wire(label).is_none()
    {
        v.push(format!("items[{i}].label {label:?} is not one of WARNING, CHECK, OK"));
    }
    check_length(v, &format!("items[{i}].title"), item.get("title"), MAX_TITLE_CHARS);
    check_length(
        v,
        &format!("items[{i}].risk_reason"),
        item.get("risk_reason"),
        MAX_RISK_REASON_CHARS,
    );
}

fn check_string_array(v: &mut Vec<String>, path: &str, value: &Value, max_chars: Option<usize>) {
    let Some(array) = value.as_array() else {
        v.push(format!("{path} is not an array"));
        return;
    };
    for (j, el) in array.iter().enumerate() {
        if !el.is_string() {
            v.push(format!("{path}[{j}] is not a string"));
        } else if let Some(max) = max_chars {
            check_length(v, &format!("{path}[{j}]"), Some(el), max);
        }
    }
}

fn check_length(v: &mut Vec<String>, path: &str, value: Option<&Value>, max: usize) {
    if let Some(s) = value.and_then(Value::as_str) {
        let len = s.chars().count();
        if len > max {
            v.push(format!("{path} is {len} characters, limit is {max}"));
        }
    }
}

/// Coerce any value into a schema-conformant report.
///
/// Missing or mistyped fields get safe defaults (empty string, empty array,
/// zero, label `OK`); non-object items are dropped; strings over their
/// ceiling are hard-cut; unknown keys are kept. A missing disclaimer is
/// filled with the canonical one for `language`.
pub fn sanitize(root: Value, language: Language) -> Value {
    let mut root = match root {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let summary = sanitize_summary(root.remove("overall_summary"));
    root.insert("overall_summary".into(), summary);

    let items = match root.remove("items") {
        Some(Value::Array(items)) => items.into_iter().filter_map(sanitize_item).collect(),
        _ => Vec::new(),
    };
    root.insert("items".into(), Value::Array(items));

    let suggestions = string_array(
        root.remove("negotiation_suggestions"),
        Some(MAX_NEGOTIATION_SUGGESTION_CHARS),
    );
    root.insert("negotiation_suggestions".into(), suggestions);

    if !root.get("disclaimer").is_some_and(Value::is_string) {
        root.insert("disclaimer".into(), Value::String(language.disclaimer().into()));
    }

    Value::Object(root)
}

fn sanitize_summary(value: Option<Value>) -> Value {
    let mut summary = match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for field in COUNT_FIELDS {
        let n = count(summary.get(field));
        summary.insert(field.into(), Value::from(n));
    }
    let points = string_array(summary.remove("key_points"), Some(MAX_KEY_POINT_CHARS));
    summary.insert("key_points".into(), points);
    Value::Object(summary)
}

fn sanitize_item(value: Value) -> Option<Value> {
    let Value::Object(mut item) = value else {
        return None;
    };

    let clause_id = text(item.remove("clause_id"));
    item.insert("clause_id".into(), Value::String(clause_id));

    let title = truncate(text(item.remove("title")), MAX_TITLE_CHARS);
    item.insert("title".into(), Value::String(title));

    let label = normalize_label(&text(item.remove("label")));
    item.insert("label".into(), Value::String(label.as_str().into()));

    let reason = truncate(text(item.remove("risk_reason")), MAX_RISK_REASON_CHARS);
    item.insert("risk_reason".into(), Value::String(reason));

    for field in ITEM_ARRAY_FIELDS {
        let array = string_array(item.remove(field), None);
        item.insert(field.into(), array);
    }

    Some(Value::Object(item))
}

/// Exact wire label; anything else, including case or whitespace variants, becomes `OK`.
pub fn normalize_label(raw: &str) -> Label {
    Label::from_wire(raw).unwrap_or(Label::Ok)
}

fn count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// String content of a scalar; `""` for null, missing and containers.
fn text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Array of strings. A lone non-empty string is wrapped; other non-arrays
/// become `[]`.
fn string_array(value: Option<Value>, max_chars: Option<usize>) -> Value {
    let strings: Vec<String> = match value {
        Some(Value::Array(items)) => items.into_iter().map(|v| text(Some(v))).collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    };
    let strings = strings.into_iter().map(|s| match max_chars {
        Some(max) => truncate(s, max),
        None => s,
    });
    Value::Array(strings.map(Value::String).collect())
}

/// Hard cut to `max` chars, no ellipsis.
pub fn truncate(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].to_string(),
        None => s,
    }
}
