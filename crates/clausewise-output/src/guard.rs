//! Forbidden-phrase guard.
//!
//! The report must never sound like a legal verdict. Any user-facing string
//! containing an absolute term ("illegal", "반드시", "100%", ...) is replaced
//! wholesale by a neutral placeholder. An item that was rewritten loses a
//! WARNING label (downgraded to CHECK) and is tagged `FORBIDDEN_PHRASE`.

use clausewise_core::{FORBIDDEN_PHRASE_TAG, Label, Language};
use serde_json::{Map, Value};

/// What one guard pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardOutcome {
    /// Strings replaced by a placeholder, across the whole report.
    pub replaced_fields: usize,
    /// `clause_id` of every item that had a field replaced.
    pub guarded_items: Vec<String>,
    /// Items downgraded from WARNING to CHECK.
    pub downgraded: usize,
}

impl GuardOutcome {
    pub fn changed(&self) -> bool {
        self.replaced_fields > 0
    }
}

/// Case-insensitive substring blacklist with per-field placeholders.
#[derive(Debug, Clone)]
pub struct ForbiddenPhraseGuard {
    /// Lower-cased.
    phrases: Vec<String>,
    language: Language,
}

impl ForbiddenPhraseGuard {
    /// Guard matching every supported language's phrases, with `language`
    /// placeholders.
    pub fn new(language: Language) -> Self {
        let phrases = Language::ALL
            .iter()
            .flat_map(|l| l.forbidden_phrases().iter().copied());
        Self::with_phrases(language, phrases)
    }

    pub fn with_phrases<I, S>(language: Language, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lowered: Vec<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        lowered.sort();
        lowered.dedup();
        Self {
            phrases: lowered,
            language,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// First blacklisted phrase contained in `text`, if any.
    pub fn find_forbidden(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.phrases
            .iter()
            .find(|p| lower.contains(p.as_str()))
            .map(String::as_str)
    }

    /// Rewrite every offending string in `root` in place.
    ///
    /// Only string content, labels and trigger tags change; no field is
    /// removed. Running the guard on its own output changes nothing.
    pub fn guard(&self, root: &mut Value) -> GuardOutcome {
        let mut outcome = GuardOutcome::default();
        let lang = self.language;

        if let Some(points) = root
            .get_mut("overall_summary")
            .and_then(|s| s.get_mut("key_points"))
        {
            outcome.replaced_fields += self.scrub_array(points, lang.key_point_placeholder());
        }

        if let Some(items) = root.get_mut("items").and_then(Value::as_array_mut) {
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                let replaced = self.guard_item(item);
                if replaced == 0 {
                    continue;
                }
                outcome.replaced_fields += replaced;
                if item.get("label").and_then(Value::as_str) == Some(Label::Warning.as_str()) {
                    item.insert("label".into(), Value::String(Label::Check.as_str().into()));
                    outcome.downgraded += 1;
                }
                tag_item(item);
                let id = item.get("clause_id").and_then(Value::as_str).unwrap_or_default();
                outcome.guarded_items.push(id.to_string());
            }
        }

        if let Some(suggestions) = root.get_mut("negotiation_suggestions") {
            outcome.replaced_fields += self.scrub_array(suggestions, lang.suggestion_placeholder());
        }

        outcome
    }

    fn guard_item(&self, item: &mut Map<String, Value>) -> usize {
        let lang = self.language;
        let mut replaced = 0;
        if let Some(title) = item.get_mut("title") {
            replaced += self.scrub(title, lang.title_placeholder());
        }
        if let Some(reason) = item.get_mut("risk_reason") {
            replaced += self.scrub(reason, lang.risk_reason_placeholder());
        }
        if let Some(suggestions) = item.get_mut("soft_suggestion") {
            replaced += self.scrub_array(suggestions, lang.suggestion_placeholder());
        }
        replaced
    }

    fn scrub(&self, value: &mut Value, placeholder: &str) -> usize {
        match value {
            Value::String(s) if self.find_forbidden(s.as_str()).is_some() => {
                *s = placeholder.to_string();
                1
            }
            _ => 0,
        }
    }

    fn scrub_array(&self, value: &mut Value, placeholder: &str) -> usize {
        match value.as_array_mut() {
            Some(array) => array.iter_mut().map(|v| self.scrub(v, placeholder)).sum(),
            None => self.scrub(value, placeholder),
        }
    }
}

fn tag_item(item: &mut Map<String, Value>) {
    let tag = Value::String(FORBIDDEN_PHRASE_TAG.into());
    match item.get_mut("triggers").and_then(Value::as_array_mut) {
        Some(triggers) => {
            if !triggers.contains(&tag) {
                triggers.push(tag);
            }
        }
        None => {
            item.insert("triggers".into(), Value::Array(vec![tag]));
        }
    }
}
