//! Prompt construction for the clause review call.
//!
//! Three parts: a fixed system prompt, a developer prompt carrying the request
//! context and the rule catalog, and a user prompt carrying the selected
//! clauses with their rule hits.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use clausewise_core::{ClauseCandidate, ContractType, Label, Language, UserProfile};
use clausewise_rules::RuleCatalog;

use crate::LlmRequest;

const SYSTEM_PROMPT: &str = "\
You review contract clauses for an individual who is about to sign.
You are not a lawyer and you do not give legal advice.

Rules:
- Respond with a single JSON object and nothing else. No markdown, no code fences.
- Point out what deserves attention and what to confirm with the other party.
- Use cautious, suggestive wording (\"may\", \"worth confirming\", \"consider asking\").
- Never state that a clause is legal, illegal, valid or void.
- Never use any of these words or phrases:";

/// Weight band shown next to each trigger: HIGH (4+), MEDIUM (2-3), LOW.
pub fn weight_band(weight: u32) -> &'static str {
    match weight {
        4.. => "HIGH",
        2..=3 => "MEDIUM",
        _ => "LOW",
    }
}

/// Builds [`LlmRequest`]s against one rule catalog.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    catalog: Arc<RuleCatalog>,
}

impl PromptBuilder {
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self { catalog }
    }

    pub fn system_prompt(&self, language: Language) -> String {
        let mut out = String::from(SYSTEM_PROMPT);
        for phrase in language.forbidden_phrases() {
            let _ = write!(out, " \"{phrase}\"");
        }
        out.push('\n');
        out
    }

    pub fn developer_prompt(
        &self,
        contract_type: ContractType,
        profile: UserProfile,
        language: Language,
    ) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "## Context");
        let _ = writeln!(out, "- contract type: {contract_type}");
        let _ = writeln!(out, "- user profile: {profile}");
        let _ = writeln!(out, "- write every text field in: {}", language.tag());
        out.push('\n');

        let _ = writeln!(out, "## Task");
        let _ = writeln!(
            out,
            "For each clause below, decide a label, explain the risk briefly, list what \
             to confirm, and offer softly worded suggestions. Use the detected rules as \
             evidence but read the clause text yourself."
        );
        out.push('\n');

        let _ = writeln!(out, "## Labels");
        for label in Label::ALL {
            let meaning = match label {
                Label::Warning => "likely unfavourable or commonly disputed; raise before signing",
                Label::Check => "numbers, periods or scope need to be confirmed",
                Label::Ok => "nothing notable",
            };
            let _ = writeln!(out, "- {label}: {meaning}");
        }
        out.push('\n');

        let _ = writeln!(out, "## Rule catalog (weights for {contract_type})");
        for rule in self.catalog.rules() {
            let boost = rule.boost_for(contract_type);
            let _ = write!(
                out,
                "- {} [{} / {}] weight {}",
                rule.id,
                rule.severity,
                rule.category,
                rule.weight_for(contract_type)
            );
            if boost > 0 {
                let _ = write!(out, " (base {} + boost {boost})", rule.base_weight);
            }
            if !rule.description.is_empty() {
                let _ = write!(out, ": {}", rule.description);
            }
            out.push('\n');
        }
        out.push('\n');

        let _ = writeln!(out, "## Output schema");
        let _ = writeln!(out, "{}", output_schema(language));
        out.push('\n');

        let _ = writeln!(out, "## Requirements");
        let _ = writeln!(out, "- one item per clause, with clause_id copied exactly");
        let _ = writeln!(out, "- label is exactly one of WARNING, CHECK, OK");
        let _ = writeln!(out, "- triggers lists the rule ids detected for that clause");
        let _ = writeln!(out, "- risk_reason at most 300 characters");
        let _ = writeln!(out, "- disclaimer copied verbatim from the schema");
        out
    }

    pub fn user_prompt(&self, candidates: &[ClauseCandidate], language: Language) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "## Clauses ({})", candidates.len());
        out.push('\n');

        let mut hits: BTreeMap<&str, usize> = BTreeMap::new();
        for candidate in candidates {
            let _ = writeln!(out, "### {} {}", candidate.id, candidate.title);
            let _ = writeln!(out, "```");
            let _ = writeln!(out, "{}", candidate.text.trim());
            let _ = writeln!(out, "```");
            if candidate.rule_triggers.is_empty() {
                let _ = writeln!(out, "detected rules: none");
            } else {
                let _ = writeln!(out, "detected rules:");
            }
            for trigger in &candidate.rule_triggers {
                *hits.entry(trigger.rule_id.as_str()).or_insert(0) += 1;
                let description = self
                    .catalog
                    .get(&trigger.rule_id)
                    .map(|r| r.description.as_str())
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "- {} [{} / {}] weight {} ({}) {description} matched \"{}\"",
                    trigger.rule_id,
                    trigger.severity,
                    trigger.category,
                    trigger.weight,
                    weight_band(trigger.weight),
                    trigger.matched_text
                );
            }
            out.push('\n');
        }

        let _ = writeln!(out, "## Detected rule summary");
        if hits.is_empty() {
            let _ = writeln!(out, "none");
        }
        for (rule_id, count) in &hits {
            let _ = writeln!(out, "- {rule_id}: {count}");
        }
        out.push('\n');

        let _ = writeln!(out, "## Clause to rule mapping");
        for candidate in candidates {
            let _ = writeln!(out, "- {}: [{}]", candidate.id, candidate.rule_ids().join(", "));
        }
        out.push('\n');

        let _ = writeln!(
            out,
            "Answer in {} with the JSON object only.",
            language.tag()
        );
        out
    }

    pub fn build_request(
        &self,
        candidates: &[ClauseCandidate],
        contract_type: ContractType,
        profile: UserProfile,
        language: Language,
    ) -> LlmRequest {
        LlmRequest::new(
            self.system_prompt(language),
            self.developer_prompt(contract_type, profile, language),
            self.user_prompt(candidates, language),
        )
    }
}

fn output_schema(language: Language) -> String {
    format!(
        r#"{{
  "overall_summary": {{
    "warning_count": 0,
    "check_count": 0,
    "ok_count": 0,
    "key_points": ["string"]
  }},
  "items": [
    {{
      "clause_id": "C-001",
      "title": "string",
      "label": "WARNING | CHECK | OK",
      "risk_reason": "string",
      "what_to_confirm": ["string"],
      "soft_suggestion": ["string"],
      "triggers": ["R-..."]
    }}
  ],
  "negotiation_suggestions": ["string"],
  "disclaimer": "{}"
}}"#,
        language.disclaimer()
    )
}
