//! The full repair chain: extract → validate/sanitize → guard → post-process.

use clausewise_core::{AnalysisReport, ClauseCandidate, Language};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::RepairError;
use crate::guard::{ForbiddenPhraseGuard, GuardOutcome};
use crate::postprocess::{LabelCounts, post_process};
use crate::repair::extract_value;
use crate::schema::{sanitize, validate};

/// Result of running a raw model response through the pipeline.
#[derive(Debug, Clone)]
pub struct ProcessedOutput {
    /// Schema-conformant JSON tree.
    pub json: Value,
    /// The same document, typed.
    pub report: AnalysisReport,
    /// Schema violations found before sanitizing.
    pub violations: Vec<String>,
    pub guard: GuardOutcome,
    pub counts: LabelCounts,
}

impl ProcessedOutput {
    /// Canonical compact serialization of [`json`](Self::json).
    pub fn to_json_string(&self) -> String {
        self.json.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct OutputPipeline {
    language: Language,
    guard: ForbiddenPhraseGuard,
}

impl OutputPipeline {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            guard: ForbiddenPhraseGuard::new(language),
        }
    }

    pub fn with_guard(mut self, guard: ForbiddenPhraseGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Run every stage over `raw`.
    ///
    /// Only extraction can fail; every later stage is total.
    pub fn process(
        &self,
        raw: &str,
        candidates: &[ClauseCandidate],
    ) -> Result<ProcessedOutput, RepairError> {
        let value = extract_value(raw)?;

        let violations = validate(&value).violations;
        if !violations.is_empty() {
            warn!(
                violations = violations.len(),
                first = %violations[0],
                "model output violates report schema, sanitizing"
            );
        }
        let mut json = sanitize(value, self.language);

        let guard = self.guard.guard(&mut json);
        if guard.changed() {
            info!(
                replaced = guard.replaced_fields,
                downgraded = guard.downgraded,
                items = guard.guarded_items.len(),
                "replaced forbidden phrasing"
            );
        }

        let counts = post_process(&mut json, candidates, self.language);
        let report = AnalysisReport::from_value(json.clone())?;

        Ok(ProcessedOutput {
            json,
            report,
            violations,
            guard,
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausewise_core::Label;

    fn candidates() -> Vec<ClauseCandidate> {
        vec![
            ClauseCandidate::new("C-001", "제8조 손해배상", "text", 0, 4),
            ClauseCandidate::new("C-002", "제9조 위약금", "text", 5, 9),
        ]
    }

    const RAW: &str = r#"Here's my analysis:
```json
{
  "overall_summary": {
    "warning_count": 5, "check_count": 5, "ok_count": 5,
    "key_points": ["손해배상 한도가 없어요.", "이 계약은 100% 불리합니다."],
  },
  "items": [
    {
      "clause_id": "C-001",
      "title": "제8조 손해배상",
      "label": "WARNING",
      "risk_reason": "이 조항은 법적으로 무효입니다.",
      "what_to_confirm": ["배상 한도"],
      "soft_suggestion": ["한도를 정하자고 제안해 볼 수 있어요."],
      "triggers": ["R-W-DMG-001"]
    },
    {
      "clause_id": "C-002",
      "title": “제9조 위약금”,
      "label": "CHECK",
      "risk_reason": "위약금 금액을 확인해 보세요.",
      "what_to_confirm": [],
      "soft_suggestion": [],
      "triggers": ["R-W-PEN-001"],
    }
  ],
  "negotiation_suggestions": ["배상 한도 협의"],
  "disclaimer": "법률 자문입니다."
}
```"#;

    #[test]
    fn processes_fenced_korean_response() {
        let out = OutputPipeline::new(Language::Korean)
            .process(RAW, &candidates())
            .unwrap();

        assert_eq!(out.report.items.len(), 2);
        let first = &out.report.items[0];
        assert_eq!(first.label, Label::Check, "guard downgrades the WARNING");
        assert!(first.was_guarded());
        assert_eq!(first.risk_reason, Language::Korean.risk_reason_placeholder());
        assert_eq!(out.report.items[1].title, "제9조 위약금");

        assert_eq!(
            out.report.overall_summary.key_points[1],
            Language::Korean.key_point_placeholder()
        );
        assert_eq!(out.report.overall_summary.warning_count, 0);
        assert_eq!(out.report.overall_summary.check_count, 2);
        assert!(out.report.counts_consistent());
        assert_eq!(out.report.disclaimer, Language::Korean.disclaimer());
        assert_eq!(out.guard.guarded_items, vec!["C-001"]);
    }

    #[test]
    fn repairs_minimal_object_into_full_report() {
        let out = OutputPipeline::new(Language::English)
            .process("{\"items\": [{\"clause_id\": \"C-002\", \"label\": \"WARNING\"}]}", &candidates())
            .unwrap();
        assert!(!out.violations.is_empty());
        assert_eq!(out.report.items[0].label, Label::Warning);
        assert_eq!(out.counts.warning, 1);
        assert_eq!(out.report.disclaimer, Language::English.disclaimer());
        assert!(out.to_json_string().contains("\"warning_count\":1"));
    }

    #[test]
    fn extraction_failures_propagate() {
        let pipeline = OutputPipeline::new(Language::Korean);
        assert!(matches!(
            pipeline.process("", &[]).unwrap_err(),
            RepairError::EmptyInput
        ));
        assert!(matches!(
            pipeline.process("죄송합니다, 분석할 수 없습니다.", &[]).unwrap_err(),
            RepairError::NoJsonObjectFound
        ));
    }
}
