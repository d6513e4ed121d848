//! One contract analysis, end to end.
//!
//! normalize → mask PII → segment → run rules → select → prompt → LLM →
//! repair pipeline → [`AnalysisRecord`]. Failures never escape as errors: they
//! become a FAILED record with an [`ErrorCode`] and an audit entry.

pub mod record;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clausewise_core::{ClauseCandidate, ContractType, Language, RuleCategory, UserProfile};
use clausewise_llm::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, LlmClient, LlmRequest, PromptBuilder,
};
use clausewise_output::{OutputPipeline, ProcessedOutput};
use clausewise_rules::{
    ClauseSegmenter, RuleCatalog, RuleEngine, SelectionConfig, SegmenterConfig, mask_pii,
    normalize,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

pub use record::{AnalysisRecord, AnalysisStatus, AuditRecord, AuditTrail, ErrorCode};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Most candidates sent to the model per request.
    pub top_n: usize,
    pub segmenter: SegmenterConfig,
    pub selection: SelectionConfig,
    /// Used when a request does not name its own language.
    pub language: Language,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            segmenter: SegmenterConfig::default(),
            selection: SelectionConfig::default(),
            language: Language::default(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Extracted contract text, before normalization.
    pub text: String,
    pub contract_type: ContractType,
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub language: Option<Language>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>, contract_type: ContractType) -> Self {
        Self {
            text: text.into(),
            contract_type,
            user_profile: UserProfile::default(),
            language: None,
        }
    }

    pub fn with_user_profile(mut self, profile: UserProfile) -> Self {
        self.user_profile = profile;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

/// State between rule selection and the model's answer.
#[derive(Debug, Clone)]
pub struct PreparedAnalysis {
    pub id: Uuid,
    pub contract_type: ContractType,
    pub user_profile: UserProfile,
    pub language: Language,
    /// Normalized, PII-masked document text.
    pub text: String,
    pub candidates_considered: usize,
    pub selected: Vec<ClauseCandidate>,
    pub llm_request: LlmRequest,
    audit: AuditTrail,
    created_at: DateTime<Utc>,
}

impl PreparedAnalysis {
    pub fn audit(&self) -> &[AuditRecord] {
        self.audit.entries()
    }

    fn rule_categories(&self) -> BTreeSet<RuleCategory> {
        self.selected.iter().flat_map(|c| c.categories()).collect()
    }

    fn into_record(
        mut self,
        outcome: Result<ProcessedOutput, (ErrorCode, String)>,
        llm_model: Option<String>,
    ) -> AnalysisRecord {
        let (status, error_code, error_message, report) = match outcome {
            Ok(output) => {
                self.audit.record(
                    "analysis-completed",
                    format!(
                        "items={} warning={} check={} ok={} guarded={}",
                        output.report.items.len(),
                        output.counts.warning,
                        output.counts.check,
                        output.counts.ok,
                        output.guard.guarded_items.len()
                    ),
                );
                (AnalysisStatus::Done, None, None, Some(output.report))
            }
            Err((code, message)) => {
                self.audit
                    .record("analysis-failed", format!("{code}: {message}"));
                (AnalysisStatus::Failed, Some(code), Some(message), None)
            }
        };

        info!(
            id = %self.id,
            status = status.as_str(),
            selected = self.selected.len(),
            "analysis finished"
        );

        AnalysisRecord {
            id: self.id,
            contract_type: self.contract_type,
            user_profile: self.user_profile,
            language: self.language,
            status,
            error_code,
            error_message,
            report,
            rule_categories: self.rule_categories(),
            llm_model,
            candidates_considered: self.candidates_considered,
            candidates_selected: self.selected.len(),
            audit: self.audit.into_entries(),
            created_at: self.created_at,
        }
    }
}

/// Shared, read-only analysis service. One per process; cheap to clone.
#[derive(Debug, Clone)]
pub struct Analyzer {
    engine: RuleEngine,
    prompts: PromptBuilder,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(catalog: Arc<RuleCatalog>, config: AnalysisConfig) -> Self {
        Self {
            engine: RuleEngine::new(Arc::clone(&catalog)).with_selection(config.selection),
            prompts: PromptBuilder::new(catalog),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Everything up to the model call: clean the text, find and score
    /// clauses, pick the ones worth sending, and build the prompt.
    pub fn prepare(&self, request: &AnalysisRequest) -> PreparedAnalysis {
        let id = Uuid::now_v7();
        let language = request.language.unwrap_or(self.config.language);
        let mut audit = AuditTrail::new(id.to_string());
        audit.record(
            "analysis-started",
            format!(
                "contract_type={} user_profile={} language={}",
                request.contract_type,
                request.user_profile,
                language.tag()
            ),
        );

        let text = mask_pii(&normalize(&request.text));

        let segmenter = ClauseSegmenter::new(SegmenterConfig {
            language,
            ..self.config.segmenter.clone()
        });
        let candidates = segmenter.segment(&text);
        let run = self
            .engine
            .run_rules(&text, request.contract_type, candidates);
        let selected =
            self.engine
                .select_top_candidates(&run.candidates, self.config.top_n, request.contract_type);

        audit.record(
            "rules-evaluated",
            format!(
                "candidates={} triggers={} selected={}",
                run.candidates.len(),
                run.total_triggers,
                selected.len()
            ),
        );

        let llm_request = self
            .prompts
            .build_request(&selected, request.contract_type, request.user_profile, language)
            .with_model(self.config.model.clone())
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        PreparedAnalysis {
            id,
            contract_type: request.contract_type,
            user_profile: request.user_profile,
            language,
            text,
            candidates_considered: run.candidates.len(),
            selected,
            llm_request,
            audit,
            created_at: Utc::now(),
        }
    }

    /// Run the model's raw answer through the repair pipeline and seal the record.
    pub fn finish(
        &self,
        prepared: PreparedAnalysis,
        raw: &str,
        llm_model: Option<String>,
    ) -> AnalysisRecord {
        let pipeline = OutputPipeline::new(prepared.language);
        let outcome = pipeline.process(raw, &prepared.selected).map_err(|e| {
            warn!(id = %prepared.id, code = e.code(), error = %e, "model output could not be repaired");
            (ErrorCode::from(&e), e.to_string())
        });
        prepared.into_record(outcome, llm_model)
    }

    /// Full workflow against `client`. Never returns an error; failures are
    /// recorded on the returned record.
    pub async fn analyze(&self, request: &AnalysisRequest, client: &dyn LlmClient) -> AnalysisRecord {
        let mut prepared = self.prepare(request);

        if prepared.text.is_empty() {
            return prepared.into_record(
                Err((ErrorCode::ExtractionFailed, "contract text is empty".into())),
                None,
            );
        }

        let response = match client.complete(&prepared.llm_request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(id = %prepared.id, error = %e, "LLM call failed");
                return prepared.into_record(Err((ErrorCode::from(&e), e.to_string())), None);
            }
        };

        prepared.audit.record(
            "llm-called",
            format!(
                "model={} total_tokens={}",
                response.model,
                response
                    .total_tokens
                    .map_or_else(|| "unknown".to_string(), |t| t.to_string())
            ),
        );

        self.finish(prepared, &response.content, Some(response.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausewise_llm::{LlmError, LlmResponse, ReplayClient};

    struct FailingClient;

    #[async_trait::async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            Err(LlmError::Server {
                status: 503,
                body: "overloaded".into(),
            })
        }
    }

    const CONTRACT: &str = "\
제1조 (목적) 본 계약은 웹사이트 제작 용역에 관한 사항을 정한다.
제2조 (위약금) 을이 계약을 위반한 경우 계약금의 3배를 위약금으로 지급한다.
제3조 (손해배상) 을은 갑에게 발생한 모든 손해를 배상한다.";

    fn analyzer() -> Analyzer {
        Analyzer::new(
            Arc::new(RuleCatalog::builtin().unwrap()),
            AnalysisConfig::default(),
        )
    }

    fn event_types(record: &AnalysisRecord) -> Vec<&str> {
        record.audit.iter().map(|a| a.event_type.as_str()).collect()
    }

    #[test]
    fn prepare_selects_and_prompts() {
        let a = analyzer();
        let req = AnalysisRequest::new(CONTRACT, ContractType::Freelance);
        let prepared = a.prepare(&req);
        assert_eq!(prepared.candidates_considered, 3);
        assert!(!prepared.selected.is_empty());
        assert!(prepared.selected.len() <= DEFAULT_TOP_N);
        assert!(prepared.llm_request.user_prompt.contains("C-002"));
        assert_eq!(prepared.language, Language::Korean);
        assert_eq!(prepared.audit().len(), 2);
    }

    #[test]
    fn prepare_masks_pii_before_prompting() {
        let a = analyzer();
        let text = "제1조 (연락) 담당자 연락처는 010-1234-5678 이며 메일은 a@b.com 이다.";
        let prepared = a.prepare(&AnalysisRequest::new(text, ContractType::Other));
        assert!(!prepared.llm_request.user_prompt.contains("1234-5678"));
        assert!(!prepared.llm_request.user_prompt.contains("a@b.com"));
    }

    #[test]
    fn request_language_overrides_default() {
        let a = analyzer();
        let req = AnalysisRequest::new("Article 1 Fees\nThe fee is paid monthly.", ContractType::Other)
            .with_language(Language::English);
        let prepared = a.prepare(&req);
        assert_eq!(prepared.language, Language::English);
        assert!(prepared.llm_request.developer_prompt.contains("en-US"));
    }

    #[tokio::test]
    async fn blank_text_fails_with_extraction_code() {
        let a = analyzer();
        let client = ReplayClient::new("{}");
        let record = a
            .analyze(&AnalysisRequest::new("  \n ", ContractType::Lease), &client)
            .await;
        assert_eq!(record.status, AnalysisStatus::Failed);
        assert_eq!(record.error_code, Some(ErrorCode::ExtractionFailed));
        assert!(record.report.is_none());
        assert_eq!(event_types(&record).last(), Some(&"analysis-failed"));
    }

    #[tokio::test]
    async fn upstream_failure_is_recorded() {
        let a = analyzer();
        let record = a
            .analyze(&AnalysisRequest::new(CONTRACT, ContractType::Freelance), &FailingClient)
            .await;
        assert_eq!(record.error_code, Some(ErrorCode::LlmUpstreamError));
        assert!(record.error_message.as_deref().unwrap().contains("503"));
        assert!(!event_types(&record).contains(&"llm-called"));
    }

    #[tokio::test]
    async fn unrepairable_output_is_json_repair_failed() {
        let a = analyzer();
        let client = ReplayClient::new("Sorry, I cannot help with that.");
        let record = a
            .analyze(&AnalysisRequest::new(CONTRACT, ContractType::Freelance), &client)
            .await;
        assert_eq!(record.status, AnalysisStatus::Failed);
        assert_eq!(record.error_code, Some(ErrorCode::JsonRepairFailed));
        assert_eq!(
            event_types(&record),
            ["analysis-started", "rules-evaluated", "llm-called", "analysis-failed"]
        );
    }
}
