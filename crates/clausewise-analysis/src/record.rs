//! Persistable outcome of one analysis: status, error code, report and audit trail.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use clausewise_core::{AnalysisReport, ContractType, Language, RuleCategory, UserProfile};
use clausewise_llm::LlmError;
use clausewise_output::RepairError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Done,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outward failure code of a FAILED analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The model answered but its output could not be turned into a report.
    JsonRepairFailed,
    /// The model could not be reached or returned an error.
    LlmUpstreamError,
    /// No usable contract text.
    ExtractionFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonRepairFailed => "JSON_REPAIR_FAILED",
            Self::LlmUpstreamError => "LLM_UPSTREAM_ERROR",
            Self::ExtractionFailed => "EXTRACTION_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&RepairError> for ErrorCode {
    fn from(_: &RepairError) -> Self {
        Self::JsonRepairFailed
    }
}

impl From<&LlmError> for ErrorCode {
    fn from(_: &LlmError) -> Self {
        Self::LlmUpstreamError
    }
}

/// Timestamped workflow event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event_type: String,
    pub resource: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered audit events for one analysis, mirrored to the log as they happen.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    resource: String,
    entries: Vec<AuditRecord>,
}

impl AuditTrail {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, event_type: &str, detail: impl Into<String>) {
        let entry = AuditRecord {
            event_type: event_type.to_string(),
            resource: self.resource.clone(),
            detail: detail.into(),
            timestamp: Utc::now(),
        };
        tracing::info!(
            event_type = %entry.event_type,
            resource = %entry.resource,
            detail = %entry.detail,
            "audit event recorded"
        );
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditRecord] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<AuditRecord> {
        self.entries
    }
}

/// Everything kept about one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub contract_type: ContractType,
    pub user_profile: UserProfile,
    pub language: Language,
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
    /// Distinct categories triggered across the selected candidates.
    #[serde(default)]
    pub rule_categories: BTreeSet<RuleCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    pub candidates_considered: usize,
    pub candidates_selected: usize,
    #[serde(default)]
    pub audit: Vec<AuditRecord>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn is_done(&self) -> bool {
        self.status == AnalysisStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_from_errors() {
        assert_eq!(
            ErrorCode::from(&RepairError::NoJsonObjectFound),
            ErrorCode::JsonRepairFailed
        );
        assert_eq!(
            ErrorCode::from(&LlmError::MissingContent),
            ErrorCode::LlmUpstreamError
        );
        assert_eq!(ErrorCode::ExtractionFailed.as_str(), "EXTRACTION_FAILED");
    }

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_value(ErrorCode::JsonRepairFailed).unwrap(),
            "JSON_REPAIR_FAILED"
        );
        assert_eq!(serde_json::to_value(AnalysisStatus::Done).unwrap(), "DONE");
    }

    #[test]
    fn audit_trail_keeps_order_and_resource() {
        let mut trail = AuditTrail::new("a-1");
        trail.record("analysis-started", "one");
        trail.record("analysis-completed", "two");
        let entries = trail.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event_type, "analysis-started");
        assert_eq!(entries[1].resource, "a-1");
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }
}
