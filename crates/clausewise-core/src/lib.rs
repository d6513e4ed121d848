pub mod candidate;
pub mod language;
pub mod numeral;
pub mod report;
pub mod rule;

pub use candidate::{ClauseCandidate, RuleRunResult, RuleTrigger};
pub use language::Language;
pub use numeral::parse_article_number;
pub use report::{AnalysisReport, FORBIDDEN_PHRASE_TAG, Label, OverallSummary, ReportItem};
pub use rule::{ContractType, ParseTagError, RuleCategory, RulePattern, Severity, UserProfile};
