//! Repair pipeline for LLM analysis output.
//!
//! Stage A ([`repair`]) pulls a JSON object out of the raw response. Stage B
//! ([`schema`]) validates and sanitizes it, Stage C ([`guard`]) rewrites
//! absolute phrasing, and [`postprocess`] pins the server-owned fields.
//! [`OutputPipeline`] runs them in order.

pub mod error;
pub mod guard;
pub mod pipeline;
pub mod postprocess;
pub mod repair;
pub mod schema;

pub use error::RepairError;
pub use guard::{ForbiddenPhraseGuard, GuardOutcome};
pub use pipeline::{OutputPipeline, ProcessedOutput};
pub use postprocess::{LabelCounts, post_process};
pub use repair::{extract_and_repair, extract_value};
pub use schema::{ValidationReport, sanitize, validate};
