//! Rule-based clause analysis: text cleanup, segmentation, the rule catalog,
//! and candidate scoring/selection.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod segment;
pub mod text;

pub use catalog::{CatalogSummary, RuleCatalog};
pub use engine::{RuleEngine, SelectionConfig};
pub use error::CatalogError;
pub use segment::{ClauseSegmenter, SegmentMode, SegmenterConfig};
pub use text::{mask_pii, normalize};
