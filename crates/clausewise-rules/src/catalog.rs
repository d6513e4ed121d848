//! The rule catalog: weighted regex detectors loaded from YAML.
//!
//! Patterns are compiled once at load time, case-insensitive and multi-line.
//! A pattern that does not compile is logged and skipped so one bad entry
//! cannot take the whole catalog down.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use clausewise_core::{RuleCategory, RulePattern, Severity};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../rules/catalog.yaml");

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    rules: Vec<RulePattern>,
}

/// Immutable set of rules with their compiled patterns.
///
/// Shared read-only between requests (wrap in `Arc`).
#[derive(Debug)]
pub struct RuleCatalog {
    rules: Vec<RulePattern>,
    /// rule id → compiled patterns, in catalog order, invalid ones omitted
    compiled: HashMap<String, Vec<Regex>>,
    skipped: usize,
}

/// Summary statistics for a RuleCatalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub rule_count: usize,
    pub warning_rules: usize,
    pub check_rules: usize,
    pub declared_patterns: usize,
    pub compiled_patterns: usize,
    pub skipped_patterns: usize,
    pub rules_per_category: BTreeMap<RuleCategory, usize>,
}

impl RuleCatalog {
    /// Build a catalog from already-deserialized rules.
    ///
    /// An empty rule list is accepted; duplicate ids are not.
    pub fn from_rules(rules: Vec<RulePattern>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(CatalogError::DuplicateRuleId(rule.id.clone()));
            }
        }

        let mut compiled = HashMap::with_capacity(rules.len());
        let mut skipped = 0;
        for rule in &rules {
            let mut patterns = Vec::with_capacity(rule.regex.len());
            for source in &rule.regex {
                match compile_pattern(source) {
                    Ok(re) => patterns.push(re),
                    Err(e) => {
                        skipped += 1;
                        warn!(rule_id = %rule.id, pattern = %source, error = %e, "skipping invalid rule pattern");
                    }
                }
            }
            compiled.insert(rule.id.clone(), patterns);
        }

        Ok(Self {
            rules,
            compiled,
            skipped,
        })
    }

    /// Parse a YAML catalog of the form `rules: [ {id, category, ...}, ... ]`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        if file.rules.is_empty() {
            return Err(CatalogError::Empty);
        }
        Self::from_rules(file.rules)
    }

    /// Load a YAML catalog from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }
        let yaml = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(
            path = %path.display(),
            rules = catalog.len(),
            patterns = catalog.compiled_regex_count(),
            "loaded rule catalog"
        );
        Ok(catalog)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Rules in catalog order.
    pub fn rules(&self) -> &[RulePattern] {
        &self.rules
    }

    pub fn get(&self, rule_id: &str) -> Option<&RulePattern> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    /// Compiled patterns for `rule_id` (empty for unknown ids).
    pub fn compiled(&self, rule_id: &str) -> &[Regex] {
        self.compiled.get(rule_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Patterns declared across all rules, including ones that failed to compile.
    pub fn total_regex_count(&self) -> usize {
        self.rules.iter().map(|r| r.regex.len()).sum()
    }

    pub fn compiled_regex_count(&self) -> usize {
        self.compiled.values().map(Vec::len).sum()
    }

    pub fn summary(&self) -> CatalogSummary {
        let mut rules_per_category = BTreeMap::new();
        for rule in &self.rules {
            *rules_per_category.entry(rule.category).or_insert(0) += 1;
        }
        let warning_rules = self
            .rules
            .iter()
            .filter(|r| r.severity == Severity::Warning)
            .count();

        CatalogSummary {
            rule_count: self.rules.len(),
            warning_rules,
            check_rules: self.rules.len() - warning_rules,
            declared_patterns: self.total_regex_count(),
            compiled_patterns: self.compiled_regex_count(),
            skipped_patterns: self.skipped,
            rules_per_category,
        }
    }
}

fn compile_pattern(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .multi_line(true)
        .build()
}
