//! Rule catalog entries and the request-level tags that parameterise scoring.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A request tag (contract type, user profile, language) that did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseTagError {
    pub kind: &'static str,
    pub value: String,
}

/// Canonicalise a tag for matching: trimmed, upper-case, `-`/space → `_`.
fn canonical_tag(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Kind of contract under analysis. Rule weights are boosted per contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    Freelance,
    Employment,
    PartTime,
    Lease,
    Nda,
    Other,
}

impl ContractType {
    pub const ALL: [ContractType; 6] = [
        Self::Freelance,
        Self::Employment,
        Self::PartTime,
        Self::Lease,
        Self::Nda,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freelance => "FREELANCE",
            Self::Employment => "EMPLOYMENT",
            Self::PartTime => "PART_TIME",
            Self::Lease => "LEASE",
            Self::Nda => "NDA",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical_tag(s).as_str() {
            "FREELANCE" | "FREELANCER" => Ok(Self::Freelance),
            "EMPLOYMENT" => Ok(Self::Employment),
            "PART_TIME" => Ok(Self::PartTime),
            "LEASE" => Ok(Self::Lease),
            "NDA" => Ok(Self::Nda),
            "OTHER" => Ok(Self::Other),
            _ => Err(ParseTagError {
                kind: "contract type",
                value: s.to_string(),
            }),
        }
    }
}

/// Background of the person reviewing the contract. Only shapes the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserProfile {
    Student,
    EntryLevel,
    Freelancer,
    IndividualBusiness,
    #[default]
    GeneralConsumer,
}

impl UserProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::EntryLevel => "ENTRY_LEVEL",
            Self::Freelancer => "FREELANCER",
            Self::IndividualBusiness => "INDIVIDUAL_BUSINESS",
            Self::GeneralConsumer => "GENERAL_CONSUMER",
        }
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserProfile {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical_tag(s).as_str() {
            "STUDENT" => Ok(Self::Student),
            "ENTRY_LEVEL" => Ok(Self::EntryLevel),
            "FREELANCER" => Ok(Self::Freelancer),
            "INDIVIDUAL_BUSINESS" => Ok(Self::IndividualBusiness),
            "GENERAL_CONSUMER" | "GENERAL" => Ok(Self::GeneralConsumer),
            _ => Err(ParseTagError {
                kind: "user profile",
                value: s.to_string(),
            }),
        }
    }
}

/// Risk category a rule detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    Penalty,
    DamagesUnlimited,
    IpAssignment,
    DepositDeduction,
    Payment,
    Termination,
    NonCompete,
    Confidentiality,
    AutoRenewal,
    WorkingHours,
    Probation,
    ScopeChange,
    DisputeResolution,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Penalty => "PENALTY",
            Self::DamagesUnlimited => "DAMAGES_UNLIMITED",
            Self::IpAssignment => "IP_ASSIGNMENT",
            Self::DepositDeduction => "DEPOSIT_DEDUCTION",
            Self::Payment => "PAYMENT",
            Self::Termination => "TERMINATION",
            Self::NonCompete => "NON_COMPETE",
            Self::Confidentiality => "CONFIDENTIALITY",
            Self::AutoRenewal => "AUTO_RENEWAL",
            Self::WorkingHours => "WORKING_HOURS",
            Self::Probation => "PROBATION",
            Self::ScopeChange => "SCOPE_CHANGE",
            Self::DisputeResolution => "DISPUTE_RESOLUTION",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a rule hit is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Commonly disputed or likely unfavourable to the individual.
    Warning,
    /// Needs its numbers, periods, or scope verified.
    Check,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Check => "CHECK",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weighted regex detector from the rule catalog.
///
/// Deserialized from the catalog file; immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePattern {
    pub id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    #[serde(rename = "baseWeight", alias = "base_weight")]
    pub base_weight: u32,
    /// Extra weight per contract type. Absent types get no boost.
    #[serde(default)]
    pub boost: HashMap<ContractType, u32>,
    #[serde(default)]
    pub regex: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl RulePattern {
    /// Boost applied for `contract_type` (0 when none is configured).
    pub fn boost_for(&self, contract_type: ContractType) -> u32 {
        self.boost.get(&contract_type).copied().unwrap_or(0)
    }

    /// `base_weight + boost[contract_type]`, saturating at `u32::MAX`.
    pub fn weight_for(&self, contract_type: ContractType) -> u32 {
        self.base_weight.saturating_add(self.boost_for(contract_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_with_boost(boost: &[(ContractType, u32)]) -> RulePattern {
        RulePattern {
            id: "R-W-PEN-001".into(),
            category: RuleCategory::Penalty,
            severity: Severity::Warning,
            base_weight: 3,
            boost: boost.iter().copied().collect(),
            regex: vec!["위약금".into()],
            description: "penalty".into(),
        }
    }

    #[test]
    fn weight_adds_matching_boost() {
        let rule = rule_with_boost(&[(ContractType::Lease, 2)]);
        assert_eq!(rule.weight_for(ContractType::Lease), 5);
        assert_eq!(rule.weight_for(ContractType::Freelance), 3);
    }

    #[test]
    fn weight_saturates_instead_of_overflowing() {
        let mut rule = rule_with_boost(&[(ContractType::Lease, 1)]);
        rule.base_weight = u32::MAX;
        assert_eq!(rule.weight_for(ContractType::Lease), u32::MAX);
        assert_eq!(rule.weight_for(ContractType::Nda), u32::MAX);
    }

    #[test]
    fn weight_without_boost_table() {
        let rule = rule_with_boost(&[]);
        for ct in ContractType::ALL {
            assert_eq!(rule.weight_for(ct), 3);
        }
    }

    #[test]
    fn contract_type_parses_loosely() {
        assert_eq!("freelance".parse::<ContractType>(), Ok(ContractType::Freelance));
        assert_eq!("FREELANCER".parse::<ContractType>(), Ok(ContractType::Freelance));
        assert_eq!("part-time".parse::<ContractType>(), Ok(ContractType::PartTime));
        assert!("franchise".parse::<ContractType>().is_err());
    }

    #[test]
    fn user_profile_parses_loosely() {
        assert_eq!("entry level".parse::<UserProfile>(), Ok(UserProfile::EntryLevel));
        assert_eq!(
            "general_consumer".parse::<UserProfile>(),
            Ok(UserProfile::GeneralConsumer)
        );
        let err = "lawyer".parse::<UserProfile>().unwrap_err();
        assert_eq!(err.kind, "user profile");
    }

    #[test]
    fn rule_pattern_deserializes_catalog_field_names() {
        let json = r#"{
            "id": "R-C-PAY-001",
            "category": "PAYMENT",
            "severity": "CHECK",
            "baseWeight": 2,
            "boost": { "EMPLOYMENT": 1, "PART_TIME": 2 },
            "regex": ["최저임금"],
            "description": "wage terms"
        }"#;
        let rule: RulePattern = serde_json::from_str(json).unwrap();
        assert_eq!(rule.category, RuleCategory::Payment);
        assert_eq!(rule.severity, Severity::Check);
        assert_eq!(rule.weight_for(ContractType::PartTime), 4);
        assert_eq!(rule.weight_for(ContractType::Lease), 2);
    }

    #[test]
    fn rule_pattern_optional_fields_default() {
        let json = r#"{"id": "R", "category": "PENALTY", "severity": "WARNING", "baseWeight": 1}"#;
        let rule: RulePattern = serde_json::from_str(json).unwrap();
        assert!(rule.boost.is_empty());
        assert!(rule.regex.is_empty());
        assert!(rule.description.is_empty());
    }

    #[test]
    fn category_names_match_serde() {
        let json = serde_json::to_string(&RuleCategory::DamagesUnlimited).unwrap();
        assert_eq!(json, format!("\"{}\"", RuleCategory::DamagesUnlimited.as_str()));
    }
}
