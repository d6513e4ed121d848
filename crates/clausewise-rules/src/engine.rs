//! Rule matching and candidate selection.
//!
//! [`RuleEngine::run_rules`] attaches every regex hit in every candidate as a
//! weighted [`RuleTrigger`]. [`RuleEngine::select_top_candidates`] then picks
//! the clauses worth sending to the model: highest score first, with a
//! category-diversity guard so one dominant risk cannot fill the budget.

use std::collections::BTreeSet;
use std::sync::Arc;

use clausewise_core::{ClauseCandidate, ContractType, RuleRunResult, RuleTrigger};
use tracing::{debug, info};

use crate::catalog::RuleCatalog;

pub const DEFAULT_DIVERSITY_AFTER: usize = 3;
pub const DEFAULT_FALLBACK_COUNT: usize = 5;

/// Selection heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Number of picks taken purely by score before the diversity guard applies.
    pub diversity_after: usize,
    /// How many of the longest clauses to take when nothing else was selected.
    pub fallback_count: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            diversity_after: DEFAULT_DIVERSITY_AFTER,
            fallback_count: DEFAULT_FALLBACK_COUNT,
        }
    }
}

/// Scores candidates against a shared, read-only catalog.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    catalog: Arc<RuleCatalog>,
    selection: SelectionConfig,
}

impl RuleEngine {
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self {
            catalog,
            selection: SelectionConfig::default(),
        }
    }

    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> SelectionConfig {
        self.selection
    }

    /// Every match of every rule pattern in `text`, one trigger per match.
    ///
    /// Trigger offsets are byte offsets into `text`. Zero-width matches are ignored.
    pub fn match_clause(&self, text: &str, contract_type: ContractType) -> Vec<RuleTrigger> {
        let mut triggers = Vec::new();
        for rule in self.catalog.rules() {
            let weight = rule.weight_for(contract_type);
            for re in self.catalog.compiled(&rule.id) {
                for m in re.find_iter(text).filter(|m| !m.is_empty()) {
                    triggers.push(RuleTrigger {
                        rule_id: rule.id.clone(),
                        category: rule.category,
                        severity: rule.severity,
                        weight,
                        matched_text: m.as_str().to_string(),
                        start_index: m.start(),
                        end_index: m.end(),
                    });
                }
            }
        }
        triggers
    }

    /// Attach triggers to every candidate and total the document's category scores.
    ///
    /// `text` is the full document the candidates were cut from; it is only
    /// used for logging.
    pub fn run_rules(
        &self,
        text: &str,
        contract_type: ContractType,
        candidates: Vec<ClauseCandidate>,
    ) -> RuleRunResult {
        let mut result = RuleRunResult::default();

        for mut candidate in candidates {
            let triggers = self.match_clause(&candidate.text, contract_type);
            result.total_triggers += triggers.len();
            for t in &triggers {
                let score = result.category_scores.entry(t.category).or_insert(0);
                *score = score.saturating_add(t.weight);
            }
            candidate.attach_triggers(triggers);
            result.candidates.push(candidate);
        }

        debug!(
            contract_type = contract_type.as_str(),
            document_bytes = text.len(),
            candidates = result.candidates.len(),
            triggers = result.total_triggers,
            categories = result.category_scores.len(),
            "rules evaluated"
        );
        result
    }

    /// Pick at most `top_n` candidates to send to the model, in selection order.
    ///
    /// 1. Rank by total score, then by WARNING trigger count (stable).
    /// 2. Walk the ranking; once `diversity_after` picks are made, skip a
    ///    candidate whose categories are all already covered.
    /// 3. Fill any remaining slots from the ranking, ignoring diversity.
    /// 4. If nothing was picked but candidates exist, take the
    ///    `fallback_count` longest ones, capped at `top_n`.
    ///
    /// Step 3 fills every slot whenever `top_n > 0`, and the cap makes step 4
    /// empty when `top_n == 0`, so under the top-N cap step 4 never adds a
    /// candidate.
    pub fn select_top_candidates(
        &self,
        candidates: &[ClauseCandidate],
        top_n: usize,
        contract_type: ContractType,
    ) -> Vec<ClauseCandidate> {
        let mut ranked: Vec<&ClauseCandidate> = candidates.iter().collect();
        ranked.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then_with(|| b.warning_count().cmp(&a.warning_count()))
        });

        let mut chosen = vec![false; ranked.len()];
        let mut order: Vec<usize> = Vec::with_capacity(top_n.min(ranked.len()));
        let mut covered = BTreeSet::new();
        let mut skipped_for_diversity = 0;

        for (i, candidate) in ranked.iter().enumerate() {
            if order.len() >= top_n {
                break;
            }
            let categories = candidate.categories();
            if order.len() >= self.selection.diversity_after
                && !categories.is_empty()
                && categories.is_subset(&covered)
            {
                skipped_for_diversity += 1;
                continue;
            }
            covered.extend(categories);
            chosen[i] = true;
            order.push(i);
        }

        for (i, picked) in chosen.iter_mut().enumerate() {
            if order.len() >= top_n {
                break;
            }
            if !*picked {
                *picked = true;
                order.push(i);
            }
        }

        let mut selected: Vec<ClauseCandidate> =
            order.into_iter().map(|i| ranked[i].clone()).collect();

        if selected.is_empty() && !candidates.is_empty() {
            let mut by_length: Vec<&ClauseCandidate> = candidates.iter().collect();
            by_length.sort_by_key(|c| std::cmp::Reverse(c.char_len()));
            selected = by_length
                .into_iter()
                .take(self.selection.fallback_count.min(top_n))
                .cloned()
                .collect();
        }

        info!(
            contract_type = contract_type.as_str(),
            available = candidates.len(),
            selected = selected.len(),
            top_n,
            skipped_for_diversity,
            "selected candidates"
        );
        selected
    }
}
