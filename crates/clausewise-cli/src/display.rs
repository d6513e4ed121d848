//! Terminal rendering for catalogs, segmentations, reports and analysis records.

use std::collections::HashSet;

use clausewise_analysis::AnalysisRecord;
use clausewise_core::{AnalysisReport, ClauseCandidate, RuleRunResult};
use clausewise_rules::{RuleCatalog, SegmentMode};

const MAX_LIST_ITEMS: usize = 10;
const PREVIEW_CHARS: usize = 60;

// ── Public API ──

pub fn print_catalog(catalog: &RuleCatalog) {
    let s = catalog.summary();
    println!("=== Rule catalog ===");
    println!();
    println!("  {:<26} {}", "rules", s.rule_count);
    println!("  {:<26} {}", "warning rules", s.warning_rules);
    println!("  {:<26} {}", "check rules", s.check_rules);
    println!("  {:<26} {}", "patterns", s.declared_patterns);
    println!("  {:<26} {}", "compiled", s.compiled_patterns);
    if s.skipped_patterns > 0 {
        println!("  {:<26} {}", "skipped (invalid)", s.skipped_patterns);
    }
    println!();

    println!("Categories");
    for (category, count) in &s.rules_per_category {
        println!("  {:<26} {}", category.as_str(), count);
    }
    println!();

    println!("Rules");
    for rule in catalog.rules() {
        println!(
            "  {:<12} {:<8} {:<20} w={} {}",
            rule.id,
            rule.severity.as_str(),
            rule.category.as_str(),
            rule.base_weight,
            rule.description
        );
    }
}

pub fn print_segmentation(run: &RuleRunResult, selected: &[ClauseCandidate], mode: SegmentMode) {
    println!(
        "=== {} clause(s), {} mode, {} trigger(s) ===",
        run.candidates.len(),
        mode.as_str(),
        run.total_triggers
    );
    println!();

    let picked: HashSet<&str> = selected.iter().map(|c| c.id.as_str()).collect();
    for c in &run.candidates {
        let mark = if picked.contains(c.id.as_str()) { "*" } else { " " };
        println!(
            "{mark} {:<6} score={:<3} [{}..{}] {}",
            c.id, c.total_score, c.start_index, c.end_index, c.title
        );
        println!("         {}", preview(&c.text));
        let ids = c.rule_ids();
        if !ids.is_empty() {
            println!("         rules: {}", ids.join(", "));
        }
    }
    println!();

    if !run.category_scores.is_empty() {
        println!("Category scores");
        for (category, score) in run.ranked_categories() {
            println!("  {:<26} {}", category.as_str(), score);
        }
        println!();
    }

    let order: Vec<&str> = selected.iter().map(|c| c.id.as_str()).collect();
    println!("Selected ({}): {}", order.len(), order.join(", "));
}

pub fn print_report(report: &AnalysisReport) {
    let s = &report.overall_summary;
    println!(
        "=== WARNING {} · CHECK {} · OK {} ===",
        s.warning_count, s.check_count, s.ok_count
    );
    println!();

    print_list("Key points", &s.key_points);

    for item in &report.items {
        println!("[{}] {} {}", item.label, item.clause_id, item.title);
        if !item.risk_reason.is_empty() {
            println!("  {}", item.risk_reason);
        }
        print_bullets("confirm", &item.what_to_confirm);
        print_bullets("suggest", &item.soft_suggestion);
        if !item.triggers.is_empty() {
            println!("  rules: {}", item.triggers.join(", "));
        }
        println!();
    }

    print_list("Negotiation suggestions", &report.negotiation_suggestions);
    println!("{}", report.disclaimer);
}

pub fn print_record(record: &AnalysisRecord) {
    println!("=== Analysis {} ===", record.id);
    println!("  {:<26} {}", "status", record.status);
    if let Some(code) = record.error_code {
        println!("  {:<26} {}", "error", code);
    }
    if let Some(message) = &record.error_message {
        println!("  {:<26} {}", "detail", message);
    }
    println!("  {:<26} {}", "contract type", record.contract_type);
    println!("  {:<26} {}", "user profile", record.user_profile);
    println!("  {:<26} {}", "language", record.language);
    if let Some(model) = &record.llm_model {
        println!("  {:<26} {}", "model", model);
    }
    println!(
        "  {:<26} {} of {}",
        "clauses sent", record.candidates_selected, record.candidates_considered
    );
    if !record.rule_categories.is_empty() {
        let categories: Vec<&str> = record.rule_categories.iter().map(|c| c.as_str()).collect();
        println!("  {:<26} {}", "categories", categories.join(", "));
    }
    println!(
        "  {:<26} {}",
        "created",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if let Some(report) = &record.report {
        print_report(report);
        println!();
    }

    println!("Audit");
    for entry in &record.audit {
        println!(
            "  {} {:<20} {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.event_type,
            entry.detail
        );
    }
}

// ── Helpers ──

fn print_list(header: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{header}");
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("  - {item}");
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("    ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
    println!();
}

fn print_bullets(label: &str, items: &[String]) {
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("  {label}: {item}");
    }
}

/// First line of `text`, cut to [`PREVIEW_CHARS`].
fn preview(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or_default().trim();
    if line.chars().count() <= PREVIEW_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_on_char_boundary() {
        let text = "가".repeat(100);
        let p = preview(&text);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 1);
        assert!(p.ends_with('…'));
    }

    #[test]
    fn preview_skips_blank_lines() {
        assert_eq!(preview("\n  \n제1조 목적\n본문"), "제1조 목적");
    }
}
