use std::sync::Arc;

use clausewise_analysis::{AnalysisConfig, AnalysisRequest, AnalysisStatus, Analyzer};
use clausewise_core::{ContractType, Label, Language, RuleCategory, UserProfile};
use clausewise_llm::ReplayClient;
use clausewise_output::{extract_and_repair, sanitize};
use clausewise_rules::{ClauseSegmenter, RuleCatalog, RuleEngine};
use serde_json::json;

const FREELANCE_CONTRACT: &str = "\
프리랜서 용역 계약서

제1조 (목적) 본 계약은 갑이 을에게 의뢰하는 모바일 앱 개발 용역의 조건을 정한다.

제2조 (대금 지급) 갑은 검수 완료 후 60일 이내에 대금을 지급한다.

제3조 (위약금) 을이 납기를 지연하는 경우 지연 일수마다 계약금의 1%를 위약금으로 지급한다.

제4조 (지식재산권) 결과물에 대한 모든 지식재산권은 갑에게 귀속된다.

제5조 (연락처) 을의 연락처는 010-9876-5432, 이메일 dev@example.com 이다.";

fn analyzer() -> Analyzer {
    Analyzer::new(
        Arc::new(RuleCatalog::builtin().expect("builtin catalog loads")),
        AnalysisConfig::default(),
    )
}

fn model_response() -> String {
    let body = json!({
        "overall_summary": {
            "warning_count": 7,
            "check_count": 7,
            "ok_count": 7,
            "key_points": ["지연 위약금 비율을 확인해 보세요."]
        },
        "items": [
            {
                "clause_id": "C-003",
                "title": "위약금",
                "label": "WARNING",
                "risk_reason": "이 조항은 명백히 불법입니다.",
                "what_to_confirm": ["상한이 있는지"],
                "soft_suggestion": ["상한을 두는 방안을 제안해 볼 수 있어요."],
                "triggers": ["R-W-PEN-001"]
            },
            {
                "clause_id": "C-004",
                "title": "지식재산권",
                "label": "CHECK",
                "risk_reason": "결과물 권리가 모두 갑에게 넘어가요.",
                "what_to_confirm": "포트폴리오 사용 가능 여부",
                "soft_suggestion": [],
                "triggers": ["R-W-IP-001"],
                "confidence": 0.8
            }
        ],
        "negotiation_suggestions": ["지연 사유가 갑에게 있는 경우는 제외해 달라고 요청해 보세요."],
        "disclaimer": "법률 자문입니다."
    });
    format!("분석 결과입니다.\n```json\n{}\n```\n감사합니다.", body)
}

#[tokio::test]
async fn replayed_analysis_produces_consistent_report() {
    let a = analyzer();
    let request = AnalysisRequest::new(FREELANCE_CONTRACT, ContractType::Freelance)
        .with_user_profile(UserProfile::Freelancer);
    let client = ReplayClient::new(model_response());

    let record = a.analyze(&request, &client).await;

    assert_eq!(record.status, AnalysisStatus::Done, "{:?}", record.error_message);
    assert!(record.error_code.is_none());
    assert_eq!(record.llm_model.as_deref(), Some("replay"));
    assert_eq!(record.language, Language::Korean);
    assert_eq!(record.user_profile, UserProfile::Freelancer);
    assert_eq!(record.candidates_considered, 5);
    assert!(record.candidates_selected <= 10);
    assert!(record.rule_categories.contains(&RuleCategory::Penalty));

    let report = record.report.expect("report present");
    assert!(report.counts_consistent());
    assert_eq!(report.overall_summary.warning_count, 0);
    assert_eq!(report.overall_summary.check_count, 2);
    assert_eq!(report.disclaimer, Language::Korean.disclaimer());

    let penalty = &report.items[0];
    assert_eq!(penalty.label, Label::Check);
    assert!(penalty.was_guarded());
    assert!(!penalty.risk_reason.contains("불법"));

    assert_eq!(report.items[1].what_to_confirm, vec!["포트폴리오 사용 가능 여부"]);

    let events: Vec<_> = record.audit.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(
        events,
        ["analysis-started", "rules-evaluated", "llm-called", "analysis-completed"]
    );
    assert!(record.audit.iter().all(|e| e.resource == record.id.to_string()));
}

#[tokio::test]
async fn record_serializes_with_wire_names() {
    let a = analyzer();
    let request = AnalysisRequest::new(FREELANCE_CONTRACT, ContractType::Freelance);
    let record = a.analyze(&request, &ReplayClient::new(model_response())).await;

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["status"], "DONE");
    assert_eq!(value["contract_type"], "FREELANCE");
    assert_eq!(value["language"], "ko-KR");
    assert!(value.get("error_code").is_none());
    assert_eq!(value["report"]["disclaimer"], Language::Korean.disclaimer());
}

#[test]
fn prompt_never_sees_raw_pii() {
    let a = analyzer();
    let prepared = a.prepare(&AnalysisRequest::new(FREELANCE_CONTRACT, ContractType::Freelance));
    let prompt = prepared.llm_request.combined_user_message();
    assert!(!prompt.contains("9876-5432"));
    assert!(!prompt.contains("dev@example.com"));
    assert!(prompt.contains("010-****-5432"));
}

#[test]
fn article_headings_with_empty_catalog_select_all_in_order() {
    let engine = RuleEngine::new(Arc::new(RuleCatalog::from_rules(Vec::new()).unwrap()));
    let text = "Article 1 Test\nArticle 2 Test\nArticle 3 Test";
    let candidates = ClauseSegmenter::default().segment(text);
    let run = engine.run_rules(text, ContractType::Other, candidates);
    let selected = engine.select_top_candidates(&run.candidates, 10, ContractType::Other);

    let ids: Vec<_> = selected.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["C-001", "C-002", "C-003"]);
}

#[test]
fn scores_equal_trigger_weight_sums() {
    let a = analyzer();
    let prepared = a.prepare(&AnalysisRequest::new(FREELANCE_CONTRACT, ContractType::Freelance));
    for c in &prepared.selected {
        let total: u32 = c.rule_triggers.iter().map(|t| t.weight).sum();
        assert_eq!(c.total_score, total, "{}", c.id);
        for (category, score) in &c.category_scores {
            let sum: u32 = c
                .rule_triggers
                .iter()
                .filter(|t| t.category == *category)
                .map(|t| t.weight)
                .sum();
            assert_eq!(*score, sum, "{} {category}", c.id);
        }
    }
}

#[test]
fn selection_respects_top_n_and_membership() {
    let a = analyzer();
    let prepared = a.prepare(&AnalysisRequest::new(FREELANCE_CONTRACT, ContractType::Freelance));
    let engine = a.engine();
    let candidates = ClauseSegmenter::default().segment(&prepared.text);
    let run = engine.run_rules(&prepared.text, ContractType::Freelance, candidates);
    for top_n in 0..=6 {
        let selected = engine.select_top_candidates(&run.candidates, top_n, ContractType::Freelance);
        assert!(selected.len() <= top_n);
        for s in &selected {
            assert!(run.candidates.iter().any(|c| c.id == s.id));
        }
    }
}

#[test]
fn fenced_example_repairs_to_canonical_json() {
    let out = extract_and_repair("```json\n{\"test\": \"value\"}\n```").unwrap();
    assert_eq!(out, r#"{"test":"value"}"#);
}

#[test]
fn sanitize_is_idempotent_on_odd_shapes() {
    let inputs = [
        json!(null),
        json!([1, 2, 3]),
        json!({"items": "nope", "overall_summary": 5}),
        json!({"items": [null, {"label": "maybe", "title": 7}], "disclaimer": false}),
        json!({"overall_summary": {"warning_count": "3", "key_points": "one"}}),
    ];
    for input in inputs {
        let once = sanitize(input.clone(), Language::English);
        let twice = sanitize(once.clone(), Language::English);
        assert_eq!(once, twice, "input {input}");
    }
}
