use super::*;

fn result(index: usize, success: bool, method: ResolutionMethod, confidence: f64, ms: u64) -> ActionResult {
    ActionResult {
        index,
        name: format!("action {}", index),
        action_type: ActionType::Click,
        success,
        method,
        confidence,
        retries: 0,
        duration_ms: ms,
        error: (!success).then(|| "not found".to_string()),
        artifacts: None,
    }
}

#[test]
fn test_overall_stats_empty() {
    let stats = OverallStats::from_results(&[]);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.success_rate, 0.0);
}

#[test]
fn test_overall_stats() {
    let results = vec![
        result(0, true, ResolutionMethod::Selector, 1.0, 100),
        result(1, true, ResolutionMethod::Text, 0.5, 300),
        result(2, false, ResolutionMethod::None, 0.0, 200),
        result(3, true, ResolutionMethod::Direct, 1.0, 400),
    ];
    let stats = OverallStats::from_results(&results);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.successful, 3);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.success_rate, 75.0);
    assert_eq!(stats.average_time, 250.0);
    assert!((stats.average_confidence - 2.5 / 3.0).abs() < 1e-9);
}

#[test]
fn test_method_stats_keyed_by_strategy() {
    let now = Utc::now();
    let report = ExecutionReport::from_results(
        "wf",
        now,
        now,
        vec![
            result(0, true, ResolutionMethod::Selector, 1.0, 100),
            result(1, true, ResolutionMethod::Selector, 1.0, 50),
            result(2, true, ResolutionMethod::Position, 0.7, 30),
            result(3, false, ResolutionMethod::None, 0.0, 10),
        ],
        vec![],
        false,
    );
    assert_eq!(report.method_stats["selector"], MethodStat { count: 2, total_time: 150 });
    assert_eq!(report.method_stats["position"], MethodStat { count: 1, total_time: 30 });
    assert!(!report.method_stats.contains_key("none"));
    assert!(!report.is_success());
}

#[test]
fn test_report_json_contract() {
    let now = Utc::now();
    let report = ExecutionReport::from_results(
        "wf-9",
        now,
        now,
        vec![result(0, true, ResolutionMethod::Text, 0.9, 12)],
        vec![],
        false,
    );
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["workflowId"], "wf-9");
    assert_eq!(json["overallStats"]["successRate"], 100.0);
    assert_eq!(json["methodStats"]["text"]["count"], 1);
    assert_eq!(json["methodStats"]["text"]["totalTime"], 12);
    assert_eq!(json["actions"][0]["durationMs"], 12);

    let parsed = ExecutionReport::from_json(&report.to_json().unwrap()).unwrap();
    assert_eq!(parsed, report);
    assert!(parsed.is_success());
}

#[test]
fn test_error_record_for_action() {
    let record = ErrorRecord::new(ErrorKind::ResolutionFailure, "no candidate").for_action(3, "Click Next");
    assert_eq!(record.action_index, Some(3));
    assert_eq!(record.action_name.as_deref(), Some("Click Next"));
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["kind"], "resolutionFailure");
}
