use _segment_select::core::day_batch::{
    execute_day_batch, DayBatchRequestPayload, DayInputPayload, SelectionConfigPayload, SettleScope,
    DEFAULT_PERIODS_PER_DAY,
};
use _segment_select::core::errors::CoreError;
use serde_json::json;

const EPS: f64 = 1e-9;

fn day(label: &str, prices: Vec<f64>) -> DayInputPayload {
    DayInputPayload {
        day: label.to_string(),
        prices,
        real_diff: None,
        day_ahead: None,
        real_time: None,
        predicted: None,
    }
}

fn request(days: Vec<DayInputPayload>) -> DayBatchRequestPayload {
    DayBatchRequestPayload {
        job_id: "backtest-test".to_string(),
        selection: SelectionConfigPayload {
            segment_length: 2,
            min_gap: 1,
            num_segments: 2,
        },
        periods_per_day: None,
        position_coef: 0.2,
        settle_scope: SettleScope::Selection,
        worker_concurrency: 2,
        timeout_ms: 10_000,
        days,
    }
}

#[test]
fn payload_defaults_follow_intraday_backtest() {
    let payload: DayBatchRequestPayload = serde_json::from_value(json!({
        "job_id": "defaults",
        "days": [{ "day": "2025-06-01", "prices": [1.0, 2.0] }]
    }))
    .unwrap();

    assert_eq!(payload.selection.segment_length, 44);
    assert_eq!(payload.selection.min_gap, 12);
    assert_eq!(payload.selection.num_segments, 3);
    assert_eq!(payload.periods_per_day, Some(DEFAULT_PERIODS_PER_DAY));
    assert_eq!(payload.settle_scope, SettleScope::Selection);
    assert_eq!(payload.position_coef, 0.2);
    assert!(payload.days[0].real_diff.is_none());
}

#[test]
fn explicit_null_disables_period_check() {
    let payload: DayBatchRequestPayload = serde_json::from_value(json!({
        "job_id": "no-check",
        "periods_per_day": null,
        "settle_scope": "day",
        "days": [{ "day": "2025-06-01", "prices": [1.0] }]
    }))
    .unwrap();

    assert_eq!(payload.periods_per_day, None);
    assert_eq!(payload.settle_scope, SettleScope::Day);
}

#[tokio::test]
async fn keeps_day_order_and_reports_infeasible_days() {
    let days = vec![
        day("d1", vec![5.0, 1.0, 1.0, 9.0, 2.0, 2.0, 9.0]),
        day("d2", vec![1.0, 1.0]),
        day("d3", vec![0.0; 8]),
        day("d4", vec![4.0, 3.0, 9.0, 9.0, 1.0, 0.0]),
    ];

    let result = execute_day_batch(request(days)).await.unwrap();

    let labels = result.days.iter().map(|d| d.day.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["d1", "d2", "d3", "d4"]);

    assert_eq!(result.days[0].total_cost, Some(6.0));
    let starts = result.days[0]
        .segments
        .iter()
        .map(|window| window.start_index)
        .collect::<Vec<_>>();
    assert_eq!(starts, vec![1, 4]);

    assert_eq!(result.days[0].covered_periods, 4);
    assert_eq!(result.days[1].total_cost, None);
    assert_eq!(result.days[1].covered_periods, 0);
    assert!(result.days[1].segments.is_empty());
    assert_eq!(result.days[3].total_cost, Some(8.0));

    assert_eq!(result.metrics.day_count, 4);
    assert_eq!(result.metrics.feasible_days, 3);
    assert_eq!(result.metrics.infeasible_days, 1);
    assert!((result.metrics.total_cost - 14.0).abs() < EPS);
    assert_eq!(result.metrics.mae, None);

    let value = serde_json::to_value(&result).unwrap();
    assert!(value["days"][1]["total_cost"].is_null());
    assert_eq!(value["days"][0]["segments"][0]["end_index"], json!(2));
}

#[tokio::test]
async fn settles_selected_periods_and_aggregates_metrics() {
    let mut first = day("d1", vec![5.0, 1.0, 1.0, 9.0, 2.0, 2.0, 9.0]);
    first.real_diff = Some(vec![100.0, 10.0, -10.0, 100.0, 20.0, 30.0, 100.0]);
    first.predicted = Some(vec![1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 1.0]);
    let mut second = day("d2", vec![1.0, 1.0]);
    second.real_diff = Some(vec![1.0, 1.0]);
    second.predicted = Some(vec![1.0, 1.0]);

    let result = execute_day_batch(request(vec![first, second])).await.unwrap();

    let settlement = result.days[0].settlement.expect("settled");
    // windows [1..2] and [4..5]: 10*0.2 + (-10)*(-0.2) + 20*(-0.2) + 30*0.2
    assert!((settlement.profit - 6.0).abs() < EPS);
    assert!((settlement.baseline_profit - 10.0).abs() < EPS);
    assert_eq!(settlement.settled_periods, 4);
    assert!(result.days[1].settlement.is_none());

    assert!((result.metrics.profit - 6.0).abs() < EPS);
    assert!((result.metrics.baseline_profit - 10.0).abs() < EPS);
    assert!(result.metrics.mae.is_some());
    assert!(result.metrics.r2.is_some());
}

#[tokio::test]
async fn day_scope_settles_whole_day_even_when_infeasible() {
    let mut only = day("d1", vec![1.0, 1.0]);
    only.real_diff = Some(vec![10.0, -10.0]);
    only.predicted = Some(vec![1.0, -1.0]);
    let mut payload = request(vec![only]);
    payload.settle_scope = SettleScope::Day;

    let result = execute_day_batch(payload).await.unwrap();

    assert_eq!(result.days[0].total_cost, None);
    let settlement = result.days[0].settlement.expect("settled");
    assert!((settlement.profit - 4.0).abs() < EPS);
    assert!(settlement.baseline_profit.abs() < EPS);
}

#[tokio::test]
async fn rejects_wrong_period_count() {
    let mut payload = request(vec![day("2025-06-01", vec![1.0; 95])]);
    payload.periods_per_day = Some(96);

    let error = execute_day_batch(payload).await.unwrap_err();

    match error {
        CoreError::InvalidInput(message) => assert!(message.contains("2025-06-01")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn rejects_one_sided_signals() {
    let mut only = day("d1", vec![1.0; 6]);
    only.real_diff = Some(vec![1.0; 6]);

    let error = execute_day_batch(request(vec![only])).await.unwrap_err();

    match error {
        CoreError::InvalidInput(message) => assert!(message.contains("d1")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn rejects_signal_length_mismatch() {
    let mut only = day("d1", vec![1.0; 6]);
    only.real_diff = Some(vec![1.0; 5]);
    only.predicted = Some(vec![1.0; 6]);

    let error = execute_day_batch(request(vec![only])).await.unwrap_err();
    assert!(matches!(error, CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn rejects_bad_batch_config() {
    let mut zero_workers = request(vec![day("d1", vec![1.0; 6])]);
    zero_workers.worker_concurrency = 0;
    assert!(matches!(
        execute_day_batch(zero_workers).await,
        Err(CoreError::InvalidConfig(_))
    ));

    let mut zero_timeout = request(vec![day("d1", vec![1.0; 6])]);
    zero_timeout.timeout_ms = 0;
    assert!(matches!(
        execute_day_batch(zero_timeout).await,
        Err(CoreError::InvalidConfig(_))
    ));

    let mut bad_selection = request(vec![day("d1", vec![1.0; 6])]);
    bad_selection.selection.min_gap = -1;
    assert!(matches!(
        execute_day_batch(bad_selection).await,
        Err(CoreError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn rejects_empty_batch() {
    let mut payload = request(Vec::new());
    assert!(matches!(
        execute_day_batch(payload.clone()).await,
        Err(CoreError::InvalidInput(_))
    ));

    payload.days = vec![day("d1", vec![1.0; 6])];
    payload.job_id = "  ".to_string();
    assert!(matches!(
        execute_day_batch(payload).await,
        Err(CoreError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn non_finite_price_reports_day() {
    let error = execute_day_batch(request(vec![
        day("ok", vec![1.0; 6]),
        day("broken", vec![1.0, f64::NAN, 1.0, 1.0, 1.0, 1.0]),
    ]))
    .await
    .unwrap_err();

    match error {
        CoreError::InvalidInput(message) => assert!(message.contains("broken")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn derives_real_diff_from_price_pair() {
    let mut only = day("d1", vec![5.0, 1.0, 1.0, 9.0, 2.0, 2.0, 9.0]);
    only.day_ahead = Some(vec![300.0, 310.0, 290.0, 300.0, 320.0, 330.0, 300.0]);
    only.real_time = Some(vec![200.0, 300.0, 300.0, 200.0, 300.0, 300.0, 200.0]);
    only.predicted = Some(vec![1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 1.0]);

    let result = execute_day_batch(request(vec![only])).await.unwrap();

    // diff on [1..2] and [4..5] = 10, -10, 20, 30
    let settlement = result.days[0].settlement.expect("settled");
    assert!((settlement.profit - 6.0).abs() < EPS);
    assert!((settlement.baseline_profit - 10.0).abs() < EPS);
}

#[tokio::test]
async fn rejects_real_diff_together_with_price_pair() {
    let mut only = day("d1", vec![1.0; 6]);
    only.real_diff = Some(vec![1.0; 6]);
    only.day_ahead = Some(vec![1.0; 6]);
    only.real_time = Some(vec![1.0; 6]);
    only.predicted = Some(vec![1.0; 6]);

    let error = execute_day_batch(request(vec![only])).await.unwrap_err();
    assert!(matches!(error, CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn rejects_price_pair_length_mismatch() {
    let mut only = day("d1", vec![1.0; 6]);
    only.day_ahead = Some(vec![1.0; 6]);
    only.real_time = Some(vec![1.0; 5]);
    only.predicted = Some(vec![1.0; 6]);

    let error = execute_day_batch(request(vec![only])).await.unwrap_err();
    assert!(matches!(error, CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn batch_exceeding_timeout_fails_without_partial_result() {
    let days = (0..64)
        .map(|index| day(&format!("d{}", index), vec![1.0; 20_000]))
        .collect::<Vec<_>>();
    let mut payload = request(days);
    payload.selection = SelectionConfigPayload {
        segment_length: 1,
        min_gap: 0,
        num_segments: 64,
    };
    payload.worker_concurrency = 1;
    payload.timeout_ms = 1;

    let result = execute_day_batch(payload).await;

    match result {
        Err(CoreError::Runtime(message)) => assert!(message.contains("timeout_ms=1")),
        other => panic!("expected timeout, got {:?}", other.map(|r| r.job_id)),
    }
}
