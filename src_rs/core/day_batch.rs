// 목적:
// - 여러 날짜의 가격 시계열에 구간 선택을 일 단위로 실행한다.
//
// 설명:
// - 날짜마다 독립된 DP를 새로 계산하고, 세션 단위 캐시는 두지 않는다.
// - 날짜 작업은 spawn_blocking으로 실행하며 병렬 수는 semaphore로 제한한다.
// - 배치 전체는 timeout_ms 안에 끝나야 한다.
// - 실현 가격차와 예측 신호가 함께 주어진 날짜는 정산과 예측 지표 계산에 포함한다.
// - 실현 가격차 대신 day_ahead/real_time 가격 쌍을 주면 가격차를 직접 계산한다.
//
// 디자인 패턴:
// - 파이프라인(Pipeline) + 제한 병렬 처리(Bounded Concurrency).
//
// 참조:
// - src_rs/core/segment_selector.rs
// - src_rs/core/settlement.rs
// - src_rs/api/segment_bridge.rs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::errors::{CoreError, CoreResult};
use crate::core::segment_selector::{
    select_segments, SelectionParams, Window, DEFAULT_MIN_GAP, DEFAULT_NUM_SEGMENTS,
    DEFAULT_SEGMENT_LENGTH,
};
use crate::core::settlement::{
    price_difference, settle_selection, settle_signal, validate_coef, SignalSettlement,
    DEFAULT_POSITION_COEF,
};
use crate::math::metrics::{mean_absolute_error, r2_score};

pub const DEFAULT_PERIODS_PER_DAY: usize = 96;
pub const DEFAULT_WORKER_CONCURRENCY: usize = 4;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfigPayload {
    #[serde(default = "default_segment_length")]
    pub segment_length: i64,
    #[serde(default = "default_min_gap")]
    pub min_gap: i64,
    #[serde(default = "default_num_segments")]
    pub num_segments: i64,
}

impl Default for SelectionConfigPayload {
    fn default() -> Self {
        Self {
            segment_length: DEFAULT_SEGMENT_LENGTH,
            min_gap: DEFAULT_MIN_GAP,
            num_segments: DEFAULT_NUM_SEGMENTS,
        }
    }
}

impl SelectionConfigPayload {
    pub fn to_params(&self) -> CoreResult<SelectionParams> {
        SelectionParams::new(self.segment_length, self.min_gap, self.num_segments)
    }
}

/// 정산 범위. `selection`은 선택 구간 안의 기간만, `day`는 하루 전체를 정산한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleScope {
    #[default]
    Selection,
    Day,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayInputPayload {
    pub day: String,
    pub prices: Vec<f64>,
    #[serde(default)]
    pub real_diff: Option<Vec<f64>>,
    #[serde(default)]
    pub day_ahead: Option<Vec<f64>>,
    #[serde(default)]
    pub real_time: Option<Vec<f64>>,
    #[serde(default)]
    pub predicted: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBatchRequestPayload {
    pub job_id: String,
    #[serde(default)]
    pub selection: SelectionConfigPayload,
    #[serde(default = "default_periods_per_day")]
    pub periods_per_day: Option<usize>,
    #[serde(default = "default_position_coef")]
    pub position_coef: f64,
    #[serde(default)]
    pub settle_scope: SettleScope,
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    pub days: Vec<DayInputPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySelectionPayload {
    pub day: String,
    pub total_cost: Option<f64>,
    pub covered_periods: usize,
    pub segments: Vec<Window>,
    pub settlement: Option<SignalSettlement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBatchMetricsPayload {
    pub day_count: usize,
    pub feasible_days: usize,
    pub infeasible_days: usize,
    pub total_cost: f64,
    pub profit: f64,
    pub baseline_profit: f64,
    pub mae: Option<f64>,
    pub r2: Option<f64>,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBatchResultPayload {
    pub job_id: String,
    pub days: Vec<DaySelectionPayload>,
    pub metrics: DayBatchMetricsPayload,
}

#[derive(Debug, Clone, Copy)]
struct DayJobConfig {
    params: SelectionParams,
    scope: SettleScope,
    coef: f64,
}

struct DayOutcome {
    selection: DaySelectionPayload,
    signals: Option<(Vec<f64>, Vec<f64>)>,
}

/// 일 단위 구간 선택 배치를 실행한다.
pub async fn execute_day_batch(payload: DayBatchRequestPayload) -> CoreResult<DayBatchResultPayload> {
    let params = validate_payload(&payload)?;

    let started = Instant::now();
    let DayBatchRequestPayload {
        job_id,
        position_coef,
        settle_scope,
        worker_concurrency,
        timeout_ms,
        days,
        ..
    } = payload;

    info!(
        job_id = %job_id,
        day_count = days.len(),
        segment_length = params.segment_length(),
        min_gap = params.min_gap(),
        num_segments = params.num_segments(),
        "일 단위 구간 선택 배치 시작"
    );

    let config = DayJobConfig {
        params,
        scope: settle_scope,
        coef: position_coef,
    };

    let outcomes = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        run_days(days, config, worker_concurrency),
    )
    .await
    .map_err(|_| {
        CoreError::Runtime(format!(
            "배치가 제한 시간 안에 끝나지 않았습니다: timeout_ms={}",
            timeout_ms
        ))
    })??;

    let metrics = summarize(&outcomes, started.elapsed().as_millis());
    info!(
        job_id = %job_id,
        feasible_days = metrics.feasible_days,
        infeasible_days = metrics.infeasible_days,
        elapsed_ms = metrics.elapsed_ms as u64,
        "일 단위 구간 선택 배치 완료"
    );

    Ok(DayBatchResultPayload {
        job_id,
        days: outcomes.into_iter().map(|outcome| outcome.selection).collect(),
        metrics,
    })
}

async fn run_days(
    days: Vec<DayInputPayload>,
    config: DayJobConfig,
    concurrency: usize,
) -> CoreResult<Vec<DayOutcome>> {
    let day_count = days.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for (index, day) in days.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await.map_err(|error| {
            CoreError::Runtime(format!("날짜 작업 semaphore 획득 실패: {}", error))
        })?;

        join_set.spawn_blocking(move || {
            let _permit: OwnedSemaphorePermit = permit;
            let label = day.day.clone();
            let outcome = solve_day(day, config).map_err(|error| with_day_context(error, &label));
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<DayOutcome>> = (0..day_count).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        let (index, outcome) = joined.map_err(|error| {
            CoreError::Runtime(format!("날짜 작업 조인 실패: {}", error))
        })?;
        slots[index] = Some(outcome?);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| CoreError::Runtime(format!("날짜 작업 결과가 없습니다: index={}", index)))
        })
        .collect()
}

fn solve_day(day: DayInputPayload, config: DayJobConfig) -> CoreResult<DayOutcome> {
    let selection = select_segments(&day.prices, config.params)?;

    let real_diff = match (day.real_diff, day.day_ahead, day.real_time) {
        (Some(real_diff), None, None) => Some(real_diff),
        (None, Some(day_ahead), Some(real_time)) => Some(price_difference(&day_ahead, &real_time)?),
        (None, None, None) => None,
        _ => {
            return Err(CoreError::InvalidInput(
                "real_diff 또는 day_ahead/real_time 쌍 중 하나만 주어져야 합니다".to_string(),
            ))
        }
    };

    let signals = match (real_diff, day.predicted) {
        (Some(real_diff), Some(predicted)) => Some((real_diff, predicted)),
        (None, None) => None,
        _ => {
            return Err(CoreError::InvalidInput(
                "real_diff와 predicted는 함께 주어져야 합니다".to_string(),
            ))
        }
    };

    let settlement = match (&signals, &selection, config.scope) {
        (Some((real_diff, predicted)), _, SettleScope::Day) => {
            Some(settle_signal(real_diff, predicted, config.coef)?)
        }
        (Some((real_diff, predicted)), Some(selected), SettleScope::Selection) => {
            Some(settle_selection(real_diff, predicted, selected, config.coef)?)
        }
        _ => None,
    };

    match &selection {
        Some(selected) => debug!(
            day = %day.day,
            total_cost = selected.total_cost,
            segments = selected.segments.len(),
            "날짜 구간 선택 완료"
        ),
        None => warn!(day = %day.day, periods = day.prices.len(), "선택 가능한 구간 조합이 없습니다"),
    }

    let (total_cost, covered_periods, segments) = match selection {
        Some(selected) => (
            Some(selected.total_cost),
            selected.covered_periods(),
            selected.segments,
        ),
        None => (None, 0, Vec::new()),
    };

    Ok(DayOutcome {
        selection: DaySelectionPayload {
            day: day.day,
            total_cost,
            covered_periods,
            segments,
            settlement,
        },
        signals,
    })
}

fn summarize(outcomes: &[DayOutcome], elapsed_ms: u128) -> DayBatchMetricsPayload {
    let mut real_all = Vec::<f64>::new();
    let mut predicted_all = Vec::<f64>::new();
    let mut metrics = DayBatchMetricsPayload {
        day_count: outcomes.len(),
        feasible_days: 0,
        infeasible_days: 0,
        total_cost: 0.0,
        profit: 0.0,
        baseline_profit: 0.0,
        mae: None,
        r2: None,
        elapsed_ms,
    };

    for outcome in outcomes {
        match outcome.selection.total_cost {
            Some(cost) => {
                metrics.feasible_days += 1;
                metrics.total_cost += cost;
            }
            None => metrics.infeasible_days += 1,
        }

        if let Some(settlement) = &outcome.selection.settlement {
            metrics.profit += settlement.profit;
            metrics.baseline_profit += settlement.baseline_profit;
        }

        if let Some((real_diff, predicted)) = &outcome.signals {
            real_all.extend_from_slice(real_diff);
            predicted_all.extend_from_slice(predicted);
        }
    }

    metrics.mae = mean_absolute_error(&real_all, &predicted_all);
    metrics.r2 = r2_score(&real_all, &predicted_all);
    metrics
}

fn with_day_context(error: CoreError, day: &str) -> CoreError {
    match error {
        CoreError::InvalidInput(message) => CoreError::InvalidInput(format!("[{}] {}", day, message)),
        CoreError::InvalidConfig(message) => CoreError::InvalidConfig(format!("[{}] {}", day, message)),
        CoreError::Serialization(message) => CoreError::Serialization(format!("[{}] {}", day, message)),
        CoreError::Runtime(message) => CoreError::Runtime(format!("[{}] {}", day, message)),
    }
}

fn validate_payload(payload: &DayBatchRequestPayload) -> CoreResult<SelectionParams> {
    if payload.job_id.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            "job_id는 비어 있을 수 없습니다".to_string(),
        ));
    }

    if payload.days.is_empty() {
        return Err(CoreError::InvalidInput(
            "days는 최소 1개 이상이어야 합니다".to_string(),
        ));
    }

    if payload.worker_concurrency == 0 {
        return Err(CoreError::InvalidConfig(
            "worker_concurrency는 1 이상이어야 합니다".to_string(),
        ));
    }

    if payload.timeout_ms == 0 {
        return Err(CoreError::InvalidConfig(
            "timeout_ms는 1 이상이어야 합니다".to_string(),
        ));
    }

    validate_coef(payload.position_coef)?;
    let params = payload.selection.to_params()?;

    for day in &payload.days {
        if day.day.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "day 라벨은 비어 있을 수 없습니다".to_string(),
            ));
        }

        if let Some(expected) = payload.periods_per_day {
            if day.prices.len() != expected {
                return Err(CoreError::InvalidInput(format!(
                    "[{}] 기간 수가 periods_per_day와 다릅니다: expected={}, actual={}",
                    day.day,
                    expected,
                    day.prices.len()
                )));
            }
        }

        for (field_name, values) in [
            ("real_diff", &day.real_diff),
            ("day_ahead", &day.day_ahead),
            ("real_time", &day.real_time),
            ("predicted", &day.predicted),
        ] {
            if let Some(values) = values {
                if values.len() != day.prices.len() {
                    return Err(CoreError::InvalidInput(format!(
                        "[{}] {} 길이가 prices와 다릅니다: expected={}, actual={}",
                        day.day,
                        field_name,
                        day.prices.len(),
                        values.len()
                    )));
                }
            }
        }
    }

    Ok(params)
}

fn default_segment_length() -> i64 {
    DEFAULT_SEGMENT_LENGTH
}

fn default_min_gap() -> i64 {
    DEFAULT_MIN_GAP
}

fn default_num_segments() -> i64 {
    DEFAULT_NUM_SEGMENTS
}

fn default_periods_per_day() -> Option<usize> {
    Some(DEFAULT_PERIODS_PER_DAY)
}

fn default_position_coef() -> f64 {
    DEFAULT_POSITION_COEF
}

fn default_worker_concurrency() -> usize {
    DEFAULT_WORKER_CONCURRENCY
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
