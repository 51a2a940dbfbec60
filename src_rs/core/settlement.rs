// 목적:
// - 예측 신호에 따른 기간별 포지션 수익을 정산한다.
//
// 설명:
// - 가격차 = 일전 가격 - 실시간 가격.
// - 예측 신호가 0 이상이면 +coef, 음수면 -coef 포지션을 잡는다.
// - 비교 기준(baseline)은 모든 기간에 +coef 포지션을 유지한 경우다.
// - 선택 결과가 주어지면 선택 구간에 포함된 기간만 정산한다.
//
// 디자인 패턴:
// - 순수 함수(Pure Function).
//
// 참조:
// - src_rs/core/segment_selector.rs
// - src_rs/core/day_batch.rs

use serde::{Deserialize, Serialize};

use crate::core::errors::{CoreError, CoreResult};
use crate::core::segment_selector::Selection;
use crate::math::window_sums::first_non_finite;

pub const DEFAULT_POSITION_COEF: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSettlement {
    pub profit: f64,
    pub baseline_profit: f64,
    pub settled_periods: usize,
}

/// 일전/실시간 가격으로 기간별 가격차를 만든다.
pub fn price_difference(day_ahead: &[f64], real_time: &[f64]) -> CoreResult<Vec<f64>> {
    ensure_same_length(day_ahead.len(), real_time.len(), "day_ahead", "real_time")?;
    ensure_finite(day_ahead, "day_ahead")?;
    ensure_finite(real_time, "real_time")?;

    Ok(day_ahead
        .iter()
        .zip(real_time.iter())
        .map(|(ahead, real)| ahead - real)
        .collect())
}

/// 전체 기간에 대해 신호 수익과 baseline 수익을 계산한다.
pub fn settle_signal(real_diff: &[f64], predicted: &[f64], coef: f64) -> CoreResult<SignalSettlement> {
    settle_where(real_diff, predicted, coef, |_| true)
}

/// 선택 구간에 포함된 기간만 정산한다.
pub fn settle_selection(
    real_diff: &[f64],
    predicted: &[f64],
    selection: &Selection,
    coef: f64,
) -> CoreResult<SignalSettlement> {
    if let Some(window) = selection
        .segments
        .iter()
        .find(|window| window.end_index >= real_diff.len())
    {
        return Err(CoreError::InvalidInput(format!(
            "선택 구간이 신호 범위를 벗어났습니다: end_index={}, periods={}",
            window.end_index,
            real_diff.len()
        )));
    }

    settle_where(real_diff, predicted, coef, |index| selection.covers(index))
}

pub fn position_for(signal: f64, coef: f64) -> f64 {
    if signal >= 0.0 {
        coef
    } else {
        -coef
    }
}

fn settle_where<F>(real_diff: &[f64], predicted: &[f64], coef: f64, include: F) -> CoreResult<SignalSettlement>
where
    F: Fn(usize) -> bool,
{
    validate_coef(coef)?;
    ensure_same_length(real_diff.len(), predicted.len(), "real_diff", "predicted")?;
    ensure_finite(real_diff, "real_diff")?;
    ensure_finite(predicted, "predicted")?;

    let mut settlement = SignalSettlement {
        profit: 0.0,
        baseline_profit: 0.0,
        settled_periods: 0,
    };

    for (index, (real, signal)) in real_diff.iter().zip(predicted.iter()).enumerate() {
        if !include(index) {
            continue;
        }
        settlement.profit += real * position_for(*signal, coef);
        settlement.baseline_profit += real * coef;
        settlement.settled_periods += 1;
    }

    Ok(settlement)
}

pub fn validate_coef(coef: f64) -> CoreResult<()> {
    if !coef.is_finite() || coef < 0.0 {
        return Err(CoreError::InvalidConfig(format!(
            "position_coef는 0 이상의 유한한 값이어야 합니다: {}",
            coef
        )));
    }
    Ok(())
}

fn ensure_same_length(left: usize, right: usize, left_name: &str, right_name: &str) -> CoreResult<()> {
    if left != right {
        return Err(CoreError::InvalidInput(format!(
            "{}와 {}의 길이가 다릅니다: {} != {}",
            left_name, right_name, left, right
        )));
    }
    Ok(())
}

fn ensure_finite(values: &[f64], field_name: &str) -> CoreResult<()> {
    match first_non_finite(values) {
        Some(index) => Err(CoreError::InvalidInput(format!(
            "{}에 유한하지 않은 값이 있습니다: index={}",
            field_name, index
        ))),
        None => Ok(()),
    }
}
