// 목적:
// - 가격 시계열에서 최소 비용의 비중첩 고정 길이 구간들을 선택한다.
//
// 설명:
// - 시작 위치별 후보 구간 비용을 누적합으로 계산한 뒤,
//   dp[행][k] = "앞쪽 행 개 후보만 사용해 k개를 고른 최소 비용" 표를 채운다.
// - 후보가 모든 시작 위치에 존재하므로 간격 조건을 만족하는 가장 가까운 선행 행은
//   `행 - (구간 길이 + 최소 간격)`으로 바로 계산된다.
// - dp[p][k-1]은 p에 대해 단조 비증가이므로 가장 가까운 선행 행이 항상 최적이다.
// - 역추적은 (결정, 선행 행) 표만 따라간다.
//
// 디자인 패턴:
// - 동적 계획법(Dynamic Programming) + 명시적 역추적 표.
//
// 참조:
// - src_rs/math/window_sums.rs
// - src_rs/core/day_batch.rs

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{CoreError, CoreResult};
use crate::math::window_sums::{first_non_finite, slice_sum, window_costs};

pub const DEFAULT_SEGMENT_LENGTH: i64 = 44;
pub const DEFAULT_MIN_GAP: i64 = 12;
pub const DEFAULT_NUM_SEGMENTS: i64 = 3;

/// 검증이 끝난 구간 선택 파라미터다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionParams {
    segment_length: usize,
    min_gap: usize,
    num_segments: usize,
}

impl SelectionParams {
    /// FFI/JSON에서 들어온 부호 있는 정수를 검증해 파라미터를 만든다.
    pub fn new(segment_length: i64, min_gap: i64, num_segments: i64) -> CoreResult<Self> {
        if segment_length <= 0 {
            return Err(CoreError::InvalidInput(format!(
                "segment_length는 1 이상이어야 합니다: {}",
                segment_length
            )));
        }

        if min_gap < 0 {
            return Err(CoreError::InvalidInput(format!(
                "min_gap은 0 이상이어야 합니다: {}",
                min_gap
            )));
        }

        if num_segments <= 0 {
            return Err(CoreError::InvalidInput(format!(
                "num_segments는 1 이상이어야 합니다: {}",
                num_segments
            )));
        }

        let to_usize = |value: i64, field_name: &str| {
            usize::try_from(value).map_err(|_| {
                CoreError::InvalidInput(format!("{}가 너무 큽니다: {}", field_name, value))
            })
        };

        Ok(Self {
            segment_length: to_usize(segment_length, "segment_length")?,
            min_gap: to_usize(min_gap, "min_gap")?,
            num_segments: to_usize(num_segments, "num_segments")?,
        })
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    pub fn min_gap(&self) -> usize {
        self.min_gap
    }

    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    /// 모든 구간을 최소 간격으로 붙여 놓았을 때 필요한 기간 수.
    pub fn required_periods(&self) -> usize {
        self.num_segments
            .saturating_mul(self.segment_length)
            .saturating_add((self.num_segments - 1).saturating_mul(self.min_gap))
    }
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            segment_length: DEFAULT_SEGMENT_LENGTH as usize,
            min_gap: DEFAULT_MIN_GAP as usize,
            num_segments: DEFAULT_NUM_SEGMENTS as usize,
        }
    }
}

/// 선택된 하나의 구간이다. `end_index`는 포함 경계다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start_index: usize,
    pub end_index: usize,
    pub cost: f64,
}

impl Window {
    pub fn contains(&self, index: usize) -> bool {
        self.start_index <= index && index <= self.end_index
    }
}

/// 시작 위치 오름차순으로 정렬된 선택 결과다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub total_cost: f64,
    pub segments: Vec<Window>,
}

impl Selection {
    pub fn covers(&self, index: usize) -> bool {
        self.segments.iter().any(|window| window.contains(index))
    }

    pub fn covered_periods(&self) -> usize {
        self.segments
            .iter()
            .map(|window| window.end_index - window.start_index + 1)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Unreachable,
    Skip,
    Take { predecessor: usize },
}

/// 최소 비용 구간 조합을 찾는다.
///
/// 파라미터나 가격이 잘못되면 `Err`, 조건을 만족하는 조합이 없으면 `Ok(None)`을 반환한다.
/// 비용이 같은 조합이 여럿이면 더 앞쪽 구간을 쓰는 조합을 고른다.
pub fn select_segments(prices: &[f64], params: SelectionParams) -> CoreResult<Option<Selection>> {
    if let Some(index) = first_non_finite(prices) {
        return Err(CoreError::InvalidInput(format!(
            "prices에 유한하지 않은 값이 있습니다: index={}, value={}",
            index, prices[index]
        )));
    }

    if prices.len() < params.required_periods() {
        debug!(
            periods = prices.len(),
            required = params.required_periods(),
            "구간 선택 불가: 기간 수 부족"
        );
        return Ok(None);
    }

    let length = params.segment_length;
    let target = params.num_segments;
    let stride = length + params.min_gap;
    let costs = window_costs(prices, length);
    let rows = costs.len();
    let width = target + 1;
    let at = |row: usize, k: usize| row * width + k;

    let mut dp = vec![f64::INFINITY; (rows + 1) * width];
    let mut trace = vec![Decision::Unreachable; (rows + 1) * width];
    for row in 0..=rows {
        dp[at(row, 0)] = 0.0;
    }

    for row in 1..=rows {
        let cost = costs[row - 1];
        // 0행은 "선택 가능한 선행 구간 없음"을 뜻한다.
        let predecessor = row.saturating_sub(stride);

        for k in 1..=target.min(row) {
            let skipped = dp[at(row - 1, k)];
            let mut best = skipped;
            let mut decision = if skipped.is_finite() {
                Decision::Skip
            } else {
                Decision::Unreachable
            };

            let base = dp[at(predecessor, k - 1)];
            if base.is_finite() && base + cost < best {
                best = base + cost;
                decision = Decision::Take { predecessor };
            }

            dp[at(row, k)] = best;
            trace[at(row, k)] = decision;
        }
    }

    if !dp[at(rows, target)].is_finite() {
        return Ok(None);
    }

    let mut segments = Vec::with_capacity(target);
    let (mut row, mut k) = (rows, target);
    while k > 0 {
        match trace[at(row, k)] {
            Decision::Skip => row -= 1,
            Decision::Take { predecessor } => {
                let start_index = row - 1;
                let end_index = start_index + length - 1;
                segments.push(Window {
                    start_index,
                    end_index,
                    cost: slice_sum(&prices[start_index..=end_index]),
                });
                row = predecessor;
                k -= 1;
            }
            Decision::Unreachable => {
                return Err(CoreError::Runtime(format!(
                    "역추적 표가 손상되었습니다: row={}, k={}",
                    row, k
                )));
            }
        }
    }
    segments.reverse();

    let total_cost = segments.iter().map(|window| window.cost).sum::<f64>();
    debug!(
        periods = prices.len(),
        segments = segments.len(),
        total_cost,
        "구간 선택 완료"
    );

    Ok(Some(Selection {
        total_cost,
        segments,
    }))
}
