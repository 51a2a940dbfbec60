// 목적:
// - numpy 배열을 받아 구간 선택과 신호 정산을 수행하는 Python 함수를 제공한다.
//
// 설명:
// - 연속 메모리 배열은 복사 없이 슬라이스로 읽고, 아니면 한 번 복사한다.
// - 계산 중에는 GIL을 해제한다.
// - 선택 불가능하면 None을 반환한다.
//
// 참조:
// - src_rs/core/segment_selector.rs
// - src_rs/core/settlement.rs

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use crate::api::to_py_err;
use crate::core::segment_selector::{select_segments, SelectionParams};
use crate::core::settlement::{price_difference, settle_signal};

/// (총 비용, [(시작, 끝, 비용), ...])
pub type SelectionTuple = (f64, Vec<(usize, usize, f64)>);

#[pyfunction(name = "select_segments")]
#[pyo3(signature = (prices, segment_length=44, min_gap=12, num_segments=3))]
pub fn py_select_segments(
    py: Python<'_>,
    prices: PyReadonlyArray1<'_, f64>,
    segment_length: i64,
    min_gap: i64,
    num_segments: i64,
) -> PyResult<Option<SelectionTuple>> {
    let params = SelectionParams::new(segment_length, min_gap, num_segments).map_err(to_py_err)?;
    let values = to_owned_or_slice(&prices);

    let selection = py
        .detach(|| select_segments(&values, params))
        .map_err(to_py_err)?;

    Ok(selection.map(|selected| {
        let windows = selected
            .segments
            .iter()
            .map(|window| (window.start_index, window.end_index, window.cost))
            .collect();
        (selected.total_cost, windows)
    }))
}

/// (신호 수익, baseline 수익)
#[pyfunction(name = "settle_signal")]
#[pyo3(signature = (real_diff, predicted, coef=0.2))]
pub fn py_settle_signal(
    real_diff: PyReadonlyArray1<'_, f64>,
    predicted: PyReadonlyArray1<'_, f64>,
    coef: f64,
) -> PyResult<(f64, f64)> {
    let real_values = to_owned_or_slice(&real_diff);
    let predicted_values = to_owned_or_slice(&predicted);
    let settlement = settle_signal(&real_values, &predicted_values, coef).map_err(to_py_err)?;
    Ok((settlement.profit, settlement.baseline_profit))
}

/// 일전 가격 - 실시간 가격
#[pyfunction(name = "price_difference")]
pub fn py_price_difference<'py>(
    py: Python<'py>,
    day_ahead: PyReadonlyArray1<'_, f64>,
    real_time: PyReadonlyArray1<'_, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let ahead_values = to_owned_or_slice(&day_ahead);
    let real_values = to_owned_or_slice(&real_time);
    let diff = price_difference(&ahead_values, &real_values).map_err(to_py_err)?;
    Ok(PyArray1::from_vec(py, diff))
}

fn to_owned_or_slice<'a>(array: &'a PyReadonlyArray1<'_, f64>) -> std::borrow::Cow<'a, [f64]> {
    match array.as_slice() {
        Ok(slice) => std::borrow::Cow::Borrowed(slice),
        Err(_) => std::borrow::Cow::Owned(array.as_array().to_vec()),
    }
}
