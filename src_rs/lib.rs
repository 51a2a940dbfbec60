#![allow(non_local_definitions)]

// 목적:
// - 구간 선택 Rust 확장 모듈의 진입점을 제공한다.
//
// 설명:
// - 가격 시계열에서 최소 비용의 비중첩 구간을 고르는 DP 코어와
//   일 단위 배치/신호 정산을 Python에 노출한다.
//
// 디자인 패턴:
// - 계층형 모듈 구조(api/core/math).
//
// 참조:
// - src_rs/core/segment_selector.rs
// - src_rs/api/segment_bridge.rs

use pyo3::prelude::*;
use pyo3::types::PyModule;

pub mod api;
pub mod core;
pub mod math;

use api::logging::py_init_logging;
use api::segment_bridge::PySegmentBridge;
use api::selector::{py_price_difference, py_select_segments, py_settle_signal};

#[pymodule]
fn _segment_select(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySegmentBridge>()?;
    m.add_function(wrap_pyfunction!(py_select_segments, m)?)?;
    m.add_function(wrap_pyfunction!(py_settle_signal, m)?)?;
    m.add_function(wrap_pyfunction!(py_price_difference, m)?)?;
    m.add_function(wrap_pyfunction!(py_init_logging, m)?)?;
    Ok(())
}
