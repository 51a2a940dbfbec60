// 목적:
// - Python FFI 경계 모듈을 선언한다.
//
// 설명:
// - 배치 브릿지 클래스, numpy 입력 함수, 로깅 초기화를 분리해 Python 계층에 노출한다.
// - 코어 오류는 여기서 Python 예외로 변환한다.
//
// 디자인 패턴:
// - 모듈 분리(Module Separation).
//
// 참조:
// - src_rs/api/segment_bridge.rs
// - src_rs/api/selector.rs
// - src_rs/api/logging.rs

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::PyErr;

use crate::core::errors::CoreError;

pub mod logging;
pub mod segment_bridge;
pub mod selector;

/// 호출자 입력 오류는 ValueError, 나머지는 RuntimeError로 변환한다.
pub fn to_py_err(error: CoreError) -> PyErr {
    if error.is_caller_fault() {
        PyValueError::new_err(error.to_string())
    } else {
        PyRuntimeError::new_err(error.to_string())
    }
}
