// 목적:
// - Python에서 호출 가능한 일 단위 구간 선택 브릿지 클래스를 제공한다.
//
// 설명:
// - JSON 페이로드를 입력받아 Rust 배치 파이프라인을 실행하고,
//   결과를 JSON 문자열로 반환한다.
//
// 디자인 패턴:
// - 파사드(Facade) + 실패 빠르게(Fail Fast).
//
// 참조:
// - src_rs/core/day_batch.rs

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::api::to_py_err;
use crate::core::day_batch::{execute_day_batch, DayBatchRequestPayload};
use crate::core::errors::{CoreError, CoreResult};

/// Python에 노출되는 구간 선택 배치 브릿지 클래스다.
#[pyclass(name = "SegmentBridge")]
pub struct PySegmentBridge {
    phase: String,
}

#[pymethods]
impl PySegmentBridge {
    /// 브릿지 객체를 생성한다.
    #[new]
    pub fn new() -> Self {
        Self {
            phase: "day-batch-selection".to_string(),
        }
    }

    /// 현재 브릿지 단계 정보를 반환한다.
    pub fn status(&self) -> String {
        self.phase.clone()
    }

    /// 배치 페이로드(JSON)를 실행하고 결과 JSON을 반환한다.
    pub fn execute(&self, py: Python<'_>, payload_json: &str) -> PyResult<String> {
        let payload: DayBatchRequestPayload = serde_json::from_str(payload_json).map_err(|error| {
            PyValueError::new_err(format!(
                "배치 페이로드 JSON 파싱에 실패했습니다: {}",
                error
            ))
        })?;
        debug!(job_id = %payload.job_id, "배치 페이로드 파싱 완료");

        let result = py
            .detach(|| {
                let runtime = create_runtime()?;
                let result = runtime.block_on(execute_day_batch(payload));
                // 시간 초과 후 남은 blocking 작업을 기다리지 않는다.
                runtime.shutdown_background();
                result
            })
            .map_err(to_py_err)?;

        serde_json::to_string(&result)
            .map_err(|error| PyRuntimeError::new_err(format!("배치 결과 직렬화 실패: {}", error)))
    }
}

impl Default for PySegmentBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn create_runtime() -> CoreResult<Runtime> {
    Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| CoreError::Runtime(format!("Tokio 런타임 생성 실패: {}", error)))
}
