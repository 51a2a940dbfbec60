// 목적:
// - tracing 구독자를 한 번만 설치하는 Python 함수를 제공한다.
//
// 설명:
// - RUST_LOG 환경 변수가 있으면 그 값을, 없으면 인자로 받은 레벨을 사용한다.
// - 이미 설치되어 있으면 False를 반환한다.
//
// 참조:
// - src_rs/core/day_batch.rs

use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::api::to_py_err;
use crate::core::errors::{CoreError, CoreResult};

/// 전역 tracing 구독자를 설치한다. 새로 설치했으면 true.
pub fn install_subscriber(level: &str) -> CoreResult<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|error| {
            CoreError::InvalidConfig(format!("로그 레벨이 올바르지 않습니다: {}, {}", level, error))
        })?,
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok())
}

#[pyfunction(name = "init_logging")]
#[pyo3(signature = (level="info"))]
pub fn py_init_logging(level: &str) -> PyResult<bool> {
    install_subscriber(level).map_err(to_py_err)
}
