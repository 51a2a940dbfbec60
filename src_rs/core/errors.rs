// 목적:
// - Rust 코어 계층의 표준 오류 타입을 정의한다.
//
// 설명:
// - 입력/설정/직렬화/런타임 오류를 명시적으로 구분해 Python에 전달한다.
// - 선택 불가능(infeasible)은 오류가 아니며 Option::None으로 표현한다.
//
// 디자인 패턴:
// - 도메인 오류 열거형(Domain Error Enum).
//
// 참조:
// - src_rs/core/segment_selector.rs
// - src_rs/core/day_batch.rs
// - src_rs/api/mod.rs

use thiserror::Error;

/// 코어 계층에서 공통으로 사용하는 오류 열거형이다.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("입력값이 유효하지 않습니다: {0}")]
    InvalidInput(String),
    #[error("설정값이 유효하지 않습니다: {0}")]
    InvalidConfig(String),
    #[error("직렬화/역직렬화에 실패했습니다: {0}")]
    Serialization(String),
    #[error("런타임 처리 중 오류가 발생했습니다: {0}")]
    Runtime(String),
}

impl CoreError {
    /// 호출자가 입력을 고쳐야 하는 오류인지 여부를 반환한다.
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_) | CoreError::InvalidConfig(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
