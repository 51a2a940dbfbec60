// 목적:
// - 핵심 런타임 계층 모듈을 선언한다.
//
// 설명:
// - 구간 선택 DP, 일 단위 배치 실행, 신호 정산과 공통 오류 모델을 분리해 유지보수성을 높인다.
//
// 디자인 패턴:
// - 명시적 오류 모델(Explicit Error Model).
//
// 참조:
// - src_rs/core/errors.rs
// - src_rs/core/segment_selector.rs
// - src_rs/core/day_batch.rs
// - src_rs/core/settlement.rs

pub mod day_batch;
pub mod errors;
pub mod segment_selector;
pub mod settlement;
