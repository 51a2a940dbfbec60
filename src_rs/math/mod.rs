// 목적:
// - 수치 계산 유틸리티 모듈을 선언한다.
//
// 설명:
// - 구간 합 계산과 예측 평가 지표를 코어 로직과 분리한다.
//
// 참조:
// - src_rs/math/window_sums.rs
// - src_rs/math/metrics.rs

pub mod metrics;
pub mod window_sums;
