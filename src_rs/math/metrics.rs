/// 평균 절대 오차. 길이가 다르거나 비어 있으면 None.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }

    let total = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>();
    Some(total / actual.len() as f64)
}

/// 결정계수(R²). `actual`을 정답으로 본다.
///
/// 기존 Python 백테스트는 `r2_score(pred, real)` 순서로 호출해 예측값을 정답으로 취급했다.
/// 여기서는 실현 가격차가 정답이므로 같은 데이터라도 기존 보고 수치와 다를 수 있다.
///
/// 정답 분산이 0이면 완전 일치 시 1.0, 아니면 0.0을 반환한다.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p) * (a - p))
        .sum::<f64>();
    let ss_tot = actual.iter().map(|a| (a - mean) * (a - mean)).sum::<f64>();

    if ss_tot <= f64::EPSILON {
        return Some(if ss_res <= f64::EPSILON { 1.0 } else { 0.0 });
    }
    Some(1.0 - ss_res / ss_tot)
}
