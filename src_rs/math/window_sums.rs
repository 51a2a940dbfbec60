/// 길이 n 입력에 대해 길이 n+1의 누적합을 반환한다. `sums[i]`는 `values[..i]`의 합이다.
pub fn prefix_sums(values: &[f64]) -> Vec<f64> {
    compensated_prefix_sums(values)
        .into_iter()
        .map(|(high, low)| high + low)
        .collect()
}

/// Neumaier 보정 누적합. 각 항목은 (반올림된 합, 누락된 하위 비트) 쌍이다.
pub fn compensated_prefix_sums(values: &[f64]) -> Vec<(f64, f64)> {
    let mut sums = Vec::with_capacity(values.len() + 1);
    let (mut high, mut low) = (0.0f64, 0.0f64);
    sums.push((high, low));
    for &value in values {
        let next = high + value;
        if high.abs() >= value.abs() {
            low += (high - next) + value;
        } else {
            low += (value - next) + high;
        }
        high = next;
        sums.push((high, low));
    }
    sums
}

/// 시작 위치별 고정 길이 구간 합을 O(n)으로 계산한다.
///
/// 보정 누적합의 상위/하위 부분을 따로 빼므로 크기가 크게 다른 값이 섞여도
/// 작은 구간 합이 큰 앞쪽 값에 묻히지 않는다.
/// `length`가 0이거나 입력보다 길면 빈 벡터를 반환한다.
pub fn window_costs(values: &[f64], length: usize) -> Vec<f64> {
    if length == 0 || length > values.len() {
        return Vec::new();
    }

    let sums = compensated_prefix_sums(values);
    (0..=values.len() - length)
        .map(|start| {
            let (end_high, end_low) = sums[start + length];
            let (start_high, start_low) = sums[start];
            (end_high - start_high) + (end_low - start_low)
        })
        .collect()
}

pub fn slice_sum(values: &[f64]) -> f64 {
    values.iter().sum::<f64>()
}

pub fn first_non_finite(values: &[f64]) -> Option<usize> {
    values.iter().position(|value| !value.is_finite())
}
