//! Regression tests for the smoothing stage's boundary policy.
//!
//! T103: Fixed-divisor trailing average regression tests

use paddlepower::metrics::smoothing::trailing_average;

#[test]
fn test_fixed_divisor_policy_constant_input() {
    // documented policy: the divisor is always the kernel width, so a
    // constant series V ramps up as V * min(i+1, K) / K
    const K: usize = 40;
    let v = 250.0;
    let raw = vec![v; 120];
    let smoothed = trailing_average(&raw, K);

    assert_eq!(smoothed.len(), raw.len());
    for (i, &s) in smoothed.iter().enumerate() {
        let expected = v * ((i + 1).min(K) as f64) / K as f64;
        assert!(
            (s - expected).abs() < 1e-9,
            "index {i}: {s} != {expected}"
        );
    }
}

#[test]
fn test_kernel_one_is_identity_and_idempotent() {
    let raw = vec![0.0, 3.5, 3.5, 120.7, -2.0, 88.0];
    let once = trailing_average(&raw, 1);
    assert_eq!(once, raw);
    assert_eq!(trailing_average(&once, 1), raw);
}

#[test]
fn test_step_input_settles_on_new_level() {
    // a step from 0 to 100 reaches the new level after K samples
    const K: usize = 4;
    let mut raw = vec![0.0; K];
    raw.extend(vec![100.0; 3 * K]);
    let smoothed = trailing_average(&raw, K);

    assert_eq!(smoothed[K - 1], 0.0);
    assert!((smoothed[K] - 25.0).abs() < 1e-12);
    assert!((smoothed[2 * K - 1] - 100.0).abs() < 1e-12);
    assert!((*smoothed.last().unwrap() - 100.0).abs() < 1e-12);
}

#[test]
fn test_empty_and_single_sample() {
    assert!(trailing_average(&[], 40).is_empty());
    let smoothed = trailing_average(&[80.0], 40);
    assert_eq!(smoothed.len(), 1);
    // one sample out of a 40-wide divisor
    assert!((smoothed[0] - 2.0).abs() < 1e-12);
}
