//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use pixfish::{Fish, FishError};

use super::fixtures::{f32_values, f64_values};

/// Run `fish` over `input` and return the destination buffer.
pub fn run_fish(fish: &Fish, input: &[u8]) -> Vec<u8> {
    let n = input.len() / fish.source().bytes_per_pixel;
    let mut output = vec![0u8; n * fish.destination().bytes_per_pixel];
    assert_eq!(fish.process(input, &mut output, n), n);
    output
}

/// Assert two f32 buffers hold exactly the same values
pub fn assert_f32_eq(actual: &[u8], expected: &[f32]) {
    assert_eq!(f32_values(actual), expected);
}

pub fn assert_f64_eq(actual: &[u8], expected: &[f64]) {
    assert_eq!(f64_values(actual), expected);
}

pub fn assert_f32_near(actual: &[u8], expected: &[f32], tolerance: f32) {
    let actual = f32_values(actual);
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "value {i}: expected {e}, got {a} (tolerance {tolerance})"
        );
    }
}

/// Assert f64 values agree within `tolerance`
pub fn assert_f64_near(actual: &[u8], expected: &[f64], tolerance: f64) {
    let actual = f64_values(actual);
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "value {i}: expected {e}, got {a} (tolerance {tolerance})"
        );
    }
}

/// Assert the error is a `NoPathFound` and return its reason
pub fn assert_no_path(result: Result<impl std::fmt::Debug, FishError>) -> String {
    match result {
        Err(FishError::NoPathFound { reason, .. }) => reason,
        other => panic!("Expected NoPathFound, got {other:?}"),
    }
}
