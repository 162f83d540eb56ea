//! Assertion helpers for tests that call CMake functions.
//!
//! Failure messages always carry the captured output and the generated script, which is usually all that
//! is needed to see why a CMake function misbehaved.

use super::result::InvocationResult;

/// Assert that the invocation succeeded and returned exactly `expected`.
///
/// # Panics
///
/// Panics if the invocation failed or returned a different value.
#[track_caller]
pub fn assert_returns(result: &InvocationResult, expected: &str) {
    match result.value() {
        None => panic!(
            "function failed, but should have completed successfully with result {expected:?}\n{}",
            result.diagnostics()
        ),
        Some(actual) if actual != expected => panic!(
            "function returned {actual:?}, expected {expected:?}\n{}",
            result.diagnostics()
        ),
        Some(_) => {}
    }
}

/// Assert that the invocation failed and its normalized output contains `fragment`.
///
/// # Panics
///
/// Panics if the invocation succeeded or the output does not mention `fragment`.
#[track_caller]
pub fn assert_fails_with(result: &InvocationResult, fragment: &str) {
    if result.is_success() {
        panic!(
            "function should have failed, but it completed successfully\n{}",
            result.diagnostics()
        );
    }
    if !result.normalized_output().contains(fragment) {
        panic!(
            "function failed, but its output does not contain {fragment:?}\n{}",
            result.diagnostics()
        );
    }
}
