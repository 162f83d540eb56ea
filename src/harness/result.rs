//! The structured outcome of one invocation.

use serde::Serialize;

use cmakefn_core::normalize_whitespace;

/// Result of calling a function under test.
///
/// `value` is present exactly when the engine exited with code zero; there is no separate success flag.
/// The normalized output is always derived from the raw output at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    value: Option<String>,
    raw_output: String,
    normalized_output: String,
    script_text: String,
}

impl InvocationResult {
    pub fn new(value: Option<String>, raw_output: String, script_text: String) -> Self {
        let normalized_output = normalize_whitespace(&raw_output);
        Self {
            value,
            raw_output,
            normalized_output,
            script_text,
        }
    }

    /// The output variable's final value, or `None` if the invocation failed.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.value.is_some()
    }

    /// Merged stdout/stderr exactly as captured.
    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    /// Captured output with whitespace runs collapsed to single spaces.
    pub fn normalized_output(&self) -> &str {
        &self.normalized_output
    }

    /// The host script that was run.
    pub fn script_text(&self) -> &str {
        &self.script_text
    }

    pub fn into_value(self) -> Option<String> {
        self.value
    }

    /// Multi-line description for assertion failure messages.
    pub fn diagnostics(&self) -> String {
        let value = match &self.value {
            Some(v) => format!("{v:?}"),
            None => "<failed>".to_string(),
        };
        format!(
            "value: {value}\noutput:\n{}\nscript:\n{}",
            self.raw_output.trim_end(),
            self.script_text.trim_end()
        )
    }
}
