//! Invocation inputs: what to call, and how to adjust the environment it runs in.
//!
//! Both types are built once by the calling test through consuming `with_*` methods and are never
//! mutated afterwards; the harness only ever borrows them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// One logical call of a CMake function under test.
///
/// The output variable is passed to the function as its implicit leading argument, so `arguments`
/// holds only the remaining positional tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInvocationSpec {
    module_path: PathBuf,
    function_name: String,
    output_variable: String,
    arguments: Vec<String>,
    variables: Vec<(String, String)>,
}

impl FunctionInvocationSpec {
    /// Create a spec that calls `function_name` from the module at `module_path`, reading the result from
    /// `output_variable`.
    pub fn new(
        module_path: impl Into<PathBuf>,
        function_name: impl Into<String>,
        output_variable: impl Into<String>,
    ) -> Self {
        Self {
            module_path: module_path.into(),
            function_name: function_name.into(),
            output_variable: output_variable.into(),
            arguments: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Append one positional argument token.
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Append several positional argument tokens, in order.
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// Pre-set a CMake variable before the call. Variables are set in the order they are added.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((name.into(), value.into()));
        self
    }

    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn output_variable(&self) -> &str {
        &self.output_variable
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Pre-set variables as `(name, value)` pairs, in insertion order.
    pub fn variables(&self) -> &[(String, String)] {
        &self.variables
    }
}

/// Per-invocation environment adjustment: names to remove, then names to set.
///
/// A name that is both removed and set ends up set; see [`crate::effective_environment`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverride {
    removals: BTreeSet<String>,
    overlays: BTreeMap<String, String>,
}

impl EnvironmentOverride {
    /// An override that leaves the ambient environment untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `name` from the subprocess environment.
    pub fn with_removed(mut self, name: impl Into<String>) -> Self {
        self.removals.insert(name.into());
        self
    }

    /// Remove every name in `names` from the subprocess environment.
    pub fn with_removals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.removals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set `name` to `value` in the subprocess environment.
    pub fn with_set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overlays.insert(name.into(), value.into());
        self
    }

    /// Set every `(name, value)` pair in the subprocess environment.
    pub fn with_overlays<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overlays
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn removals(&self) -> &BTreeSet<String> {
        &self.removals
    }

    pub fn overlays(&self) -> &BTreeMap<String, String> {
        &self.overlays
    }

    /// True when applying this override would not change anything.
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.overlays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_keeps_argument_order() {
        let spec = FunctionInvocationSpec::new("m.cmake", "Fn", "OUT")
            .with_argument("a")
            .with_arguments(["b", "c"]);
        assert_eq!(spec.arguments(), ["a", "b", "c"]);
    }

    #[test]
    fn test_spec_keeps_variable_insertion_order() {
        let spec = FunctionInvocationSpec::new("m.cmake", "Fn", "OUT")
            .with_variable("ZED", "1")
            .with_variable("ALPHA", "2");
        assert_eq!(
            spec.variables(),
            [
                ("ZED".to_string(), "1".to_string()),
                ("ALPHA".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_spec_accessors() {
        let spec = FunctionInvocationSpec::new("dir/m.cmake", "Fn", "OUT");
        assert_eq!(spec.module_path(), Path::new("dir/m.cmake"));
        assert_eq!(spec.function_name(), "Fn");
        assert_eq!(spec.output_variable(), "OUT");
        assert!(spec.arguments().is_empty());
        assert!(spec.variables().is_empty());
    }

    #[test]
    fn test_override_default_is_empty() {
        assert!(EnvironmentOverride::new().is_empty());
        assert!(!EnvironmentOverride::new().with_removed("HOME").is_empty());
        assert!(!EnvironmentOverride::new().with_set("HOME", "x").is_empty());
    }

    #[test]
    fn test_override_last_set_wins() {
        let ov = EnvironmentOverride::new()
            .with_set("HOME", "first")
            .with_overlays([("HOME", "second")]);
        assert_eq!(ov.overlays().get("HOME").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_override_removals_deduplicate() {
        let ov = EnvironmentOverride::new().with_removals(["HOME", "HOME", "USERPROFILE"]);
        assert_eq!(ov.removals().len(), 2);
    }
}
