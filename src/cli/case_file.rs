//! Declarative test case files (`*.cmake.test.json`)
//!
//! A case file names one CMake function and lists invocations of it together with the expected outcome:
//!
//! ```json
//! {
//!   "module": "../ConcppGetUserHomeDir.cmake",
//!   "function": "ConcppGetUserHomeDir",
//!   "out_var": "GET_USER_HOME_DIR_RESULT",
//!   "cases": [
//!     { "name": "not_found", "env_unset": ["HOME", "USERPROFILE"], "expect": { "value": "NOTFOUND" } },
//!     { "name": "extra_argument", "args": ["zzyzx"],
//!       "expect": { "failure_containing": "unexpected arguments: zzyzx" } }
//!   ]
//! }
//! ```
//!
//! `module` is resolved relative to the directory containing the case file.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use cmakefn_core::{EnvironmentOverride, FunctionInvocationSpec};

/// Suffix identifying case files during discovery.
pub const CASE_FILE_SUFFIX: &str = ".cmake.test.json";

/// Errors loading a case file
#[derive(Debug, Error)]
pub enum CaseFileError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid case file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: duplicate case name '{name}'", .path.display())]
    DuplicateCase { path: PathBuf, name: String },
}

/// Contents of one case file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseFile {
    pub module: PathBuf,
    pub function: String,
    pub out_var: String,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// One invocation and its expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    /// Arguments after the output variable
    #[serde(default)]
    pub args: Vec<String>,
    /// CMake variables set before the call, in file order
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub variables: Vec<(String, String)>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub env_unset: Vec<String>,
    #[serde(default)]
    pub only_on: Option<Platform>,
    pub expect: Expectation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) { Platform::Windows } else { Platform::Unix }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Unix => "unix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The call succeeds and returns exactly this value
    Value(String),
    /// The call fails and the normalized output contains this text
    FailureContaining(String),
}

/// Deserialize a JSON object into its entries in document order. Later values may refer to earlier ones
/// (`"B": "${A}"`), so the order is significant.
fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedPairs;

    impl<'de> Visitor<'de> for OrderedPairs {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object of string values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut pairs: Vec<(String, String)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, value)) = map.next_entry::<String, String>()? {
                if pairs.iter().any(|(existing, _)| *existing == name) {
                    return Err(de::Error::custom(format!("duplicate variable '{}'", name)));
                }
                pairs.push((name, value));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(OrderedPairs)
}

/// A parsed case file with its module path resolved.
#[derive(Debug, Clone)]
pub struct LoadedCaseFile {
    pub path: PathBuf,
    pub module_path: PathBuf,
    pub contents: CaseFile,
}

impl LoadedCaseFile {
    /// Build the invocation for `case`.
    pub fn spec_for(&self, case: &TestCase) -> FunctionInvocationSpec {
        case.variables.iter().fold(
            FunctionInvocationSpec::new(&self.module_path, &self.contents.function, &self.contents.out_var)
                .with_arguments(case.args.iter().cloned()),
            |spec, (name, value)| spec.with_variable(name, value),
        )
    }
}

impl TestCase {
    pub fn environment_override(&self) -> EnvironmentOverride {
        EnvironmentOverride::new()
            .with_removals(self.env_unset.iter().cloned())
            .with_overlays(self.env.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Why this case does not run here, if it doesn't.
    pub fn skip_reason(&self, platform: Platform) -> Option<String> {
        match self.only_on {
            Some(only) if only != platform => Some(format!("only runs on {}", only.as_str())),
            _ => None,
        }
    }
}

/// Parse case file text. `path` is used for error messages and module resolution.
pub fn parse_case_file(path: &Path, text: &str) -> Result<LoadedCaseFile, CaseFileError> {
    let contents: CaseFile = serde_json::from_str(text).map_err(|source| CaseFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut names = HashSet::new();
    for case in &contents.cases {
        if !names.insert(case.name.as_str()) {
            return Err(CaseFileError::DuplicateCase {
                path: path.to_path_buf(),
                name: case.name.clone(),
            });
        }
    }

    let module_path = match path.parent() {
        Some(dir) if contents.module.is_relative() => dir.join(&contents.module),
        _ => contents.module.clone(),
    };

    Ok(LoadedCaseFile {
        path: path.to_path_buf(),
        module_path,
        contents,
    })
}

/// Read and parse a case file from disk.
pub fn load_case_file(path: &Path) -> Result<LoadedCaseFile, CaseFileError> {
    let text = fs::read_to_string(path).map_err(|source| CaseFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_case_file(path, &text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HOME_CASES: &str = r#"{
        "module": "../ConcppGetUserHomeDir.cmake",
        "function": "ConcppGetUserHomeDir",
        "out_var": "GET_USER_HOME_DIR_RESULT",
        "cases": [
            { "name": "not_found", "env_unset": ["HOME", "USERPROFILE"], "expect": { "value": "NOTFOUND" } },
            { "name": "home_on_unix", "only_on": "unix", "env": { "HOME": "abcdef" }, "expect": { "value": "abcdef" } },
            { "name": "extra_argument", "args": ["zzyzx"],
              "expect": { "failure_containing": "unexpected arguments: zzyzx" } }
        ]
    }"#;

    #[test]
    fn test_parse_full_file() {
        let loaded = parse_case_file(Path::new("cmake/test/home.cmake.test.json"), HOME_CASES).unwrap();
        assert_eq!(loaded.contents.function, "ConcppGetUserHomeDir");
        assert_eq!(loaded.contents.cases.len(), 3);
        assert_eq!(loaded.module_path, Path::new("cmake/test/../ConcppGetUserHomeDir.cmake"));
        assert_eq!(
            loaded.contents.cases[2].expect,
            Expectation::FailureContaining("unexpected arguments: zzyzx".to_string())
        );
        assert_eq!(loaded.contents.cases[1].only_on, Some(Platform::Unix));
    }

    #[test]
    fn test_absolute_module_is_kept() {
        let text = r#"{ "module": "/abs/Mod.cmake", "function": "F", "out_var": "O" }"#;
        let loaded = parse_case_file(Path::new("dir/x.cmake.test.json"), text).unwrap();
        if cfg!(unix) {
            assert_eq!(loaded.module_path, Path::new("/abs/Mod.cmake"));
        }
        assert!(loaded.contents.cases.is_empty());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let text = r#"{ "module": "m", "function": "F", "out_var": "O", "timeout": 3 }"#;
        let err = parse_case_file(Path::new("x.cmake.test.json"), text).unwrap_err();
        assert!(matches!(err, CaseFileError::Parse { .. }));
        assert!(err.to_string().contains("x.cmake.test.json"));
    }

    #[test]
    fn test_duplicate_case_names_are_rejected() {
        let text = r#"{ "module": "m", "function": "F", "out_var": "O", "cases": [
            { "name": "a", "expect": { "value": "" } },
            { "name": "a", "expect": { "value": "x" } }
        ] }"#;
        let err = parse_case_file(Path::new("x.cmake.test.json"), text).unwrap_err();
        assert!(matches!(err, CaseFileError::DuplicateCase { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_spec_for_case() {
        let text = r#"{ "module": "Pick.cmake", "function": "ConcppGetValueForCompiler", "out_var": "return_value",
            "cases": [ { "name": "gnu", "args": ["g", "m", "d"],
                         "variables": { "CMAKE_CXX_COMPILER_ID": "MSVC", "CMAKE_CXX_COMPILER_FRONTEND_VARIANT": "GNU" },
                         "expect": { "value": "g" } } ] }"#;
        let loaded = parse_case_file(Path::new("cmake/x.cmake.test.json"), text).unwrap();
        let spec = loaded.spec_for(&loaded.contents.cases[0]);
        assert_eq!(spec.module_path(), Path::new("cmake/Pick.cmake"));
        assert_eq!(spec.output_variable(), "return_value");
        assert_eq!(spec.arguments(), ["g", "m", "d"]);
        assert_eq!(spec.variables().len(), 2);
    }

    #[test]
    fn test_variables_keep_file_order() {
        let text = r#"{ "module": "M.cmake", "function": "F", "out_var": "O",
            "cases": [ { "name": "chained", "variables": { "ZED": "1", "ALPHA": "${ZED}", "MID": "2" },
                         "expect": { "value": "1" } } ] }"#;
        let loaded = parse_case_file(Path::new("x.cmake.test.json"), text).unwrap();
        let spec = loaded.spec_for(&loaded.contents.cases[0]);
        let names: Vec<&str> = spec.variables().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["ZED", "ALPHA", "MID"]);

        let script = cmakefn_core::render_invocation_script(&spec, Path::new("/w/result.txt"));
        let zed = script.find("set(ZED \"1\")").unwrap();
        let alpha = script.find("set(ALPHA \"${ZED}\")").unwrap();
        assert!(zed < alpha);
    }

    #[test]
    fn test_duplicate_variable_is_rejected() {
        let text = r#"{ "module": "M.cmake", "function": "F", "out_var": "O",
            "cases": [ { "name": "dup", "variables": { "A": "1", "A": "2" }, "expect": { "value": "" } } ] }"#;
        let err = parse_case_file(Path::new("x.cmake.test.json"), text).unwrap_err();
        assert!(matches!(err, CaseFileError::Parse { .. }));
        assert!(err.to_string().contains("duplicate variable 'A'"));
    }

    #[test]
    fn test_non_string_variable_is_rejected() {
        let text = r#"{ "module": "M.cmake", "function": "F", "out_var": "O",
            "cases": [ { "name": "bad", "variables": { "A": 1 }, "expect": { "value": "" } } ] }"#;
        assert!(parse_case_file(Path::new("x.cmake.test.json"), text).is_err());
    }

    #[test]
    fn test_environment_override_for_case() {
        let loaded = parse_case_file(Path::new("t/h.cmake.test.json"), HOME_CASES).unwrap();
        let ov = loaded.contents.cases[0].environment_override();
        assert!(ov.removals().contains("HOME"));
        assert!(ov.removals().contains("USERPROFILE"));
        assert!(ov.overlays().is_empty());

        let ov = loaded.contents.cases[1].environment_override();
        assert_eq!(ov.overlays().get("HOME").map(String::as_str), Some("abcdef"));
    }

    #[test]
    fn test_skip_reason() {
        let loaded = parse_case_file(Path::new("t/h.cmake.test.json"), HOME_CASES).unwrap();
        let unix_only = &loaded.contents.cases[1];
        assert_eq!(unix_only.skip_reason(Platform::Unix), None);
        assert_eq!(unix_only.skip_reason(Platform::Windows).as_deref(), Some("only runs on unix"));
        assert_eq!(loaded.contents.cases[0].skip_reason(Platform::Windows), None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_case_file(Path::new("definitely/missing.cmake.test.json")).unwrap_err();
        assert!(matches!(err, CaseFileError::Read { .. }));
    }
}
