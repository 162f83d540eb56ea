#![forbid(unsafe_code)]
//! Call CMake functions in isolation and inspect what they return.
//!
//! Each invocation generates a throwaway host script that includes the module defining the function,
//! calls it, and writes the output variable to a private exchange file. The script runs under
//! `cmake -P` with a per-call environment, and the result comes back as an [`InvocationResult`].
//!
//! ```no_run
//! use cmakefn::{EnvironmentOverride, FunctionInvocationSpec, Harness};
//!
//! let harness = Harness::from_env();
//! let spec = FunctionInvocationSpec::new("cmake/ConcppGetUserHomeDir.cmake", "ConcppGetUserHomeDir", "OUT");
//! let overrides = EnvironmentOverride::new().with_removed("USERPROFILE").with_set("HOME", "/home/me");
//! let result = harness.invoke(&spec, &overrides)?;
//! assert_eq!(result.value(), Some("/home/me"));
//! # Ok::<(), cmakefn::HarnessError>(())
//! ```
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `harness`
//!   modules enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests. The assertion helpers in
//!   [`harness::assertions`] panic on purpose.

pub mod cli;
pub mod harness;
pub mod version;

pub use cmakefn_core::{EnvironmentOverride, FunctionInvocationSpec, normalize_whitespace};

pub use harness::assertions::{assert_fails_with, assert_returns};
pub use harness::{AmbientEnvironment, EngineRunner, Harness, HarnessConfig, HarnessError, InvocationResult, ProcessRunner};
