//! Invocation harness for CMake functions under test
//!
//! One call to [`Harness::invoke`] runs a fixed, linear pipeline:
//!
//! 1. render the host script ([`cmakefn_core::render_invocation_script`])
//! 2. compute the subprocess environment ([`cmakefn_core::effective_environment`])
//! 3. run the engine ([`ProcessRunner`])
//! 4. read the exchange file if and only if the engine exited with code zero ([`extract_value`])
//! 5. derive the whitespace-normalized output ([`InvocationResult::new`])
//!
//! ## Isolation
//!
//! Every invocation gets its own temporary directory holding the script, the exchange file and the
//! captured output. The directory is removed before `invoke` returns. The current process environment is
//! only ever read, so invocations can run concurrently from parallel test threads.
//!
//! ## Known gaps
//!
//! - There is no timeout: an engine that never exits blocks the caller indefinitely.
//! - Argument tokens are not escaped; whitespace or quotes inside an argument corrupt the call.
//! - A missing or unstartable engine is returned as [`HarnessError::EngineLaunch`], not as a failed result.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod assertions;
pub mod config;
pub mod error;
pub mod extract;
pub mod result;
pub mod runner;

use std::fs;

use cmakefn_core::vocab::{EXCHANGE_FILE_NAME, SCRIPT_FILE_NAME};
use cmakefn_core::{EnvironmentOverride, FunctionInvocationSpec, effective_environment, render_invocation_script};

pub use config::{AmbientEnvironment, HarnessConfig};
pub use error::HarnessError;
pub use extract::extract_value;
pub use result::InvocationResult;
pub use runner::{EngineRunner, ProcessRunner, RunOutcome, RunRequest};

const WORKSPACE_PREFIX: &str = "cmakefn-";

/// Calls CMake functions in isolation and reports structured results.
#[derive(Debug, Clone)]
pub struct Harness<R = EngineRunner> {
    runner: R,
    ambient: AmbientEnvironment,
}

impl Harness<EngineRunner> {
    /// A harness running the engine described by `config`.
    pub fn new(config: &HarnessConfig) -> Self {
        Self::with_runner(EngineRunner::new(config))
    }

    /// A harness configured from the process environment (see [`HarnessConfig::from_env`]).
    pub fn from_env() -> Self {
        Self::new(&HarnessConfig::from_env())
    }
}

impl Default for Harness<EngineRunner> {
    fn default() -> Self {
        Self::new(&HarnessConfig::default())
    }
}

impl<R: ProcessRunner> Harness<R> {
    /// A harness using a custom runner, starting from the process environment.
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            ambient: AmbientEnvironment::Process,
        }
    }

    /// Replace the base environment overrides are applied to.
    pub fn with_ambient(mut self, ambient: AmbientEnvironment) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Call the function described by `spec` with the ambient environment unchanged.
    pub fn invoke_spec(&self, spec: &FunctionInvocationSpec) -> Result<InvocationResult, HarnessError> {
        self.invoke(spec, &EnvironmentOverride::new())
    }

    /// Call the function described by `spec` with `overrides` applied to the subprocess environment.
    ///
    /// ## Errors
    /// - [`HarnessError::Workspace`] if the temporary files cannot be created.
    /// - [`HarnessError::EngineLaunch`] if the engine cannot be started.
    /// - [`HarnessError::ExchangeRead`] if the exchange file exists but cannot be read.
    ///
    /// A function that fails (nonzero exit) is `Ok` with no value.
    #[tracing::instrument(skip_all, fields(function = spec.function_name()))]
    pub fn invoke(
        &self,
        spec: &FunctionInvocationSpec,
        overrides: &EnvironmentOverride,
    ) -> Result<InvocationResult, HarnessError> {
        let workspace = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .map_err(|e| HarnessError::workspace("create invocation workspace", std::env::temp_dir(), e))?;

        let script_path = workspace.path().join(SCRIPT_FILE_NAME);
        let exchange_path = workspace.path().join(EXCHANGE_FILE_NAME);

        let script_text = render_invocation_script(spec, &exchange_path);
        fs::write(&script_path, &script_text)
            .map_err(|e| HarnessError::workspace("write host script", &script_path, e))?;

        let env = effective_environment(&self.ambient.snapshot(), overrides);

        let outcome = self.runner.run(&RunRequest {
            script_path: &script_path,
            workspace_dir: workspace.path(),
            env: &env,
        })?;

        let value = extract_value(&outcome, &exchange_path)?;
        tracing::debug!(success = value.is_some(), exit_code = ?outcome.exit_code, "invocation finished");

        let workspace_path = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            tracing::warn!(path = %workspace_path.display(), error = %e, "failed to remove invocation workspace");
        }

        Ok(InvocationResult::new(value, outcome.output, script_text))
    }
}
