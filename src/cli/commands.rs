//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::{self, Write};
use std::path::{self, PathBuf};

use serde::Serialize;

use cmakefn_core::{EnvironmentOverride, FunctionInvocationSpec};

use crate::harness::{Harness, InvocationResult, ProcessRunner};

use super::{CliError, CliResult, ExitCode};

/// What `cmakefn call` invokes.
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    pub module: PathBuf,
    pub function: String,
    pub out_var: String,
    pub args: Vec<String>,
    pub variables: Vec<(String, String)>,
    pub env: Vec<(String, String)>,
    pub unset: Vec<String>,
}

impl CallRequest {
    fn spec(&self, module_path: PathBuf) -> FunctionInvocationSpec {
        self.variables.iter().fold(
            FunctionInvocationSpec::new(module_path, &self.function, &self.out_var)
                .with_arguments(self.args.iter().cloned()),
            |spec, (name, value)| spec.with_variable(name, value),
        )
    }

    fn environment_override(&self) -> EnvironmentOverride {
        EnvironmentOverride::new()
            .with_removals(self.unset.iter().cloned())
            .with_overlays(self.env.iter().cloned())
    }
}

/// How `cmakefn call` reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOutput {
    pub json: bool,
    pub show_script: bool,
}

#[derive(Serialize)]
struct CallReport<'a> {
    success: bool,
    #[serde(flatten)]
    result: &'a InvocationResult,
}

/// Invoke one function and print its value (or the engine output on failure).
pub fn call_function<R: ProcessRunner>(
    harness: &Harness<R>,
    request: &CallRequest,
    output: &CallOutput,
) -> CliResult<ExitCode> {
    if !request.module.is_file() {
        return Err(CliError::failure(format!(
            "Error: module '{}' not found",
            request.module.display()
        )));
    }
    // include() resolves relative paths against the engine's working directory; pin the module instead.
    let module_path = path::absolute(&request.module).map_err(|e| {
        CliError::failure(format!("Error resolving '{}': {}", request.module.display(), e))
    })?;

    let result = harness
        .invoke(&request.spec(module_path), &request.environment_override())
        .map_err(|e| CliError::failure(format!("Error: {}", e)))?;

    report_call(&result, output, &mut io::stdout().lock(), &mut io::stderr().lock())
}

/// Write the result of a call to the given streams and pick the exit code.
pub fn report_call(
    result: &InvocationResult,
    output: &CallOutput,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> CliResult<ExitCode> {
    let io_err = |e: io::Error| CliError::failure(format!("Error writing output: {}", e));

    if output.show_script {
        write!(stderr, "{}", result.script_text()).map_err(io_err)?;
    }

    if output.json {
        let report = CallReport {
            success: result.is_success(),
            result,
        };
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::failure(format!("Error serializing result: {}", e)))?;
        writeln!(stdout, "{}", text).map_err(io_err)?;
    } else {
        match result.value() {
            Some(value) => writeln!(stdout, "{}", value).map_err(io_err)?,
            None => write!(stderr, "{}", result.raw_output()).map_err(io_err)?,
        }
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
