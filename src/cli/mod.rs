//! CLI module for cmakefn
//!
//! ## Commands
//!
//! - `call <module> <function>` - Invoke one function and print its result
//! - `test [path]` - Run declarative case files (pytest-style)
//!
//! ## Modules
//!
//! - `case_file` - The `*.cmake.test.json` format
//! - `commands` - Command implementations
//! - `test_runner` - Case discovery and execution
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod case_file;
pub mod commands;
pub mod test_runner;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::harness::{Harness, HarnessConfig};
use crate::version::CMAKEFN_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Call CMake functions in isolation and check what they return
#[derive(Parser, Debug)]
#[command(name = "cmakefn")]
#[command(version = CMAKEFN_VERSION)]
#[command(about = "Call CMake functions in isolation and check what they return", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Script engine to run (default: $CMAKEFN_ENGINE, then `cmake`)
    #[arg(long, global = true, value_name = "PATH")]
    pub engine: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Invoke one function and print the value it assigns
    Call {
        /// CMake module defining the function
        #[arg(value_name = "MODULE")]
        module: PathBuf,
        /// Function to call
        #[arg(value_name = "FUNCTION")]
        function: String,
        /// Variable the function assigns its result to
        #[arg(long = "out-var", value_name = "NAME")]
        out_var: String,
        /// Arguments passed after the output variable
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
        /// Set a CMake variable before the call
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        variables: Vec<(String, String)>,
        /// Set an environment variable for the engine
        #[arg(long = "env", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        env: Vec<(String, String)>,
        /// Remove an environment variable for the engine
        #[arg(long = "unset", value_name = "NAME")]
        unset: Vec<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Print the generated script to stderr before running it
        #[arg(long = "show-script")]
        show_script: bool,
    },

    /// Run case files (pytest-style)
    Test {
        /// Case file or directory to search
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Stop on first failure
        #[arg(short = 'x', long = "exitfirst")]
        stop_on_fail: bool,
        /// Only run cases whose name contains this keyword
        #[arg(short = 'k', value_name = "EXPR")]
        filter: Option<String>,
    },
}

/// Parse `NAME=VALUE`. The value may be empty or contain further `=`.
fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        Some(_) => Err(format!("missing name in '{}'", raw)),
        None => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = match cli.engine {
        Some(engine) => HarnessConfig::from_env().with_engine(engine),
        None => HarnessConfig::from_env(),
    };
    tracing::debug!(engine = %config.engine.display(), "resolved script engine");
    let harness = Harness::new(&config);

    match cli.command {
        Command::Call {
            module,
            function,
            out_var,
            args,
            variables,
            env,
            unset,
            json,
            show_script,
        } => commands::call_function(
            &harness,
            &commands::CallRequest {
                module,
                function,
                out_var,
                args,
                variables,
                env,
                unset,
            },
            &commands::CallOutput { json, show_script },
        ),
        Command::Test {
            path,
            verbose,
            stop_on_fail,
            filter,
        } => {
            let options = test_runner::TestRunOptions { stop_on_fail, filter };
            let mut reporter = test_runner::ConsoleReporter::new(verbose);
            test_runner::run_tests(&harness, &path, &options, &mut reporter)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_call() {
        let cli = Cli::try_parse_from([
            "cmakefn",
            "call",
            "cmake/ConcppGetValueForCompiler.cmake",
            "ConcppGetValueForCompiler",
            "--out-var",
            "return_value",
            "g",
            "m",
            "d",
            "--set",
            "CMAKE_CXX_COMPILER_ID=GNU",
            "--unset",
            "HOME",
            "--json",
        ])
        .unwrap();

        if let Command::Call {
            function,
            out_var,
            args,
            variables,
            unset,
            json,
            show_script,
            ..
        } = cli.command
        {
            assert_eq!(function, "ConcppGetValueForCompiler");
            assert_eq!(out_var, "return_value");
            assert_eq!(args, ["g", "m", "d"]);
            assert_eq!(variables, [("CMAKE_CXX_COMPILER_ID".to_string(), "GNU".to_string())]);
            assert_eq!(unset, ["HOME"]);
            assert!(json);
            assert!(!show_script);
        } else {
            panic!("Expected Call command");
        }
    }

    #[test]
    fn test_cli_call_requires_out_var() {
        assert!(Cli::try_parse_from(["cmakefn", "call", "m.cmake", "F"]).is_err());
    }

    #[test]
    fn test_cli_malformed_assignment_is_usage_error() {
        let err = Cli::try_parse_from(["cmakefn", "call", "m.cmake", "F", "--out-var", "O", "--env", "HOME"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_cli_parse_test() {
        let cli = Cli::try_parse_from(["cmakefn", "test", "-v", "-x", "-k", "home"]).unwrap();
        if let Command::Test {
            path,
            verbose,
            stop_on_fail,
            filter,
        } = cli.command
        {
            assert_eq!(path, PathBuf::from("."));
            assert!(verbose);
            assert!(stop_on_fail);
            assert_eq!(filter.as_deref(), Some("home"));
        } else {
            panic!("Expected Test command");
        }
    }

    #[test]
    fn test_cli_engine_is_global() {
        let cli = Cli::try_parse_from(["cmakefn", "test", "cmake/test", "--engine", "/opt/cmake/bin/cmake"]).unwrap();
        assert_eq!(cli.engine, Some(PathBuf::from("/opt/cmake/bin/cmake")));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("A=b").unwrap(), ("A".to_string(), "b".to_string()));
        assert_eq!(parse_assignment("A=").unwrap(), ("A".to_string(), String::new()));
        assert_eq!(parse_assignment("A=b=c").unwrap(), ("A".to_string(), "b=c".to_string()));
        assert!(parse_assignment("=b").is_err());
        assert!(parse_assignment("A").is_err());
    }
}
