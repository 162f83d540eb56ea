//! Test runner for case files (pytest-style output)
//!
//! ## TestReporter Trait
//!
//! The runner uses a `TestReporter` trait to separate reporting from execution. `ConsoleReporter` prints
//! one line per case and a summary; other formats can be added by implementing the trait.
//!
//! ## Outcomes
//!
//! - A case whose expectation holds is passed; otherwise it failed.
//! - A case restricted to another platform is skipped.
//! - A case file that cannot be loaded is an error; the remaining files still run.
//! - An engine that cannot be launched aborts the whole run: nothing else can pass either.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::harness::{Harness, InvocationResult, ProcessRunner};

use super::case_file::{CASE_FILE_SUFFIX, CaseFileError, Expectation, Platform, TestCase, load_case_file};
use super::{CliError, CliResult, ExitCode};

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called when a case file could not be loaded
    fn on_file_error(&mut self, error: &CaseFileError);

    /// Called when test collection is complete
    fn on_collection_complete(&mut self, test_count: usize);

    /// Called when a case completes (or is skipped)
    fn on_test_complete(&mut self, test: &TestInfo, result: &TestResult);

    /// Called when all cases have completed
    fn on_run_complete(&mut self, summary: &TestSummary);
}

/// Summary of a test run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    fn record(&mut self, result: &TestResult) {
        match result {
            TestResult::Passed(_) => self.passed += 1,
            TestResult::Failed(_, _) => self.failed += 1,
            TestResult::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Default console reporter (pytest-style)
#[derive(Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_file_error(&mut self, error: &CaseFileError) {
        eprintln!("\x1b[31mERROR\x1b[0m {}", error);
    }

    fn on_collection_complete(&mut self, test_count: usize) {
        println!("\x1b[1m=================== test session starts ===================\x1b[0m");
        println!("collected {} item(s)", test_count);
        println!();
    }

    fn on_test_complete(&mut self, test: &TestInfo, result: &TestResult) {
        let status = match result {
            TestResult::Passed(d) => {
                if self.verbose {
                    format!("\x1b[32mPASSED\x1b[0m ({:.0}ms)", d.as_millis())
                } else {
                    "\x1b[32mPASSED\x1b[0m".to_string()
                }
            }
            TestResult::Failed(d, _) => {
                if self.verbose {
                    format!("\x1b[31mFAILED\x1b[0m ({:.0}ms)", d.as_millis())
                } else {
                    "\x1b[31mFAILED\x1b[0m".to_string()
                }
            }
            TestResult::Skipped(reason) => format!("\x1b[33mSKIPPED\x1b[0m ({})", reason),
        };

        println!("{} {}", test.id(), status);

        if let TestResult::Failed(_, message) = result {
            println!();
            for line in message.lines() {
                println!("    {}", line);
            }
            println!();
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("{} passed", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        if summary.skipped > 0 {
            parts.push(format!("{} skipped", summary.skipped));
        }
        if summary.errors > 0 {
            parts.push(format!("{} error(s)", summary.errors));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }

        let color = if summary.is_success() { "\x1b[1;32m" } else { "\x1b[1;31m" };
        println!();
        println!(
            "{}=================== {} in {:.2}s ===================\x1b[0m",
            color,
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
    }
}

/// Identifies one case within a case file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInfo {
    pub file_path: PathBuf,
    pub case_name: String,
}

impl TestInfo {
    /// `file.cmake.test.json::case_name`
    pub fn id(&self) -> String {
        let file_name = self.file_path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");
        format!("{}::{}", file_name, self.case_name)
    }
}

/// Result of running a single case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed(Duration),
    Failed(Duration, String),
    Skipped(String),
}

/// Options for a test run
#[derive(Debug, Clone, Default)]
pub struct TestRunOptions {
    /// Stop after the first failed case
    pub stop_on_fail: bool,
    /// Only run cases whose name contains this keyword
    pub filter: Option<String>,
}

/// Run every case file under `path` and return the exit code.
pub fn run_tests<R: ProcessRunner>(
    harness: &Harness<R>,
    path: &Path,
    options: &TestRunOptions,
    reporter: &mut dyn TestReporter,
) -> CliResult<ExitCode> {
    let files = discover_case_files(path);
    if files.is_empty() {
        return Err(CliError::failure(format!(
            "No case files found in '{}'\nCase files should be named *{}",
            path.display(),
            CASE_FILE_SUFFIX
        )));
    }

    let summary = run_case_files(harness, &files, options, reporter)?;
    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Summary already printed
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

/// Run the given case files, reporting as it goes.
///
/// ## Errors
/// Only an engine launch failure (or other harness fault) is an `Err`; failing cases are counted in the
/// returned summary.
pub fn run_case_files<R: ProcessRunner>(
    harness: &Harness<R>,
    files: &[PathBuf],
    options: &TestRunOptions,
    reporter: &mut dyn TestReporter,
) -> CliResult<TestSummary> {
    let start_time = Instant::now();
    let mut summary = TestSummary::default();

    let mut loaded = Vec::new();
    for file in files {
        match load_case_file(file) {
            Ok(case_file) => loaded.push(case_file),
            Err(e) => {
                reporter.on_file_error(&e);
                summary.errors += 1;
            }
        }
    }

    let selected: Vec<_> = loaded
        .iter()
        .flat_map(|file| file.contents.cases.iter().map(move |case| (file, case)))
        .filter(|(_, case)| {
            options
                .filter
                .as_deref()
                .is_none_or(|keyword| case.name.contains(keyword))
        })
        .collect();

    reporter.on_collection_complete(selected.len());

    let platform = Platform::current();
    for (file, case) in selected {
        let info = TestInfo {
            file_path: file.path.clone(),
            case_name: case.name.clone(),
        };

        let result = match case.skip_reason(platform) {
            Some(reason) => TestResult::Skipped(reason),
            None => {
                let started = Instant::now();
                let outcome = harness
                    .invoke(&file.spec_for(case), &case.environment_override())
                    .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
                judge(case, &outcome, started.elapsed())
            }
        };

        tracing::debug!(case = %info.id(), ?result, "case finished");
        summary.record(&result);
        reporter.on_test_complete(&info, &result);

        if options.stop_on_fail && matches!(result, TestResult::Failed(_, _)) {
            break;
        }
    }

    summary.duration = start_time.elapsed();
    reporter.on_run_complete(&summary);
    Ok(summary)
}

/// Compare an invocation result with the case's expectation.
pub fn judge(case: &TestCase, result: &InvocationResult, duration: Duration) -> TestResult {
    match &case.expect {
        Expectation::Value(expected) => match result.value() {
            Some(actual) if actual == expected => TestResult::Passed(duration),
            Some(actual) => TestResult::Failed(
                duration,
                format!("returned {:?}, expected {:?}\n{}", actual, expected, result.diagnostics()),
            ),
            None => TestResult::Failed(
                duration,
                format!(
                    "failed, but should have returned {:?}\n{}",
                    expected,
                    result.diagnostics()
                ),
            ),
        },
        Expectation::FailureContaining(fragment) => {
            if result.is_success() {
                TestResult::Failed(
                    duration,
                    format!("should have failed, but completed successfully\n{}", result.diagnostics()),
                )
            } else if result.normalized_output().contains(fragment.as_str()) {
                TestResult::Passed(duration)
            } else {
                TestResult::Failed(
                    duration,
                    format!("failed, but output does not contain {:?}\n{}", fragment, result.diagnostics()),
                )
            }
        }
    }
}

/// Discover case files under a path.
///
/// A file is returned as-is if it has the case file suffix; directories are walked recursively, skipping
/// hidden directories and `target`.
pub fn discover_case_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if path.is_file() {
        if is_case_file(path) {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                let entry_path = entry.path();
                if entry_path.is_dir() {
                    let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                    if !name.starts_with('.') && name != "target" {
                        files.extend(discover_case_files(&entry_path));
                    }
                } else if is_case_file(&entry_path) {
                    files.push(entry_path);
                }
            }
        }
    }

    files.sort();
    files
}

fn is_case_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.ends_with(CASE_FILE_SUFFIX))
}

// ============================================================================
// Tests
// ============================================================================
