//! Script engine execution.
//!
//! `ProcessRunner` separates launching the engine from the rest of the pipeline so the orchestration can
//! be exercised with a scripted runner in tests. `EngineRunner` is the real implementation.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use cmakefn_core::Environment;
use cmakefn_core::vocab::{OUTPUT_FILE_NAME, SCRIPT_MODE_FLAG};

use super::config::HarnessConfig;
use super::error::HarnessError;

/// Everything a runner needs for one execution.
#[derive(Debug)]
pub struct RunRequest<'a> {
    /// The generated host script
    pub script_path: &'a Path,
    /// Per-invocation scratch directory; removed after the result is built
    pub workspace_dir: &'a Path,
    /// Complete subprocess environment (nothing is inherited beyond this)
    pub env: &'a Environment,
}

/// What came back from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Interleaved stdout and stderr, decoded lossily
    pub output: String,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run a generated script and capture its exit status and output.
pub trait ProcessRunner {
    /// Block until the script has finished.
    ///
    /// Returns `Err` only when the engine could not be run at all; a script that fails is an `Ok` outcome
    /// with a nonzero exit code.
    fn run(&self, request: &RunRequest<'_>) -> Result<RunOutcome, HarnessError>;
}

/// Runs `<engine> -P <script> <engine_args...>` as a child process.
#[derive(Debug, Clone)]
pub struct EngineRunner {
    engine: PathBuf,
    engine_args: Vec<String>,
}

impl EngineRunner {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            engine: config.engine.clone(),
            engine_args: config.engine_args.clone(),
        }
    }

    pub fn engine(&self) -> &Path {
        &self.engine
    }
}

impl Default for EngineRunner {
    fn default() -> Self {
        Self::new(&HarnessConfig::default())
    }
}

impl ProcessRunner for EngineRunner {
    #[tracing::instrument(skip_all, fields(engine = %self.engine.display()))]
    fn run(&self, request: &RunRequest<'_>) -> Result<RunOutcome, HarnessError> {
        // stdout and stderr share one file description so writes interleave in order.
        let capture_path = request.workspace_dir.join(OUTPUT_FILE_NAME);
        let stdout = File::create(&capture_path)
            .map_err(|e| HarnessError::workspace("create output capture", &capture_path, e))?;
        let stderr = stdout
            .try_clone()
            .map_err(|e| HarnessError::workspace("share output capture", &capture_path, e))?;

        let mut command = Command::new(&self.engine);
        command
            .arg(SCRIPT_MODE_FLAG)
            .arg(request.script_path)
            .args(&self.engine_args)
            .env_clear()
            .envs(request.env)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));

        tracing::debug!(script = %request.script_path.display(), args = ?self.engine_args, "launching script engine");

        let status = command.status().map_err(|source| HarnessError::EngineLaunch {
            engine: self.engine.clone(),
            source,
        })?;

        let bytes = fs::read(&capture_path)
            .map_err(|e| HarnessError::workspace("read output capture", &capture_path, e))?;
        let output = String::from_utf8_lossy(&bytes).into_owned();

        tracing::debug!(exit_code = ?status.code(), output_len = output.len(), "script engine exited");

        Ok(RunOutcome {
            exit_code: status.code(),
            output,
        })
    }
}
