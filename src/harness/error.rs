//! Harness faults.
//!
//! These describe a broken test environment (no engine, unwritable temp directory), never a behaviour of
//! the function under test. A function that rejects its arguments is an `Ok` result without a value.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop an invocation from producing an [`InvocationResult`](super::InvocationResult).
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to {action} '{}': {source}", .path.display())]
    Workspace {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch script engine '{}': {source}", .engine.display())]
    EngineLaunch {
        engine: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read exchange file '{}': {source}", .path.display())]
    ExchangeRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    pub(crate) fn workspace(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Workspace {
            action,
            path: path.into(),
            source,
        }
    }
}
