//! Harness configuration: which engine to run, and which environment to start from.

use std::path::PathBuf;

use cmakefn_core::Environment;
use cmakefn_core::vocab::{DEFAULT_ENGINE, DEFAULT_VERBOSITY_FLAGS, ENGINE_ENV_VAR};

/// How the script engine is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Engine executable name (resolved from the search path) or path
    pub engine: PathBuf,
    /// Fixed flags appended after the script path
    pub engine_args: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            engine: PathBuf::from(DEFAULT_ENGINE),
            engine_args: DEFAULT_VERBOSITY_FLAGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HarnessConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings, with the engine taken from `CMAKEFN_ENGINE` when it is set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`HarnessConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self::default();
        match lookup(ENGINE_ENV_VAR) {
            Some(engine) if !engine.trim().is_empty() => config.with_engine(engine.trim()),
            _ => config,
        }
    }

    /// Set the engine executable
    pub fn with_engine(mut self, engine: impl Into<PathBuf>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Replace the fixed engine flags
    pub fn with_engine_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine_args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// The base environment every invocation starts from, before overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AmbientEnvironment {
    /// Snapshot the current process environment at each invocation.
    #[default]
    Process,
    /// Use a fixed table instead of the process environment.
    Fixed(Environment),
}

impl AmbientEnvironment {
    /// Take an owned copy of the base environment.
    pub fn snapshot(&self) -> Environment {
        match self {
            AmbientEnvironment::Process => std::env::vars_os().collect(),
            AmbientEnvironment::Fixed(env) => env.clone(),
        }
    }
}
