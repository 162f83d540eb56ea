//! Provide the pure building blocks of the cmakefn invocation harness.
//!
//! This crate is intentionally small and dependency-light. It contains the deterministic pieces of a
//! function invocation that can be reasoned about without starting a process:
//! - the invocation inputs ([`FunctionInvocationSpec`], [`EnvironmentOverride`]),
//! - the host-script renderer ([`render_invocation_script`]),
//! - the subprocess environment computation ([`effective_environment`]),
//! - the captured-output normalizer ([`normalize_whitespace`]).
//!
//! ## Notes
//!
//! - **No IO** and no global state: the ambient environment is always passed in as a value.
//! - Process orchestration, temporary files and result extraction live in the `cmakefn` crate.

pub mod env_scope;
pub mod normalize;
pub mod script;
pub mod spec;
pub mod vocab;

pub use env_scope::{Environment, effective_environment};
pub use normalize::normalize_whitespace;
pub use script::{portable_path, render_invocation_script};
pub use spec::{EnvironmentOverride, FunctionInvocationSpec};
