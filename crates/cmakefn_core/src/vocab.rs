//! CMake vocabulary used by the harness (command names and engine flags).

/// Command that loads the module under test.
pub const INCLUDE_COMMAND: &str = "include";

/// Command that injects a pre-set variable.
pub const SET_COMMAND: &str = "set";

/// Command used for the value exchange.
pub const FILE_COMMAND: &str = "file";

/// `file()` sub-command that writes (and truncates) the exchange file.
pub const FILE_WRITE_MODE: &str = "WRITE";

/// Default script engine executable, resolved from the search path.
pub const DEFAULT_ENGINE: &str = "cmake";

/// Engine flag that runs a script file in one-shot mode instead of configuring a build.
pub const SCRIPT_MODE_FLAG: &str = "-P";

/// Fixed verbosity flags appended after the script path.
///
/// They only make the engine's own diagnostics more detailed; they never change script semantics.
pub const DEFAULT_VERBOSITY_FLAGS: &[&str] = &["--log-level=VERBOSE", "--log-context"];

/// Environment variable that overrides the engine executable.
pub const ENGINE_ENV_VAR: &str = "CMAKEFN_ENGINE";

/// File name of the generated host script inside an invocation workspace.
pub const SCRIPT_FILE_NAME: &str = "invoke.cmake";

/// File name of the exchange file inside an invocation workspace.
pub const EXCHANGE_FILE_NAME: &str = "result.txt";

/// File name of the merged stdout/stderr capture inside an invocation workspace.
pub const OUTPUT_FILE_NAME: &str = "output.log";
