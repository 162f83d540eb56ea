//! Host-script rendering.
//!
//! The generated script is the whole of the harness's "program": it loads the module under test, presets
//! variables, calls the function and dumps the output variable into the exchange file.
//!
//! ```text
//! include("<module-path>")
//! set(<name> "<value>")                      # zero or more
//! <function>(<output-var> <arg1> <arg2> ...)
//! file(WRITE "<exchange-path>" "${<output-var>}")
//! ```
//!
//! ## Notes
//!
//! - Rendering is pure: the same spec and exchange path always give the same text.
//! - Arguments are joined verbatim. Tokens containing whitespace or quotes are not escaped and will change
//!   the meaning of the call; they are logged at `warn` level and passed through unchanged.

use std::path::Path;

use crate::spec::FunctionInvocationSpec;
use crate::vocab::{FILE_COMMAND, FILE_WRITE_MODE, INCLUDE_COMMAND, SET_COMMAND};

/// Render the host script for one invocation.
///
/// ## Parameters
/// - `spec`: the function to call and its inputs.
/// - `exchange_path`: where the script writes the output variable's final value.
///
/// ## Returns
/// - (`String`): one statement per line, `\n`-separated, ending with a newline.
pub fn render_invocation_script(spec: &FunctionInvocationSpec, exchange_path: &Path) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(spec.variables().len() + 3);

    lines.push(format!(
        "{INCLUDE_COMMAND}(\"{}\")",
        portable_path(spec.module_path())
    ));

    for (name, value) in spec.variables() {
        lines.push(format!("{SET_COMMAND}({name} \"{value}\")"));
    }

    lines.push(render_call(spec));

    lines.push(format!(
        "{FILE_COMMAND}({FILE_WRITE_MODE} \"{}\" \"${{{}}}\")",
        portable_path(exchange_path),
        spec.output_variable()
    ));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Render a path with `/` separators. Only Windows separators are rewritten; on other hosts a backslash
/// is an ordinary file name character.
pub fn portable_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}

fn render_call(spec: &FunctionInvocationSpec) -> String {
    let mut call_args: Vec<&str> = Vec::with_capacity(spec.arguments().len() + 1);
    call_args.push(spec.output_variable());

    for argument in spec.arguments() {
        if !is_simple_token(argument) {
            tracing::warn!(
                function = spec.function_name(),
                argument = argument.as_str(),
                "argument is not a simple token and is passed unescaped"
            );
        }
        call_args.push(argument);
    }

    format!("{}({})", spec.function_name(), call_args.join(" "))
}

fn is_simple_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'')
}
