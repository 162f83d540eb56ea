//! Reading the function's value back from the exchange file.

use std::fs;
use std::io;
use std::path::Path;

use super::error::HarnessError;
use super::runner::RunOutcome;

/// Obtain the returned value for a finished run.
///
/// ## Returns
/// - `Ok(None)` when the engine did not exit with code zero. The exchange file is not looked at, so a file
///   left behind by anything else can never be mistaken for a result.
/// - `Ok(Some(""))` when the engine succeeded but the exchange file does not exist.
/// - `Ok(Some(value))` with the file contents otherwise, undecodable bytes replaced.
///
/// ## Errors
/// - [`HarnessError::ExchangeRead`] when the file exists but cannot be read.
pub fn extract_value(outcome: &RunOutcome, exchange_path: &Path) -> Result<Option<String>, HarnessError> {
    if !outcome.succeeded() {
        return Ok(None);
    }

    match fs::read(exchange_path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Some(String::new())),
        Err(source) => Err(HarnessError::ExchangeRead {
            path: exchange_path.to_path_buf(),
            source,
        }),
    }
}
