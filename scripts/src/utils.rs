//! Utilities for the deploy scripts.

use std::process::Command;

use tracing::debug;

use crate::errors::ScriptError;

/// Executes a command, returning its stdout, or an error if the command fails
pub fn command_output_or(mut cmd: Command, err_msg: &str) -> Result<Vec<u8>, ScriptError> {
    debug!("Running command: {:?}", cmd);
    let output = cmd.output().map_err(|e| {
        ScriptError::ContractCompilation(format!("{err_msg}: {:?}: {e}", cmd.get_program()))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScriptError::ContractCompilation(format!(
            "{err_msg}: {}",
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}
