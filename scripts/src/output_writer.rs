//! The `deployed.json` record of deployed contracts

use std::{fmt::LowerHex, fs, fs::File, io::Read, path::Path};

use json::JsonValue;

use crate::errors::ScriptError;

/// Entries of the output file, keyed by network then contract
pub enum OutputKeys<'a> {
    /// Address of a deployed contract
    Deployment {
        /// Network name
        network: &'a str,
        /// Contract name
        contract: &'a str,
    },
    /// Hash of the deployment transaction
    DeploymentTx {
        /// Network name
        network: &'a str,
        /// Contract name
        contract: &'a str,
    },
    /// GUID of the explorer verification request
    Verification {
        /// Network name
        network: &'a str,
        /// Contract name
        contract: &'a str,
    },
}

impl OutputKeys<'_> {
    /// The entry of the output file this key points to
    fn entry<'j>(&self, parsed_json: &'j JsonValue) -> &'j JsonValue {
        match self {
            OutputKeys::Deployment { network, contract } => &parsed_json[*network][*contract]["deploy"],
            OutputKeys::DeploymentTx { network, contract } => &parsed_json[*network][*contract]["tx"],
            OutputKeys::Verification { network, contract } => {
                &parsed_json[*network][*contract]["verification"]
            }
        }
    }

    /// Mutable access to the entry, creating the parent objects if needed
    fn entry_mut<'j>(&self, parsed_json: &'j mut JsonValue) -> &'j mut JsonValue {
        match self {
            OutputKeys::Deployment { network, contract } => {
                &mut parsed_json[*network][*contract]["deploy"]
            }
            OutputKeys::DeploymentTx { network, contract } => {
                &mut parsed_json[*network][*contract]["tx"]
            }
            OutputKeys::Verification { network, contract } => {
                &mut parsed_json[*network][*contract]["verification"]
            }
        }
    }
}

/// Read a value from the output file
pub fn read_output_file(file_path: impl AsRef<Path>, key: OutputKeys) -> Result<String, ScriptError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(ScriptError::JsonOutputError(format!(
            "deployed addresses file {} not found",
            file_path.display()
        )));
    }

    // Parse it's json content into objects
    let parsed_json = get_json_from_file(file_path)?;

    key.entry(&parsed_json)
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ScriptError::JsonOutputError(String::from("key not found in output file")))
}

/// Writes the given value in the output file, as a `0x` prefixed hex string
pub fn write_output_file<T: LowerHex>(
    file_path: impl AsRef<Path>,
    key: OutputKeys,
    value: T,
) -> Result<(), ScriptError> {
    write_output_str(file_path, key, &format!("{value:#x}"))
}

/// Writes a plain string value in the output file
pub fn write_output_str(
    file_path: impl AsRef<Path>,
    key: OutputKeys,
    value: &str,
) -> Result<(), ScriptError> {
    let file_path = file_path.as_ref();
    // If the file doesn't exist, create it
    if !file_path.exists() {
        fs::write(file_path, "{}").map_err(|e| ScriptError::JsonOutputError(e.to_string()))?;
    }

    // Parse it's json content into objects
    let mut parsed_json = get_json_from_file(file_path)?;

    // Update the right key
    *key.entry_mut(&mut parsed_json) = JsonValue::String(value.to_string());

    // Write the updated json back to the file
    fs::write(file_path, json::stringify_pretty(parsed_json, 4))
        .map_err(|e| ScriptError::JsonOutputError(e.to_string()))
}

/// Parses the JSON file at the given path
fn get_json_from_file(file_path: &Path) -> Result<JsonValue, ScriptError> {
    let mut file_contents = String::new();
    File::open(file_path)
        .map_err(|e| ScriptError::JsonOutputError(e.to_string()))?
        .read_to_string(&mut file_contents)
        .map_err(|e| ScriptError::JsonOutputError(e.to_string()))?;

    json::parse(&file_contents).map_err(|e| ScriptError::JsonOutputError(e.to_string()))
}
