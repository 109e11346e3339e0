//! Solidity compilation with `solc`

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use alloy::hex;
use tracing::info;

use crate::{artifact::ContractArtifact, errors::ScriptError, utils::command_output_or};

/// Compiles Solidity sources with the `solc` binary found in `PATH`
pub struct SolcBuilder {
    /// Compiler version the sources must be built with
    pub version: String,
}

impl SolcBuilder {
    /// Builder expecting the given compiler version
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Compile `contract_name` out of `source_path`, and write its artifact
    /// at `artifact_path`
    pub fn build(
        &self,
        source_path: &Path,
        contract_name: &str,
        artifact_path: &Path,
    ) -> Result<PathBuf, ScriptError> {
        info!("Compiling {} with solc {}...", source_path.display(), self.version);

        let mut build_cmd = Command::new("solc");
        // Abi + creation bytecode, as a single json document
        build_cmd.arg("--combined-json");
        build_cmd.arg("abi,bin");
        build_cmd.arg(source_path);

        let output = command_output_or(build_cmd, "Failed to compile contract")?;
        let output = String::from_utf8(output)
            .map_err(|e| ScriptError::ContractCompilation(e.to_string()))?;

        let source_name = source_path.to_string_lossy().replace('\\', "/");
        let artifact = self.parse_combined_json(&output, &source_name, contract_name)?;
        artifact.save(artifact_path)?;

        info!(
            "Built {} ({} bytes) into {}",
            contract_name,
            artifact.bytecode.len(),
            artifact_path.display()
        );
        Ok(artifact_path.to_path_buf())
    }

    /// Extract one contract out of a `solc --combined-json abi,bin` output
    pub fn parse_combined_json(
        &self,
        output: &str,
        source_name: &str,
        contract_name: &str,
    ) -> Result<ContractArtifact, ScriptError> {
        let parsed =
            json::parse(output).map_err(|e| ScriptError::ContractCompilation(e.to_string()))?;

        // Reported as `0.8.19+commit.7dd6d404.Linux.g++`
        let reported = parsed["version"].as_str().unwrap_or_default();
        let matches_version = reported
            .split('+')
            .next()
            .is_some_and(|version| version == self.version);
        if !matches_version {
            return Err(ScriptError::ContractCompilation(format!(
                "expected solc {}, found {}",
                self.version,
                if reported.is_empty() { "unknown" } else { reported }
            )));
        }

        let suffix = format!(":{contract_name}");
        let (_, contract) = parsed["contracts"]
            .entries()
            .find(|(key, _)| key.ends_with(&suffix))
            .ok_or_else(|| {
                ScriptError::ContractCompilation(format!(
                    "{contract_name} not found in compiler output"
                ))
            })?;

        let bytecode = hex::decode(contract["bin"].as_str().unwrap_or_default())
            .map_err(|e| ScriptError::ContractCompilation(e.to_string()))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ContractCompilation(format!(
                "{contract_name} compiled to an empty bytecode"
            )));
        }

        // Older compilers emit the abi as a json string
        let abi = match contract["abi"].as_str() {
            Some(abi) => abi.to_string(),
            None => contract["abi"].dump(),
        };

        Ok(ContractArtifact {
            contract_name: contract_name.to_string(),
            source_name: source_name.to_string(),
            abi,
            bytecode: bytecode.into(),
        })
    }
}
