//! Compiled contract artifacts, in the Hardhat artifact format

use std::{fs, path::Path};

use alloy::{hex, primitives::Bytes};
use json::JsonValue;

use crate::errors::ScriptError;

/// A compiled contract, ready to be deployed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    /// Name of the contract
    pub contract_name: String,
    /// Path of the source the contract was compiled from
    pub source_name: String,
    /// Serialized JSON ABI
    pub abi: String,
    /// Creation bytecode
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Read an artifact file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ScriptError::Artifact(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse the content of an artifact file
    pub fn parse(content: &str) -> Result<Self, ScriptError> {
        let parsed = json::parse(content).map_err(|e| ScriptError::Artifact(e.to_string()))?;

        let contract_name = parsed["contractName"]
            .as_str()
            .ok_or_else(|| ScriptError::Artifact("missing contractName".to_string()))?
            .to_string();
        let source_name = parsed["sourceName"].as_str().unwrap_or_default().to_string();

        let bytecode = parsed["bytecode"]
            .as_str()
            .ok_or_else(|| ScriptError::Artifact("missing bytecode".to_string()))?;
        let bytecode = hex::decode(bytecode)
            .map_err(|e| ScriptError::Artifact(format!("invalid bytecode: {e}")))?;
        // Abstract contracts and interfaces compile to nothing
        if bytecode.is_empty() {
            return Err(ScriptError::Artifact(format!(
                "{contract_name} has no bytecode, is it abstract?"
            )));
        }

        Ok(ContractArtifact {
            contract_name,
            source_name,
            abi: parsed["abi"].dump(),
            bytecode: bytecode.into(),
        })
    }

    /// Serialize the artifact back to the Hardhat format
    pub fn to_json(&self) -> Result<JsonValue, ScriptError> {
        let mut artifact = JsonValue::new_object();
        artifact["_format"] = "hh-sol-artifact-1".into();
        artifact["contractName"] = self.contract_name.as_str().into();
        artifact["sourceName"] = self.source_name.as_str().into();
        artifact["abi"] = json::parse(&self.abi).map_err(|e| ScriptError::Artifact(e.to_string()))?;
        artifact["bytecode"] = hex::encode_prefixed(&self.bytecode).into();
        Ok(artifact)
    }

    /// Write the artifact file, creating its directory if needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScriptError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ScriptError::Artifact(e.to_string()))?;
        }
        fs::write(path, json::stringify_pretty(self.to_json()?, 2))
            .map_err(|e| ScriptError::Artifact(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK_ARTIFACT: &str = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "Lock",
        "sourceName": "contracts/Lock.sol",
        "abi": [{"inputs": [{"internalType": "uint256", "name": "_unlockTime", "type": "uint256"}], "stateMutability": "payable", "type": "constructor"}],
        "bytecode": "0x6080604052"
    }"#;

    #[test]
    fn parse_hardhat_artifact() {
        let artifact = ContractArtifact::parse(LOCK_ARTIFACT).unwrap();

        assert_eq!(artifact.contract_name, "Lock");
        assert_eq!(artifact.source_name, "contracts/Lock.sol");
        assert_eq!(artifact.bytecode, Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]));
        assert!(artifact.abi.contains("_unlockTime"));
    }

    #[test]
    fn empty_bytecode_is_rejected() {
        let content = r#"{"contractName": "ILock", "abi": [], "bytecode": "0x"}"#;
        assert!(matches!(
            ContractArtifact::parse(content),
            Err(ScriptError::Artifact(msg)) if msg.contains("ILock")
        ));
    }

    #[test]
    fn malformed_bytecode_is_rejected() {
        let content = r#"{"contractName": "Lock", "abi": [], "bytecode": "0xzz"}"#;
        assert!(ContractArtifact::parse(content).is_err());

        let content = r#"{"contractName": "Lock", "abi": []}"#;
        assert!(ContractArtifact::parse(content).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts").join("Lock.json");

        let artifact = ContractArtifact::parse(LOCK_ARTIFACT).unwrap();
        artifact.save(&path).unwrap();

        assert_eq!(ContractArtifact::load(&path).unwrap(), artifact);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ContractArtifact::load(dir.path().join("nope.json")),
            Err(ScriptError::Artifact(_))
        ));
    }
}
