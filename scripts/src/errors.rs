//! Definitions of errors that can occur during the execution of the contract management scripts

use thiserror::Error;

/// Errors that can occur during the execution of the contract management scripts
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A required environment variable is unset or empty
    #[error("missing environment variable {var}, required by network {network}")]
    MissingEnvVar {
        /// The variable name
        var: &'static str,
        /// The network that needs it
        network: String,
    },
    /// The requested network isn't part of the configuration
    #[error("unknown network {name}, expected one of: {known}")]
    UnknownNetwork {
        /// The requested name
        name: String,
        /// Comma separated names of the configured networks
        known: String,
    },
    /// A decimal ether amount couldn't be converted
    #[error("invalid ether amount: {0}")]
    InvalidAmount(String),
    /// A deployment parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Error writing to the console
    #[error("error writing output: {0}")]
    Output(String),
    /// Error when building output file
    #[error("error writing json output: {0}")]
    JsonOutputError(String),
    /// Error when creating the client
    #[error("error during client init: {0}")]
    ClientInitialization(String),
    /// Error when fetching the nonce to deploy a contract
    #[error("error during nonce fetching for client signing: {0}")]
    NonceFetching(String),
    /// Error compiling a contract
    #[error("error compiling contract: {0}")]
    ContractCompilation(String),
    /// Error reading a compiled contract artifact
    #[error("error reading contract artifact: {0}")]
    Artifact(String),
    /// Error deploying a contract
    #[error("error deploying contract: {0}")]
    ContractDeployment(String),
    /// Error calling a contract method
    #[error("error interacting with contract: {0}")]
    ContractInteraction(String),
    /// Error verifying a contract on the block explorer
    #[error("error verifying contract: {0}")]
    Verification(String),
}
