//! Etherscan compatible verification API

use std::time::Duration;

use alloy::{
    hex,
    primitives::{Address, Bytes},
};
use json::JsonValue;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{config::ExplorerConfig, errors::ScriptError};

/// A source verification request, for an Etherscan compatible API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Address of the deployed contract
    pub address: Address,
    /// Path of the source, as used by the compiler
    pub source_name: String,
    /// Solidity source
    pub source_code: String,
    /// Name of the contract inside the source
    pub contract_name: String,
    /// Full compiler version, `v0.8.19+commit.7dd6d404`
    pub compiler_version: String,
    /// ABI encoded constructor arguments
    pub constructor_args: Bytes,
}

impl VerificationRequest {
    /// `path:Name`, as expected with standard json input
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Compiler standard json input for the single source file
    pub fn standard_json_input(&self) -> String {
        let mut input = JsonValue::new_object();
        input["language"] = "Solidity".into();
        input["sources"][self.source_name.as_str()]["content"] = self.source_code.as_str().into();
        input["settings"]["optimizer"]["enabled"] = false.into();
        input["settings"]["optimizer"]["runs"] = 200.into();
        input["settings"]["outputSelection"]["*"]["*"] = json::array!["*"];
        input.dump()
    }

    /// Form fields of the `verifysourcecode` call
    fn form(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", api_key.to_string()),
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", format!("{:#x}", self.address)),
            ("sourceCode", self.standard_json_input()),
            ("codeformat", "solidity-standard-json-input".to_string()),
            ("contractname", self.fully_qualified_name()),
            ("compilerversion", self.compiler_version.clone()),
            // Misspelled on the Etherscan side
            ("constructorArguements", hex::encode(&self.constructor_args)),
        ]
    }
}

/// Outcome of a verification submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Queued, track it with this GUID
    Queued(String),
    /// The source is already public
    AlreadyVerified,
}

/// State of a queued verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Still queued
    Pending,
    /// Source is public
    Verified,
    /// Rejected, with the explorer reason
    Failed(String),
}

/// Talks to the block explorer of one network
pub struct ExplorerClient {
    /// HTTP client
    http: Client,
    /// Explorer endpoints and key
    config: ExplorerConfig,
}

impl ExplorerClient {
    /// Client for the given explorer
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Page of the contract on the explorer website
    pub fn contract_url(&self, address: Address) -> String {
        format!(
            "{}/address/{}#code",
            self.config.browser_url.trim_end_matches('/'),
            address
        )
    }

    /// Submit the sources for verification
    pub async fn submit(&self, request: &VerificationRequest) -> Result<Submission, ScriptError> {
        info!(
            "Submitting {} at {} for verification...",
            request.fully_qualified_name(),
            request.address
        );
        let body = self
            .http
            .post(&self.config.api_url)
            .form(&request.form(&self.config.api_key))
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;
        debug!(%body, "verifysourcecode response");

        parse_submission(&body)
    }

    /// Check the state of a queued verification
    pub async fn check_status(&self, guid: &str) -> Result<VerificationStatus, ScriptError> {
        let body = self
            .http
            .get(&self.config.api_url)
            .query(&[
                ("apikey", self.config.api_key.as_str()),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;
        debug!(%body, "checkverifystatus response");

        parse_status(&body)
    }

    /// Poll a queued verification until it is settled, or `max_polls` is reached
    pub async fn wait_for_verification(
        &self,
        guid: &str,
        poll_interval: Duration,
        max_polls: usize,
    ) -> Result<(), ScriptError> {
        for attempt in 1..=max_polls {
            tokio::time::sleep(poll_interval).await;

            match self.check_status(guid).await? {
                VerificationStatus::Verified => return Ok(()),
                VerificationStatus::Failed(reason) => {
                    return Err(ScriptError::Verification(reason))
                }
                VerificationStatus::Pending => {
                    info!("Verification pending ({attempt}/{max_polls})...")
                }
            }
        }

        warn!("Verification {guid} still pending");
        Err(ScriptError::Verification(format!(
            "still pending after {max_polls} checks, guid {guid}"
        )))
    }
}

/// Split an explorer response into its `status` and `result` fields
fn parse_response(body: &str) -> Result<(bool, String), ScriptError> {
    let parsed = json::parse(body)
        .map_err(|e| ScriptError::Verification(format!("unexpected explorer response: {e}")))?;
    let ok = parsed["status"].as_str() == Some("1");
    let result = parsed["result"]
        .as_str()
        .or_else(|| parsed["message"].as_str())
        .unwrap_or_default()
        .to_string();
    Ok((ok, result))
}

/// Interpret a `verifysourcecode` response
fn parse_submission(body: &str) -> Result<Submission, ScriptError> {
    match parse_response(body)? {
        (true, guid) => Ok(Submission::Queued(guid)),
        (false, result) if result.to_lowercase().contains("already verified") => {
            Ok(Submission::AlreadyVerified)
        }
        (false, result) => Err(ScriptError::Verification(result)),
    }
}

/// Interpret a `checkverifystatus` response
fn parse_status(body: &str) -> Result<VerificationStatus, ScriptError> {
    let (ok, result) = parse_response(body)?;
    let lowered = result.to_lowercase();

    if lowered.contains("pending") {
        Ok(VerificationStatus::Pending)
    } else if ok || lowered.contains("already verified") {
        Ok(VerificationStatus::Verified)
    } else {
        Ok(VerificationStatus::Failed(result))
    }
}
