//! Signing RPC provider

use std::str::FromStr;

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use reqwest::Url;
use tracing::info;

use crate::{config::NetworkConfig, errors::ScriptError};

/// An alloy provider with the recommended fillers (gas, nonce, chain id)
/// and the deployer wallet, interfacing with the RPC endpoint over HTTP
pub type RpcProvider = DynProvider;

/// The provider along with its signing account
#[derive(Clone)]
pub struct RpcClient {
    /// The signing provider
    pub provider: RpcProvider,
    /// Address of the signing account
    pub signer: Address,
}

/// Build a signing provider for the given network, checking that the RPC
/// endpoint serves the chain the network is configured for
pub async fn create_rpc_provider(network: &NetworkConfig) -> Result<RpcClient, ScriptError> {
    // Create our signer
    let signer = PrivateKeySigner::from_str(network.deployer_key()?)
        .map_err(|e| ScriptError::ClientInitialization(format!("invalid private key: {e}")))?;
    let signer_address = signer.address();

    let wallet = EthereumWallet::from(signer);

    let url = network
        .url
        .parse::<Url>()
        .map_err(|e| ScriptError::ClientInitialization(format!("invalid rpc url: {e}")))?;

    // Create our provider with the rpc client + signer
    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url).erased();

    // Fetch chain id
    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    if let Some(expected) = network.chain_id {
        if expected != chain_id {
            return Err(ScriptError::ClientInitialization(format!(
                "network {} expects chain id {expected}, but the rpc endpoint is on chain {chain_id}",
                network.name
            )));
        }
    }

    info!(network = %network.name, %signer_address, "Built client on chain ID: {}", chain_id);

    Ok(RpcClient {
        provider,
        signer: signer_address,
    })
}
