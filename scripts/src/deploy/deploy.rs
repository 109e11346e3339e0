//! Contract creation through an RPC provider

use alloy::{
    dyn_abi::DynSolValue,
    network::TransactionBuilder,
    primitives::{Address, TxHash, U256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{artifact::ContractArtifact, errors::ScriptError, tx::client::RpcClient};

/// A contract creation, as handed to a [`ContractDeployer`]
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRequest {
    /// Name of the contract to deploy
    pub contract: String,
    /// Constructor arguments, in declaration order
    pub constructor_args: Vec<DynSolValue>,
    /// Wei sent along with the creation
    pub value: U256,
    /// Explicit gas limit of the creation transaction
    pub gas_limit: u64,
}

/// A confirmed contract creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    /// Address of the new contract
    pub address: Address,
    /// Hash of the creation transaction
    pub transaction_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: Option<u64>,
    /// Gas consumed by the creation
    pub gas_used: u64,
}

/// Submits contract creations and waits for them to be confirmed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Deploy a contract, resolving once the creation is confirmed
    async fn deploy(&self, request: DeploymentRequest) -> Result<DeploymentResult, ScriptError>;
}

/// Deploys compiled artifacts through an alloy provider
pub struct AlloyDeployer {
    /// Signing provider
    client: RpcClient,
    /// The compiled contract
    artifact: ContractArtifact,
}

impl AlloyDeployer {
    /// Deployer of `artifact`, signing with `client`
    pub fn new(client: RpcClient, artifact: ContractArtifact) -> Self {
        Self { client, artifact }
    }
}

#[async_trait]
impl ContractDeployer for AlloyDeployer {
    async fn deploy(&self, request: DeploymentRequest) -> Result<DeploymentResult, ScriptError> {
        if request.contract != self.artifact.contract_name {
            return Err(ScriptError::ContractDeployment(format!(
                "artifact holds {}, not {}",
                self.artifact.contract_name, request.contract
            )));
        }

        // Predict the contract address
        let expected_address = predict_contract_address(&self.client).await?;
        info!("Expected {} address: {}", request.contract, expected_address);

        // Creation code is the bytecode followed by the encoded constructor arguments
        let mut deploy_code = self.artifact.bytecode.to_vec();
        deploy_code.extend(DynSolValue::Tuple(request.constructor_args).abi_encode_params());
        debug!(bytes = deploy_code.len(), "Built creation code");

        let tx_request = TransactionRequest::default()
            .with_deploy_code(deploy_code)
            .with_value(request.value)
            .with_gas_limit(request.gas_limit);

        // Send it
        let pending_tx = self
            .client
            .provider
            .send_transaction(tx_request)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        info!("Pending deployment transaction... {}", pending_tx.tx_hash());

        // Wait for the transaction to be included.
        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "creation transaction {} reverted",
                receipt.transaction_hash
            )));
        }
        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "receipt of {} has no contract address",
                receipt.transaction_hash
            ))
        })?;
        if address != expected_address {
            warn!(%expected_address, %address, "Contract deployed at an unexpected address");
        }
        info!(
            "Deployment tx done on block: {:?}, gas used: {}",
            receipt.block_number, receipt.gas_used
        );

        Ok(DeploymentResult {
            address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}

/// Predict the address of the next contract created by the client signer
async fn predict_contract_address(client: &RpcClient) -> Result<Address, ScriptError> {
    // Get the signer nonce
    let signer_nonce = client
        .provider
        .get_transaction_count(client.signer)
        .await
        .map_err(|e| ScriptError::NonceFetching(e.to_string()))?;

    Ok(client.signer.create(signer_nonce))
}
