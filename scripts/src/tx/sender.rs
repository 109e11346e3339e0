//! Transactions sent to a deployed Lock

use alloy::primitives::{Address, TxHash};
use tracing::info;

use crate::{
    errors::ScriptError,
    tx::{abi::ILock, client::RpcProvider},
};

/// Withdraw the funds of an unlocked lock
pub async fn send_withdraw(contract: Address, client: RpcProvider) -> Result<TxHash, ScriptError> {
    let lock = ILock::new(contract, client);

    // Send it
    let pending_tx = lock
        .withdraw()
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    info!("Pending withdraw transaction... {}", pending_tx.tx_hash());

    // Wait for the transaction to be included.
    let receipt = pending_tx
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "withdraw transaction {} reverted",
            receipt.transaction_hash
        )));
    }
    info!("Withdraw tx done on block: {:?}", receipt.block_number);

    Ok(receipt.transaction_hash)
}
