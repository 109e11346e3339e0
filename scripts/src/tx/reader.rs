//! Read-only calls to a deployed Lock

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};

use crate::{
    errors::ScriptError,
    tx::{abi::ILock, client::RpcProvider},
    units::format_ether,
};

/// On-chain state of a deployed lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockState {
    /// Address of the lock
    pub address: Address,
    /// Timestamp after which the funds can be withdrawn
    pub unlock_time: U256,
    /// Account allowed to withdraw
    pub owner: Address,
    /// Locked funds, in wei
    pub balance: U256,
}

impl LockState {
    /// Whether the lock can be withdrawn at the given timestamp
    pub fn is_unlocked_at(&self, timestamp: u64) -> bool {
        U256::from(timestamp) >= self.unlock_time
    }

    /// One line description of the lock
    pub fn summary(&self) -> String {
        format!(
            "Lock {} holds {}ETH for {} until timestamp {}",
            self.address,
            format_ether(self.balance),
            self.owner,
            self.unlock_time
        )
    }
}

/// Get the unlock time of a deployed lock
pub async fn get_unlock_time(
    contract_address: Address,
    client: RpcProvider,
) -> Result<U256, ScriptError> {
    let contract = ILock::new(contract_address, client);

    contract
        .unlockTime()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
}

/// Read the whole state of a deployed lock
pub async fn read_lock_state(
    contract_address: Address,
    client: RpcProvider,
) -> Result<LockState, ScriptError> {
    // Make sure there is a contract there, calls to an EOA would decode garbage
    let code = client
        .get_code_at(contract_address)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if code.is_empty() {
        return Err(ScriptError::ContractInteraction(format!(
            "no contract deployed at {contract_address}"
        )));
    }

    let unlock_time = get_unlock_time(contract_address, client.clone()).await?;

    let owner = ILock::new(contract_address, client.clone())
        .owner()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let balance = client
        .get_balance(contract_address)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(LockState {
        address: contract_address,
        unlock_time,
        owner,
        balance,
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    fn lock_state() -> LockState {
        LockState {
            address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            unlock_time: U256::from(1_700_000_060u64),
            owner: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            balance: U256::from(1_000_000_000_000_000u64),
        }
    }

    #[test]
    fn unlocks_at_unlock_time() {
        let state = lock_state();
        assert!(!state.is_unlocked_at(1_700_000_059));
        assert!(state.is_unlocked_at(1_700_000_060));
        assert!(state.is_unlocked_at(1_700_000_061));
    }

    #[test]
    fn summary_shows_formatted_balance() {
        assert_eq!(
            lock_state().summary(),
            "Lock 0x5FbDB2315678afecb367f032d93F642f64180aa3 holds 0.001ETH for \
             0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 until timestamp 1700000060"
        );
    }
}
