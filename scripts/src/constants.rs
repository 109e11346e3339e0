//! Constants used in the deploy scripts

/// Name of the deployed contract
pub const LOCK_CONTRACT_NAME: &str = "Lock";

/// Default amount of ether locked in the contract
pub const DEFAULT_LOCK_AMOUNT: &str = "0.001";

/// Default delay, in seconds, before the lock can be withdrawn
pub const DEFAULT_UNLOCK_DELAY: u64 = 60;

/// Default gas limit of the deployment transaction
pub const DEFAULT_GAS_LIMIT: u64 = 0x1000000;

/// Decimals of the native currency
pub const ETHER_DECIMALS: u8 = 18;

/// Solidity compiler version the contract is built with
pub const SOLC_VERSION: &str = "0.8.19";

/// Full solc build identifier, as expected by the explorers
pub const SOLC_LONG_VERSION: &str = "v0.8.19+commit.7dd6d404";

/// Path of the contract source
pub const DEFAULT_SOURCE_PATH: &str = "contracts/Lock.sol";

/// Path of the compiled artifact
pub const DEFAULT_ARTIFACT_PATH: &str = "artifacts/Lock.json";

/// File where deployed addresses are recorded
pub const DEFAULT_OUTPUT_FILE: &str = "deployed.json";

/// Network used when none is given
pub const DEFAULT_NETWORK: &str = "sepolia";

/// Delay between two verification status checks, in seconds
pub const VERIFY_POLL_INTERVAL_SECS: u64 = 5;

/// Max number of verification status checks
pub const VERIFY_MAX_POLLS: usize = 10;
