//! The Lock deployment procedure

use std::io::Write;

use alloy::{dyn_abi::DynSolValue, primitives::U256};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    constants::{DEFAULT_GAS_LIMIT, DEFAULT_LOCK_AMOUNT, DEFAULT_UNLOCK_DELAY, LOCK_CONTRACT_NAME},
    deploy::deploy::{ContractDeployer, DeploymentRequest, DeploymentResult},
    errors::ScriptError,
    units::{format_ether, parse_ether},
};

/// What to lock, and for how long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockParams {
    /// Decimal ether amount to lock
    pub amount: String,
    /// Seconds between the deployment and the unlock
    pub unlock_delay: u64,
    /// Gas limit of the creation transaction
    pub gas_limit: u64,
}

impl Default for LockParams {
    fn default() -> Self {
        Self {
            amount: DEFAULT_LOCK_AMOUNT.to_string(),
            unlock_delay: DEFAULT_UNLOCK_DELAY,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

/// Parameters of one deployment, resolved at a given time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentParameters {
    /// Seconds since epoch after which the lock can be withdrawn
    pub unlock_time: u64,
    /// Locked amount, in wei
    pub locked_amount: U256,
    /// Gas limit of the creation transaction
    pub gas_limit: u64,
}

impl DeploymentParameters {
    /// Resolve the parameters against the current time
    pub fn resolve(params: &LockParams, now: DateTime<Utc>) -> Result<Self, ScriptError> {
        Ok(Self {
            unlock_time: unlock_time(now, params.unlock_delay)?,
            locked_amount: parse_ether(&params.amount)?,
            gas_limit: params.gas_limit,
        })
    }

    /// The creation request for the Lock contract
    pub fn request(&self) -> DeploymentRequest {
        DeploymentRequest {
            contract: LOCK_CONTRACT_NAME.to_string(),
            constructor_args: vec![DynSolValue::Uint(U256::from(self.unlock_time), 256)],
            value: self.locked_amount,
            gas_limit: self.gas_limit,
        }
    }
}

/// Unlock timestamp: `now` rounded to the closest second, plus the delay
pub fn unlock_time(now: DateTime<Utc>, delay: u64) -> Result<u64, ScriptError> {
    let now_secs = (now.timestamp_millis() + 500).div_euclid(1000);
    u64::try_from(now_secs)
        .ok()
        .and_then(|secs| secs.checked_add(delay))
        .ok_or_else(|| {
            ScriptError::InvalidParameter(format!("unlock time out of range for {now} + {delay}s"))
        })
}

/// The line printed once the lock is deployed
pub fn deployment_summary(params: &DeploymentParameters, result: &DeploymentResult) -> String {
    format!(
        "Lock with {}ETH and unlock timestamp {} deployed to {}",
        format_ether(params.locked_amount),
        params.unlock_time,
        result.address
    )
}

/// Deploy a Lock holding `params.amount` until `params.unlock_delay` seconds
/// after `now`, then write the summary line to `out`.
///
/// Nothing is written when the deployment fails.
pub async fn deploy_lock<D, W>(
    deployer: &D,
    params: &LockParams,
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<(DeploymentParameters, DeploymentResult), ScriptError>
where
    D: ContractDeployer + ?Sized,
    W: Write,
{
    let parameters = DeploymentParameters::resolve(params, now)?;
    info!(
        unlock_time = parameters.unlock_time,
        locked_amount = %parameters.locked_amount,
        gas_limit = parameters.gas_limit,
        "Deploying {}...",
        LOCK_CONTRACT_NAME
    );

    let result = deployer.deploy(parameters.request()).await?;

    writeln!(out, "{}", deployment_summary(&parameters, &result))
        .map_err(|e| ScriptError::Output(e.to_string()))?;

    Ok((parameters, result))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256, Address};
    use chrono::TimeZone;

    use super::*;
    use crate::deploy::deploy::MockContractDeployer;

    const LOCK_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_400).unwrap()
    }

    fn deployed() -> DeploymentResult {
        DeploymentResult {
            address: LOCK_ADDRESS,
            transaction_hash: b256!(
                "1111111111111111111111111111111111111111111111111111111111111111"
            ),
            block_number: Some(42),
            gas_used: 326_000,
        }
    }

    #[test]
    fn unlock_time_rounds_to_closest_second() {
        let down = Utc.timestamp_millis_opt(1_700_000_000_499).unwrap();
        let up = Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();

        assert_eq!(unlock_time(down, 60).unwrap(), 1_700_000_060);
        assert_eq!(unlock_time(up, 60).unwrap(), 1_700_000_061);
    }

    #[test]
    fn unlock_time_is_in_the_future() {
        let now = Utc::now();
        let unlock = unlock_time(now, DEFAULT_UNLOCK_DELAY).unwrap();
        assert!(unlock > now.timestamp() as u64);
    }

    #[test]
    fn default_request() {
        let parameters = DeploymentParameters::resolve(&LockParams::default(), now()).unwrap();
        let request = parameters.request();

        assert_eq!(request.contract, "Lock");
        assert_eq!(
            request.constructor_args,
            vec![DynSolValue::Uint(U256::from(1_700_000_060u64), 256)]
        );
        assert_eq!(request.value, U256::from(1_000_000_000_000_000u64));
        assert_eq!(request.gas_limit, 16_777_216);
    }

    #[tokio::test]
    async fn deploys_with_unlock_time_value_and_gas_limit() {
        let mut deployer = MockContractDeployer::new();
        deployer
            .expect_deploy()
            .withf(|request| {
                request.contract == "Lock"
                    && request.constructor_args
                        == vec![DynSolValue::Uint(U256::from(1_700_000_060u64), 256)]
                    && request.value == U256::from(1_000_000_000_000_000u64)
                    && request.gas_limit == 0x1000000
            })
            .times(1)
            .returning(|_| Ok(deployed()));

        let mut out = Vec::new();
        let (parameters, result) = deploy_lock(&deployer, &LockParams::default(), now(), &mut out)
            .await
            .unwrap();

        assert_eq!(parameters.unlock_time, 1_700_000_060);
        assert_eq!(result.address, LOCK_ADDRESS);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Lock with 0.001ETH and unlock timestamp 1700000060 deployed to \
             0x5FbDB2315678afecb367f032d93F642f64180aa3\n"
        );
    }

    #[tokio::test]
    async fn custom_params_flow_into_the_request() {
        let params = LockParams {
            amount: "1.5".to_string(),
            unlock_delay: 3600,
            gas_limit: 3_000_000,
        };

        let mut deployer = MockContractDeployer::new();
        deployer
            .expect_deploy()
            .withf(|request| {
                request.constructor_args
                    == vec![DynSolValue::Uint(U256::from(1_700_003_600u64), 256)]
                    && request.value == U256::from(1_500_000_000_000_000_000u128)
                    && request.gas_limit == 3_000_000
            })
            .times(1)
            .returning(|_| Ok(deployed()));

        let mut out = Vec::new();
        deploy_lock(&deployer, &params, now(), &mut out).await.unwrap();

        let line = String::from_utf8(out).unwrap();
        assert!(line.starts_with("Lock with 1.5ETH and unlock timestamp 1700003600"));
    }

    #[tokio::test]
    async fn failed_deployment_prints_nothing() {
        let mut deployer = MockContractDeployer::new();
        deployer
            .expect_deploy()
            .times(1)
            .returning(|_| Err(ScriptError::ContractDeployment("insufficient funds".to_string())));

        let mut out = Vec::new();
        let err = deploy_lock(&deployer, &LockParams::default(), now(), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::ContractDeployment(msg) if msg == "insufficient funds"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_the_deployer() {
        let mut deployer = MockContractDeployer::new();
        deployer.expect_deploy().never();

        let params = LockParams {
            amount: "a lot".to_string(),
            ..LockParams::default()
        };
        let mut out = Vec::new();
        let err = deploy_lock(&deployer, &params, now(), &mut out).await.unwrap_err();

        assert!(matches!(err, ScriptError::InvalidAmount(_)));
        assert!(out.is_empty());
    }
}
