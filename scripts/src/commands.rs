//! One function per CLI command

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes},
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    artifact::ContractArtifact,
    build::solc::SolcBuilder,
    cli::{AddressArgs, BuildArgs, DeployArgs, VerifyArgs},
    config::{NetworkConfig, ProjectConfig},
    constants::{LOCK_CONTRACT_NAME, SOLC_LONG_VERSION, VERIFY_MAX_POLLS, VERIFY_POLL_INTERVAL_SECS},
    deploy::{
        deploy::{AlloyDeployer, ContractDeployer, DeploymentResult},
        lock::{deploy_lock, LockParams},
    },
    errors::ScriptError,
    output_writer::{read_output_file, write_output_file, write_output_str, OutputKeys},
    tx::{
        client::{create_rpc_provider, RpcClient},
        reader::{get_unlock_time, read_lock_state},
        sender::send_withdraw,
    },
    units::parse_ether,
    verify::explorer::{ExplorerClient, Submission, VerificationRequest},
};

/// What every command runs against
pub struct ScriptContext {
    /// The project configuration
    pub config: ProjectConfig,
    /// Name of the selected network
    pub network: String,
    /// RPC URL replacing the configured one
    pub rpc_url: Option<String>,
    /// File where deployed addresses are recorded
    pub output: PathBuf,
}

impl ScriptContext {
    /// The selected network, with all of its credentials checked
    pub fn network(&self) -> Result<NetworkConfig, ScriptError> {
        Ok(self
            .config
            .network(&self.network)?
            .with_rpc_url(self.rpc_url.as_deref()))
    }

    /// Build a client on the selected network
    pub async fn client(&self) -> Result<RpcClient, ScriptError> {
        create_rpc_provider(&self.network()?).await
    }

    /// The given lock address, or the one recorded for the selected network
    pub fn lock_address(&self, args: &AddressArgs) -> Result<Address, ScriptError> {
        if let Some(address) = args.address {
            return Ok(address);
        }

        read_output_file(
            &self.output,
            OutputKeys::Deployment {
                network: &self.network,
                contract: LOCK_CONTRACT_NAME,
            },
        )?
        .parse::<Address>()
        .map_err(|e| ScriptError::JsonOutputError(e.to_string()))
    }
}

/// Compile the Lock contract into its artifact
pub fn build_contract(args: &BuildArgs, ctx: &ScriptContext) -> Result<PathBuf, ScriptError> {
    SolcBuilder::new(ctx.config.solidity).build(&args.source, LOCK_CONTRACT_NAME, &args.artifact)
}

/// Deploy a Lock on the selected network, and record its address
pub async fn deploy_contract(
    args: DeployArgs,
    ctx: &ScriptContext,
) -> Result<DeploymentResult, ScriptError> {
    // Check the credentials and parameters before anything else
    let network = ctx.network()?;
    let params = args.lock_params();
    parse_ether(&params.amount)?;

    if args.build || !args.build_args.artifact.exists() {
        info!("Building contracts...");
        build_contract(&args.build_args, ctx)?;
        info!("Built with success");
    }
    let artifact = ContractArtifact::load(&args.build_args.artifact)?;

    let client = create_rpc_provider(&network).await?;
    let deployer = AlloyDeployer::new(client, artifact);

    deploy_and_record(&deployer, &params, &network.name, ctx, &mut io::stdout()).await
}

/// Deploy a Lock through `deployer`, then record it in the output file.
///
/// Once the contract is deployed the run is a success: a failure to record
/// it is only logged.
pub async fn deploy_and_record<D, W>(
    deployer: &D,
    params: &LockParams,
    network: &str,
    ctx: &ScriptContext,
    out: &mut W,
) -> Result<DeploymentResult, ScriptError>
where
    D: ContractDeployer + ?Sized,
    W: Write,
{
    let (_, result) = deploy_lock(deployer, params, Utc::now(), out).await?;
    info!("Deployed with success");

    if let Err(e) = record_deployment(&ctx.output, network, &result) {
        warn!(
            output = %ctx.output.display(),
            address = %result.address,
            "Failed to record the deployment: {e}"
        );
    }

    Ok(result)
}

/// Write the address and creation tx of a deployed Lock in the output file
fn record_deployment(
    output: &Path,
    network: &str,
    result: &DeploymentResult,
) -> Result<(), ScriptError> {
    write_output_file(
        output,
        OutputKeys::Deployment {
            network,
            contract: LOCK_CONTRACT_NAME,
        },
        result.address,
    )?;
    write_output_file(
        output,
        OutputKeys::DeploymentTx {
            network,
            contract: LOCK_CONTRACT_NAME,
        },
        result.transaction_hash,
    )
}

/// Print the configured networks, one per line
pub fn list_networks(ctx: &ScriptContext) {
    for name in ctx.config.network_names() {
        println!("{name}");
    }
}

/// Print the state of a deployed Lock
pub async fn lock_status(args: AddressArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let address = ctx.lock_address(&args)?;
    let client = ctx.client().await?;

    let state = read_lock_state(address, client.provider).await?;
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    if state.is_unlocked_at(now) {
        info!("Lock {} can be withdrawn", address);
    } else {
        info!("Lock {} is still locked", address);
    }

    println!("{}", state.summary());
    Ok(())
}

/// Withdraw the funds of a deployed Lock
pub async fn withdraw(args: AddressArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let address = ctx.lock_address(&args)?;
    let client = ctx.client().await?;

    let state = read_lock_state(address, client.provider.clone()).await?;
    if state.owner != client.signer {
        warn!(owner = %state.owner, signer = %client.signer, "Signer isn't the lock owner, withdraw will revert");
    }

    let tx_hash = send_withdraw(address, client.provider).await?;
    info!("Withdrew lock {} in tx {}", address, tx_hash);
    Ok(())
}

/// Verify the sources of a deployed Lock on the network explorer
pub async fn verify_contract(args: VerifyArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    // Check the explorer key before touching the network
    let explorer = ExplorerClient::new(ctx.config.explorer(&ctx.network)?);
    let address = ctx.lock_address(&args.target)?;

    let source_code = fs::read_to_string(&args.source).map_err(|e| {
        ScriptError::Verification(format!("{}: {e}", args.source.display()))
    })?;

    // The constructor argument is read back from the deployed lock
    let client = ctx.client().await?;
    let unlock_time = get_unlock_time(address, client.provider).await?;
    let constructor_args: Bytes =
        DynSolValue::Tuple(vec![DynSolValue::Uint(unlock_time, 256)]).abi_encode_params().into();

    let request = VerificationRequest {
        address,
        source_name: args.source.to_string_lossy().replace('\\', "/"),
        source_code,
        contract_name: LOCK_CONTRACT_NAME.to_string(),
        compiler_version: SOLC_LONG_VERSION.to_string(),
        constructor_args,
    };

    match explorer.submit(&request).await? {
        Submission::AlreadyVerified => info!("{} is already verified", address),
        Submission::Queued(guid) => {
            write_output_str(
                &ctx.output,
                OutputKeys::Verification {
                    network: &ctx.network,
                    contract: LOCK_CONTRACT_NAME,
                },
                &guid,
            )?;
            explorer
                .wait_for_verification(
                    &guid,
                    Duration::from_secs(VERIFY_POLL_INTERVAL_SECS),
                    VERIFY_MAX_POLLS,
                )
                .await?;
            info!("Verified with success");
        }
    }

    println!("{}", explorer.contract_url(address));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use alloy::primitives::{address, b256};

    use super::*;
    use crate::{
        config::{MANTLE_PRIVATE_KEY, SEPOLIA_PRIVATE_KEY},
        deploy::deploy::MockContractDeployer,
    };

    fn context(vars: &[(&str, &str)], network: &str, output: PathBuf) -> ScriptContext {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScriptContext {
            config: ProjectConfig::from_lookup(move |var| vars.get(var).cloned()),
            network: network.to_string(),
            rpc_url: None,
            output,
        }
    }

    #[test]
    fn explicit_address_wins() {
        let ctx = context(&[], "sepolia", PathBuf::from("does-not-exist.json"));
        let lock = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

        assert_eq!(ctx.lock_address(&AddressArgs { address: Some(lock) }).unwrap(), lock);
    }

    #[test]
    fn recorded_address_is_used_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deployed.json");
        let lock = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");
        write_output_file(
            &output,
            OutputKeys::Deployment {
                network: "mantle-testnet",
                contract: "Lock",
            },
            lock,
        )
        .unwrap();

        let ctx = context(&[], "mantle-testnet", output.clone());
        assert_eq!(ctx.lock_address(&AddressArgs { address: None }).unwrap(), lock);

        // Nothing recorded for sepolia
        let ctx = context(&[], "sepolia", output);
        assert!(ctx.lock_address(&AddressArgs { address: None }).is_err());
    }

    #[test]
    fn rpc_url_override_applies_to_the_selected_network() {
        let mut ctx = context(&[(MANTLE_PRIVATE_KEY, "0x02")], "mantle-testnet", PathBuf::new());
        ctx.rpc_url = Some("http://localhost:8545".to_string());

        assert_eq!(ctx.network().unwrap().url, "http://localhost:8545");
    }

    #[tokio::test]
    async fn deploy_fails_fast_on_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&[("INFURA_API_KEY", "abc")], "sepolia", dir.path().join("deployed.json"));
        let err = deploy_contract(deploy_args("0.001", dir.path()), &ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ScriptError::MissingEnvVar { var: SEPOLIA_PRIVATE_KEY, .. }
        ));
        assert!(!dir.path().join("deployed.json").exists());
    }

    fn deploy_args(amount: &str, dir: &Path) -> DeployArgs {
        DeployArgs {
            amount: amount.to_string(),
            unlock_delay: 60,
            gas_limit: 0x1000000,
            build: false,
            build_args: BuildArgs {
                source: dir.join("Lock.sol"),
                artifact: dir.join("Lock.json"),
            },
        }
    }

    fn deployed_lock() -> DeploymentResult {
        DeploymentResult {
            address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            transaction_hash: b256!(
                "2222222222222222222222222222222222222222222222222222222222222222"
            ),
            block_number: Some(7),
            gas_used: 326_000,
        }
    }

    #[tokio::test]
    async fn invalid_amount_fails_before_compiling() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(
            &[(MANTLE_PRIVATE_KEY, "0x02")],
            "mantle-testnet",
            dir.path().join("deployed.json"),
        );

        let err = deploy_contract(deploy_args("abc", dir.path()), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn deployment_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deployed.json");
        let ctx = context(&[], "mantle-testnet", output.clone());

        let mut deployer = MockContractDeployer::new();
        deployer
            .expect_deploy()
            .times(1)
            .returning(|_| Ok(deployed_lock()));

        let mut out = Vec::new();
        let result = deploy_and_record(
            &deployer,
            &LockParams::default(),
            "mantle-testnet",
            &ctx,
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(ctx.lock_address(&AddressArgs { address: None }).unwrap(), result.address);
        let tx = read_output_file(
            &output,
            OutputKeys::DeploymentTx {
                network: "mantle-testnet",
                contract: "Lock",
            },
        )
        .unwrap();
        assert_eq!(tx, format!("{:#x}", result.transaction_hash));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn unwritable_record_keeps_the_deployment_successful() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deployed.json");
        fs::write(&output, "not json").unwrap();
        let ctx = context(&[], "sepolia", output.clone());

        let mut deployer = MockContractDeployer::new();
        deployer
            .expect_deploy()
            .times(1)
            .returning(|_| Ok(deployed_lock()));

        let mut out = Vec::new();
        let result = deploy_and_record(&deployer, &LockParams::default(), "sepolia", &ctx, &mut out)
            .await
            .unwrap();

        assert_eq!(result, deployed_lock());
        let line = String::from_utf8(out).unwrap();
        assert!(line.contains("0.001ETH"));
        assert!(line.contains("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "not json");
    }

    #[test]
    fn unknown_network_lists_the_configured_ones() {
        let ctx = context(&[], "mainnet", PathBuf::new());
        assert_eq!(
            ctx.network().unwrap_err().to_string(),
            "unknown network mainnet, expected one of: mantle-testnet, sepolia"
        );
    }
}
