//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    commands::{
        build_contract, deploy_contract, list_networks, lock_status, verify_contract, withdraw,
        ScriptContext,
    },
    config::ProjectConfig,
    constants::{
        DEFAULT_ARTIFACT_PATH, DEFAULT_LOCK_AMOUNT, DEFAULT_NETWORK, DEFAULT_OUTPUT_FILE,
        DEFAULT_SOURCE_PATH, DEFAULT_UNLOCK_DELAY,
    },
    deploy::lock::LockParams,
    errors::ScriptError,
};

/// Scripts for building, deploying & verifying the Lock contract
#[derive(Parser)]
#[command(version)]
pub struct Cli {
    /// Network to run against
    #[arg(short, long, env = "DEPLOY_NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// Network RPC URL, replaces the configured one
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// File where deployed addresses are recorded
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Run the selected command against the given configuration
    pub async fn run(self, config: ProjectConfig) -> Result<(), ScriptError> {
        let ctx = ScriptContext {
            config,
            network: self.network,
            rpc_url: self.rpc_url,
            output: self.output,
        };
        self.command.run(&ctx).await
    }
}

/// The possible CLI commands
#[derive(Subcommand)]
pub enum Command {
    /// Compile the Lock contract
    Build(BuildArgs),
    /// Deploy a new Lock
    Deploy(DeployArgs),
    /// Show the state of a deployed Lock
    Status(AddressArgs),
    /// Withdraw the funds of an unlocked Lock
    Withdraw(AddressArgs),
    /// Verify the Lock sources on the network block explorer
    Verify(VerifyArgs),
    /// List the configured networks
    Networks,
}

impl Command {
    /// Run the command
    pub async fn run(self, ctx: &ScriptContext) -> Result<(), ScriptError> {
        match self {
            Command::Build(args) => {
                info!("Building contracts...");
                build_contract(&args, ctx)?;
                Ok(())
            }
            Command::Deploy(args) => {
                info!("Deploying contracts on {}...", ctx.network);
                deploy_contract(args, ctx).await?;
                Ok(())
            }
            Command::Status(args) => lock_status(args, ctx).await,
            Command::Withdraw(args) => {
                info!("Withdrawing lock on {}...", ctx.network);
                withdraw(args, ctx).await
            }
            Command::Verify(args) => {
                info!("Verifying contracts on {}...", ctx.network);
                verify_contract(args, ctx).await
            }
            Command::Networks => {
                list_networks(ctx);
                Ok(())
            }
        }
    }
}

/// Compile the contract
#[derive(Args)]
pub struct BuildArgs {
    /// Solidity source of the contract
    #[arg(long, default_value = DEFAULT_SOURCE_PATH)]
    pub source: PathBuf,
    /// Where to write the compiled artifact
    #[arg(long, default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,
}

/// Deploy a Lock
#[derive(Args)]
pub struct DeployArgs {
    /// Amount of ether to lock
    #[arg(long, default_value = DEFAULT_LOCK_AMOUNT)]
    pub amount: String,
    /// Seconds until the lock can be withdrawn
    #[arg(long, default_value_t = DEFAULT_UNLOCK_DELAY)]
    pub unlock_delay: u64,
    /// Gas limit of the deployment, decimal or 0x prefixed hex
    #[arg(long, value_parser = parse_gas_limit, default_value = "0x1000000")]
    pub gas_limit: u64,
    /// Compile the contract even if its artifact exists
    #[arg(long)]
    pub build: bool,
    /// Compilation inputs and outputs
    #[command(flatten)]
    pub build_args: BuildArgs,
}

impl DeployArgs {
    /// The deployment parameters held by these args
    pub fn lock_params(&self) -> LockParams {
        LockParams {
            amount: self.amount.clone(),
            unlock_delay: self.unlock_delay,
            gas_limit: self.gas_limit,
        }
    }
}

/// Target a deployed Lock
#[derive(Args)]
pub struct AddressArgs {
    /// Address of the Lock, defaults to the last one deployed on the network
    #[arg(short, long)]
    pub address: Option<Address>,
}

/// Verify a deployed Lock
#[derive(Args)]
pub struct VerifyArgs {
    /// The Lock to verify
    #[command(flatten)]
    pub target: AddressArgs,
    /// Solidity source of the contract
    #[arg(long, default_value = DEFAULT_SOURCE_PATH)]
    pub source: PathBuf,
}

/// Parse a gas limit given either in decimal or as 0x prefixed hex
pub fn parse_gas_limit(value: &str) -> Result<u64, String> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    match parsed {
        Ok(0) => Err("gas limit can't be zero".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(format!("invalid gas limit {value}: {e}")),
    }
}
