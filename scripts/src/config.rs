//! Networks, compiler and block explorer configuration.
//!
//! Credentials are read from the environment (after `.env` is loaded). Loading
//! never fails, the presence of every value a network needs is checked when
//! that network gets selected.

use std::collections::BTreeMap;

use crate::{constants::SOLC_VERSION, errors::ScriptError};

/// Env var holding the Infura project key
pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
/// Env var holding the Etherscan API key
pub const ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";
/// Env var holding the Sepolia deployer key
pub const SEPOLIA_PRIVATE_KEY: &str = "SEPOLIA_PRIVATE_KEY";
/// Env var holding the Mantle testnet deployer key
pub const MANTLE_PRIVATE_KEY: &str = "MANTLE_PRIVATE_KEY";

/// Placeholder key, the Mantle explorer doesn't check it
const MANTLE_EXPLORER_API_KEY: &str = "xyz";

/// A value that is either set, or missing with the env var that should hold it
#[derive(Debug, Clone, PartialEq, Eq)]
enum Setting {
    /// Set, trimmed
    Value(String),
    /// Unset, holds the variable name
    Missing(&'static str),
}

impl Setting {
    /// Read `var` through the given lookup, empty values count as missing
    fn from_env(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Self {
        match lookup(var) {
            Some(value) if !value.trim().is_empty() => Setting::Value(value.trim().to_string()),
            _ => Setting::Missing(var),
        }
    }

    /// The value, or a `MissingEnvVar` error blaming `network`
    fn require(&self, network: &str) -> Result<&str, ScriptError> {
        match self {
            Setting::Value(value) => Ok(value),
            Setting::Missing(var) => Err(ScriptError::MissingEnvVar {
                var,
                network: network.to_string(),
            }),
        }
    }
}

/// The RPC endpoint of a network, possibly embedding a provider key
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    /// A public endpoint
    Fixed(&'static str),
    /// `{prefix}{key}`
    WithKey {
        /// URL up to the key
        prefix: &'static str,
        /// Provider API key
        key: Setting,
    },
}

/// How to reach and sign for a network
#[derive(Debug, Clone)]
struct NetworkEntry {
    /// Expected chain id
    chain_id: Option<u64>,
    /// RPC endpoint
    endpoint: Endpoint,
    /// Signing keys
    accounts: Vec<Setting>,
}

/// A network ready to be used: every credential is present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Name of the network, as given on the command line
    pub name: String,
    /// Expected chain id, if known
    pub chain_id: Option<u64>,
    /// RPC endpoint
    pub url: String,
    /// Private keys of the signing accounts, the first one deploys
    pub accounts: Vec<String>,
}

/// Block explorer used to verify contracts on a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// API key of the explorer
    pub api_key: String,
    /// Base URL of the explorer API
    pub api_url: String,
    /// Base URL of the explorer website
    pub browser_url: String,
}

/// Explorer registration for a chain the verification service doesn't know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomChain {
    /// Network the chain is registered for
    pub network: &'static str,
    /// Chain id
    pub chain_id: u64,
    /// Base URL of the explorer API
    pub api_url: &'static str,
    /// Base URL of the explorer website
    pub browser_url: &'static str,
}

/// Explorers natively known by the verification service, by network
const KNOWN_EXPLORERS: &[(&str, &str, &str)] = &[(
    "sepolia",
    "https://api-sepolia.etherscan.io/api",
    "https://sepolia.etherscan.io",
)];

/// The whole project configuration
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Solidity compiler version
    pub solidity: &'static str,
    /// Networks by name
    networks: BTreeMap<&'static str, NetworkEntry>,
    /// Explorer API keys by network
    explorer_keys: BTreeMap<&'static str, Setting>,
    /// Explorers registered on top of the natively known ones
    pub custom_chains: Vec<CustomChain>,
}

impl ProjectConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration, resolving env vars through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(
            "mantle-testnet",
            NetworkEntry {
                chain_id: Some(5001),
                endpoint: Endpoint::Fixed("https://rpc.testnet.mantle.xyz/"),
                accounts: vec![Setting::from_env(&lookup, MANTLE_PRIVATE_KEY)],
            },
        );
        networks.insert(
            "sepolia",
            NetworkEntry {
                chain_id: Some(11155111),
                endpoint: Endpoint::WithKey {
                    prefix: "https://sepolia.infura.io/v3/",
                    key: Setting::from_env(&lookup, INFURA_API_KEY),
                },
                accounts: vec![Setting::from_env(&lookup, SEPOLIA_PRIVATE_KEY)],
            },
        );

        let mut explorer_keys = BTreeMap::new();
        explorer_keys.insert("sepolia", Setting::from_env(&lookup, ETHERSCAN_API_KEY));
        explorer_keys.insert(
            "mantle-testnet",
            Setting::Value(MANTLE_EXPLORER_API_KEY.to_string()),
        );

        ProjectConfig {
            solidity: SOLC_VERSION,
            networks,
            explorer_keys,
            custom_chains: vec![CustomChain {
                network: "mantle-testnet",
                chain_id: 5001,
                api_url: "https://explorer.testnet.mantle.xyz/api",
                browser_url: "https://explorer.testnet.mantle.xyz",
            }],
        }
    }

    /// Names of the configured networks
    pub fn network_names(&self) -> Vec<&'static str> {
        self.networks.keys().copied().collect()
    }

    /// The error for a network missing from the configuration
    fn unknown_network(&self, name: &str) -> ScriptError {
        ScriptError::UnknownNetwork {
            name: name.to_string(),
            known: self.network_names().join(", "),
        }
    }

    /// Select a network, checking that all of its credentials are set
    pub fn network(&self, name: &str) -> Result<NetworkConfig, ScriptError> {
        let entry = self
            .networks
            .get(name)
            .ok_or_else(|| self.unknown_network(name))?;

        let url = match &entry.endpoint {
            Endpoint::Fixed(url) => url.to_string(),
            Endpoint::WithKey { prefix, key } => format!("{prefix}{}", key.require(name)?),
        };
        let accounts = entry
            .accounts
            .iter()
            .map(|account| account.require(name).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NetworkConfig {
            name: name.to_string(),
            chain_id: entry.chain_id,
            url,
            accounts,
        })
    }

    /// Explorer of a network, checking that its API key is set
    pub fn explorer(&self, network: &str) -> Result<ExplorerConfig, ScriptError> {
        let (api_url, browser_url) = self
            .custom_chains
            .iter()
            .find(|chain| chain.network == network)
            .map(|chain| (chain.api_url, chain.browser_url))
            .or_else(|| {
                KNOWN_EXPLORERS
                    .iter()
                    .find(|(name, _, _)| *name == network)
                    .map(|(_, api, browser)| (*api, *browser))
            })
            .ok_or_else(|| self.unknown_network(network))?;

        let api_key = self
            .explorer_keys
            .get(network)
            .ok_or_else(|| self.unknown_network(network))?
            .require(network)?;

        Ok(ExplorerConfig {
            api_key: api_key.to_string(),
            api_url: api_url.to_string(),
            browser_url: browser_url.to_string(),
        })
    }
}

impl NetworkConfig {
    /// Replace the configured RPC endpoint
    pub fn with_rpc_url(mut self, rpc_url: Option<&str>) -> Self {
        if let Some(url) = rpc_url {
            self.url = url.to_string();
        }
        self
    }

    /// The account used to sign deployments
    pub fn deployer_key(&self) -> Result<&str, ScriptError> {
        self.accounts
            .first()
            .map(String::as_str)
            .ok_or_else(|| ScriptError::ClientInitialization(format!(
                "no account configured for network {}",
                self.name
            )))
    }
}
