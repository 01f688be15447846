use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Chain;

/// Environment variable overriding the chain's RPC endpoint.
pub const RPC_URL_ENV: &str = "GAUGE_STAKING_RPC_URL";

/// Deployment settings for the staking data sources.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StakingConfig {
    /// Chain the gauges live on.
    pub chain: Chain,
    /// GraphQL endpoint of the gauges subgraph.
    pub gauge_subgraph_url: String,
    /// GraphQL endpoint of the pools subgraph.
    pub pools_subgraph_url: String,
    /// Address of the liquidity gauge factory (`getPoolGauge`).
    pub gauge_factory: String,
    /// Pool ids whose gauges may be staked into.
    #[serde(default)]
    pub stakable_pool_ids: Vec<String>,
}

impl StakingConfig {
    /// Load a config file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: StakingConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.with_env_overrides(std::env::var(RPC_URL_ENV).ok()))
    }

    fn with_env_overrides(mut self, rpc_url: Option<String>) -> Self {
        self.chain = self.chain.with_registry_defaults();
        if let Some(url) = rpc_url.filter(|u| !u.trim().is_empty()) {
            self.chain.rpc_url = Some(url);
        }
        self
    }

    pub fn gauge_factory_address(&self) -> Result<Address> {
        self.gauge_factory
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid gauge_factory '{}': {e}", self.gauge_factory))
    }
}
