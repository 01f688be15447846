use std::path::Path;
use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};

use crate::config::StakingConfig;
use crate::sources::{
    BptFiatValuer, GaugeSubgraph, OnchainGauges, PoolsSubgraph, SubgraphClient,
};
use crate::staking::{StakingSources, UserStakingData};

/// Entry point for the `query` command.
/// Loads the config, fetches every staking source once for `account` and
/// prints the resulting snapshot as JSON.
pub fn run(config_path: &Path, account: &str, pool: Option<&str>) -> Result<()> {
    let config = StakingConfig::load(config_path)?;
    let account: Address = account
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid account '{account}': {e}"))?;
    let pool: Option<Address> = pool
        .map(|p| {
            p.parse()
                .map_err(|e| anyhow::anyhow!("Invalid pool address '{p}': {e}"))
        })
        .transpose()?;

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(query_async(&config, account, pool))
}

/// Wire the subgraph and on-chain adapters into a set of sources.
pub fn build_sources(config: &StakingConfig) -> Result<StakingSources> {
    let http = reqwest::Client::new();
    let gauges = Arc::new(GaugeSubgraph::new(SubgraphClient::new(
        http.clone(),
        &config.gauge_subgraph_url,
    )));
    let pools = Arc::new(PoolsSubgraph::new(SubgraphClient::new(
        http,
        &config.pools_subgraph_url,
    )));
    let onchain = Arc::new(OnchainGauges::connect(
        &config.chain,
        config.gauge_factory_address()?,
    )?);

    Ok(StakingSources {
        user_pools: pools.clone(),
        gauge_shares: gauges,
        gauge_resolver: onchain.clone(),
        gauge_balances: onchain.clone(),
        boosts: onchain,
        pools,
        fiat: Arc::new(BptFiatValuer),
    })
}

async fn query_async(config: &StakingConfig, account: Address, pool: Option<Address>) -> Result<()> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let sources = build_sources(config)?;
    let mut data = UserStakingData::new(
        sources,
        config.chain.clone(),
        config.stakable_pool_ids.clone(),
    );
    data.set_account(Some(account));
    data.set_pool_address(pool);

    tracing::info!(chain = %config.chain, %account, "fetching staking data");
    data.refresh().await;

    let snapshot = data.snapshot()?;
    tracing::info!(
        staked_pools = snapshot.staked_pools.len(),
        total = %snapshot.total_staked_fiat_value,
        "staking data ready"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
