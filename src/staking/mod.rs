//! A user's staking positions, merged from several asynchronous sources.
//!
//! Each source has its own [`Query`] so consumers can render partial data
//! while other sources are still loading. Derived values are recomputed from
//! the latest query data on every call.

pub mod query;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::apr::calculator::add;
use crate::error::StakingError;
use crate::model::amount::{BPT_DECIMALS, format_units};
use crate::model::{
    Chain, DecoratedPool, DecoratedPoolWithShares, GaugeShare, LiquidityGauge, UserGaugeShares,
};
use crate::sources::{
    BoostSource, FiatValuer, GaugeAddressResolver, GaugeBalanceReader, GaugeShareSource,
    PoolListSource, PoolMembershipSource,
};

pub use query::{Query, QueryStatus};

/// The collaborators the aggregator reads from.
#[derive(Clone)]
pub struct StakingSources {
    pub user_pools: Arc<dyn PoolMembershipSource>,
    pub gauge_shares: Arc<dyn GaugeShareSource>,
    pub gauge_resolver: Arc<dyn GaugeAddressResolver>,
    pub gauge_balances: Arc<dyn GaugeBalanceReader>,
    pub boosts: Arc<dyn BoostSource>,
    pub pools: Arc<dyn PoolListSource>,
    pub fiat: Arc<dyn FiatValuer>,
}

/// Staking positions of the connected account.
pub struct UserStakingData {
    sources: StakingSources,
    chain: Chain,
    stakable_pool_ids: Vec<String>,
    account: Option<Address>,
    pool_address: Option<Address>,

    user_pools: Query<Vec<DecoratedPool>>,
    staking_data: Query<UserGaugeShares>,
    staked_shares: Query<String>,
    staked_pools: Query<Vec<DecoratedPool>>,
    boosts: Query<HashMap<String, Decimal>>,
}

impl UserStakingData {
    pub fn new(sources: StakingSources, chain: Chain, stakable_pool_ids: Vec<String>) -> Self {
        UserStakingData {
            sources,
            chain,
            stakable_pool_ids,
            account: None,
            pool_address: None,
            user_pools: Query::default(),
            staking_data: Query::default(),
            staked_shares: Query::default(),
            staked_pools: Query::default(),
            boosts: Query::default(),
        }
    }

    // ── Inputs ──────────────────────────────────────────────────────

    /// Connect (or disconnect) an account. A different account invalidates everything.
    pub fn set_account(&mut self, account: Option<Address>) {
        if self.account == account {
            return;
        }
        self.account = account;
        self.user_pools.reset();
        self.staking_data.reset();
        self.staked_shares.reset();
        self.staked_pools.reset();
        self.boosts.reset();
    }

    /// Focus on one pool for the authoritative staked-balance read.
    pub fn set_pool_address(&mut self, pool_address: Option<Address>) {
        if self.pool_address == pool_address {
            return;
        }
        self.pool_address = pool_address;
        self.staked_shares.reset();
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn pool_address(&self) -> Option<Address> {
        self.pool_address
    }

    pub fn is_wallet_ready(&self) -> bool {
        self.account.is_some()
    }

    // ── Enable rules ────────────────────────────────────────────────

    pub fn is_user_pools_query_enabled(&self) -> bool {
        self.is_wallet_ready()
    }

    pub fn is_staking_data_query_enabled(&self) -> bool {
        self.is_wallet_ready()
    }

    pub fn is_staked_shares_query_enabled(&self) -> bool {
        self.pool_address.is_some() && self.is_wallet_ready()
    }

    pub fn is_staked_pools_query_enabled(&self) -> bool {
        !self.staked_pool_ids().is_empty()
    }

    /// Boosts are not modelled on layer-2 deployments.
    pub fn is_boost_query_enabled(&self) -> bool {
        self.is_wallet_ready() && !self.user_gauge_shares().is_empty() && self.chain.supports_boost()
    }

    // ── Fetching ────────────────────────────────────────────────────

    /// Run every enabled source, following the dependencies between them.
    ///
    /// Independent sources of a phase are fetched concurrently.
    pub async fn refresh(&mut self) {
        let load_user_pools = self.is_user_pools_query_enabled();
        let load_staked_shares = self.is_staked_shares_query_enabled();
        if load_user_pools {
            self.user_pools.begin();
        }
        if load_staked_shares {
            self.staked_shares.begin();
        }
        let (user_pools, staked_shares) = tokio::join!(
            async {
                if load_user_pools {
                    Some(self.fetch_user_pools().await)
                } else {
                    None
                }
            },
            async {
                if load_staked_shares {
                    Some(self.get_staked_shares().await)
                } else {
                    None
                }
            },
        );
        if let Some(result) = user_pools {
            settle_logged(&mut self.user_pools, "user_pools", result);
        }
        if let Some(result) = staked_shares {
            settle_logged(&mut self.staked_shares, "staked_shares", result);
        }

        self.refetch_user_staking_data().await;

        let load_staked_pools = self.is_staked_pools_query_enabled();
        let load_boosts = self.is_boost_query_enabled();
        if load_staked_pools {
            self.staked_pools.begin();
        }
        if load_boosts {
            self.boosts.begin();
        }
        let (staked_pools, boosts) = tokio::join!(
            async {
                if load_staked_pools {
                    Some(self.fetch_staked_pools().await)
                } else {
                    None
                }
            },
            async {
                if load_boosts {
                    Some(self.fetch_boosts().await)
                } else {
                    None
                }
            },
        );
        if let Some(result) = staked_pools {
            settle_logged(&mut self.staked_pools, "staked_pools", result);
        }
        if let Some(result) = boosts {
            settle_logged(&mut self.boosts, "boosts", result);
        }
    }

    pub async fn refetch_user_pools(&mut self) {
        if !self.is_user_pools_query_enabled() {
            tracing::debug!("user pools query disabled");
            return;
        }
        self.user_pools.begin();
        let result = self.fetch_user_pools().await;
        settle_logged(&mut self.user_pools, "user_pools", result);
    }

    pub async fn refetch_user_staking_data(&mut self) {
        if !self.is_staking_data_query_enabled() {
            tracing::debug!("staking data query disabled");
            return;
        }
        self.staking_data.begin();
        let result = self.fetch_staking_data().await;
        settle_logged(&mut self.staking_data, "staking_data", result);
    }

    pub async fn refetch_staked_shares(&mut self) {
        if !self.is_staked_shares_query_enabled() {
            tracing::debug!("staked shares query disabled");
            return;
        }
        self.staked_shares.begin();
        let result = self.get_staked_shares().await;
        settle_logged(&mut self.staked_shares, "staked_shares", result);
    }

    pub async fn refetch_staked_pools(&mut self) {
        if !self.is_staked_pools_query_enabled() {
            tracing::debug!("staked pools query disabled");
            return;
        }
        self.staked_pools.begin();
        let result = self.fetch_staked_pools().await;
        settle_logged(&mut self.staked_pools, "staked_pools", result);
    }

    pub async fn refetch_boosts(&mut self) {
        if !self.is_boost_query_enabled() {
            tracing::debug!("boost query disabled");
            return;
        }
        self.boosts.begin();
        let result = self.fetch_boosts().await;
        settle_logged(&mut self.boosts, "boosts", result);
    }

    /// Read the staked balance for the provided pool straight from its gauge.
    ///
    /// The gauge subgraph lags behind the chain; this read reflects a stake or
    /// unstake as soon as it is confirmed.
    pub async fn get_staked_shares(&self) -> Result<String> {
        let pool = self
            .pool_address
            .ok_or(StakingError::PoolAddressNotConfigured)?;
        let account = self.account.ok_or(StakingError::WalletNotConnected)?;

        let gauge = self.sources.gauge_resolver.gauge_for_pool(pool).await?;
        let balance = self
            .sources
            .gauge_balances
            .staked_balance(gauge, account)
            .await?;
        Ok(format_units(balance, BPT_DECIMALS))
    }

    async fn fetch_user_pools(&self) -> Result<Vec<DecoratedPool>> {
        let account = self.account.ok_or(StakingError::WalletNotConnected)?;
        self.sources.user_pools.user_pools(account).await
    }

    async fn fetch_staking_data(&self) -> Result<UserGaugeShares> {
        let account = self.account.ok_or(StakingError::WalletNotConnected)?;
        let pool_ids = self.stakeable_user_pool_ids();
        self.sources.gauge_shares.gauge_shares(account, &pool_ids).await
    }

    async fn fetch_staked_pools(&self) -> Result<Vec<DecoratedPool>> {
        let pool_ids = self.staked_pool_ids();
        self.sources.pools.pools_by_ids(&pool_ids).await
    }

    async fn fetch_boosts(&self) -> Result<HashMap<String, Decimal>> {
        let account = self.account.ok_or(StakingError::WalletNotConnected)?;
        self.sources
            .boosts
            .user_boosts(account, self.user_gauge_shares())
            .await
    }

    // ── Query state ─────────────────────────────────────────────────

    pub fn user_pools_query(&self) -> &Query<Vec<DecoratedPool>> {
        &self.user_pools
    }

    pub fn staking_data_query(&self) -> &Query<UserGaugeShares> {
        &self.staking_data
    }

    pub fn staked_shares_query(&self) -> &Query<String> {
        &self.staked_shares
    }

    pub fn staked_pools_query(&self) -> &Query<Vec<DecoratedPool>> {
        &self.staked_pools
    }

    pub fn boosts_query(&self) -> &Query<HashMap<String, Decimal>> {
        &self.boosts
    }

    pub fn is_loading_user_pools(&self) -> bool {
        self.user_pools.is_loading()
    }

    pub fn is_loading_user_staking_data(&self) -> bool {
        self.staking_data.is_loading()
    }

    pub fn is_loading_staked_shares(&self) -> bool {
        self.staked_shares.is_loading()
    }

    pub fn is_refetching_staked_shares(&self) -> bool {
        self.staked_shares.is_refetching()
    }

    pub fn is_loading_staked_pools(&self) -> bool {
        self.staked_pools.is_loading()
    }

    pub fn is_loading_boosts(&self) -> bool {
        self.boosts.is_loading()
    }

    // ── Derived values ──────────────────────────────────────────────

    pub fn user_pools(&self) -> &[DecoratedPool] {
        self.user_pools.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn user_pool_ids(&self) -> Vec<String> {
        self.user_pools().iter().map(|p| p.id.clone()).collect()
    }

    /// User pool ids that are on the stakable allowlist, in user order.
    pub fn stakeable_user_pool_ids(&self) -> Vec<String> {
        self.user_pool_ids()
            .into_iter()
            .filter(|id| {
                self.stakable_pool_ids
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(id))
            })
            .collect()
    }

    pub fn user_gauge_shares(&self) -> &[GaugeShare] {
        self.staking_data
            .data()
            .map(|d| d.gauge_shares.as_slice())
            .unwrap_or_default()
    }

    pub fn user_liquidity_gauges(&self) -> &[LiquidityGauge] {
        self.staking_data
            .data()
            .map(|d| d.liquidity_gauges.as_slice())
            .unwrap_or_default()
    }

    /// Staked BPT per pool id, as indexed.
    pub fn staked_shares_map(&self) -> HashMap<String, Decimal> {
        self.user_gauge_shares()
            .iter()
            .map(|share| (share.pool_id.clone(), share.user_balance))
            .collect()
    }

    /// Pools with a nonzero gauge share. Empty while gauge shares load.
    pub fn staked_pool_ids(&self) -> Vec<String> {
        if self.staking_data.is_loading() {
            return Vec::new();
        }
        self.user_gauge_shares()
            .iter()
            .filter(|share| share.is_staked())
            .map(|share| share.pool_id.clone())
            .collect()
    }

    /// Staked pools valued in fiat. Fails if a valuation overflows.
    pub fn staked_pools(&self) -> Result<Vec<DecoratedPoolWithShares>, StakingError> {
        let staked = self.staked_shares_map();
        let mut pools = Vec::new();
        for pool in self.staked_pools.data().map(Vec::as_slice).unwrap_or_default() {
            let bpt = staked.get(&pool.id).copied().unwrap_or_default();
            if bpt.is_zero() {
                continue;
            }
            pools.push(DecoratedPoolWithShares {
                shares: self.sources.fiat.bpt_fiat_value(pool, bpt)?,
                bpt,
                pool: pool.clone(),
            });
        }
        Ok(pools)
    }

    pub fn total_staked_fiat_value(&self) -> Result<Decimal, StakingError> {
        self.staked_pools()?
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| add(acc, p.shares))
    }

    /// On-chain staked balance of the provided pool, `"0"` until known.
    pub fn staked_shares_for_provided_pool(&self) -> String {
        self.staked_shares
            .data()
            .cloned()
            .unwrap_or_else(|| "0".to_string())
    }

    pub fn pool_boosts(&self) -> Option<&HashMap<String, Decimal>> {
        self.boosts.data()
    }

    /// Boost of the user's gauge for a pool, 1 when unknown.
    pub fn get_boost_for(&self, pool_id: &str) -> Decimal {
        self.pool_boosts()
            .and_then(|boosts| boosts.get(pool_id))
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Serializable view of every derived value and source status.
    pub fn snapshot(&self) -> Result<StakingSnapshot, StakingError> {
        let staked_pools = self.staked_pools()?;
        let total_staked_fiat_value = staked_pools
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| add(acc, p.shares))?;
        Ok(StakingSnapshot {
            chain: self.chain.name.clone(),
            account: self.account,
            pool_address: self.pool_address,
            staked_shares_for_provided_pool: self.staked_shares_for_provided_pool(),
            staked_pools,
            total_staked_fiat_value,
            user_gauge_shares: self.user_gauge_shares().to_vec(),
            user_liquidity_gauges: self.user_liquidity_gauges().to_vec(),
            pool_boosts: self
                .pool_boosts()
                .map(|b| b.iter().map(|(k, v)| (k.clone(), *v)).collect())
                .unwrap_or_default(),
            sources: SourceStatuses {
                user_pools: SourceStatus::of(&self.user_pools),
                staking_data: SourceStatus::of(&self.staking_data),
                staked_shares: SourceStatus::of(&self.staked_shares),
                staked_pools: SourceStatus::of(&self.staked_pools),
                boosts: SourceStatus::of(&self.boosts),
            },
        })
    }
}

fn settle_logged<T>(query: &mut Query<T>, source: &'static str, result: Result<T>) {
    match &result {
        Ok(_) => tracing::debug!(source, "staking source updated"),
        Err(e) => tracing::warn!(source, error = %format!("{e:#}"), "staking source failed"),
    }
    query.settle(result);
}

// ── Snapshot ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub status: QueryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SourceStatus {
    fn of<T>(query: &Query<T>) -> Self {
        SourceStatus {
            status: query.status(),
            error: query.error().map(str::to_string),
            updated_at: query.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStatuses {
    pub user_pools: SourceStatus,
    pub staking_data: SourceStatus,
    pub staked_shares: SourceStatus,
    pub staked_pools: SourceStatus,
    pub boosts: SourceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StakingSnapshot {
    pub chain: String,
    pub account: Option<Address>,
    pub pool_address: Option<Address>,
    pub staked_shares_for_provided_pool: String,
    pub staked_pools: Vec<DecoratedPoolWithShares>,
    pub total_staked_fiat_value: Decimal,
    pub user_gauge_shares: Vec<GaugeShare>,
    pub user_liquidity_gauges: Vec<LiquidityGauge>,
    pub pool_boosts: BTreeMap<String, Decimal>,
    pub sources: SourceStatuses,
}
