pub mod fiat;
pub mod gauge;
pub mod pools;
pub mod subgraph;

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::StakingError;
use crate::model::{DecoratedPool, GaugeShare, UserGaugeShares};

pub use fiat::BptFiatValuer;
pub use gauge::OnchainGauges;
pub use pools::PoolsSubgraph;
pub use subgraph::{GaugeSubgraph, SubgraphClient};

// ── Collaborator interfaces ─────────────────────────────────────────

/// Pools the account holds a nonzero BPT balance in.
#[async_trait]
pub trait PoolMembershipSource: Send + Sync {
    async fn user_pools(&self, account: Address) -> Result<Vec<DecoratedPool>>;
}

/// Indexed gauge shares of an account, plus gauges for candidate pools.
///
/// Indexing lags chain state; only shares with a balance above zero are returned.
#[async_trait]
pub trait GaugeShareSource: Send + Sync {
    async fn gauge_shares(&self, account: Address, pool_ids: &[String]) -> Result<UserGaugeShares>;
}

/// Resolves the gauge contract of a pool. Fails when the pool has none.
#[async_trait]
pub trait GaugeAddressResolver: Send + Sync {
    async fn gauge_for_pool(&self, pool: Address) -> Result<Address>;
}

/// Reads an account's raw staked balance (18-decimal fixed point) from a gauge.
#[async_trait]
pub trait GaugeBalanceReader: Send + Sync {
    async fn staked_balance(&self, gauge: Address, account: Address) -> Result<U256>;
}

/// Per-pool boost of an account, keyed by pool id.
#[async_trait]
pub trait BoostSource: Send + Sync {
    async fn user_boosts(
        &self,
        account: Address,
        gauge_shares: &[GaugeShare],
    ) -> Result<HashMap<String, Decimal>>;
}

/// Decorated pool records for a list of pool ids.
#[async_trait]
pub trait PoolListSource: Send + Sync {
    async fn pools_by_ids(&self, pool_ids: &[String]) -> Result<Vec<DecoratedPool>>;
}

/// Fiat value of a BPT amount in a pool. Fails on overflow.
pub trait FiatValuer: Send + Sync {
    fn bpt_fiat_value(&self, pool: &DecoratedPool, bpt: Decimal) -> Result<Decimal, StakingError>;
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Retry an async operation with exponential backoff.
pub async fn retry<T, F, Fut>(max_retries: u32, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) if attempt < max_retries => {
                let delay = std::time::Duration::from_millis(1000 * 2u64.pow(attempt));
                tracing::debug!(attempt, ?delay, error = %format!("{e:#}"), "retrying request");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
