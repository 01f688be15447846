use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::apr::NATIVE_WORKING_BALANCE;
use crate::apr::calculator::ratio;
use crate::error::StakingError;
use crate::model::Chain;
use crate::model::GaugeShare;
use crate::model::amount::{BPT_DECIMALS, units_to_decimal};

use super::{BoostSource, GaugeAddressResolver, GaugeBalanceReader};

// ── Gauge contract interfaces ───────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ILiquidityGaugeFactory {
        function getPoolGauge(address pool) external view returns (address);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ILiquidityGauge {
        function balanceOf(address account) external view returns (uint256);
        function working_balances(address account) external view returns (uint256);
    }
}

// ── On-chain gauges ─────────────────────────────────────────────────

/// Gauge resolver, balance reader and boost source over JSON-RPC.
#[derive(Clone)]
pub struct OnchainGauges {
    provider: DynProvider,
    factory: Address,
}

impl OnchainGauges {
    pub fn new(provider: DynProvider, factory: Address) -> Self {
        OnchainGauges { provider, factory }
    }

    /// Connect over HTTP to the chain's RPC endpoint.
    pub fn connect(chain: &Chain, factory: Address) -> Result<Self> {
        let rpc_url = chain
            .rpc_url()
            .with_context(|| format!("chain {chain} requires an rpc_url for gauge reads"))?;
        let provider = ProviderBuilder::new()
            .connect_http(
                rpc_url
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid RPC URL for chain {chain}: {e}"))?,
            )
            .erased();
        Ok(Self::new(provider, factory))
    }

    async fn boost_for(&self, gauge: Address, account: Address) -> Result<Decimal> {
        let contract = ILiquidityGauge::new(gauge, &self.provider);
        let working = contract
            .working_balances(account)
            .call()
            .await
            .with_context(|| format!("gauge {gauge}.working_balances"))?;
        let balance = contract
            .balanceOf(account)
            .call()
            .await
            .with_context(|| format!("gauge {gauge}.balanceOf"))?;

        let working = units_to_decimal(working, BPT_DECIMALS)?;
        let balance = units_to_decimal(balance, BPT_DECIMALS)?;
        if balance.is_zero() {
            return Ok(Decimal::ONE);
        }
        let unboosted = balance
            .checked_mul(NATIVE_WORKING_BALANCE)
            .ok_or(StakingError::Overflow { op: "multiplication" })?;
        Ok(ratio(working, unboosted)?)
    }
}

#[async_trait]
impl GaugeAddressResolver for OnchainGauges {
    async fn gauge_for_pool(&self, pool: Address) -> Result<Address> {
        let factory = ILiquidityGaugeFactory::new(self.factory, &self.provider);
        let gauge = factory
            .getPoolGauge(pool)
            .call()
            .await
            .with_context(|| format!("gaugeFactory.getPoolGauge({pool})"))?;
        if gauge == Address::ZERO {
            return Err(StakingError::GaugeNotFound { pool }.into());
        }
        tracing::debug!(%pool, %gauge, "resolved pool gauge");
        Ok(gauge)
    }
}

#[async_trait]
impl GaugeBalanceReader for OnchainGauges {
    async fn staked_balance(&self, gauge: Address, account: Address) -> Result<U256> {
        let contract = ILiquidityGauge::new(gauge, &self.provider);
        let balance = contract
            .balanceOf(account)
            .call()
            .await
            .with_context(|| format!("gauge {gauge}.balanceOf({account})"))?;
        Ok(balance)
    }
}

#[async_trait]
impl BoostSource for OnchainGauges {
    /// `boost = working_balance / (balance * 0.4)`, 1 for an empty position.
    async fn user_boosts(
        &self,
        account: Address,
        gauge_shares: &[GaugeShare],
    ) -> Result<HashMap<String, Decimal>> {
        let mut boosts = HashMap::with_capacity(gauge_shares.len());
        for share in gauge_shares {
            let boost = self.boost_for(share.gauge_id, account).await?;
            tracing::debug!(pool = %share.pool_id, %boost, "user boost");
            boosts.insert(share.pool_id.clone(), boost);
        }
        Ok(boosts)
    }
}
