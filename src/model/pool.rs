use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed APR interval, `min <= max`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AprRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Staking part of a pool's APR breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakingApr {
    /// Native (BAL) emission APR at minimum and maximum boost.
    #[serde(rename = "BAL", default, skip_serializing_if = "Option::is_none")]
    pub bal: Option<AprRange>,
    /// Sum of non-native reward token APRs.
    #[serde(rename = "Rewards", default, skip_serializing_if = "Option::is_none")]
    pub rewards: Option<Decimal>,
}

/// APR breakdown attached to a decorated pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolApr {
    /// Base (swap fee) APR.
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking: Option<StakingApr>,
}

impl PoolApr {
    pub fn min_native_apr(&self) -> Decimal {
        self.native_range().map(|r| r.min).unwrap_or_default()
    }

    pub fn max_native_apr(&self) -> Decimal {
        self.native_range().map(|r| r.max).unwrap_or_default()
    }

    pub fn rewards_apr(&self) -> Decimal {
        self.staking
            .as_ref()
            .and_then(|s| s.rewards)
            .unwrap_or_default()
    }

    fn native_range(&self) -> Option<AprRange> {
        self.staking.as_ref().and_then(|s| s.bal)
    }
}

/// Pool record as returned by the pool-list source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedPool {
    pub id: String,
    pub address: Address,
    /// Pool TVL in fiat.
    pub total_liquidity: Decimal,
    /// Outstanding BPT supply.
    pub total_shares: Decimal,
    #[serde(default)]
    pub apr: PoolApr,
}

/// A staked pool together with the user's stake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratedPoolWithShares {
    #[serde(flatten)]
    pub pool: DecoratedPool,
    /// Fiat value of the stake.
    pub shares: Decimal,
    /// Staked BPT.
    pub bpt: Decimal,
}
