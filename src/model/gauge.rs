use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's staked deposit receipt in one gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeShare {
    pub gauge_id: Address,
    pub pool_id: String,
    /// Staked BPT, already scaled to whole tokens.
    pub user_balance: Decimal,
    pub gauge_total_supply: Decimal,
}

impl GaugeShare {
    /// Shares with a zero balance are not stakes.
    pub fn is_staked(&self) -> bool {
        self.user_balance > Decimal::ZERO
    }
}

/// A gauge the user could stake into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityGauge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Address>,
    pub pool_id: String,
    #[serde(default)]
    pub total_share_balances: Vec<Decimal>,
}

/// Response of the gauge-share indexing source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGaugeShares {
    pub gauge_shares: Vec<GaugeShare>,
    pub liquidity_gauges: Vec<LiquidityGauge>,
}

/// A non-native reward token emitted by a gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTokenMeta {
    pub token: Address,
    /// Raw emission per second, in the token's smallest unit.
    pub rate: U256,
}
