use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::apr::{self, GaugeAprParams, RewardAprParams};
use crate::model::RewardTokenMeta;
use crate::model::amount::parse_decimal;

/// CLI-facing inputs of the `apr` command.
pub struct GaugeAprArgs<'a> {
    pub inflation_rate: &'a str,
    pub relative_weight: &'a str,
    pub working_supply: &'a str,
    pub bal_price: &'a str,
    pub bpt_price: &'a str,
    pub boost: &'a str,
}

/// Entry point for the `apr` command.
pub fn run_gauge_apr(args: &GaugeAprArgs<'_>) -> Result<()> {
    let gauge = Address::ZERO;
    let working_supplies = HashMap::from([(gauge, parse_decimal(args.working_supply)?)]);
    let relative_weights = HashMap::from([(gauge, parse_decimal(args.relative_weight)?)]);

    let boost = parse_decimal(args.boost)?;
    let params = GaugeAprParams {
        gauge,
        inflation_rate: parse_decimal(args.inflation_rate)?,
        bal_price: parse_decimal(args.bal_price)?,
        bpt_price: parse_decimal(args.bpt_price)?,
        working_supplies: &working_supplies,
        relative_weights: &relative_weights,
        boost,
    };
    let apr = apr::calculate_gauge_apr(&params)?;
    // The range is quoted for a minimum-boost staker.
    let base = apr::calculate_gauge_apr(&GaugeAprParams {
        boost: apr::MIN_BOOST,
        ..params
    })?;
    let range = apr::get_apr_range(base)?;

    tracing::info!(%apr, %boost, "gauge apr");
    let out = json!({
        "apr": apr.normalize(),
        "range": { "min": range.min.normalize(), "max": range.max.normalize() },
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

// ── Reward token APRs ───────────────────────────────────────────────

/// Input file of the `reward-aprs` command.
#[derive(Debug, Deserialize)]
pub struct RewardAprInput {
    #[serde(default = "default_boost")]
    pub boost: Decimal,
    /// Raw BPT staked in the gauge.
    pub total_supply: Decimal,
    pub bpt_price: Decimal,
    pub reward_tokens: Vec<RewardTokenInput>,
}

#[derive(Debug, Deserialize)]
pub struct RewardTokenInput {
    pub token: Address,
    /// Raw per-second rate, decimal or 0x-hex.
    pub rate: String,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub price_usd: Option<Decimal>,
}

fn default_boost() -> Decimal {
    Decimal::ONE
}

/// Entry point for the `reward-aprs` command.
pub fn run_reward_aprs(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let input: RewardAprInput = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;

    let aprs = reward_aprs(&input)?;
    let out: serde_json::Map<String, serde_json::Value> = aprs
        .into_iter()
        .map(|(token, apr)| (format!("{token}"), json!(apr.normalize())))
        .collect();
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn reward_aprs(input: &RewardAprInput) -> Result<std::collections::BTreeMap<Address, Decimal>> {
    let mut prices = HashMap::new();
    let mut decimals = HashMap::new();
    let mut reward_tokens = Vec::with_capacity(input.reward_tokens.len());

    for entry in &input.reward_tokens {
        let rate = U256::from_str(&entry.rate)
            .map_err(|e| anyhow::anyhow!("Invalid rate '{}' for {}: {e}", entry.rate, entry.token))?;
        reward_tokens.push(RewardTokenMeta {
            token: entry.token,
            rate,
        });
        if let Some(price) = entry.price_usd {
            prices.insert(entry.token, price);
        }
        if let Some(d) = entry.decimals {
            decimals.insert(entry.token, d);
        }
    }

    Ok(apr::calculate_reward_token_aprs(&RewardAprParams {
        boost: input.boost,
        prices: &prices,
        reward_tokens: &reward_tokens,
        token_decimals: &decimals,
        total_supply: input.total_supply,
        bpt_price: input.bpt_price,
    })?)
}
