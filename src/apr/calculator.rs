use std::collections::{BTreeMap, HashMap};

use alloy::primitives::Address;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::StakingError;
use crate::model::amount::{DEFAULT_TOKEN_DECIMALS, units_to_decimal};
use crate::model::{AprRange, RewardTokenMeta};

// ── Protocol constants ──────────────────────────────────────────────

/// Lowest boost any staker can have.
pub const MIN_BOOST: Decimal = Decimal::ONE;

/// Highest boost a veBAL holder can reach.
pub const MAX_BOOST: Decimal = Decimal::from_parts(25, 0, 0, false, 1);

/// Working balance of one deposited BPT at minimum boost (40% of the deposit).
pub const NATIVE_WORKING_BALANCE: Decimal = Decimal::from_parts(4, 0, 0, false, 1);

/// Reward tokens are not boost weighted: one BPT counts as one.
pub const REWARD_TOKEN_WORKING_BALANCE: Decimal = Decimal::ONE;

pub const SECONDS_PER_WEEK: u32 = 7 * 86_400;

pub const WEEKS_PER_YEAR: u32 = 52;

/// Quotients are rounded half away from zero to this many places.
pub const DIVISION_DECIMAL_PLACES: u32 = 20;

// ── Checked arithmetic ──────────────────────────────────────────────
//
// Results are normalized: `0.12 * 2.5` renders as `0.3`, not `0.300`.

pub(crate) fn mul(a: Decimal, b: Decimal) -> Result<Decimal, StakingError> {
    a.checked_mul(b)
        .map(|v| v.normalize())
        .ok_or(StakingError::Overflow { op: "multiplication" })
}

pub(crate) fn add(a: Decimal, b: Decimal) -> Result<Decimal, StakingError> {
    a.checked_add(b)
        .map(|v| v.normalize())
        .ok_or(StakingError::Overflow { op: "addition" })
}

/// Division with a zero denominator yields zero.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Result<Decimal, StakingError> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)
        .map(|q| {
            q.round_dp_with_strategy(DIVISION_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        })
        .ok_or(StakingError::Overflow { op: "division" })
}

/// `weekly * boost * 52 * token_price`
fn annualize(weekly: Decimal, boost: Decimal, token_price: Decimal) -> Result<Decimal, StakingError> {
    let boosted = mul(weekly, boost)?;
    let yearly = mul(boosted, Decimal::from(WEEKS_PER_YEAR))?;
    mul(yearly, token_price)
}

// ── Emission formulas ───────────────────────────────────────────────

/// Weekly reward earned by `working_balance` in a gauge with `working_supply`.
///
/// `share = working_balance / (working_supply + working_balance)`. An empty
/// gauge with a zero balance earns nothing.
pub fn calculate_weekly_reward(
    working_balance: Decimal,
    working_supply: Decimal,
    emission_payable_to_gauge: Decimal,
) -> Result<Decimal, StakingError> {
    let pool_size = add(working_supply, working_balance)?;
    let share = ratio(working_balance, pool_size)?;
    mul(share, emission_payable_to_gauge)
}

/// Tokens emitted to a gauge per week.
pub fn calculate_token_payable_to_gauge(
    emission_rate_per_second: Decimal,
    relative_weight: Decimal,
) -> Result<Decimal, StakingError> {
    let weekly = mul(emission_rate_per_second, Decimal::from(SECONDS_PER_WEEK))?;
    mul(weekly, relative_weight)
}

// ── Reward token APRs ───────────────────────────────────────────────

/// Inputs for [`calculate_reward_token_aprs`].
pub struct RewardAprParams<'a> {
    pub boost: Decimal,
    /// USD price per token address.
    pub prices: &'a HashMap<Address, Decimal>,
    pub reward_tokens: &'a [RewardTokenMeta],
    /// Token decimals; missing entries default to 18.
    pub token_decimals: &'a HashMap<Address, u8>,
    /// Raw (unboosted) BPT staked in the gauge.
    pub total_supply: Decimal,
    pub bpt_price: Decimal,
}

/// APR of every reward token a gauge emits, keyed by token address.
///
/// Reward tokens go entirely to depositors (relative weight 1) and are shared
/// by raw balance. A reward token without a price is an error.
pub fn calculate_reward_token_aprs(
    params: &RewardAprParams<'_>,
) -> Result<BTreeMap<Address, Decimal>, StakingError> {
    params
        .reward_tokens
        .iter()
        .map(|meta| {
            let decimals = params
                .token_decimals
                .get(&meta.token)
                .copied()
                .unwrap_or(DEFAULT_TOKEN_DECIMALS);
            let rate = units_to_decimal(meta.rate, decimals)?;
            let payable = calculate_token_payable_to_gauge(rate, Decimal::ONE)?;
            let weekly = calculate_weekly_reward(
                REWARD_TOKEN_WORKING_BALANCE,
                params.total_supply,
                payable,
            )?;
            let price = params
                .prices
                .get(&meta.token)
                .copied()
                .ok_or(StakingError::MissingPrice { token: meta.token })?;
            let yearly = annualize(weekly, params.boost, price)?;
            Ok((meta.token, ratio(yearly, params.bpt_price)?))
        })
        .collect()
}

// ── Native emission APR ─────────────────────────────────────────────

/// Inputs for [`calculate_gauge_apr`].
pub struct GaugeAprParams<'a> {
    pub gauge: Address,
    /// Native token emitted per second across all gauges.
    pub inflation_rate: Decimal,
    pub bal_price: Decimal,
    pub bpt_price: Decimal,
    pub working_supplies: &'a HashMap<Address, Decimal>,
    pub relative_weights: &'a HashMap<Address, Decimal>,
    pub boost: Decimal,
}

/// Native emission APR of a gauge for a staker with `boost`.
///
/// A gauge missing from the working supply or relative weight maps has not
/// been observed yet; both read as zero.
pub fn calculate_gauge_apr(params: &GaugeAprParams<'_>) -> Result<Decimal, StakingError> {
    let working_supply = params
        .working_supplies
        .get(&params.gauge)
        .copied()
        .unwrap_or_default();
    let relative_weight = params
        .relative_weights
        .get(&params.gauge)
        .copied()
        .unwrap_or_default();

    let payable = calculate_token_payable_to_gauge(params.inflation_rate, relative_weight)?;
    let weekly = calculate_weekly_reward(NATIVE_WORKING_BALANCE, working_supply, payable)?;
    let yearly = annualize(weekly, params.boost, params.bal_price)?;
    ratio(yearly, params.bpt_price)
}

/// APR at minimum and maximum boost.
pub fn get_apr_range(apr: Decimal) -> Result<AprRange, StakingError> {
    Ok(AprRange {
        min: mul(apr, MIN_BOOST)?,
        max: mul(apr, MAX_BOOST)?,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::primitives::U256;

    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_constants() {
        assert_eq!(MAX_BOOST, d("2.5"));
        assert_eq!(NATIVE_WORKING_BALANCE, d("0.4"));
        assert_eq!(SECONDS_PER_WEEK, 604_800);
    }

    #[test]
    fn test_weekly_reward_share() {
        // 1 of 4 working units → a quarter of the emission
        let reward = calculate_weekly_reward(d("1"), d("3"), d("300")).unwrap();
        assert_eq!(reward, d("75"));
    }

    #[test]
    fn test_weekly_reward_empty_gauge() {
        assert_eq!(
            calculate_weekly_reward(Decimal::ZERO, Decimal::ZERO, d("30")).unwrap(),
            Decimal::ZERO
        );
        // Sole staker takes the whole emission.
        assert_eq!(
            calculate_weekly_reward(d("0.4"), Decimal::ZERO, d("30")).unwrap(),
            d("30")
        );
    }

    #[test]
    fn test_token_payable() {
        let weekly = calculate_token_payable_to_gauge(d("0.0001"), d("0.5")).unwrap();
        assert_eq!(weekly, d("30.24"));
        assert_eq!(
            calculate_token_payable_to_gauge(d("3"), Decimal::ZERO).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_gauge_apr_reference_values() {
        let gauge = addr(0x11);
        let supplies = HashMap::from([(gauge, d("1000"))]);
        let weights = HashMap::from([(gauge, d("0.5"))]);
        let apr = calculate_gauge_apr(&GaugeAprParams {
            gauge,
            inflation_rate: d("0.0001"),
            bal_price: d("5"),
            bpt_price: d("2"),
            working_supplies: &supplies,
            relative_weights: &weights,
            boost: Decimal::ONE,
        })
        .unwrap();
        assert_eq!(apr, d("1.57185125949620153549"));
        assert_eq!(apr.normalize().to_string(), "1.57185125949620153549");
    }

    #[test]
    fn test_gauge_apr_unknown_gauge_is_zero() {
        let empty = HashMap::new();
        let apr = calculate_gauge_apr(&GaugeAprParams {
            gauge: addr(0x22),
            inflation_rate: d("0.0001"),
            bal_price: d("5"),
            bpt_price: d("2"),
            working_supplies: &empty,
            relative_weights: &empty,
            boost: d("2.5"),
        })
        .unwrap();
        assert_eq!(apr, Decimal::ZERO);
    }

    #[test]
    fn test_gauge_apr_scales_with_boost() {
        let gauge = addr(0x11);
        // 0.4 / (0.6 + 0.4) is an exact 40% share
        let supplies = HashMap::from([(gauge, d("0.6"))]);
        let weights = HashMap::from([(gauge, d("0.5"))]);
        let apr_at = |boost: Decimal| {
            calculate_gauge_apr(&GaugeAprParams {
                gauge,
                inflation_rate: d("0.0001"),
                bal_price: d("5"),
                bpt_price: d("4"),
                working_supplies: &supplies,
                relative_weights: &weights,
                boost,
            })
            .unwrap()
        };
        assert_eq!(apr_at(Decimal::ONE).to_string(), "786.24");
        assert_eq!(apr_at(d("2")).to_string(), "1572.48");
    }

    #[test]
    fn test_reward_token_apr() {
        let token = addr(0xaa);
        let prices = HashMap::from([(token, d("2"))]);
        let decimals = HashMap::new();
        let rewards = [RewardTokenMeta {
            token,
            rate: U256::from(10u64).pow(U256::from(18u64)),
        }];
        let aprs = calculate_reward_token_aprs(&RewardAprParams {
            boost: Decimal::ONE,
            prices: &prices,
            reward_tokens: &rewards,
            token_decimals: &decimals,
            total_supply: d("1000"),
            bpt_price: d("4"),
        })
        .unwrap();
        assert_eq!(aprs.len(), 1);
        assert_eq!(aprs[&token], d("15709.0909090909090752"));
    }

    #[test]
    fn test_reward_token_apr_uses_token_decimals() {
        let token = addr(0xbb);
        let prices = HashMap::from([(token, d("1"))]);
        let decimals = HashMap::from([(token, 6u8)]);
        // 1 token/sec at 6 decimals, sole staker, BPT worth $1
        let rewards = [RewardTokenMeta {
            token,
            rate: U256::from(1_000_000u64),
        }];
        let aprs = calculate_reward_token_aprs(&RewardAprParams {
            boost: Decimal::ONE,
            prices: &prices,
            reward_tokens: &rewards,
            token_decimals: &decimals,
            total_supply: Decimal::ZERO,
            bpt_price: d("1"),
        })
        .unwrap();
        assert_eq!(aprs[&token], d("31449600"));
    }

    #[test]
    fn test_reward_token_apr_missing_price_fails() {
        let priced = addr(0xaa);
        let unpriced = addr(0xcc);
        let prices = HashMap::from([(priced, d("2"))]);
        let decimals = HashMap::new();
        let rewards = [
            RewardTokenMeta { token: priced, rate: U256::from(1u64) },
            RewardTokenMeta { token: unpriced, rate: U256::from(1u64) },
        ];
        let err = calculate_reward_token_aprs(&RewardAprParams {
            boost: Decimal::ONE,
            prices: &prices,
            reward_tokens: &rewards,
            token_decimals: &decimals,
            total_supply: d("10"),
            bpt_price: d("1"),
        })
        .unwrap_err();
        assert!(matches!(err, StakingError::MissingPrice { token } if token == unpriced));
    }

    #[test]
    fn test_apr_range() {
        let range = get_apr_range(d("0.12")).unwrap();
        assert_eq!(range.min.to_string(), "0.12");
        assert_eq!(range.max.to_string(), "0.3");
        assert_eq!(serde_json::to_string(&range).unwrap(), r#"{"min":"0.12","max":"0.3"}"#);
    }

    #[test]
    fn test_results_render_without_trailing_zeros() {
        let payable = calculate_token_payable_to_gauge(d("0.0001"), d("0.5")).unwrap();
        assert_eq!(payable.to_string(), "30.24");
        let weekly = calculate_weekly_reward(d("1"), d("3"), d("300")).unwrap();
        assert_eq!(weekly.to_string(), "75");
        assert_eq!(ratio(d("1.50"), d("0.5")).unwrap().to_string(), "3");
    }

    #[test]
    fn test_ratio_rounds_half_away_from_zero() {
        assert_eq!(ratio(d("2"), d("3")).unwrap(), d("0.66666666666666666667"));
        assert_eq!(ratio(d("1"), Decimal::ZERO).unwrap(), Decimal::ZERO);
    }
}
