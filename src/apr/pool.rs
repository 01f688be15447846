use rust_decimal::Decimal;

use super::calculator::{add, mul};
use crate::error::StakingError;
use crate::model::{AprRange, DecoratedPool};

fn sum(values: &[Decimal]) -> Result<Decimal, StakingError> {
    values.iter().try_fold(Decimal::ZERO, |acc, v| add(acc, *v))
}

/// A pool has staking rewards if it has native emissions or a reward token APR.
pub fn has_staking_rewards(pool: Option<&DecoratedPool>) -> bool {
    pool.is_some_and(|p| {
        p.apr.min_native_apr() > Decimal::ZERO || p.apr.rewards_apr() > Decimal::ZERO
    })
}

/// Whether the pool's gauge receives native emissions.
pub fn has_bal_emissions(pool: Option<&DecoratedPool>) -> bool {
    pool.is_some_and(|p| p.apr.min_native_apr() > Decimal::ZERO)
}

/// Total APR for a staker with `boost`.
///
/// Only the native emission component is boosted; reward token and swap fee
/// APRs are added as they are.
pub fn get_boost_adjusted_total_apr(
    pool: &DecoratedPool,
    boost: Decimal,
) -> Result<Decimal, StakingError> {
    let boosted = mul(pool.apr.min_native_apr(), boost)?;
    sum(&[boosted, pool.apr.rewards_apr(), pool.apr.total])
}

/// Total APR range including native emissions at min/max boost and reward tokens.
pub fn get_apr_range_with_reward_emissions(
    pool: Option<&DecoratedPool>,
) -> Result<AprRange, StakingError> {
    let Some(pool) = pool else {
        return Ok(AprRange::default());
    };
    let apr = &pool.apr;
    Ok(AprRange {
        min: sum(&[apr.total, apr.min_native_apr(), apr.rewards_apr()])?,
        max: sum(&[apr.total, apr.max_native_apr(), apr.rewards_apr()])?,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::primitives::Address;

    use super::*;
    use crate::model::{PoolApr, StakingApr};

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn pool(base: &str, native: Option<(&str, &str)>, rewards: Option<&str>) -> DecoratedPool {
        let staking = if native.is_none() && rewards.is_none() {
            None
        } else {
            Some(StakingApr {
                bal: native.map(|(min, max)| AprRange { min: d(min), max: d(max) }),
                rewards: rewards.map(d),
            })
        };
        DecoratedPool {
            id: "0xpool".into(),
            address: Address::ZERO,
            total_liquidity: d("1000"),
            total_shares: d("100"),
            apr: PoolApr { total: d(base), staking },
        }
    }

    #[test]
    fn test_has_staking_rewards() {
        assert!(!has_staking_rewards(None));
        assert!(!has_staking_rewards(Some(&pool("0.02", None, None))));
        assert!(has_staking_rewards(Some(&pool("0.02", None, Some("0.05")))));
        assert!(has_staking_rewards(Some(&pool("0", Some(("0.1", "0.25")), None))));
        assert!(!has_staking_rewards(Some(&pool("0.02", Some(("0", "0")), Some("0")))));
    }

    #[test]
    fn test_has_bal_emissions() {
        assert!(!has_bal_emissions(None));
        assert!(!has_bal_emissions(Some(&pool("0.02", None, Some("0.05")))));
        assert!(has_bal_emissions(Some(&pool("0", Some(("0.1", "0.25")), None))));
    }

    #[test]
    fn test_boost_adjusted_total_apr() {
        let p = pool("0.02", Some(("0.1", "0.25")), Some("0.05"));
        assert_eq!(get_boost_adjusted_total_apr(&p, Decimal::ONE).unwrap(), d("0.17"));
        // boost touches the native component only
        assert_eq!(get_boost_adjusted_total_apr(&p, d("2")).unwrap(), d("0.27"));
        // 0.10 * 2.0 + 0.050 + 0.020 keeps no trailing zeros
        let padded = pool("0.020", Some(("0.10", "0.250")), Some("0.050"));
        let total = get_boost_adjusted_total_apr(&padded, d("2.0")).unwrap();
        assert_eq!(total.to_string(), "0.27");
    }

    #[test]
    fn test_apr_range_with_reward_emissions() {
        let p = pool("0.02", Some(("0.1", "0.25")), Some("0.05"));
        let range = get_apr_range_with_reward_emissions(Some(&p)).unwrap();
        assert_eq!(range.min, d("0.17"));
        assert_eq!(range.max, d("0.32"));
        assert_eq!(range.max - range.min, d("0.15"));
        assert_eq!(range.max.to_string(), "0.32");

        let empty = get_apr_range_with_reward_emissions(None).unwrap();
        assert_eq!(empty.min.to_string(), "0");
        assert_eq!(empty.max.to_string(), "0");
    }
}
