use rust_decimal::Decimal;

use crate::apr::calculator::{mul, ratio};
use crate::error::StakingError;
use crate::model::DecoratedPool;

use super::FiatValuer;

/// Values BPT at the pool's liquidity per share.
#[derive(Debug, Clone, Copy, Default)]
pub struct BptFiatValuer;

impl FiatValuer for BptFiatValuer {
    fn bpt_fiat_value(&self, pool: &DecoratedPool, bpt: Decimal) -> Result<Decimal, StakingError> {
        let per_share = ratio(pool.total_liquidity, pool.total_shares)?;
        mul(per_share, bpt)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::primitives::Address;

    use super::*;
    use crate::model::PoolApr;

    fn pool(liquidity: &str, shares: &str) -> DecoratedPool {
        DecoratedPool {
            id: "0xpool".into(),
            address: Address::ZERO,
            total_liquidity: Decimal::from_str(liquidity).unwrap(),
            total_shares: Decimal::from_str(shares).unwrap(),
            apr: PoolApr::default(),
        }
    }

    #[test]
    fn test_bpt_fiat_value() {
        let value = BptFiatValuer
            .bpt_fiat_value(&pool("1000", "100"), Decimal::from(3))
            .unwrap();
        assert_eq!(value, Decimal::from(30));

        let value = BptFiatValuer
            .bpt_fiat_value(&pool("1000000", "50000"), Decimal::from_str("12.5").unwrap())
            .unwrap();
        assert_eq!(value.to_string(), "250");
    }

    #[test]
    fn test_empty_pool_is_worthless() {
        let value = BptFiatValuer
            .bpt_fiat_value(&pool("1000", "0"), Decimal::from(3))
            .unwrap();
        assert_eq!(value, Decimal::ZERO);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = BptFiatValuer
            .bpt_fiat_value(&pool(&Decimal::MAX.to_string(), "1"), Decimal::from(2))
            .unwrap_err();
        assert!(matches!(err, StakingError::Overflow { .. }));
    }
}
