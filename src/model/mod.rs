pub mod amount;
pub mod chain;
pub mod gauge;
pub mod pool;

pub use chain::Chain;
pub use gauge::{GaugeShare, LiquidityGauge, RewardTokenMeta, UserGaugeShares};
pub use pool::{AprRange, DecoratedPool, DecoratedPoolWithShares, PoolApr, StakingApr};
