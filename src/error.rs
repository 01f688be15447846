use alloy::primitives::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("No USD price for reward token `{token}`")]
    MissingPrice { token: Address },

    #[error(
        "Attempted to get staked shares, however staking data was initialised without a pool address"
    )]
    PoolAddressNotConfigured,

    #[error("Wallet is not connected")]
    WalletNotConnected,

    #[error("No gauge registered for pool `{pool}`")]
    GaugeNotFound { pool: Address },

    #[error("Invalid decimal value `{value}`")]
    InvalidDecimal { value: String },

    #[error("Decimal overflow in {op}")]
    Overflow { op: &'static str },
}
