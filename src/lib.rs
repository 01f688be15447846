pub mod apr;
pub mod cli;
pub mod config;
pub mod error;
pub mod estimate;
pub mod logs;
pub mod model;
pub mod query;
pub mod schema;
pub mod sources;
pub mod staking;

pub use error::StakingError;
