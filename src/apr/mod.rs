//! Staking APR arithmetic.
//!
//! All functions are pure and work on `Decimal` inputs. Quotients are rounded
//! to [`DIVISION_DECIMAL_PLACES`] places and a zero denominator yields zero.

pub mod calculator;
pub mod pool;

pub use calculator::{
    DIVISION_DECIMAL_PLACES, GaugeAprParams, MAX_BOOST, MIN_BOOST, NATIVE_WORKING_BALANCE,
    REWARD_TOKEN_WORKING_BALANCE, RewardAprParams, SECONDS_PER_WEEK, WEEKS_PER_YEAR,
    calculate_gauge_apr, calculate_reward_token_aprs, calculate_token_payable_to_gauge,
    calculate_weekly_reward, get_apr_range,
};
pub use pool::{
    get_apr_range_with_reward_emissions, get_boost_adjusted_total_apr, has_bal_emissions,
    has_staking_rewards,
};
