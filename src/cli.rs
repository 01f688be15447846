use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Gauge staking yields: APR arithmetic and a user's staked positions.
#[derive(Parser)]
#[command(name = "gauge-staking", version, about)]
pub struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Output the JSON schema of the staking config file
    Schema,

    /// Native emission APR of a gauge and its min/max boost range
    Apr {
        /// Native token emitted per second across all gauges
        #[arg(long)]
        inflation_rate: String,

        /// Gauge relative weight (0..=1)
        #[arg(long)]
        relative_weight: String,

        /// Working supply of the gauge
        #[arg(long)]
        working_supply: String,

        /// Native token price in USD
        #[arg(long)]
        bal_price: String,

        /// BPT price in USD
        #[arg(long)]
        bpt_price: String,

        /// Staker boost
        #[arg(long, default_value = "1")]
        boost: String,
    },

    /// Reward token APRs from a JSON input file
    RewardAprs {
        /// Path to the reward APR input JSON
        file: PathBuf,
    },

    /// Fetch a user's staking positions and print them as JSON
    Query {
        /// Path to the staking config JSON
        #[arg(long)]
        config: PathBuf,

        /// Connected account
        #[arg(long)]
        account: String,

        /// Pool to read the on-chain staked balance for
        #[arg(long)]
        pool: Option<String>,
    },
}
