use clap::Parser;

use gauge_staking::{cli, estimate, logs, query, schema};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logs::init(cli.verbose);

    match cli.command {
        cli::Command::Schema => schema::run(),
        cli::Command::Apr {
            inflation_rate,
            relative_weight,
            working_supply,
            bal_price,
            bpt_price,
            boost,
        } => estimate::run_gauge_apr(&estimate::GaugeAprArgs {
            inflation_rate: &inflation_rate,
            relative_weight: &relative_weight,
            working_supply: &working_supply,
            bal_price: &bal_price,
            bpt_price: &bpt_price,
            boost: &boost,
        }),
        cli::Command::RewardAprs { file } => estimate::run_reward_aprs(&file),
        cli::Command::Query {
            config,
            account,
            pool,
        } => query::run(&config, &account, pool.as_deref()),
    }
}
