use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "gauge_staking=info";
const VERBOSE_FILTER: &str = "gauge_staking=debug";

/// Install the global subscriber. Logs go to stderr so stdout stays valid JSON.
///
/// `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
