use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A blockchain the staking contracts are deployed on.
///
/// In JSON, chains are always objects:
/// `{"name": "ethereum", "chain_id": 1, "rpc_url": "https://eth.llamarpc.com"}`.
/// `chain_id`/`rpc_url` are filled from the registry for known names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Chain {
    /// Human-readable chain name (e.g. "ethereum", "arbitrum", "polygon").
    pub name: String,
    /// EVM chain ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// JSON-RPC endpoint URL. Required for on-chain gauge reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

/// Chain IDs where veBAL boosting is modelled.
const BOOST_CHAIN_IDS: &[u64] = &[1, 5, 11155111];

/// Layer-2 deployments (child-chain gauges, no boost).
const L2_CHAIN_IDS: &[u64] = &[10, 100, 137, 1101, 8453, 42161, 43114];

// ── Methods ──────────────────────────────────────────────────────────

impl Chain {
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_url.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for layer-2 deployments.
    pub fn is_l2(&self) -> bool {
        self.chain_id.is_some_and(|id| L2_CHAIN_IDS.contains(&id))
    }

    /// Whether per-user boosts exist on this chain. Unknown chains have none.
    pub fn supports_boost(&self) -> bool {
        !self.is_l2() && self.chain_id.is_some_and(|id| BOOST_CHAIN_IDS.contains(&id))
    }
}

// ── Convenience constructors ─────────────────────────────────────────

impl Chain {
    pub fn ethereum() -> Self {
        Chain {
            name: "ethereum".into(),
            chain_id: Some(1),
            rpc_url: Some("https://eth.llamarpc.com".into()),
        }
    }
    pub fn arbitrum() -> Self {
        Chain {
            name: "arbitrum".into(),
            chain_id: Some(42161),
            rpc_url: Some("https://arb1.arbitrum.io/rpc".into()),
        }
    }
    pub fn optimism() -> Self {
        Chain {
            name: "optimism".into(),
            chain_id: Some(10),
            rpc_url: Some("https://mainnet.optimism.io".into()),
        }
    }
    pub fn polygon() -> Self {
        Chain {
            name: "polygon".into(),
            chain_id: Some(137),
            rpc_url: Some("https://polygon-rpc.com".into()),
        }
    }
    pub fn gnosis() -> Self {
        Chain {
            name: "gnosis".into(),
            chain_id: Some(100),
            rpc_url: Some("https://rpc.gnosischain.com".into()),
        }
    }

    /// Construct a chain from its name, matching known chains.
    /// Falls back to a name-only chain (no chain_id/rpc_url) for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "ethereum" | "mainnet" => Self::ethereum(),
            "arbitrum" => Self::arbitrum(),
            "optimism" => Self::optimism(),
            "polygon" => Self::polygon(),
            "gnosis" => Self::gnosis(),
            _ => Self::named(name),
        }
    }

    /// Custom EVM chain with chain_id + rpc_url.
    pub fn custom(name: impl Into<String>, chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Chain {
            name: name.into(),
            chain_id: Some(chain_id),
            rpc_url: Some(rpc_url.into()),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Chain {
            name: name.into(),
            chain_id: None,
            rpc_url: None,
        }
    }

    /// Fill in `chain_id`/`rpc_url` from the registry where the JSON left them out.
    pub fn with_registry_defaults(mut self) -> Self {
        let known = Self::from_name(&self.name);
        if self.chain_id.is_none() {
            self.chain_id = known.chain_id;
        }
        if self.rpc_url.is_none() {
            self.rpc_url = known.rpc_url;
        }
        self
    }
}

// ── Display ──────────────────────────────────────────────────────────

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_only_on_mainnet() {
        assert!(Chain::ethereum().supports_boost());
        assert!(!Chain::ethereum().is_l2());
        assert!(Chain::arbitrum().is_l2());
        assert!(!Chain::arbitrum().supports_boost());
        assert!(!Chain::polygon().supports_boost());
        assert!(!Chain::named("devnet").supports_boost());
    }

    #[test]
    fn test_registry_defaults() {
        let chain = Chain::named("Polygon").with_registry_defaults();
        assert_eq!(chain.chain_id(), Some(137));
        assert!(chain.rpc_url().is_some());

        let custom = Chain::custom("ethereum", 1, "http://localhost:8545").with_registry_defaults();
        assert_eq!(custom.rpc_url(), Some("http://localhost:8545"));
    }
}
