use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::model::amount::parse_decimal;
use crate::model::{GaugeShare, LiquidityGauge, UserGaugeShares};

use super::{GaugeShareSource, retry};

const MAX_RETRIES: u32 = 3;

// ── GraphQL transport ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Minimal GraphQL-over-HTTP client for a subgraph endpoint.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        SubgraphClient {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute a query and decode its `data` object.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let body = json!({ "query": query, "variables": variables });

        let resp = retry(MAX_RETRIES, || {
            let client = self.client.clone();
            let body = body.clone();
            async move {
                let r = client
                    .post(&self.url)
                    .header("Content-Type", "application/json")
                    .header("Accept", "application/json")
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<GraphQlResponse<T>>()
                    .await?;
                Ok(r)
            }
        })
        .await
        .with_context(|| format!("querying subgraph {}", self.url))?;

        if let Some(errors) = resp.errors {
            if !errors.is_empty() {
                bail!(
                    "Subgraph errors: {}",
                    errors
                        .iter()
                        .map(|e| e.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ")
                );
            }
        }

        resp.data.context("no data in subgraph response")
    }
}

// ── Gauge subgraph ──────────────────────────────────────────────────

const USER_GAUGE_SHARES_QUERY: &str = r#"
query UserGaugeShares($user: String!, $poolIds: [String!]!) {
    gaugeShares(where: { user: $user, balance_gt: "0" }) {
        balance
        gauge {
            id
            poolId
            totalSupply
        }
    }
    liquidityGauges(where: { poolId_in: $poolIds }) {
        id
        poolId
        shares {
            balance
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GaugeSharesData {
    gauge_shares: Vec<RawGaugeShare>,
    liquidity_gauges: Vec<RawLiquidityGauge>,
}

#[derive(Debug, Deserialize)]
struct RawGaugeShare {
    balance: String,
    gauge: RawGauge,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGauge {
    id: String,
    pool_id: String,
    total_supply: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLiquidityGauge {
    id: Option<String>,
    pool_id: String,
    #[serde(default)]
    shares: Vec<RawShareBalance>,
}

#[derive(Debug, Deserialize)]
struct RawShareBalance {
    balance: String,
}

/// Gauge-share indexing source backed by the gauges subgraph.
pub struct GaugeSubgraph {
    client: SubgraphClient,
}

impl GaugeSubgraph {
    pub fn new(client: SubgraphClient) -> Self {
        GaugeSubgraph { client }
    }
}

#[async_trait]
impl GaugeShareSource for GaugeSubgraph {
    async fn gauge_shares(&self, account: Address, pool_ids: &[String]) -> Result<UserGaugeShares> {
        let variables = json!({
            "user": format!("{account:?}").to_lowercase(),
            "poolIds": pool_ids,
        });
        let data: GaugeSharesData = self
            .client
            .query(USER_GAUGE_SHARES_QUERY, variables)
            .await
            .context("fetching user gauge shares")?;

        tracing::debug!(
            shares = data.gauge_shares.len(),
            gauges = data.liquidity_gauges.len(),
            "gauge subgraph responded"
        );
        convert_gauge_shares(data)
    }
}

fn parse_address(value: &str) -> Result<Address> {
    value
        .parse()
        .with_context(|| format!("invalid address `{value}` in subgraph response"))
}

fn convert_gauge_shares(data: GaugeSharesData) -> Result<UserGaugeShares> {
    let gauge_shares = data
        .gauge_shares
        .into_iter()
        .map(|raw| {
            Ok(GaugeShare {
                gauge_id: parse_address(&raw.gauge.id)?,
                pool_id: raw.gauge.pool_id,
                user_balance: parse_decimal(&raw.balance)?,
                gauge_total_supply: parse_decimal(&raw.gauge.total_supply)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let liquidity_gauges = data
        .liquidity_gauges
        .into_iter()
        .map(|raw| {
            Ok(LiquidityGauge {
                id: raw.id.as_deref().map(parse_address).transpose()?,
                pool_id: raw.pool_id,
                total_share_balances: raw
                    .shares
                    .iter()
                    .map(|s| parse_decimal(&s.balance))
                    .collect::<Result<Vec<Decimal>, _>>()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(UserGaugeShares {
        gauge_shares,
        liquidity_gauges,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_convert_gauge_shares_response() {
        let body = r#"{
            "gaugeShares": [{
                "balance": "12.5",
                "gauge": {
                    "id": "0x34f33cdaed8ba0e1ceece80e5f4a73bcf234cfac",
                    "poolId": "0xpool",
                    "totalSupply": "1000"
                }
            }],
            "liquidityGauges": [{
                "id": "0x34f33cdaed8ba0e1ceece80e5f4a73bcf234cfac",
                "poolId": "0xpool",
                "shares": [{ "balance": "12.5" }, { "balance": "7" }]
            }]
        }"#;
        let data: GaugeSharesData = serde_json::from_str(body).unwrap();
        let converted = convert_gauge_shares(data).unwrap();

        let share = &converted.gauge_shares[0];
        assert_eq!(share.pool_id, "0xpool");
        assert_eq!(share.user_balance, Decimal::from_str("12.5").unwrap());
        assert_eq!(share.gauge_total_supply, Decimal::from(1000));
        assert_eq!(converted.liquidity_gauges[0].total_share_balances.len(), 2);
    }

    #[test]
    fn test_convert_rejects_bad_address() {
        let body = r#"{
            "gaugeShares": [{
                "balance": "1",
                "gauge": { "id": "not-an-address", "poolId": "0xpool", "totalSupply": "1" }
            }],
            "liquidityGauges": []
        }"#;
        let data: GaugeSharesData = serde_json::from_str(body).unwrap();
        assert!(convert_gauge_shares(data).is_err());
    }
}
