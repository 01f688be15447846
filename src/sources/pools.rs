use alloy::primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::model::amount::parse_decimal;
use crate::model::{DecoratedPool, PoolApr};

use super::subgraph::SubgraphClient;
use super::{PoolListSource, PoolMembershipSource};

/// Upper bound on pools fetched in one page.
const POOL_PAGE_SIZE: usize = 999;

const USER_POOLS_QUERY: &str = r#"
query UserPools($user: String!, $first: Int!) {
    poolShares(first: $first, where: { userAddress: $user, balance_gt: "0" }) {
        poolId {
            id
            address
            totalLiquidity
            totalShares
        }
    }
}
"#;

const POOLS_BY_IDS_QUERY: &str = r#"
query PoolsByIds($ids: [String!]!, $first: Int!) {
    pools(first: $first, where: { id_in: $ids }) {
        id
        address
        totalLiquidity
        totalShares
    }
}
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPoolsData {
    pool_shares: Vec<RawPoolShare>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoolShare {
    pool_id: RawPool,
}

#[derive(Debug, Deserialize)]
struct PoolsData {
    pools: Vec<RawPool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPool {
    id: String,
    address: String,
    total_liquidity: String,
    total_shares: String,
}

impl RawPool {
    /// APR decoration happens elsewhere; pools from the subgraph carry none.
    fn into_pool(self) -> Result<DecoratedPool> {
        let address: Address = self
            .address
            .parse()
            .with_context(|| format!("invalid pool address `{}`", self.address))?;
        Ok(DecoratedPool {
            total_liquidity: parse_decimal(&self.total_liquidity)?,
            total_shares: parse_decimal(&self.total_shares)?,
            id: self.id,
            address,
            apr: PoolApr::default(),
        })
    }
}

/// Pool membership and pool list, backed by the pools subgraph.
pub struct PoolsSubgraph {
    client: SubgraphClient,
}

impl PoolsSubgraph {
    pub fn new(client: SubgraphClient) -> Self {
        PoolsSubgraph { client }
    }
}

#[async_trait]
impl PoolMembershipSource for PoolsSubgraph {
    async fn user_pools(&self, account: Address) -> Result<Vec<DecoratedPool>> {
        let variables = json!({
            "user": format!("{account:?}").to_lowercase(),
            "first": POOL_PAGE_SIZE,
        });
        let data: UserPoolsData = self
            .client
            .query(USER_POOLS_QUERY, variables)
            .await
            .context("fetching user pools")?;

        data.pool_shares
            .into_iter()
            .map(|share| share.pool_id.into_pool())
            .collect()
    }
}

#[async_trait]
impl PoolListSource for PoolsSubgraph {
    async fn pools_by_ids(&self, pool_ids: &[String]) -> Result<Vec<DecoratedPool>> {
        let variables = json!({ "ids": pool_ids, "first": POOL_PAGE_SIZE });
        let data: PoolsData = self
            .client
            .query(POOLS_BY_IDS_QUERY, variables)
            .await
            .context("fetching pools by id")?;

        data.pools.into_iter().map(RawPool::into_pool).collect()
    }
}
