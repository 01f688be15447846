use anyhow::Result;
use schemars::schema_for;
use serde_json::Value;

use crate::config::{RPC_URL_ENV, StakingConfig};

/// JSON Schema of the staking config file.
///
/// The description notes the RPC override so editors surface it.
pub fn config_schema() -> Result<Value> {
    let mut schema = serde_json::to_value(schema_for!(StakingConfig))?;
    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "description".into(),
            Value::String(format!(
                "Staking data sources. `chain.rpc_url` can be overridden with {RPC_URL_ENV}."
            )),
        );
    }
    Ok(schema)
}

/// Entry point for the `schema` command.
pub fn run() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config_schema()?)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_schema_lists_required_fields() {
        let schema = config_schema().unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        for field in ["chain", "gauge_subgraph_url", "pools_subgraph_url", "gauge_factory"] {
            assert!(required.contains(&field), "{field} missing from {required:?}");
        }
        assert!(!required.contains(&"stakable_pool_ids"));
        assert!(schema["properties"]["chain"].is_object());
        assert!(
            schema["description"]
                .as_str()
                .unwrap()
                .contains(RPC_URL_ENV)
        );
    }
}
