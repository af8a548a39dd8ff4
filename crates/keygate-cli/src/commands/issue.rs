//! `keygate issue` command implementation.
//!
//! Runs one issuance against the configured store and prints the response
//! JSON to stdout, success or failure, so the output can be piped.

use anyhow::bail;
use keygate_core::KeygateConfig;
use keygate_issuer::TokenIssuer;
use keygate_store::RestStore;
use std::sync::Arc;

pub async fn run(
    config: KeygateConfig,
    user: &str,
    partition_key: Option<&str>,
) -> anyhow::Result<()> {
    if user.trim().is_empty() {
        bail!("--user must be non-empty");
    }

    let config = Arc::new(config);
    let store = Arc::new(RestStore::new(&config.endpoint, &config.master_key)?);
    let issuer = TokenIssuer::new(config, store);

    match issuer.issue(user.trim(), partition_key).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err.to_error_response())?);
            std::process::exit(1);
        }
    }
}
