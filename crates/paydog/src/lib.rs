pub mod config;
pub mod request;

use anyhow::{anyhow, Context, Result};
use bittx::{build_helper, AmountPolicy, BuildConfig, BuildError};
use datatypes::types;
use mempool::MempoolClient;
use serde_json::{json, Value};
use tracing::info;

pub async fn run(
    cli: &config::Cli,
    cfg: &config::Config,
    build_cfg: &BuildConfig,
) -> std::result::Result<types::TransferReceipt, BuildError> {
    let info = request::transfer_info(cli, cfg)?;
    let client = MempoolClient::new(&cfg.mempool.url);
    info!(
        "transfer {} sats from {} to {} via {}",
        info.amount,
        info.sender,
        info.recipient,
        client.base_url()
    );
    build_helper::build_transfer_tx(&client, &info, build_cfg).await
}

/// `{kind, message}` body reported when a transfer fails.
pub fn failure(err: &BuildError) -> Value {
    json!({
        "kind": err.kind().as_str(),
        "message": err.to_string(),
    })
}
