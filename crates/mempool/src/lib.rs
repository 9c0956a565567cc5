pub mod tx;
pub mod utxo;

use anyhow::{anyhow, Context, Result};
use bitcoin::{Amount, OutPoint, Txid};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const MEMPOOL_URL: &str = "https://mempool.space/api";

/// Client for an Esplora style explorer API (mempool.space, blockstream.info).
#[derive(Debug, Clone)]
pub struct MempoolClient {
    base_url: String,
    client: Client,
}

impl Default for MempoolClient {
    fn default() -> Self {
        Self::new(MEMPOOL_URL)
    }
}

impl MempoolClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn tip_height(&self) -> Result<u32> {
        let url = self.url("blocks/tip/height");
        debug!("{}", url);
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        body.trim()
            .parse::<u32>()
            .with_context(|| format!("invalid tip height: {}", body))
    }
}
