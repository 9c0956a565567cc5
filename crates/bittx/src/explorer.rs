//! Seams to the chain indexer. The core only ever awaits one call at a time.
#![allow(async_fn_in_trait)]

use super::*;
use anyhow::Result;
use mempool::MempoolClient;

/// Source of raw previous transactions for legacy inputs.
pub trait TxFetcher {
    async fn fetch_tx_hex(&self, txid: &Txid) -> Result<String>;
}

/// Everything a transfer needs from the outside world.
pub trait Explorer: TxFetcher {
    async fn utxos(&self, address: &str) -> Result<Vec<types::Utxo>>;

    async fn broadcast(&self, tx_hex: &str) -> Result<String>;
}

impl TxFetcher for MempoolClient {
    async fn fetch_tx_hex(&self, txid: &Txid) -> Result<String> {
        self.get_tx_hex(txid).await
    }
}

impl Explorer for MempoolClient {
    async fn utxos(&self, address: &str) -> Result<Vec<types::Utxo>> {
        self.gets_utxo(address).await
    }

    async fn broadcast(&self, tx_hex: &str) -> Result<String> {
        self.send_tx_hex(tx_hex).await
    }
}
