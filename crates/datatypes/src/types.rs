use bitcoin::{Amount, OutPoint};
use serde::Serialize;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub out_point: OutPoint,
    pub value: Amount,
    pub confirmations: u32,
}

/// A spend request: pay `amount` sats from `sender` to `recipient`, leaving `fee` sats to miners.
#[derive(Debug, Clone)]
pub struct TransferInfo {
    pub sender: String,
    pub recipient: String,
    pub wif: String,
    pub amount: u64,
    pub fee: u64,
    pub rbf: bool,
    pub broadcast: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub txid: String,
    pub tx_hex: String,
    pub size: usize,
    pub vsize: usize,
    pub amount: u64,
    pub fee: u64,
    pub change: u64,
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
}
