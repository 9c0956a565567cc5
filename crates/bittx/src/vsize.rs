use bitcoin::blockdata::transaction::Transaction;
use bitcoin::consensus::encode::serialize_hex;

/// Final bytes of a transaction plus the sizes fees are priced on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSummary {
    pub txid: String,
    pub hex: String,
    pub size: usize,
    pub vsize: usize,
}

pub fn get_tx_vsize(tx: &Transaction) -> usize {
    let non_witness_size = tx.base_size();
    let total_size = tx.total_size();

    // witness bytes count once, everything else four times
    let weight = 3 * non_witness_size + total_size;
    (weight + 3) / 4
}

pub fn summarize(tx: &Transaction) -> TxSummary {
    TxSummary {
        txid: tx.compute_txid().to_string(),
        hex: serialize_hex(tx),
        size: tx.total_size(),
        vsize: get_tx_vsize(tx),
    }
}
