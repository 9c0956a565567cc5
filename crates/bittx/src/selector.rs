use super::*;

/// Orders every supplied utxo by confirmations, most confirmed first.
/// Ties break on txid then vout so the order is reproducible. Nothing is filtered out.
pub fn select(mut utxos: Vec<types::Utxo>) -> Vec<types::Utxo> {
    utxos.sort_by(|a, b| {
        b.confirmations
            .cmp(&a.confirmations)
            .then_with(|| a.out_point.txid.cmp(&b.out_point.txid))
            .then_with(|| a.out_point.vout.cmp(&b.out_point.vout))
    });
    utxos
}

pub fn total_value(utxos: &[types::Utxo]) -> Amount {
    utxos.iter().map(|u| u.value).sum()
}
