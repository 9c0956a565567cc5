use std::str::FromStr;

use super::*;
use datatypes::types;

#[derive(Debug, Deserialize)]
struct Utxo {
    txid: String,
    vout: u32,
    value: u64,
    status: Status,
}

#[derive(Debug, Deserialize)]
struct Status {
    confirmed: bool,
    block_height: Option<u32>,
}

impl MempoolClient {
    /// Every unspent output of `addr`, confirmed or not.
    pub async fn gets_utxo(&self, addr: &str) -> Result<Vec<types::Utxo>> {
        let url = self.url(&format!("address/{}/utxo", addr));
        debug!("{}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let utxos: Vec<Utxo> = response.json().await?;
        debug!("{} utxos for {}", utxos.len(), addr);

        let tip = if utxos.iter().any(|u| u.status.confirmed) {
            Some(self.tip_height().await?)
        } else {
            None
        };
        into_utxos(utxos, tip)
    }
}

fn into_utxos(utxos: Vec<Utxo>, tip: Option<u32>) -> Result<Vec<types::Utxo>> {
    let mut my_utxos = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        let txid = Txid::from_str(&utxo.txid).map_err(|e| anyhow!("bad txid {}: {}", utxo.txid, e))?;
        my_utxos.push(types::Utxo {
            out_point: OutPoint::new(txid, utxo.vout),
            value: Amount::from_sat(utxo.value),
            confirmations: confirmations(&utxo.status, tip),
        });
    }

    Ok(my_utxos)
}

fn confirmations(status: &Status, tip: Option<u32>) -> u32 {
    match (status.confirmed, status.block_height, tip) {
        (true, Some(height), Some(tip)) if tip >= height => tip - height + 1,
        _ => 0,
    }
}
