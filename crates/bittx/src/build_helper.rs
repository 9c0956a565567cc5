use crate::builder::{self, BuiltTx};
use crate::explorer::Explorer;
use tracing::error;

use super::*;

/// Fetches the sender's utxos, builds and signs the transfer, and broadcasts it if asked to.
pub async fn build_transfer_tx<E: Explorer>(
    explorer: &E,
    info: &types::TransferInfo,
    cfg: &BuildConfig,
) -> Result<types::TransferReceipt, BuildError> {
    let utxos = match explorer.utxos(&info.sender).await {
        Ok(utxos) => utxos,
        Err(e) => {
            error!("fetch utxos for {} failed: {}", info.sender, e);
            vec![]
        }
    };

    let built = builder::build_transaction(info, utxos, explorer, cfg).await?;

    let broadcast = if info.broadcast {
        match explorer.broadcast(&built.summary.hex).await {
            Ok(resp) => {
                info!("broadcast {}: {}", built.summary.txid, resp);
                Some(resp)
            }
            Err(e) => {
                error!("broadcast {} failed: {}", built.summary.txid, e);
                return Err(BuildError::Broadcast(e.to_string()));
            }
        }
    } else {
        None
    };

    Ok(receipt(built, broadcast))
}

fn receipt(built: BuiltTx, broadcast: Option<String>) -> types::TransferReceipt {
    types::TransferReceipt {
        txid: built.summary.txid,
        tx_hex: built.summary.hex,
        size: built.summary.size,
        vsize: built.summary.vsize,
        amount: built.resolution.amount.to_sat(),
        fee: built.resolution.fee.to_sat(),
        change: built.resolution.change.to_sat(),
        skipped: built.skipped.iter().map(|o| o.to_string()).collect(),
        broadcast,
    }
}
