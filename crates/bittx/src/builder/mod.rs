//! Spend request to signed transaction: select, resolve, bind, assemble.

pub mod assembler;
pub mod binder;

use super::*;
use crate::explorer::TxFetcher;
use crate::fee::Resolution;
use crate::script_type::ScriptType;
use crate::signer::Signer;
use crate::vsize::TxSummary;

pub use assembler::{Stage, TxAssembler};
pub use binder::{BoundInputs, InputBinder, InputDescriptor};

#[derive(Debug, Clone)]
pub struct BuiltTx {
    pub tx: Transaction,
    pub summary: TxSummary,
    pub script_type: ScriptType,
    /// Computed from every selected utxo, before any input was skipped.
    pub resolution: Resolution,
    pub skipped: Vec<OutPoint>,
}

pub async fn build_transaction<F: TxFetcher>(
    info: &types::TransferInfo,
    utxos: Vec<types::Utxo>,
    fetcher: &F,
    cfg: &BuildConfig,
) -> Result<BuiltTx, BuildError> {
    let signer = Signer::from_wif(&info.wif, cfg.network)?;
    let sender = parse_address(&info.sender, cfg.network)?;
    let recipient = parse_address(&info.recipient, cfg.network)?;
    let script_type = ScriptType::classify(&info.sender, cfg.network);

    let selected = selector::select(utxos);
    let total_input = selector::total_value(&selected);
    let resolution = fee::resolve(
        total_input,
        Amount::from_sat(info.amount),
        Amount::from_sat(info.fee),
        cfg,
    )?;
    info!(
        "{} -> {}: {} utxos ({}), amount {}, fee {}, change {}",
        info.sender,
        info.recipient,
        selected.len(),
        total_input,
        resolution.amount,
        resolution.fee,
        resolution.change
    );

    let bound = InputBinder::new(script_type, &signer, info.rbf, fetcher)
        .bind_all(&selected)
        .await?;
    let skipped = bound.skipped;

    let mut assembler = TxAssembler::new(script_type, resolution);
    assembler.bind_inputs(bound.inputs)?;
    assembler.add_outputs(&recipient, &sender)?;
    assembler.sign(&signer)?;
    assembler.finalize()?;
    let (tx, summary) = assembler.serialize()?;

    Ok(BuiltTx {
        tx,
        summary,
        script_type,
        resolution,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::fake::FakeExplorer;
    use crate::testutil::*;
    use bitcoin::ecdsa::Signature;
    use bitcoin::hashes::Hash;
    use bitcoin::sighash::{EcdsaSighashType, SighashCache};
    use secp256k1::{Message, Secp256k1};

    fn request(sender: String, amount: u64, fee: u64) -> types::TransferInfo {
        types::TransferInfo {
            sender,
            recipient: p2wpkh_address(2),
            wif: wif(1),
            amount,
            fee,
            rbf: false,
            broadcast: false,
        }
    }

    fn verify(msg: [u8; 32], sig: &[u8], signer: &Signer) {
        let sig = Signature::from_slice(sig).unwrap();
        assert_eq!(sig.sighash_type, EcdsaSighashType::All);
        Secp256k1::verification_only()
            .verify_ecdsa(&Message::from_digest(msg), &sig.signature, &signer.public_key().inner)
            .unwrap();
    }

    #[tokio::test]
    async fn example_a_pays_recipient_and_change() {
        let info = request(p2wpkh_address(1), 50000, 1000);
        let utxo = utxo(1, 0, 100000, 6);
        let fetcher = FakeExplorer::default();

        let built = build_transaction(&info, vec![utxo.clone()], &fetcher, &BuildConfig::default())
            .await
            .unwrap();

        assert_eq!(built.script_type, ScriptType::P2wpkh);
        assert_eq!(built.resolution.change, Amount::from_sat(49000));
        let tx = &built.tx;
        assert_eq!(tx.input.len(), 1);
        assert_eq!(tx.output.len(), 2);
        let recipient = parse_address(&info.recipient, Network::Bitcoin).unwrap();
        let sender = parse_address(&info.sender, Network::Bitcoin).unwrap();
        assert_eq!(tx.output[0].value, Amount::from_sat(50000));
        assert_eq!(tx.output[0].script_pubkey, recipient.script_pubkey());
        assert_eq!(tx.output[1].value, Amount::from_sat(49000));
        assert_eq!(tx.output[1].script_pubkey, sender.script_pubkey());

        let signer = Signer::from_wif(&info.wif, Network::Bitcoin).unwrap();
        let witness = &tx.input[0].witness;
        assert_eq!(witness.len(), 2);
        assert!(tx.input[0].script_sig.is_empty());
        let msg = SighashCache::new(tx)
            .p2wpkh_signature_hash(0, &sender.script_pubkey(), utxo.value, EcdsaSighashType::All)
            .unwrap()
            .to_byte_array();
        verify(msg, witness.nth(0).unwrap(), &signer);

        assert_eq!(built.summary.size, tx.total_size());
        assert_eq!(built.summary.vsize, tx.vsize());
        assert!(built.summary.vsize < built.summary.size);
    }

    #[tokio::test]
    async fn example_b_max_send() {
        let info = request(p2wpkh_address(1), 49000, 1000);
        let fetcher = FakeExplorer::default();

        let built = build_transaction(
            &info,
            vec![utxo(1, 0, 50000, 1)],
            &fetcher,
            &BuildConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(built.resolution.amount, Amount::from_sat(48000));
        assert_eq!(built.resolution.change, Amount::from_sat(1000));
        assert_eq!(built.tx.output[0].value, Amount::from_sat(48000));
        // 1000 sats of change is above the 546 dust threshold
        assert_eq!(built.tx.output.len(), 2);
    }

    #[tokio::test]
    async fn max_send_with_dust_change_has_one_output() {
        let info = request(p2wpkh_address(1), 49500, 500);
        let fetcher = FakeExplorer::default();

        let built = build_transaction(
            &info,
            vec![utxo(1, 0, 30000, 1), utxo(2, 0, 20000, 9)],
            &fetcher,
            &BuildConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(built.tx.output.len(), 1);
        assert_eq!(built.tx.output[0].value, Amount::from_sat(49000));
        // most confirmed first
        assert_eq!(built.tx.input[0].previous_output, utxo(2, 0, 20000, 9).out_point);
    }

    #[tokio::test]
    async fn clamped_amount_spends_everything() {
        let info = request(p2wpkh_address(1), 80000, 1000);
        let fetcher = FakeExplorer::default();

        let built = build_transaction(
            &info,
            vec![utxo(1, 0, 30000, 1)],
            &fetcher,
            &BuildConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(built.resolution.requested, Amount::from_sat(80000));
        assert_eq!(built.tx.output.len(), 1);
        assert_eq!(built.tx.output[0].value, Amount::from_sat(29000));
    }

    #[tokio::test]
    async fn fee_above_input_builds_nothing() {
        let info = request(p2pkh_address(1), 100, 5000);
        let fetcher = FakeExplorer::default();

        let err = build_transaction(&info, vec![utxo(1, 0, 4000, 1)], &fetcher, &BuildConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        // aborted before any previous transaction was requested
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn empty_utxo_set_is_insufficient() {
        let info = request(p2wpkh_address(1), 1000, 0);
        let err = build_transaction(&info, vec![], &FakeExplorer::default(), &BuildConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    }

    #[tokio::test]
    async fn nested_segwit_spend() {
        let mut info = request(p2sh_p2wpkh_address(1), 20000, 1000);
        info.rbf = true;
        let fetcher = FakeExplorer::default();
        let utxo = utxo(1, 0, 30000, 1);

        let built = build_transaction(&info, vec![utxo.clone()], &fetcher, &BuildConfig::default())
            .await
            .unwrap();

        let signer = Signer::from_wif(&info.wif, Network::Bitcoin).unwrap();
        let redeem = signer.p2wpkh_script().unwrap();
        let input = &built.tx.input[0];
        assert_eq!(input.sequence, Sequence::ENABLE_RBF_NO_LOCKTIME);
        // scriptSig is a single push of the redeem script
        assert_eq!(input.script_sig.len(), redeem.len() + 1);
        assert!(input.script_sig.as_bytes().ends_with(redeem.as_bytes()));
        assert_eq!(input.witness.len(), 2);

        let msg = SighashCache::new(&built.tx)
            .p2wpkh_signature_hash(0, &redeem, utxo.value, EcdsaSighashType::All)
            .unwrap()
            .to_byte_array();
        verify(msg, input.witness.nth(0).unwrap(), &signer);
    }

    #[tokio::test]
    async fn legacy_spend_signs_script_sig() {
        let info = request(p2pkh_address(1), 20000, 1000);
        let signer = Signer::from_wif(&info.wif, Network::Bitcoin).unwrap();
        let prev = funding_tx(signer.p2pkh_script(), 0, 30000);
        let fetcher = FakeExplorer::default().with_tx(&prev);
        let mut utxo = utxo(0, 0, 30000, 4);
        utxo.out_point.txid = prev.compute_txid();

        let built = build_transaction(&info, vec![utxo], &fetcher, &BuildConfig::default())
            .await
            .unwrap();

        let input = &built.tx.input[0];
        assert!(input.witness.is_empty());
        let pushes: Vec<Vec<u8>> = input
            .script_sig
            .instructions()
            .map(|i| i.unwrap().push_bytes().unwrap().as_bytes().to_vec())
            .collect();
        assert_eq!(pushes.len(), 2);
        assert_eq!(pushes[1], signer.public_key().to_bytes());

        let msg = SighashCache::new(&built.tx)
            .legacy_signature_hash(0, &signer.p2pkh_script(), EcdsaSighashType::All.to_u32())
            .unwrap()
            .to_byte_array();
        verify(msg, &pushes[0], &signer);
        assert_eq!(built.summary.vsize, built.summary.size);
    }

    #[tokio::test]
    async fn example_c_skip_keeps_pre_skip_totals() {
        // the only utxo is legacy and its funding transaction can't be fetched
        let info = request(p2pkh_address(1), 50000, 1000);
        let fetcher = FakeExplorer::default();

        let err = build_transaction(&info, vec![utxo(5, 0, 100000, 6)], &fetcher, &BuildConfig::default())
            .await
            .unwrap_err();

        assert_eq!(fetcher.fetch_count(), 1);
        match err {
            BuildError::UnderfundedInputs {
                bound,
                required,
                total_input,
            } => {
                assert_eq!(bound, Amount::ZERO);
                // amount 50000 + change 49000 + fee 1000, all from the pre-skip total
                assert_eq!(required, Amount::from_sat(100000));
                assert_eq!(total_input, Amount::from_sat(100000));
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[tokio::test]
    async fn tolerated_skip_shrinks_inputs_not_resolution() {
        let info = request(p2pkh_address(1), 50000, 1000);
        let signer = Signer::from_wif(&info.wif, Network::Bitcoin).unwrap();
        let prev = funding_tx(signer.p2pkh_script(), 0, 51000);
        let fetcher = FakeExplorer::default().with_tx(&prev);
        let mut good = utxo(0, 0, 51000, 6);
        good.out_point.txid = prev.compute_txid();
        let lost = utxo(8, 1, 400, 1);

        let built = build_transaction(&info, vec![good, lost.clone()], &fetcher, &BuildConfig::default())
            .await
            .unwrap();

        assert_eq!(built.resolution.total_input, Amount::from_sat(51400));
        assert_eq!(built.resolution.change, Amount::from_sat(400));
        assert_eq!(built.skipped, vec![lost.out_point]);
        assert_eq!(built.tx.input.len(), 1);
        assert_eq!(built.tx.output.len(), 1);
        assert_eq!(built.tx.output[0].value, Amount::from_sat(50000));
    }

    #[tokio::test]
    async fn rejects_foreign_network_address() {
        let mut info = request(p2wpkh_address(1), 1000, 100);
        info.recipient = "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx".to_string();
        let err = build_transaction(&info, vec![utxo(1, 0, 5000, 1)], &FakeExplorer::default(), &BuildConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Address { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
