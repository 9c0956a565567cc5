use super::*;
use crate::script_type::ScriptType;
use bitcoin::ecdsa::Signature;
use bitcoin::hashes::Hash;
use bitcoin::psbt::Psbt;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{CompressedPublicKey, NetworkKind, PrivateKey, PublicKey};
use secp256k1::{All, Message, Secp256k1};

const SIGHASH_TYPE: EcdsaSighashType = EcdsaSighashType::All;

/// The one key every input of a transfer is signed with.
pub struct Signer {
    private_key: PrivateKey,
    public_key: PublicKey,
    secp: Secp256k1<All>,
}

impl Signer {
    pub fn from_wif(wif: &str, network: Network) -> Result<Self, BuildError> {
        let private_key = PrivateKey::from_wif(wif)?;
        let expected = NetworkKind::from(network);
        if private_key.network != expected {
            return Err(BuildError::NetworkMismatch {
                key: private_key.network,
                expected,
            });
        }

        let secp = Secp256k1::new();
        let public_key = private_key.public_key(&secp);
        Ok(Self {
            private_key,
            public_key,
            secp,
        })
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// `OP_0 <hash160(pubkey)>`, also the redeem script of a nested segwit output.
    pub fn p2wpkh_script(&self) -> Result<ScriptBuf, BuildError> {
        let compressed = CompressedPublicKey::from_private_key(&self.secp, &self.private_key)
            .map_err(|_| BuildError::UncompressedKey)?;
        Ok(ScriptBuf::new_p2wpkh(&compressed.wpubkey_hash()))
    }

    pub fn p2pkh_script(&self) -> ScriptBuf {
        ScriptBuf::new_p2pkh(&self.public_key.pubkey_hash())
    }

    /// Adds a SIGHASH_ALL partial signature to every input of `psbt`.
    pub fn sign_psbt(&self, psbt: &mut Psbt, script_type: ScriptType) -> Result<(), BuildError> {
        let mut sighash_cache = SighashCache::new(&psbt.unsigned_tx);

        for (idx, input) in psbt.inputs.iter_mut().enumerate() {
            let digest = match script_type {
                ScriptType::P2pkh => {
                    let prev_tx = input
                        .non_witness_utxo
                        .as_ref()
                        .ok_or_else(|| BuildError::signing(idx, "missing previous transaction"))?;
                    let vout = psbt.unsigned_tx.input[idx].previous_output.vout;
                    let prev_out = prev_tx
                        .output
                        .get(vout as usize)
                        .ok_or_else(|| BuildError::signing(idx, "previous output not found"))?;
                    sighash_cache
                        .legacy_signature_hash(idx, &prev_out.script_pubkey, SIGHASH_TYPE.to_u32())
                        .map_err(|e| BuildError::signing(idx, e))?
                        .to_byte_array()
                }
                ScriptType::P2wpkh | ScriptType::P2shP2wpkh => {
                    let utxo = input
                        .witness_utxo
                        .as_ref()
                        .ok_or_else(|| BuildError::signing(idx, "missing witness commitment"))?;
                    let script_code = if script_type == ScriptType::P2shP2wpkh {
                        input
                            .redeem_script
                            .as_ref()
                            .ok_or_else(|| BuildError::signing(idx, "missing redeem script"))?
                    } else {
                        &utxo.script_pubkey
                    };
                    sighash_cache
                        .p2wpkh_signature_hash(idx, script_code, utxo.value, SIGHASH_TYPE)
                        .map_err(|e| BuildError::signing(idx, e))?
                        .to_byte_array()
                }
            };

            let msg = Message::from_digest(digest);
            let signature = self.secp.sign_ecdsa(&msg, &self.private_key.inner);
            input.partial_sigs.insert(
                self.public_key,
                Signature {
                    signature,
                    sighash_type: SIGHASH_TYPE,
                },
            );
            input.sighash_type = Some(SIGHASH_TYPE.into());
            debug!("signed input {} ({:?})", idx, script_type);
        }

        Ok(())
    }
}

/// Turns each input's partial signature into its final scriptSig and witness.
pub fn finalize_psbt(psbt: &mut Psbt, script_type: ScriptType) -> Result<(), BuildError> {
    for (idx, input) in psbt.inputs.iter_mut().enumerate() {
        let (public_key, sig) = input
            .partial_sigs
            .iter()
            .next()
            .map(|(pk, sig)| (*pk, *sig))
            .ok_or_else(|| BuildError::signing(idx, "input is not signed"))?;

        match script_type {
            ScriptType::P2pkh => {
                let sig_push = PushBytesBuf::try_from(sig.to_vec())
                    .map_err(|e| BuildError::signing(idx, e))?;
                input.final_script_sig = Some(
                    Builder::new()
                        .push_slice(sig_push)
                        .push_key(&public_key)
                        .into_script(),
                );
            }
            ScriptType::P2wpkh => {
                input.final_script_witness = Some(p2wpkh_witness(&sig, &public_key));
            }
            ScriptType::P2shP2wpkh => {
                let redeem_script = input
                    .redeem_script
                    .as_ref()
                    .ok_or_else(|| BuildError::signing(idx, "missing redeem script"))?;
                let redeem_push = PushBytesBuf::try_from(redeem_script.to_bytes())
                    .map_err(|e| BuildError::signing(idx, e))?;
                input.final_script_sig = Some(Builder::new().push_slice(redeem_push).into_script());
                input.final_script_witness = Some(p2wpkh_witness(&sig, &public_key));
            }
        }

        input.partial_sigs.clear();
        input.sighash_type = None;
        input.redeem_script = None;
    }

    Ok(())
}

fn p2wpkh_witness(sig: &Signature, public_key: &PublicKey) -> Witness {
    let mut witness = Witness::new();
    witness.push(sig.to_vec());
    witness.push(public_key.to_bytes());
    witness
}
