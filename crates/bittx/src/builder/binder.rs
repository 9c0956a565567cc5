use super::*;
use bitcoin::consensus::encode::deserialize_hex;
use std::collections::HashMap;

/// One utxo turned into everything the signer needs for it.
#[derive(Debug, Clone)]
pub struct InputDescriptor {
    pub utxo: types::Utxo,
    pub sequence: Sequence,
    /// Prevout script and value, for segwit spends.
    pub witness_utxo: Option<TxOut>,
    /// The whole funding transaction, for legacy spends.
    pub non_witness_utxo: Option<Transaction>,
    pub redeem_script: Option<ScriptBuf>,
}

#[derive(Debug, Default)]
pub struct BoundInputs {
    pub inputs: Vec<InputDescriptor>,
    /// Legacy utxos left out because their funding transaction was unavailable.
    pub skipped: Vec<OutPoint>,
}

impl BoundInputs {
    pub fn value(&self) -> Amount {
        self.inputs.iter().map(|i| i.utxo.value).sum()
    }
}

pub fn sequence_for(rbf: bool) -> Sequence {
    if rbf {
        Sequence::ENABLE_RBF_NO_LOCKTIME
    } else {
        Sequence::MAX
    }
}

pub struct InputBinder<'a, F> {
    script_type: ScriptType,
    signer: &'a Signer,
    sequence: Sequence,
    fetcher: &'a F,
    prev_txs: HashMap<Txid, Option<Transaction>>,
}

impl<'a, F: TxFetcher> InputBinder<'a, F> {
    pub fn new(script_type: ScriptType, signer: &'a Signer, rbf: bool, fetcher: &'a F) -> Self {
        Self {
            script_type,
            signer,
            sequence: sequence_for(rbf),
            fetcher,
            prev_txs: HashMap::new(),
        }
    }

    /// Binds `utxos` in order. Legacy utxos whose funding transaction can't be
    /// fetched are skipped, never fatal.
    pub async fn bind_all(mut self, utxos: &[types::Utxo]) -> Result<BoundInputs, BuildError> {
        let p2wpkh_script = if self.script_type.is_segwit() {
            Some(self.signer.p2wpkh_script()?)
        } else {
            None
        };

        let mut bound = BoundInputs::default();
        for utxo in utxos {
            let descriptor = match (self.script_type, &p2wpkh_script) {
                (ScriptType::P2wpkh, Some(script)) => Some(InputDescriptor {
                    witness_utxo: Some(TxOut {
                        value: utxo.value,
                        script_pubkey: script.clone(),
                    }),
                    ..self.bare(utxo)
                }),
                (ScriptType::P2shP2wpkh, Some(script)) => Some(InputDescriptor {
                    witness_utxo: Some(TxOut {
                        value: utxo.value,
                        script_pubkey: ScriptBuf::new_p2sh(&script.script_hash()),
                    }),
                    redeem_script: Some(script.clone()),
                    ..self.bare(utxo)
                }),
                _ => self.bind_legacy(utxo).await,
            };

            match descriptor {
                Some(d) => bound.inputs.push(d),
                None => {
                    warn!("skip utxo {}, funding transaction unavailable", utxo.out_point);
                    bound.skipped.push(utxo.out_point);
                }
            }
        }

        debug!(
            "bound {} inputs worth {}, skipped {}",
            bound.inputs.len(),
            bound.value(),
            bound.skipped.len()
        );
        Ok(bound)
    }

    fn bare(&self, utxo: &types::Utxo) -> InputDescriptor {
        InputDescriptor {
            utxo: utxo.clone(),
            sequence: self.sequence,
            witness_utxo: None,
            non_witness_utxo: None,
            redeem_script: None,
        }
    }

    async fn bind_legacy(&mut self, utxo: &types::Utxo) -> Option<InputDescriptor> {
        let prev_tx = self.previous_tx(&utxo.out_point.txid).await?;
        if prev_tx.output.len() <= utxo.out_point.vout as usize {
            warn!("{} has no output {}", utxo.out_point.txid, utxo.out_point.vout);
            return None;
        }

        Some(InputDescriptor {
            non_witness_utxo: Some(prev_tx),
            ..self.bare(utxo)
        })
    }

    async fn previous_tx(&mut self, txid: &Txid) -> Option<Transaction> {
        if let Some(cached) = self.prev_txs.get(txid) {
            return cached.clone();
        }

        let fetched = match self.fetcher.fetch_tx_hex(txid).await {
            Ok(hex) if hex.is_empty() => {
                warn!("fetch transaction {} returned no data", txid);
                None
            }
            Ok(hex) => match deserialize_hex::<Transaction>(&hex) {
                Ok(tx) if tx.compute_txid() == *txid => Some(tx),
                Ok(tx) => {
                    warn!("asked for {} but got {}", txid, tx.compute_txid());
                    None
                }
                Err(e) => {
                    warn!("undecodable transaction {}: {}", txid, e);
                    None
                }
            },
            Err(e) => {
                warn!("fetch transaction {} failed: {}", txid, e);
                None
            }
        };
        self.prev_txs.insert(*txid, fetched.clone());
        fetched
    }
}
