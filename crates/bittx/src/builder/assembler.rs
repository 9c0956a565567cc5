use super::*;
use bitcoin::psbt::Psbt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Empty,
    InputsBound,
    OutputsAdded,
    Signed,
    Finalized,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Empty => "empty",
            Stage::InputsBound => "inputs bound",
            Stage::OutputsAdded => "outputs added",
            Stage::Signed => "signed",
            Stage::Finalized => "finalized",
        }
    }
}

/// Walks a transfer from bound inputs to final bytes, one stage at a time.
pub struct TxAssembler {
    script_type: ScriptType,
    resolution: Resolution,
    stage: Stage,
    inputs: Vec<InputDescriptor>,
    outputs: Vec<TxOut>,
    psbt: Option<Psbt>,
}

impl TxAssembler {
    pub fn new(script_type: ScriptType, resolution: Resolution) -> Self {
        Self {
            script_type,
            resolution,
            stage: Stage::Empty,
            inputs: vec![],
            outputs: vec![],
            psbt: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.outputs
    }

    fn require(&self, stage: Stage) -> Result<(), BuildError> {
        if self.stage != stage {
            return Err(BuildError::Stage {
                expected: stage.name(),
                actual: self.stage.name(),
            });
        }
        Ok(())
    }

    pub fn bind_inputs(&mut self, inputs: Vec<InputDescriptor>) -> Result<(), BuildError> {
        self.require(Stage::Empty)?;
        self.inputs = inputs;
        self.stage = Stage::InputsBound;
        Ok(())
    }

    /// Recipient first, then change back to the sender when it beats the dust threshold.
    pub fn add_outputs(&mut self, recipient: &Address, sender: &Address) -> Result<(), BuildError> {
        self.require(Stage::InputsBound)?;
        self.outputs.push(TxOut {
            value: self.resolution.amount,
            script_pubkey: recipient.script_pubkey(),
        });
        if self.resolution.change_output {
            self.outputs.push(TxOut {
                value: self.resolution.change,
                script_pubkey: sender.script_pubkey(),
            });
        }
        self.stage = Stage::OutputsAdded;
        Ok(())
    }

    /// Inputs that survived binding must still pay for every output and the fee.
    pub fn ensure_funded(&self) -> Result<(), BuildError> {
        let bound: Amount = self.inputs.iter().map(|i| i.utxo.value).sum();
        let required = self.outputs.iter().map(|o| o.value).sum::<Amount>() + self.resolution.fee;
        if bound < required {
            return Err(BuildError::UnderfundedInputs {
                bound,
                required,
                total_input: self.resolution.total_input,
            });
        }
        Ok(())
    }

    pub fn sign(&mut self, signer: &Signer) -> Result<(), BuildError> {
        self.require(Stage::OutputsAdded)?;
        self.ensure_funded()?;

        let mut psbt = self.to_psbt()?;
        signer.sign_psbt(&mut psbt, self.script_type)?;
        self.psbt = Some(psbt);
        self.stage = Stage::Signed;
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<(), BuildError> {
        self.require(Stage::Signed)?;
        let psbt = self
            .psbt
            .as_mut()
            .ok_or_else(|| BuildError::signing(0, "nothing to finalize"))?;
        signer::finalize_psbt(psbt, self.script_type)?;
        self.stage = Stage::Finalized;
        Ok(())
    }

    pub fn serialize(self) -> Result<(Transaction, TxSummary), BuildError> {
        self.require(Stage::Finalized)?;
        let psbt = self
            .psbt
            .ok_or_else(|| BuildError::signing(0, "nothing to serialize"))?;
        let tx = psbt.extract_tx_unchecked_fee_rate();
        let summary = vsize::summarize(&tx);
        info!(
            "assembled {} ({} bytes, {} vbytes)",
            summary.txid, summary.size, summary.vsize
        );
        Ok((tx, summary))
    }

    fn to_psbt(&self) -> Result<Psbt, BuildError> {
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: self
                .inputs
                .iter()
                .map(|d| TxIn {
                    previous_output: d.utxo.out_point,
                    script_sig: ScriptBuf::new(),
                    sequence: d.sequence,
                    witness: Witness::new(),
                })
                .collect(),
            output: self.outputs.clone(),
        };

        let mut psbt = Psbt::from_unsigned_tx(tx).map_err(|e| BuildError::signing(0, e))?;
        for (input, descriptor) in psbt.inputs.iter_mut().zip(&self.inputs) {
            input.witness_utxo = descriptor.witness_utxo.clone();
            input.non_witness_utxo = descriptor.non_witness_utxo.clone();
            input.redeem_script = descriptor.redeem_script.clone();
        }
        Ok(psbt)
    }
}
