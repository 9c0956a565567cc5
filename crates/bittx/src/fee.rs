use super::*;

/// Outcome of reconciling a requested amount and fee with the funds on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Sum of every selected utxo, fixed before any input is bound.
    pub total_input: Amount,
    pub requested: Amount,
    pub amount: Amount,
    pub fee: Amount,
    pub change: Amount,
    /// Whether the change is paid back to the sender or left to miners.
    pub change_output: bool,
}

impl Resolution {
    /// Value leaving through outputs.
    pub fn outputs_value(&self) -> Amount {
        if self.change_output {
            self.amount + self.change
        } else {
            self.amount
        }
    }
}

pub fn resolve(
    total_input: Amount,
    requested: Amount,
    fee: Amount,
    cfg: &BuildConfig,
) -> Result<Resolution, BuildError> {
    let insufficient = |amount| BuildError::InsufficientFunds {
        total_input,
        amount,
        fee,
    };
    if fee > total_input {
        return Err(insufficient(requested));
    }

    let mut amount = requested;
    match requested.checked_add(fee) {
        Some(needed) if needed == total_input => {
            // exact match means "send everything": the fee comes out of the amount
            amount = requested.checked_sub(fee).ok_or(insufficient(requested))?;
            debug!("max send: amount {} -> {}", requested, amount);
        }
        Some(needed) if needed < total_input => {}
        _ => match cfg.amount_policy {
            AmountPolicy::Clamp => {
                amount = total_input - fee;
                warn!(
                    "amount {} plus fee {} exceeds input {}, sending {}",
                    requested, fee, total_input, amount
                );
            }
            AmountPolicy::Strict => {
                return Err(BuildError::OverSpend {
                    total_input,
                    amount: requested,
                    fee,
                })
            }
        },
    }

    if amount == Amount::ZERO {
        return Err(insufficient(amount));
    }
    let change = total_input
        .checked_sub(amount + fee)
        .ok_or(insufficient(amount))?;
    let change_output = change > cfg.dust_threshold;
    if !change_output && change > Amount::ZERO {
        info!("change {} is dust, absorbed into fee", change);
    }

    Ok(Resolution {
        total_input,
        requested,
        amount,
        fee,
        change,
        change_output,
    })
}
