use super::*;
use crate::config::{Cli, Config};

/// Request checks that belong to the caller side, before anything reaches the builder.
pub fn transfer_info(cli: &Cli, cfg: &Config) -> Result<types::TransferInfo, BuildError> {
    let sender = cli.from.clone().unwrap_or_else(|| cfg.sign.sender.clone());
    let sender = sender.trim().to_string();
    let recipient = cli.to.trim().to_string();

    if sender.is_empty() {
        return Err(BuildError::Validation("sender address is empty".into()));
    }
    if recipient.is_empty() {
        return Err(BuildError::Validation("recipient address is empty".into()));
    }
    if cfg.sign.wif.trim().is_empty() {
        return Err(BuildError::Validation("private key is empty".into()));
    }
    if cli.amount == 0 {
        return Err(BuildError::Validation("amount must be positive".into()));
    }

    Ok(types::TransferInfo {
        sender,
        recipient,
        wif: cfg.sign.wif.trim().to_string(),
        amount: cli.amount,
        fee: cli.fee,
        rbf: cli.rbf,
        broadcast: cli.broadcast,
    })
}
