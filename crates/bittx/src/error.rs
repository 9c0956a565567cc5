use bitcoin::address::ParseError as AddressError;
use bitcoin::key::FromWifError;
use bitcoin::{Amount, NetworkKind};
use thiserror::Error;

/// Coarse classification handed back to callers as `failure{kind, message}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InsufficientFunds,
    OverSpend,
    Signing,
    Broadcast,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::OverSpend => "over_spend",
            ErrorKind::Signing => "signing",
            ErrorKind::Broadcast => "broadcast",
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid address {address}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("invalid private key: {0}")]
    Key(#[from] FromWifError),

    #[error("private key is for {key:?} but the builder runs on {expected:?}")]
    NetworkMismatch {
        key: NetworkKind,
        expected: NetworkKind,
    },

    #[error("segwit senders need a compressed public key")]
    UncompressedKey,

    #[error("insufficient funds: total input {total_input}, amount {amount}, fee {fee}")]
    InsufficientFunds {
        total_input: Amount,
        amount: Amount,
        fee: Amount,
    },

    #[error("amount {amount} plus fee {fee} exceeds total input {total_input}")]
    OverSpend {
        total_input: Amount,
        amount: Amount,
        fee: Amount,
    },

    #[error("bound inputs {bound} do not cover outputs plus fee {required} (resolved against {total_input})")]
    UnderfundedInputs {
        bound: Amount,
        required: Amount,
        total_input: Amount,
    },

    #[error("signing failed at input {index}: {reason}")]
    Signing { index: usize, reason: String },

    #[error("transaction is {actual} but {expected} was required")]
    Stage {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("broadcast failed: {0}")]
    Broadcast(String),
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Validation(_)
            | BuildError::Address { .. }
            | BuildError::Key(_)
            | BuildError::NetworkMismatch { .. }
            | BuildError::UncompressedKey => ErrorKind::Validation,
            BuildError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            BuildError::OverSpend { .. } => ErrorKind::OverSpend,
            BuildError::UnderfundedInputs { .. }
            | BuildError::Signing { .. }
            | BuildError::Stage { .. } => ErrorKind::Signing,
            BuildError::Broadcast(_) => ErrorKind::Broadcast,
        }
    }

    pub(crate) fn signing(index: usize, reason: impl ToString) -> Self {
        BuildError::Signing {
            index,
            reason: reason.to_string(),
        }
    }
}
