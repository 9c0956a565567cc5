use bitcoin::absolute::LockTime;
use bitcoin::blockdata::transaction::{Transaction, TxIn, TxOut};
use bitcoin::transaction::Version;
use bitcoin::{Address, Amount, Network, OutPoint, ScriptBuf, Sequence, Txid, Witness};
use datatypes::types;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub mod build_helper;
pub mod builder;
pub mod error;
pub mod explorer;
pub mod fee;
pub mod script_type;
pub mod selector;
pub mod signer;
pub mod vsize;

pub use error::{BuildError, ErrorKind};

/// Bitcoin Core's dust limit for P2PKH outputs.
pub const DUST_THRESHOLD: u64 = 546;

/// What to do when `amount + fee` exceeds the funds on hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmountPolicy {
    /// Lower the amount to `total_input - fee`.
    #[default]
    Clamp,
    /// Fail with [`BuildError::OverSpend`].
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    pub network: Network,
    pub dust_threshold: Amount,
    pub amount_policy: AmountPolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            network: Network::Bitcoin,
            dust_threshold: Amount::from_sat(DUST_THRESHOLD),
            amount_policy: AmountPolicy::Clamp,
        }
    }
}

impl BuildConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Default::default()
        }
    }
}

pub(crate) fn parse_address(addr: &str, network: Network) -> Result<Address, BuildError> {
    Address::from_str(addr)
        .and_then(|a| a.require_network(network))
        .map_err(|source| BuildError::Address {
            address: addr.to_string(),
            source,
        })
}
