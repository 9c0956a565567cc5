use super::*;

/// How the sender's outputs are locked, guessed from the address prefix alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScriptType {
    /// BIP84, bech32.
    P2wpkh,
    /// BIP49, P2WPKH nested in P2SH.
    P2shP2wpkh,
    /// BIP44, base58 pubkey hash.
    P2pkh,
}

impl ScriptType {
    pub fn classify(address: &str, network: Network) -> Self {
        let (hrp, p2sh, legacy): (&str, &str, &[&str]) = match network {
            Network::Bitcoin => ("bc1", "3", &["1"]),
            Network::Regtest => ("bcrt1", "2", &["m", "n"]),
            _ => ("tb1", "2", &["m", "n"]),
        };

        if address.to_ascii_lowercase().starts_with(hrp) {
            ScriptType::P2wpkh
        } else if address.starts_with(p2sh) {
            ScriptType::P2shP2wpkh
        } else {
            if !legacy.iter().any(|p| address.starts_with(p)) {
                warn!("unrecognized address prefix {}, treating as p2pkh", address);
            }
            ScriptType::P2pkh
        }
    }

    pub fn is_segwit(&self) -> bool {
        !matches!(self, ScriptType::P2pkh)
    }
}
