use super::*;
use bitcoin::{Amount, Network};
use clap::Parser;
use serde::Deserialize;
use std::{fmt, fs, str::FromStr};

#[derive(Parser, Debug)]
#[command(version, about = "Build, sign and optionally broadcast a bitcoin transfer")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Recipient address
    #[arg(long)]
    pub to: String,

    /// Amount to send, in sats
    #[arg(long)]
    pub amount: u64,

    /// Absolute fee, in sats
    #[arg(long)]
    pub fee: u64,

    /// Sending address, overrides `sign.sender`
    #[arg(long)]
    pub from: Option<String>,

    /// Signal replace-by-fee on every input
    #[arg(long)]
    pub rbf: bool,

    /// Push the signed transaction to the explorer
    #[arg(long)]
    pub broadcast: bool,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub bitcoin: BitcoinConfig,
    #[serde(default)]
    pub mempool: MempoolConfig,
    #[serde(default)]
    pub builder: BuilderConfig,
    pub sign: SignConfig,
}

#[derive(Deserialize, Debug)]
pub struct BitcoinConfig {
    pub network: String,
}

#[derive(Deserialize, Debug)]
pub struct MempoolConfig {
    pub url: String,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            url: mempool::MEMPOOL_URL.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct BuilderConfig {
    pub dust_threshold: u64,
    pub strict_amount: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            dust_threshold: bittx::DUST_THRESHOLD,
            strict_amount: false,
        }
    }
}

#[derive(Deserialize)]
pub struct SignConfig {
    pub wif: String,
    pub sender: String,
}

impl fmt::Debug for SignConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignConfig")
            .field("wif", &"<redacted>")
            .field("sender", &self.sender)
            .finish()
    }
}

impl Config {
    pub fn network(&self) -> Result<Network> {
        Network::from_str(&self.bitcoin.network)
            .map_err(|e| anyhow!("invalid network {}: {}", self.bitcoin.network, e))
    }

    pub fn build_config(&self) -> Result<BuildConfig> {
        Ok(BuildConfig {
            network: self.network()?,
            dust_threshold: Amount::from_sat(self.builder.dust_threshold),
            amount_policy: if self.builder.strict_amount {
                AmountPolicy::Strict
            } else {
                AmountPolicy::Clamp
            },
        })
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_content =
        fs::read_to_string(path).with_context(|| format!("failed to read config file {}", path))?;
    parse_config(&config_content)
}

fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).context("failed to parse config file")
}
