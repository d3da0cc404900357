//! Configuration consumed by the data committee tooling.
//!
//! The configuration is loaded once from a TOML file and read-only
//! thereafter.

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Error {
    /// The config file could not be read from disk.
    Io(std::io::Error),
    /// The config file is not valid TOML or is missing fields.
    Parse(toml::de::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub l1: L1Config,
    pub member: MemberConfig,
}

/// The L1 network carrying the data committee registry contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct L1Config {
    /// HTTP JSON-RPC endpoint of an L1 execution node.
    pub rpc_url: String,
    /// Address of the data committee registry contract.
    pub data_committee_address: Address,
    /// Chain ID of the L1 network.
    pub chain_id: u64,
}

/// This committee member's own identity and service endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberConfig {
    /// Path to the encrypted keystore holding the member identity key.
    pub keystore_path: PathBuf,
    /// Password for `keystore_path`.
    pub keystore_password: String,
    /// Host at which other participants can reach the member's service.
    pub host: String,
    /// Port of the member's service.
    pub port: u16,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = fs::read(path)?;
        toml::from_slice(&bytes).map_err(Into::into)
    }
}

impl MemberConfig {
    /// The URL under which the member's service will be registered on-chain.
    pub fn service_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
