//! Client-side proxy for the on-chain data committee registry contract.

use ethers_contract::Contract;
use ethers_core::abi::Abi;
use ethers_core::types::{Address, Bytes, TxHash, U256};
use ethers_providers::Middleware;
use std::sync::Arc;

pub const ABI: &str = include_str!("../contracts/data_committee.json");

#[derive(Debug)]
pub enum Error {
    /// The embedded registry ABI failed to parse.
    Abi(ethers_core::abi::Error),
    /// The call arguments did not match the ABI.
    Encoding(ethers_contract::AbiError),
    /// The node rejected the submission.
    Submission(String),
    /// The configured registry address is the zero address.
    ZeroContractAddress,
}

/// Wraps the registry contract for the single state-changing call the
/// committee tooling performs.
pub struct DataCommitteeContract<M> {
    contract: Contract<M>,
}

impl<M: Middleware> DataCommitteeContract<M> {
    pub fn new(address: Address, client: Arc<M>) -> Result<Self, Error> {
        if address == Address::zero() {
            return Err(Error::ZeroContractAddress);
        }
        let abi = Abi::load(ABI.as_bytes()).map_err(Error::Abi)?;
        Ok(Self {
            contract: Contract::new(address, abi, client),
        })
    }

    /// The registry contract's address.
    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Submits `setupCommittee` and returns the broadcast transaction hash.
    ///
    /// Returns as soon as the node accepts the transaction. Whether it is
    /// ever mined is for the caller to check elsewhere.
    pub async fn setup_committee(
        &self,
        required_signatures: u64,
        urls: Vec<String>,
        addrs_bytes: Vec<u8>,
    ) -> Result<TxHash, Error> {
        let call = self
            .contract
            .method::<_, ()>(
                "setupCommittee",
                (
                    U256::from(required_signatures),
                    urls,
                    Bytes::from(addrs_bytes),
                ),
            )
            .map_err(Error::Encoding)?;

        let pending_tx = call
            .send()
            .await
            .map_err(|e| Error::Submission(e.to_string()))?;

        Ok(*pending_tx)
    }
}
