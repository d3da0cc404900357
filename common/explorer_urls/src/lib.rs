//! Maps L1 chain IDs to block-explorer URLs so a freshly broadcast transaction
//! can be reported in a form an operator can follow up on.

use ethers_core::types::TxHash;

pub const MAINNET_CHAIN_ID: u64 = 1;
pub const RINKEBY_CHAIN_ID: u64 = 4;
pub const GOERLI_CHAIN_ID: u64 = 5;
pub const LOCAL_CHAIN_ID: u64 = 1337;

/// Public networks with an explorer the transaction hash can be appended to.
const TX_EXPLORERS: &[(u64, &str)] = &[
    (MAINNET_CHAIN_ID, "https://etherscan.io/tx/"),
    (RINKEBY_CHAIN_ID, "https://rinkeby.etherscan.io/tx/"),
    (GOERLI_CHAIN_ID, "https://goerli.etherscan.io/tx/"),
];

/// Returns a human-readable status message for a broadcast transaction.
///
/// The message only says where to look for the transaction. It carries no
/// information about whether the transaction was included in a block.
pub fn tx_status_message(chain_id: u64, tx_hash: TxHash) -> String {
    if chain_id == LOCAL_CHAIN_ID {
        return format!("Local network. Tx Hash: {:?}", tx_hash);
    }

    match TX_EXPLORERS.iter().find(|(id, _)| *id == chain_id) {
        Some((_, explorer)) => format!("Check tx status: {}{:?}", explorer, tx_hash),
        None => format!("Unknown network. Tx Hash: {:?}", tx_hash),
    }
}
