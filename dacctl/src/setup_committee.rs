//! Registers this data committee member with the on-chain registry contract.
//!
//! The workflow is a single linear pipeline: confirm with the operator,
//! decrypt the L1 signer and the member identity, submit one
//! `setupCommittee` transaction and report where to look for it. It never
//! waits for confirmations and never retries.

use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use committee_config::Config;
use dac_contract::DataCommitteeContract;
use ethers_core::types::{Address, TxHash};
use ethers_middleware::SignerMiddleware;
use ethers_providers::{Http, Middleware, Provider};
use ethers_signers::Signer;
use explorer_urls::tx_status_message;
use log::info;
use std::io::{self, BufRead};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use wallet_utils::{
    decrypt_keystore_address, load_keystore_wallet, read_password_file, ZeroizeString,
};

pub const CMD: &str = "setup-committee";
pub const CONFIG_FLAG: &str = "config";
pub const YES_FLAG: &str = "yes";
pub const KEYSTORE_PATH_FLAG: &str = "keystore-path";
pub const PASSWORD_FLAG: &str = "password";
pub const PASSWORD_FILE_FLAG: &str = "password-file";

/// Number of committee signatures the registry will require. A single
/// member is registered per run, so the quorum threshold is one.
const REQUIRED_SIGNATURES: u64 = 1;

pub fn cli_app() -> Command {
    Command::new(CMD)
        .about(
            "Registers this data committee member with the on-chain registry \
            contract. Submits a single setupCommittee transaction and exits \
            without waiting for confirmations; use a block explorer and the \
            printed transaction hash to check inclusion.",
        )
        .arg(
            Arg::new(CONFIG_FLAG)
                .long(CONFIG_FLAG)
                .value_name("FILE")
                .help("Path to a TOML configuration file.")
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(YES_FLAG)
                .long(YES_FLAG)
                .short('y')
                .help("If present, do not ask for confirmation before submitting.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(KEYSTORE_PATH_FLAG)
                .long(KEYSTORE_PATH_FLAG)
                .value_name("FILE")
                .help(
                    "Path to the encrypted keystore of the L1 account that pays \
                    for the registration transaction.",
                )
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(PASSWORD_FLAG)
                .long(PASSWORD_FLAG)
                .value_name("PASSWORD")
                .help("Password of the L1 keystore.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(PASSWORD_FILE_FLAG)
                .long(PASSWORD_FILE_FLAG)
                .value_name("FILE")
                .help(
                    "Path to a file containing the password of the L1 keystore. \
                    Trailing newlines are stripped.",
                )
                .action(ArgAction::Set)
                .conflicts_with(PASSWORD_FLAG),
        )
        .group(
            ArgGroup::new("l1-password")
                .args([PASSWORD_FLAG, PASSWORD_FILE_FLAG])
                .required(true),
        )
}

pub fn cli_run(matches: &ArgMatches) -> Result<(), String> {
    let config_path: &String = matches
        .get_one(CONFIG_FLAG)
        .ok_or_else(|| format!("Expected --{} flag", CONFIG_FLAG))?;
    let config = Config::load(config_path)
        .map_err(|e| format!("Unable to load --{} {}: {:?}", CONFIG_FLAG, config_path, e))?;

    if !matches.get_flag(YES_FLAG) && !confirm_setup(&mut io::stdin().lock())? {
        // The operator declined. Nothing has been touched yet.
        return Ok(());
    }

    let keystore_path: &String = matches
        .get_one(KEYSTORE_PATH_FLAG)
        .ok_or_else(|| format!("Expected --{} flag", KEYSTORE_PATH_FLAG))?;
    let password = l1_password(matches)?;

    let wallet =
        load_keystore_wallet(keystore_path, password.as_str())?.with_chain_id(config.l1.chain_id);

    println!(
        "Data committee contract: {:?}",
        config.l1.data_committee_address
    );

    info!(
        "Decrypting committee member key from {:?}",
        config.member.keystore_path
    );
    let member = CommitteeMember {
        address: decrypt_keystore_address(
            &config.member.keystore_path,
            &config.member.keystore_password,
        )?,
        service_url: config.member.service_url(),
    };
    println!("Committee member address: {:?}", member.address);
    println!("Committee member service URL: {}", member.service_url);

    // The workflow is one blocking call chain; a current-thread runtime is
    // all the contract submission needs.
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Unable to start tokio runtime: {:?}", e))?;
    let provider = Provider::<Http>::try_from(config.l1.rpc_url.as_str())
        .map_err(|e| format!("Invalid L1 RPC URL {}: {:?}", config.l1.rpc_url, e))?;
    let client = SignerMiddleware::new(provider, wallet);
    let contract = DataCommitteeContract::new(config.l1.data_committee_address, Arc::new(client))
        .map_err(|e| format!("Unable to construct registry contract: {:?}", e))?;

    let registrar = OnchainRegistrar {
        runtime: &runtime,
        contract: &contract,
    };
    let tx_hash = register_member(&registrar, &member)?;

    println!("{}", tx_status_message(config.l1.chain_id, tx_hash));

    Ok(())
}

/// Reads the L1 keystore password from whichever of the two password flags
/// was supplied.
fn l1_password(matches: &ArgMatches) -> Result<ZeroizeString, String> {
    match matches.get_one::<String>(PASSWORD_FLAG) {
        Some(password) => Ok(ZeroizeString::from(password.clone())),
        None => {
            let path: &String = matches.get_one(PASSWORD_FILE_FLAG).ok_or_else(|| {
                format!(
                    "Expected --{} or --{} flag",
                    PASSWORD_FLAG, PASSWORD_FILE_FLAG
                )
            })?;
            read_password_file(path)
        }
    }
}

/// Asks the operator to acknowledge the registration before any keys are
/// touched. Returns `Ok(false)` on anything other than an explicit yes,
/// including an empty line or EOF.
fn confirm_setup(input: &mut impl BufRead) -> Result<bool, String> {
    println!("*WARNING* Are you sure you want to register this committee member? [y/N]: ");
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| format!("Unable to read confirmation input: {:?}", e))?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// A single committee member's registration entry: its on-chain identity and
/// the URL under which its service is reachable.
pub struct CommitteeMember {
    pub address: Address,
    pub service_url: String,
}

/// Splits registration entries into the two parallel sequences the registry
/// expects: URLs in order, and every 20-byte address concatenated into one
/// buffer, index-aligned with the URLs.
fn registration_args(members: &[CommitteeMember]) -> (Vec<String>, Vec<u8>) {
    let mut urls = Vec::with_capacity(members.len());
    let mut addrs_bytes = Vec::with_capacity(members.len() * Address::len_bytes());
    for member in members {
        urls.push(member.service_url.clone());
        addrs_bytes.extend_from_slice(member.address.as_bytes());
    }
    (urls, addrs_bytes)
}

/// Something able to submit a committee registration to the registry
/// contract. Kept as a seam so the workflow can be exercised without an L1
/// node.
pub trait CommitteeRegistrar {
    fn register(
        &self,
        required_signatures: u64,
        urls: Vec<String>,
        addrs_bytes: Vec<u8>,
    ) -> Result<TxHash, String>;
}

struct OnchainRegistrar<'a, M> {
    runtime: &'a Runtime,
    contract: &'a DataCommitteeContract<M>,
}

impl<M: Middleware> CommitteeRegistrar for OnchainRegistrar<'_, M> {
    fn register(
        &self,
        required_signatures: u64,
        urls: Vec<String>,
        addrs_bytes: Vec<u8>,
    ) -> Result<TxHash, String> {
        self.runtime
            .block_on(
                self.contract
                    .setup_committee(required_signatures, urls, addrs_bytes),
            )
            .map_err(|e| format!("Failed to submit setupCommittee transaction: {:?}", e))
    }
}

/// Registers a single member with a quorum threshold of one. The registry
/// contract owns any deduplication semantics; repeated runs simply submit
/// further transactions.
fn register_member<R: CommitteeRegistrar>(
    registrar: &R,
    member: &CommitteeMember,
) -> Result<TxHash, String> {
    let (urls, addrs_bytes) = registration_args(std::slice::from_ref(member));
    // One 20-byte address per URL.
    debug_assert_eq!(addrs_bytes.len(), urls.len() * Address::len_bytes());
    registrar.register(REQUIRED_SIGNATURES, urls, addrs_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;

    const MEMBER_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn member(service_url: &str) -> CommitteeMember {
        CommitteeMember {
            address: MEMBER_ADDRESS.parse().unwrap(),
            service_url: service_url.to_string(),
        }
    }

    /// Records every submission and hands out a fresh hash each time, the
    /// way a node would for distinct transactions.
    struct RecordingRegistrar {
        submissions: RefCell<Vec<(u64, Vec<String>, Vec<u8>)>>,
    }

    impl RecordingRegistrar {
        fn new() -> Self {
            Self {
                submissions: RefCell::new(vec![]),
            }
        }
    }

    impl CommitteeRegistrar for RecordingRegistrar {
        fn register(
            &self,
            required_signatures: u64,
            urls: Vec<String>,
            addrs_bytes: Vec<u8>,
        ) -> Result<TxHash, String> {
            let mut submissions = self.submissions.borrow_mut();
            submissions.push((required_signatures, urls, addrs_bytes));
            Ok(TxHash::from_low_u64_be(submissions.len() as u64))
        }
    }

    struct FailingRegistrar;

    impl CommitteeRegistrar for FailingRegistrar {
        fn register(&self, _: u64, _: Vec<String>, _: Vec<u8>) -> Result<TxHash, String> {
            Err("insufficient funds for gas * price + value".to_string())
        }
    }

    #[test]
    fn cli_requires_a_password_source() {
        let without_password = cli_app().try_get_matches_from([
            CMD,
            "--config",
            "committee.toml",
            "--keystore-path",
            "l1.keystore",
        ]);
        assert!(without_password.is_err());

        let with_password = cli_app()
            .try_get_matches_from([
                CMD,
                "--config",
                "committee.toml",
                "--keystore-path",
                "l1.keystore",
                "--password",
                "hunter2",
            ])
            .unwrap();
        // Confirmation is interactive unless explicitly skipped.
        assert!(!with_password.get_flag(YES_FLAG));
    }

    #[test]
    fn confirmation_accepts_yes_variants() {
        for answer in ["y\n", "yes\n", "Y\n", "YES\n", "  yes  \n", "y"] {
            assert!(
                confirm_setup(&mut Cursor::new(answer)).unwrap(),
                "{:?} should confirm",
                answer
            );
        }
    }

    #[test]
    fn confirmation_declines_everything_else() {
        // Includes the empty line and EOF (empty input) cases; declining is
        // not an error.
        for answer in ["n\n", "no\n", "yess\n", "y e s\n", "\n", ""] {
            assert!(
                !confirm_setup(&mut Cursor::new(answer)).unwrap(),
                "{:?} should decline",
                answer
            );
        }
    }

    #[test]
    fn registration_args_are_index_aligned() {
        let member = member("http://127.0.0.1:8080");
        let (urls, addrs_bytes) = registration_args(std::slice::from_ref(&member));
        assert_eq!(urls, vec!["http://127.0.0.1:8080".to_string()]);
        assert_eq!(addrs_bytes.len(), 20 * urls.len());
        assert_eq!(addrs_bytes, member.address.as_bytes());
    }

    #[test]
    fn registers_one_member_with_a_quorum_of_one() {
        let registrar = RecordingRegistrar::new();
        let tx_hash = register_member(&registrar, &member("http://127.0.0.1:8080")).unwrap();

        let submissions = registrar.submissions.borrow();
        assert_eq!(submissions.len(), 1);
        let (required_signatures, urls, addrs_bytes) = &submissions[0];
        assert_eq!(*required_signatures, 1);
        assert_eq!(urls, &vec!["http://127.0.0.1:8080".to_string()]);
        assert_eq!(addrs_bytes.len(), 20);

        let message = tx_status_message(explorer_urls::LOCAL_CHAIN_ID, tx_hash);
        assert!(message.contains("Local network. Tx Hash: "), "{}", message);
        assert!(message.contains(&format!("{:?}", tx_hash)), "{}", message);
    }

    #[test]
    fn repeated_runs_submit_independent_transactions() {
        // Registration is deliberately not idempotent; any deduplication is
        // the registry contract's business.
        let registrar = RecordingRegistrar::new();
        let member = member("http://127.0.0.1:8080");
        let first = register_member(&registrar, &member).unwrap();
        let second = register_member(&registrar, &member).unwrap();

        assert_eq!(registrar.submissions.borrow().len(), 2);
        assert_ne!(first, second);
    }

    #[test]
    fn submission_errors_propagate_unmodified() {
        let result = register_member(&FailingRegistrar, &member("http://127.0.0.1:8080"));
        assert!(result.unwrap_err().contains("insufficient funds"));
    }
}
