//! Helpers for unlocking encrypted JSON keystores and handling the passwords
//! that protect them.

use ethers_core::types::Address;
use ethers_signers::{LocalWallet, Signer};
use std::fs;
use std::path::Path;
use zeroize::Zeroize;

/// Decrypts an encrypted JSON keystore into a wallet able to sign L1
/// transactions.
pub fn load_keystore_wallet<P: AsRef<Path>>(
    path: P,
    password: &str,
) -> Result<LocalWallet, String> {
    LocalWallet::decrypt_keystore(path.as_ref(), password)
        .map_err(|e| format!("Unable to decrypt keystore {:?}: {:?}", path.as_ref(), e))
}

/// Decrypts a keystore purely to learn the 20-byte address it holds.
///
/// This is local CPU work, no network access is involved.
pub fn decrypt_keystore_address<P: AsRef<Path>>(
    path: P,
    password: &str,
) -> Result<Address, String> {
    load_keystore_wallet(path, password).map(|wallet| wallet.address())
}

/// Reads a password file into a zeroizing wrapper, with trailing newlines
/// removed.
pub fn read_password_file<P: AsRef<Path>>(path: P) -> Result<ZeroizeString, String> {
    let bytes = fs::read(path.as_ref())
        .map_err(|e| format!("Unable to read password file {:?}: {:?}", path.as_ref(), e))?;
    String::from_utf8(strip_off_newlines(bytes))
        .map(ZeroizeString::from)
        .map_err(|e| format!("Password file {:?} is not utf8: {:?}", path.as_ref(), e))
}

/// Remove any number of newline or carriage returns from the end of a vector
/// of bytes.
pub fn strip_off_newlines(mut bytes: Vec<u8>) -> Vec<u8> {
    let mut strip_off = 0;
    for (i, byte) in bytes.iter().rev().enumerate() {
        if *byte == b'\n' || *byte == b'\r' {
            strip_off = i + 1;
        } else {
            break;
        }
    }
    bytes.truncate(bytes.len() - strip_off);
    bytes
}

/// Provides a new-type wrapper around `String` that is zeroized on `Drop`.
///
/// Useful for ensuring that password memory is zeroed-out on drop.
#[derive(Clone, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct ZeroizeString(String);

impl From<String> for ZeroizeString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl ZeroizeString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for ZeroizeString {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}
