use crate::address::Address;
use crate::cryptography::keccak::prefix_digest;
use crate::cryptography::signatures::EcdsaSignature;
use crate::helpers::strip_hex_prefix;
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::RngCore;
use std::fmt::Debug;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("A secret key is 32 bytes and must be given as 64 hex characters")]
    InvalidStringLength,
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("The bytes do not represent a valid secp256k1 secret scalar")]
    InvalidScalar,
    #[error("Could not produce a signature: {0}")]
    SigningFailed(String),
}

/// A secp256k1 signing key for a channel party or a watchtower.
///
/// The wrapped key material is zeroized on drop.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl SecretKey {
    pub fn random() -> Self {
        let mut rng = rand::rng();
        loop {
            let mut bytes = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(&mut bytes[..]);
            // Out-of-range scalars (zero, or >= n) are astronomically unlikely; just draw again.
            if let Ok(key) = SigningKey::from_slice(&bytes[..]) {
                return SecretKey(key);
            }
        }
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = strip_hex_prefix(hex.trim());
        if hex.len() != 64 {
            return Err(KeyError::InvalidStringLength);
        }
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(hex, &mut bytes[..])?;
        let key = SigningKey::from_slice(&bytes[..]).map_err(|_| KeyError::InvalidScalar)?;
        Ok(SecretKey(key))
    }

    pub fn as_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.to_bytes()))
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.0.verifying_key()
    }

    pub fn address(&self) -> Address {
        Address::from_verifying_key(self.0.verifying_key())
    }

    /// Signs `hash` exactly as given. No prefixing is applied.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<EcdsaSignature, KeyError> {
        let (signature, recovery_id) =
            self.0.sign_prehash_recoverable(hash).map_err(|e| KeyError::SigningFailed(e.to_string()))?;
        Ok(EcdsaSignature::from_parts(&signature, recovery_id))
    }

    /// Applies the message prefix to `digest` and signs the result.
    pub fn sign_prefixed(&self, digest: &[u8; 32]) -> Result<EcdsaSignature, KeyError> {
        self.sign_hash(&prefix_digest(digest))
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey({})", self.address())
    }
}
