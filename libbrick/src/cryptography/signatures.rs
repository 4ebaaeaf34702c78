use crate::address::Address;
use crate::cryptography::keccak::prefix_digest;
use crate::error::ReadError;
use crate::helpers::{array_from_hex, array_to_hex, decode_hex_array};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A recoverable ECDSA signature in `(v, r, s)` form, with `v` in `{27, 28}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EcdsaSignature {
    pub v: u8,
    #[serde(serialize_with = "array_to_hex", deserialize_with = "array_from_hex")]
    pub r: [u8; 32],
    #[serde(serialize_with = "array_to_hex", deserialize_with = "array_from_hex")]
    pub s: [u8; 32],
}

impl EcdsaSignature {
    pub fn from_parts(signature: &Signature, recovery_id: RecoveryId) -> Self {
        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        EcdsaSignature { v: 27 + recovery_id.to_byte(), r, s }
    }

    /// The recovery id encoded in `v`. Both the `27/28` and the raw `0/1` conventions are accepted.
    pub fn recovery_id(&self) -> Option<RecoveryId> {
        let byte = match self.v {
            27 | 28 => self.v - 27,
            0 | 1 => self.v,
            _ => return None,
        };
        RecoveryId::from_byte(byte)
    }

    /// The 65-byte `r ‖ s ‖ v` encoding.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        EcdsaSignature { v: bytes[64], r, s }
    }
}

impl FromStr for EcdsaSignature {
    type Err = ReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex_array::<65>(s.trim()).map_err(|e| ReadError::new("EcdsaSignature", e.to_string()))?;
        Ok(EcdsaSignature::from_bytes(&bytes))
    }
}

impl Display for EcdsaSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

/// Recovers the address that produced `signature` over `hash`.
///
/// High-`s` signatures are accepted and normalised before recovery. Returns `None` for any malformed signature.
pub fn recover_signer(hash: &[u8; 32], signature: &EcdsaSignature) -> Option<Address> {
    let recovery_id = signature.recovery_id()?;
    let sig = Signature::from_scalars(signature.r, signature.s).ok()?;
    let (sig, recovery_id) = match sig.normalize_s() {
        Some(low_s) => (low_s, RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced())),
        None => (sig, recovery_id),
    };
    let key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id).ok()?;
    Some(Address::from_verifying_key(&key))
}

/// Checks that `signer` produced `signature` over `hash`. The caller supplies an already prefixed hash.
///
/// This is slightly more lenient than `ecrecover`, which only takes `v` as 27 or 28: a raw recovery id of 0 or 1 is
/// accepted too.
pub fn check_sig(signer: &Address, hash: &[u8; 32], signature: &EcdsaSignature) -> bool {
    match recover_signer(hash, signature) {
        Some(recovered) => {
            trace!("recovered {recovered} over {}, expected {signer}", hex::encode(hash));
            recovered == *signer
        }
        None => false,
    }
}

/// Checks that `signer` produced `signature` over the prefixed form of `raw_digest`.
///
/// Unlike [`check_sig`], the caller passes the *unprefixed* digest and the prefix step is applied here.
pub fn check_prefixed_sig(signer: &Address, raw_digest: &[u8; 32], signature: &EcdsaSignature) -> bool {
    check_sig(signer, &prefix_digest(raw_digest), signature)
}
