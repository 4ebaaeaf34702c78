//! The signing and encoding scheme shared by the channel and the off-chain agents.
//!
//! Every signed payload is a fixed-width word encoding (see [`messages`]), hashed with Keccak-256, then wrapped with
//! the `"\x19Ethereum Signed Message:\n32"` prefix and hashed again before ECDSA (secp256k1) signing.
mod keccak;
pub mod keys;
pub mod messages;
pub mod signatures;
pub mod signer;

pub use keccak::{keccak256, prefix_digest, ETH_MESSAGE_PREFIX};
pub use keys::{KeyError, SecretKey};
pub use messages::{Announcement, ChannelState};
pub use signatures::{check_prefixed_sig, check_sig, recover_signer, EcdsaSignature};
