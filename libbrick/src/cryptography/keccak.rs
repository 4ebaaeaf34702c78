use log::trace;
use sha3::{Digest, Keccak256};

/// Message-authentication prefix applied to a digest before it is signed.
pub const ETH_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    Keccak256::digest(data.as_ref()).into()
}

/// Computes `Keccak256(prefix ++ decimal_length(digest) ++ digest)`.
///
/// The length is always 32, so the hashed preimage is `"\x19Ethereum Signed Message:\n32" ++ digest`.
pub fn prefix_digest(digest: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(ETH_MESSAGE_PREFIX);
    hasher.update(digest.len().to_string().as_bytes());
    hasher.update(digest);
    let prefixed: [u8; 32] = hasher.finalize().into();
    trace!("prefixed digest {} -> {}", hex::encode(digest), hex::encode(prefixed));
    prefixed
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keccak_vectors() {
        assert_eq!(hex::encode(keccak256(b"")), "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
        assert_eq!(hex::encode(keccak256(b"abc")), "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45");
    }

    #[test]
    fn prefix_matches_manual_preimage() {
        let digest = keccak256(b"brick");
        let mut preimage = b"\x19Ethereum Signed Message:\n32".to_vec();
        preimage.extend_from_slice(&digest);
        assert_eq!(prefix_digest(&digest), keccak256(&preimage));
        assert_ne!(prefix_digest(&digest), digest);
    }
}
