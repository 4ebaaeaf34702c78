//! Off-chain signing helpers for Alice, Bob and watchtower agents.
use crate::address::Address;
use crate::cryptography::keys::{KeyError, SecretKey};
use crate::cryptography::messages::{announcement_digest, Announcement, ChannelState};
use crate::cryptography::signatures::EcdsaSignature;

/// Signs the full state message for `channel`. The counterparty submits this signature in a pessimistic close.
pub fn sign_state(channel: &Address, state: &ChannelState, key: &SecretKey) -> Result<EcdsaSignature, KeyError> {
    key.sign_prefixed(&state.digest(channel))
}

/// Signs the announcement message for `seq` on `channel`.
pub fn sign_announcement(channel: &Address, seq: u16, key: &SecretKey) -> Result<EcdsaSignature, KeyError> {
    key.sign_prefixed(&announcement_digest(channel, seq))
}

/// Builds a complete announcement from both parties' keys. Mostly useful for simulations and tests; in practice each
/// party signs on its own machine.
pub fn co_sign_announcement(
    channel: &Address,
    seq: u16,
    alice: &SecretKey,
    bob: &SecretKey,
) -> Result<Announcement, KeyError> {
    let alice_sig = sign_announcement(channel, seq, alice)?;
    let bob_sig = sign_announcement(channel, seq, bob)?;
    Ok(Announcement::new(seq, alice_sig, bob_sig))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::amount::Amount;
    use crate::cryptography::check_prefixed_sig;

    const ALICE_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const BOB_KEY: &str = "ae6ae8e5ccbfb04590405997ee2d52d2b330726137b875053c36d94e974d162f";

    #[test]
    fn signed_state_verifies_for_signer_only() {
        let alice = SecretKey::from_hex(ALICE_KEY).unwrap();
        let bob = SecretKey::from_hex(BOB_KEY).unwrap();
        let channel = Address::new([0x42; 20]);
        let state = ChannelState::new(Amount::from_wei(1), Amount::from_wei(16), 3);
        let sig = sign_state(&channel, &state, &alice).unwrap();
        assert!(check_prefixed_sig(&alice.address(), &state.digest(&channel), &sig));
        assert!(!check_prefixed_sig(&bob.address(), &state.digest(&channel), &sig));
        let other_channel = Address::new([0x43; 20]);
        assert!(!check_prefixed_sig(&alice.address(), &state.digest(&other_channel), &sig));
    }

    #[test]
    fn co_signed_announcement_verifies() {
        let alice = SecretKey::from_hex(ALICE_KEY).unwrap();
        let bob = SecretKey::from_hex(BOB_KEY).unwrap();
        let channel = Address::new([0x42; 20]);
        let announcement = co_sign_announcement(&channel, 7, &alice, &bob).unwrap();
        assert!(announcement.verify(&channel, &alice.address(), &bob.address()));
        // Swapped roles must fail.
        assert!(!announcement.verify(&channel, &bob.address(), &alice.address()));
        let relabelled = Announcement { seq: 8, ..announcement };
        assert!(!relabelled.verify(&channel, &alice.address(), &bob.address()));
    }
}
