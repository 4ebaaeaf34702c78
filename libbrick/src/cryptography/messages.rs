//! Canonical byte messages for the two signed payloads.
//!
//! Each field is encoded as a 32-byte big-endian word (addresses and `u16`s are left-padded with zeroes), giving
//!
//! ```text
//! StateMessage:        channel ‖ aliceValue ‖ bobValue ‖ seq   (128 bytes)
//! AnnouncementMessage: channel ‖ seq                          ( 64 bytes)
//! ```
//!
//! These layouts must match bit-for-bit across implementations or signatures will not interoperate.
use crate::address::Address;
use crate::amount::Amount;
use crate::balance::Balances;
use crate::cryptography::keccak::keccak256;
use crate::cryptography::signatures::{check_prefixed_sig, EcdsaSignature};
use serde::{Deserialize, Serialize};

pub const STATE_MESSAGE_LEN: usize = 128;
pub const ANNOUNCEMENT_MESSAGE_LEN: usize = 64;

/// An off-chain balance update, numbered by `seq`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    pub alice_value: Amount,
    pub bob_value: Amount,
    pub seq: u16,
}

impl ChannelState {
    pub fn new(alice_value: Amount, bob_value: Amount, seq: u16) -> Self {
        ChannelState { alice_value, bob_value, seq }
    }

    pub fn balances(&self) -> Balances {
        Balances::new(self.alice_value, self.bob_value)
    }

    pub fn message(&self, channel: &Address) -> Vec<u8> {
        state_message(channel, self)
    }

    pub fn digest(&self, channel: &Address) -> [u8; 32] {
        state_digest(channel, self)
    }
}

/// Both parties' signatures over the announcement message for `seq`.
///
/// An announcement says nothing about balances; it only attests that Alice and Bob both reached update `seq`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub seq: u16,
    pub alice_sig: EcdsaSignature,
    pub bob_sig: EcdsaSignature,
}

impl Announcement {
    pub fn new(seq: u16, alice_sig: EcdsaSignature, bob_sig: EcdsaSignature) -> Self {
        Announcement { seq, alice_sig, bob_sig }
    }

    /// True if both signatures verify over the announcement message for `channel` and `self.seq`.
    pub fn verify(&self, channel: &Address, alice: &Address, bob: &Address) -> bool {
        let digest = announcement_digest(channel, self.seq);
        check_prefixed_sig(alice, &digest, &self.alice_sig) && check_prefixed_sig(bob, &digest, &self.bob_sig)
    }
}

fn seq_word(seq: u16) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[30..].copy_from_slice(&seq.to_be_bytes());
    word
}

pub fn state_message(channel: &Address, state: &ChannelState) -> Vec<u8> {
    let mut message = Vec::with_capacity(STATE_MESSAGE_LEN);
    message.extend_from_slice(&channel.to_word());
    message.extend_from_slice(&state.alice_value.to_be_word());
    message.extend_from_slice(&state.bob_value.to_be_word());
    message.extend_from_slice(&seq_word(state.seq));
    message
}

pub fn state_digest(channel: &Address, state: &ChannelState) -> [u8; 32] {
    keccak256(state_message(channel, state))
}

pub fn announcement_message(channel: &Address, seq: u16) -> Vec<u8> {
    let mut message = Vec::with_capacity(ANNOUNCEMENT_MESSAGE_LEN);
    message.extend_from_slice(&channel.to_word());
    message.extend_from_slice(&seq_word(seq));
    message
}

pub fn announcement_digest(channel: &Address, seq: u16) -> [u8; 32] {
    keccak256(announcement_message(channel, seq))
}
