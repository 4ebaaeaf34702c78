use crate::address::Address;
use crate::amount::Amount;
use crate::channel::{Channel, ChannelError, ChannelEvent, ChannelParams};
use crate::cryptography::keccak256;
use crate::host::ledger::{Ledger, LedgerError};
use crate::host::{CallContext, Payout};
use crate::storage::StateStore;
use log::*;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("No channel with id {0}")]
    UnknownChannel(Address),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// The observable result of a successful call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt<T> {
    pub output: T,
    pub payouts: Vec<Payout>,
    pub events: Vec<ChannelEvent>,
}

/// Executes channel operations one at a time, all-or-nothing.
///
/// Attached value moves from the caller into the channel's own ledger account before the operation runs, and payouts
/// leave that account after the new channel record has been stored. If any step fails, every transfer made so far is
/// reversed and the stored record is left as it was.
pub struct BrickHost<L, S> {
    ledger: L,
    store: S,
    nonces: HashMap<Address, u64>,
}

/// Completed transfers of the current call, in order.
type Journal = Vec<(Address, Address, Amount)>;

impl<L: Ledger, S: StateStore> BrickHost<L, S> {
    pub fn new(ledger: L, store: S) -> Self {
        BrickHost { ledger, store, nonces: HashMap::new() }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Alice creates a channel, attaching `value` as her deposit. Returns the new channel's id.
    ///
    /// The id is the low 20 bytes of `keccak256(alice ‖ nonce)`, where the nonce counts the channels Alice has created
    /// on this host.
    pub fn create_channel(
        &mut self,
        alice: Address,
        value: Amount,
        bob: Address,
        watchtowers: Vec<Address>,
        params: ChannelParams,
    ) -> Result<Receipt<Address>, HostError> {
        let id = self.next_channel_id(&alice);
        let mut journal = Journal::new();
        self.transfer(&mut journal, alice, id, value)?;
        let mut ctx = CallContext::new(alice, value);
        let channel = match Channel::create(&mut ctx, id, bob, watchtowers, params) {
            Ok(channel) => channel,
            Err(e) => {
                self.rollback(journal);
                return Err(e.into());
            }
        };
        if let Err(e) = self.store.write_channel(&channel) {
            self.rollback(journal);
            return Err(HostError::Storage(e.to_string()));
        }
        *self.nonces.entry(alice).or_default() += 1;
        let (payouts, events) = ctx.into_effects();
        publish(&id, &events);
        Ok(Receipt { output: id, payouts, events })
    }

    /// Runs `op` against channel `id` as `caller`, with `value` attached.
    pub fn execute<T, F>(&mut self, id: &Address, caller: Address, value: Amount, op: F) -> Result<Receipt<T>, HostError>
    where
        F: FnOnce(&mut Channel, &mut CallContext) -> Result<T, ChannelError>,
    {
        let original = self.load(id)?;
        let mut journal = Journal::new();
        self.transfer(&mut journal, caller, *id, value)?;
        let mut channel = original.clone();
        let mut ctx = CallContext::new(caller, value);
        let output = match op(&mut channel, &mut ctx) {
            Ok(output) => output,
            Err(e) => {
                debug!("Call by {caller} on channel {id} failed: {e}");
                self.rollback(journal);
                return Err(e.into());
            }
        };
        if let Err(e) = self.store.write_channel(&channel) {
            self.rollback(journal);
            return Err(HostError::Storage(e.to_string()));
        }
        for payout in ctx.payouts() {
            if let Err(e) = self.transfer(&mut journal, *id, payout.to, payout.amount) {
                warn!("Payout of {} to {} from channel {id} failed: {e}", payout.amount, payout.to);
                self.rollback(journal);
                if let Err(restore) = self.store.write_channel(&original) {
                    error!("Could not restore channel {id} after a failed payout: {restore}");
                }
                return Err(e);
            }
        }
        let (payouts, events) = ctx.into_effects();
        publish(id, &events);
        Ok(Receipt { output, payouts, events })
    }

    /// Read-only access to a stored channel.
    pub fn view<T>(&self, id: &Address, f: impl FnOnce(&Channel) -> T) -> Result<T, HostError> {
        let channel = self.load(id)?;
        Ok(f(&channel))
    }

    fn load(&self, id: &Address) -> Result<Channel, HostError> {
        if !self.store.contains_channel(id) {
            return Err(HostError::UnknownChannel(*id));
        }
        self.store.load_channel(id).map_err(|e| HostError::Storage(e.to_string()))
    }

    fn next_channel_id(&self, alice: &Address) -> Address {
        let mut nonce = self.nonces.get(alice).copied().unwrap_or_default();
        loop {
            let mut preimage = [0u8; 64];
            preimage[..32].copy_from_slice(&alice.to_word());
            preimage[56..].copy_from_slice(&nonce.to_be_bytes());
            let id = Address::from_hash(&keccak256(preimage));
            if !self.store.contains_channel(&id) {
                return id;
            }
            nonce += 1;
        }
    }

    fn transfer(&mut self, journal: &mut Journal, from: Address, to: Address, amount: Amount) -> Result<(), HostError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.ledger.transfer(&from, &to, amount)?;
        journal.push((from, to, amount));
        Ok(())
    }

    fn rollback(&mut self, journal: Journal) {
        for (from, to, amount) in journal.into_iter().rev() {
            if let Err(e) = self.ledger.transfer(&to, &from, amount) {
                error!("Could not reverse the transfer of {amount} from {from} to {to}: {e}");
            }
        }
    }
}

fn publish(id: &Address, events: &[ChannelEvent]) {
    for event in events {
        info!("Channel {id}: {event}");
    }
}
