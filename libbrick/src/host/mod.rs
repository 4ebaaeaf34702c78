//! The execution host the channel runs on.
//!
//! Channel operations are pure bookkeeping over a [`CallContext`]. The [`BrickHost`] supplies what the channel cannot
//! do itself: caller identity, value transfer through a [`Ledger`], durable storage, and all-or-nothing execution.
mod executor;
mod ledger;

pub use executor::{BrickHost, HostError, Receipt};
pub use ledger::{InMemoryLedger, Ledger, LedgerError};

use crate::address::Address;
use crate::amount::Amount;
use crate::channel::ChannelEvent;
use serde::{Deserialize, Serialize};

/// A transfer of value out of a channel, queued by a channel operation and executed by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub to: Address,
    pub amount: Amount,
}

impl Payout {
    pub fn new(to: Address, amount: Amount) -> Self {
        Payout { to, amount }
    }
}

/// The environment of a single call: who is calling, how much value they attached, and the effects the call produces.
#[derive(Clone, Debug)]
pub struct CallContext {
    caller: Address,
    value: Amount,
    payouts: Vec<Payout>,
    events: Vec<ChannelEvent>,
}

impl CallContext {
    pub fn new(caller: Address, value: Amount) -> Self {
        CallContext { caller, value, payouts: Vec::new(), events: Vec::new() }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    /// Queues a payout. Zero-value payouts are dropped.
    pub fn pay(&mut self, to: Address, amount: Amount) {
        if !amount.is_zero() {
            self.payouts.push(Payout::new(to, amount));
        }
    }

    pub fn emit(&mut self, event: ChannelEvent) {
        self.events.push(event);
    }

    pub fn payouts(&self) -> &[Payout] {
        &self.payouts
    }

    pub fn events(&self) -> &[ChannelEvent] {
        &self.events
    }

    pub fn into_effects(self) -> (Vec<Payout>, Vec<ChannelEvent>) {
        (self.payouts, self.events)
    }
}
