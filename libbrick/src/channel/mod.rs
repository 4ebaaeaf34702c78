//! The Brick channel state machine.
//!
//! A [`Channel`] moves through three phases, never backwards:
//!
//! ```text
//! AwaitingFunding --open()--> Open --optimistic_bob_close() / pessimistic_close()--> Closed
//! ```
//!
//! While `AwaitingFunding`, Alice (at creation), Bob and every watchtower escrow their deposits, and any of them may
//! withdraw. Once `Open`, the channel can be settled either optimistically (Alice proposes, Bob accepts) or
//! pessimistically (one party presents the other's signature over a state, and a quorum of watchtowers has attested
//! that no later update exists).
//!
//! Every operation receives a [`CallContext`] describing the caller and the attached value. Operations never move
//! value themselves; they commit their bookkeeping and then queue payouts on the context for the host to execute.
mod committee;
mod error;
mod events;
mod funding;
mod optimistic;
mod pessimistic;
mod quorum;

pub use committee::{fault_tolerance, quorum_threshold, Committee};
pub use error::ChannelError;
pub use events::{ChannelEvent, ClosePath};
pub use pessimistic::FraudProof;
pub use quorum::QuorumTracker;

use crate::address::Address;
use crate::amount::Amount;
use crate::balance::Balances;
use crate::host::CallContext;
use log::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Deposits are being collected. Withdrawals are possible.
    AwaitingFunding,
    /// Fully funded. The channel can be closed.
    Open,
    /// Settled. No further state changes are accepted.
    Closed,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::AwaitingFunding => write!(f, "AwaitingFunding"),
            Phase::Open => write!(f, "Open"),
            Phase::Closed => write!(f, "Closed"),
        }
    }
}

/// The fixed economic parameters of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelParams {
    /// The channel fee. Alice and Bob each pay half of it.
    pub fee: Amount,
    /// The amount every watchtower must escrow.
    pub collateral: Amount,
}

impl ChannelParams {
    pub fn new(fee: Amount, collateral: Amount) -> Self {
        ChannelParams { fee, collateral }
    }

    /// Each party's share of the fee, `fee / 2`.
    pub fn fee_share(&self) -> Amount {
        self.fee.half()
    }
}

impl Default for ChannelParams {
    fn default() -> Self {
        ChannelParams { fee: Amount::from_wei(20), collateral: Amount::from_wei(5) }
    }
}

/// One depositor's escrow. `funded` and `withdrawn` are one-shot flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    pub deposit: Amount,
    pub funded: bool,
    pub withdrawn: bool,
}

impl Escrow {
    fn funded_with(deposit: Amount) -> Self {
        Escrow { deposit, funded: true, withdrawn: false }
    }

    /// True if this escrow holds no value any more (never funded, or withdrawn).
    pub fn is_empty(&self) -> bool {
        !self.funded || self.withdrawn
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCloseRecord {
    /// The closing balance split, excluding the fee refunds.
    pub final_balance: Balances,
    pub path: ClosePath,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    id: Address,
    alice: Address,
    bob: Address,
    committee: Committee,
    params: ChannelParams,
    phase: Phase,
    alice_escrow: Escrow,
    bob_escrow: Escrow,
    watchtower_escrows: Vec<Escrow>,
    /// Fixed when Bob funds: each party's deposit less its fee share.
    initial: Option<Balances>,
    /// Alice's pending optimistic-close value.
    proposal: Option<Amount>,
    quorum: QuorumTracker,
    close_record: Option<ChannelCloseRecord>,
}

impl Channel {
    pub fn id(&self) -> &Address {
        &self.id
    }

    pub fn alice(&self) -> &Address {
        &self.alice
    }

    pub fn bob(&self) -> &Address {
        &self.bob
    }

    pub fn watchtower(&self, index: usize) -> Option<&Address> {
        self.committee.member(index)
    }

    pub fn committee(&self) -> &Committee {
        &self.committee
    }

    pub fn params(&self) -> &ChannelParams {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    pub fn alice_escrow(&self) -> &Escrow {
        &self.alice_escrow
    }

    pub fn bob_escrow(&self) -> &Escrow {
        &self.bob_escrow
    }

    pub fn watchtower_escrow(&self, index: usize) -> Option<&Escrow> {
        self.watchtower_escrows.get(index)
    }

    pub fn bob_funded(&self) -> bool {
        self.bob_escrow.funded
    }

    pub fn watchtower_funded(&self, index: usize) -> bool {
        self.watchtower_escrows.get(index).is_some_and(|e| e.funded)
    }

    /// The starting balance split, available once Bob has funded.
    pub fn initial_balances(&self) -> Option<Balances> {
        self.initial
    }

    /// `initialAliceValue + initialBobValue`, available once Bob has funded. Never changes afterwards.
    pub fn total(&self) -> Option<Amount> {
        self.initial.and_then(|b| b.total())
    }

    pub fn pending_proposal(&self) -> Option<Amount> {
        self.proposal
    }

    pub fn quorum(&self) -> &QuorumTracker {
        &self.quorum
    }

    pub fn close_record(&self) -> Option<&ChannelCloseRecord> {
        self.close_record.as_ref()
    }

    /// True once any depositor has withdrawn. Such a channel can never open.
    pub fn is_abandoned(&self) -> bool {
        self.alice_escrow.withdrawn || self.bob_escrow.withdrawn || self.watchtower_escrows.iter().any(|e| e.withdrawn)
    }

    /// True when every deposit has been paid back before opening. Nothing further can happen to the channel.
    pub fn is_dissolved(&self) -> bool {
        self.phase == Phase::AwaitingFunding
            && self.alice_escrow.is_empty()
            && self.bob_escrow.is_empty()
            && self.watchtower_escrows.iter().all(Escrow::is_empty)
    }

    /// The value the channel currently holds in escrow.
    pub fn escrowed(&self) -> Option<Amount> {
        if self.phase == Phase::Closed {
            return Some(Amount::ZERO);
        }
        std::iter::once(&self.alice_escrow)
            .chain(std::iter::once(&self.bob_escrow))
            .chain(self.watchtower_escrows.iter())
            .filter(|e| !e.is_empty())
            .try_fold(Amount::ZERO, |acc, e| acc.checked_add(e.deposit))
    }

    //------------------------------------        Guards        --------------------------------------------------//

    fn require_no_value(ctx: &CallContext) -> Result<(), ChannelError> {
        if ctx.value().is_zero() {
            Ok(())
        } else {
            Err(ChannelError::NotPayable(ctx.value()))
        }
    }

    fn require_open(&self) -> Result<(), ChannelError> {
        match self.phase {
            Phase::Open => Ok(()),
            Phase::AwaitingFunding => Err(ChannelError::NotOpen),
            Phase::Closed => Err(ChannelError::AlreadyClosed),
        }
    }

    fn require_awaiting_funding(&self) -> Result<(), ChannelError> {
        match self.phase {
            Phase::AwaitingFunding => Ok(()),
            Phase::Open => Err(ChannelError::InvalidPhase(Phase::Open)),
            Phase::Closed => Err(ChannelError::AlreadyClosed),
        }
    }

    fn require_total(&self) -> Result<Amount, ChannelError> {
        self.total().ok_or(ChannelError::ArithmeticOverflow)
    }

    //------------------------------------      Settlement      --------------------------------------------------//

    /// Closes the channel with `final_balance` and queues every payout.
    ///
    /// Alice and Bob each get their balance plus their fee share back. Every watchtower gets back its recorded deposit,
    /// which exceeds `collateral` if it overpaid. All bookkeeping is committed before the first payout is queued.
    fn settle(
        &mut self,
        ctx: &mut CallContext,
        final_balance: Balances,
        path: ClosePath,
    ) -> Result<(), ChannelError> {
        let paid = final_balance.with_fee_refund(self.params.fee_share()).ok_or(ChannelError::ArithmeticOverflow)?;
        self.phase = Phase::Closed;
        self.proposal = None;
        self.close_record = Some(ChannelCloseRecord { final_balance, path });
        info!(
            "Channel {} closed ({path:?}). Alice receives {}, Bob receives {}",
            self.id, paid.alice, paid.bob
        );
        ctx.pay(self.alice, paid.alice);
        ctx.pay(self.bob, paid.bob);
        for (watchtower, escrow) in self.committee.members().iter().zip(self.watchtower_escrows.iter()) {
            ctx.pay(*watchtower, escrow.deposit);
        }
        ctx.emit(ChannelEvent::Closed { path, balances: final_balance });
        Ok(())
    }
}
