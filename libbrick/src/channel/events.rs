use crate::address::Address;
use crate::amount::Amount;
use crate::balance::Balances;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Which settlement path closed the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClosePath {
    /// Alice proposed and Bob accepted.
    Optimistic,
    /// One party closed with the counterparty's signed state, gated by the watchtower quorum.
    Pessimistic { seq: u16 },
}

/// Observable record of a successful channel operation, emitted into the call context for the host to publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelEvent {
    Created { channel: Address, alice: Address, bob: Address, watchtowers: usize },
    BobFunded { initial: Balances },
    WatchtowerFunded { index: usize, deposit: Amount },
    Withdrawn { account: Address, amount: Amount },
    Opened,
    OptimisticCloseProposed { alice_value: Amount },
    ClaimAccepted { index: usize, seq: u16, claims: usize },
    QuorumReached { highest_claimed_seq: u16 },
    Closed { path: ClosePath, balances: Balances },
}

impl Display for ChannelEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelEvent::Created { channel, watchtowers, .. } => {
                write!(f, "Created({channel}, {watchtowers} watchtowers)")
            }
            ChannelEvent::BobFunded { initial } => write!(f, "BobFunded(alice: {}, bob: {})", initial.alice, initial.bob),
            ChannelEvent::WatchtowerFunded { index, .. } => write!(f, "WatchtowerFunded({index})"),
            ChannelEvent::Withdrawn { account, amount } => write!(f, "Withdrawn({account}, {amount})"),
            ChannelEvent::Opened => write!(f, "Opened"),
            ChannelEvent::OptimisticCloseProposed { alice_value } => write!(f, "OptimisticCloseProposed({alice_value})"),
            ChannelEvent::ClaimAccepted { index, seq, claims } => {
                write!(f, "ClaimAccepted(watchtower {index}, seq {seq}, {claims} claims)")
            }
            ChannelEvent::QuorumReached { highest_claimed_seq } => write!(f, "QuorumReached(seq {highest_claimed_seq})"),
            ChannelEvent::Closed { path, balances } => {
                write!(f, "Closed({path:?}, alice: {}, bob: {})", balances.alice, balances.bob)
            }
        }
    }
}
