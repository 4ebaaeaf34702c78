use crate::amount::Amount;
use crate::channel::Phase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Precondition failures of channel operations. A call that fails with any of these has no effect on the channel.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ChannelError {
    #[error("The deposit of {deposit} does not cover the fee share of {required}")]
    InsufficientFee { deposit: Amount, required: Amount },
    #[error("A watchtower deposit of {deposit} is below the required collateral of {required}")]
    InsufficientCollateral { deposit: Amount, required: Amount },
    #[error("This party has already funded the channel")]
    AlreadyFunded,
    #[error("Watchtowers cannot fund the channel before Bob has")]
    NotYetFundable,
    #[error("The caller is not allowed to perform this operation")]
    Unauthorized,
    #[error("This party has already withdrawn its deposit")]
    AlreadyWithdrawn,
    #[error("This party has no deposit to withdraw")]
    NothingToWithdraw,
    #[error("The operation is not allowed while the channel is {0}")]
    InvalidPhase(Phase),
    #[error("Watchtower {index} has not funded the channel yet")]
    IncompleteFunding { index: usize },
    #[error("A party has withdrawn before the channel opened; the channel can no longer be funded or opened")]
    FundingAbandoned,
    #[error("The channel is not open")]
    NotOpen,
    #[error("The channel is already closed")]
    AlreadyClosed,
    #[error("Alice cannot close with {proposed}, more than her initial value of {initial}")]
    ValueTooHigh { proposed: Amount, initial: Amount },
    #[error("Bob cannot close the channel before Alice has proposed a closing value")]
    BobCannotCloseAlone,
    #[error("The caller is not watchtower {index}")]
    WrongWatchtower { index: usize },
    #[error("The watchtower quorum is already complete; no further claims are accepted")]
    RaceComplete,
    #[error("Watchtower {index} has already made a claim")]
    AlreadyClaimed { index: usize },
    #[error("The announcement is not signed by both Alice and Bob")]
    InvalidAnnouncementSignatures,
    #[error("The closing balances do not add up to the channel total of {total}")]
    ConservationViolation { total: Amount },
    #[error("Only {claims} of the {threshold} watchtower claims needed have been made")]
    QuorumNotReached { claims: usize, threshold: usize },
    #[error("State {seq} is older than update {highest_claimed} attested by the watchtowers")]
    StaleClose { seq: u16, highest_claimed: u16 },
    #[error("The counterparty's signature over the closing state is invalid")]
    InvalidCounterSignature,
    #[error("A channel needs at least one watchtower")]
    EmptyCommittee,
    #[error("Watchtower {index} is a channel party or appears more than once in the committee")]
    InvalidCommittee { index: usize },
    #[error("This operation does not accept value, but {0} was attached")]
    NotPayable(Amount),
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}
