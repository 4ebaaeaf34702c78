use crate::channel::{Channel, ChannelError, ClosePath};
use crate::cryptography::messages::state_digest;
use crate::cryptography::{check_prefixed_sig, ChannelState, EcdsaSignature};
use crate::helpers::{from_hex, to_hex};
use crate::host::CallContext;
use log::*;
use serde::{Deserialize, Serialize};

/// An opaque proof against a dishonest watchtower claim.
///
/// Proofs are accepted by [`Channel::pessimistic_close`] but not yet evaluated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudProof(#[serde(serialize_with = "to_hex", deserialize_with = "from_hex")] pub Vec<u8>);

impl Channel {
    /// Alice or Bob closes with a state the *other* party signed, once the watchtower quorum is complete.
    ///
    /// The state must conserve the channel total and must be at least as fresh as every update the quorum attested.
    pub fn pessimistic_close(
        &mut self,
        ctx: &mut CallContext,
        state: &ChannelState,
        counter_signature: &EcdsaSignature,
        extra_proofs: &[FraudProof],
    ) -> Result<(), ChannelError> {
        Self::require_no_value(ctx)?;
        self.require_open()?;
        let caller = ctx.caller();
        let counterparty = if caller == self.alice {
            self.bob
        } else if caller == self.bob {
            self.alice
        } else {
            return Err(ChannelError::Unauthorized);
        };
        let total = self.require_total()?;
        if state.balances().total() != Some(total) {
            return Err(ChannelError::ConservationViolation { total });
        }
        if !self.quorum.is_complete() {
            return Err(ChannelError::QuorumNotReached {
                claims: self.quorum.claim_count(),
                threshold: self.quorum.threshold(),
            });
        }
        let highest_claimed = self.quorum.highest_claimed_seq();
        if state.seq < highest_claimed {
            warn!("{caller} tried to close channel {} with stale state {}", self.id, state.seq);
            return Err(ChannelError::StaleClose { seq: state.seq, highest_claimed });
        }
        if !check_prefixed_sig(&counterparty, &state_digest(&self.id, state), counter_signature) {
            warn!("{caller} tried to close channel {} with a state not signed by {counterparty}", self.id);
            return Err(ChannelError::InvalidCounterSignature);
        }
        if !extra_proofs.is_empty() {
            debug!("Ignoring {} fraud proofs on channel {}", extra_proofs.len(), self.id);
        }
        self.settle(ctx, state.balances(), ClosePath::Pessimistic { seq: state.seq })
    }
}
