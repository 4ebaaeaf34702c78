use crate::channel::{Channel, ChannelError, ChannelEvent, Committee};
use crate::cryptography::Announcement;
use crate::host::CallContext;
use log::*;
use serde::{Deserialize, Serialize};

/// Tracks the watchtower race to a freshness quorum.
///
/// The first `t` distinct, valid claims win. After that the tracker is frozen: `claim_count` never exceeds `t` and
/// `highest_claimed_seq` never changes again. Arrival order is whatever the host delivers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumTracker {
    claimed: Vec<bool>,
    claim_count: usize,
    threshold: usize,
    highest_claimed_seq: u16,
}

impl QuorumTracker {
    pub fn new(committee: &Committee) -> Self {
        QuorumTracker {
            claimed: vec![false; committee.len()],
            claim_count: 0,
            threshold: committee.quorum_threshold(),
            highest_claimed_seq: 0,
        }
    }

    pub fn claim_count(&self) -> usize {
        self.claim_count
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The highest sequence number attested by any accepted claim.
    pub fn highest_claimed_seq(&self) -> u16 {
        self.highest_claimed_seq
    }

    pub fn has_claimed(&self, index: usize) -> bool {
        self.claimed.get(index).copied().unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.claim_count >= self.threshold
    }

    /// Checks whether watchtower `index` may still make a claim, ignoring the announcement itself.
    pub(crate) fn check_claim(&self, index: usize) -> Result<(), ChannelError> {
        if self.is_complete() {
            return Err(ChannelError::RaceComplete);
        }
        if self.has_claimed(index) {
            return Err(ChannelError::AlreadyClaimed { index });
        }
        Ok(())
    }

    /// Records an accepted claim. Returns the new claim count.
    pub(crate) fn record(&mut self, index: usize, seq: u16) -> usize {
        self.claimed[index] = true;
        self.claim_count += 1;
        self.highest_claimed_seq = self.highest_claimed_seq.max(seq);
        self.claim_count
    }
}

impl Channel {
    /// Watchtower `index` attests that Alice and Bob both reached update `announcement.seq`.
    pub fn watchtower_claim_state(
        &mut self,
        ctx: &mut CallContext,
        announcement: &Announcement,
        index: usize,
    ) -> Result<(), ChannelError> {
        Self::require_no_value(ctx)?;
        if !self.committee.is_member_at(index, &ctx.caller()) {
            return Err(ChannelError::WrongWatchtower { index });
        }
        self.require_open()?;
        self.quorum.check_claim(index)?;
        if !self.valid_announcement(announcement) {
            warn!("Watchtower {index} submitted an announcement for seq {} with invalid signatures", announcement.seq);
            return Err(ChannelError::InvalidAnnouncementSignatures);
        }
        let claims = self.quorum.record(index, announcement.seq);
        debug!(
            "Channel {}: watchtower {index} claimed seq {}. {claims}/{} claims",
            self.id,
            announcement.seq,
            self.quorum.threshold()
        );
        ctx.emit(ChannelEvent::ClaimAccepted { index, seq: announcement.seq, claims });
        if self.quorum.is_complete() {
            let highest_claimed_seq = self.quorum.highest_claimed_seq();
            info!("Channel {}: watchtower quorum reached. Highest attested seq is {highest_claimed_seq}", self.id);
            ctx.emit(ChannelEvent::QuorumReached { highest_claimed_seq });
        }
        Ok(())
    }

    /// True if both of the announcement's signatures verify for this channel. Independent of caller and claim state.
    pub fn valid_announcement(&self, announcement: &Announcement) -> bool {
        announcement.verify(&self.id, &self.alice, &self.bob)
    }
}

#[cfg(test)]
mod test {
    use crate::channel::test_utils::*;
    use crate::channel::{ChannelError, ChannelEvent};
    use crate::cryptography::signer::{co_sign_announcement, sign_announcement};
    use crate::cryptography::Announcement;

    #[test]
    fn first_t_claims_win() {
        env_logger::try_init().ok();
        let towers = watchtower_keys(13);
        let mut channel = open_channel(&towers);
        let announcement = co_sign_announcement(&channel_id(), 3, &alice_key(), &bob_key()).unwrap();
        assert_eq!(channel.quorum().threshold(), 9);
        for (i, key) in towers.iter().enumerate().take(9) {
            let mut ctx = call(&key.address(), 0);
            channel.watchtower_claim_state(&mut ctx, &announcement, i).unwrap();
            assert_eq!(channel.quorum().claim_count(), i + 1);
            assert_eq!(ctx.events()[0], ChannelEvent::ClaimAccepted { index: i, seq: 3, claims: i + 1 });
            if i == 8 {
                assert_eq!(ctx.events()[1], ChannelEvent::QuorumReached { highest_claimed_seq: 3 });
            } else {
                assert_eq!(ctx.events().len(), 1);
            }
        }
        assert!(channel.quorum().is_complete());
        let late = towers[9].address();
        assert_eq!(
            channel.watchtower_claim_state(&mut call(&late, 0), &announcement, 9),
            Err(ChannelError::RaceComplete)
        );
        assert_eq!(channel.quorum().claim_count(), 9);
        assert!(!channel.quorum().has_claimed(9));
    }

    #[test]
    fn one_claim_per_watchtower() {
        let towers = watchtower_keys(4);
        let mut channel = open_channel(&towers);
        let first = co_sign_announcement(&channel_id(), 1, &alice_key(), &bob_key()).unwrap();
        let second = co_sign_announcement(&channel_id(), 2, &alice_key(), &bob_key()).unwrap();
        let t0 = towers[0].address();
        channel.watchtower_claim_state(&mut call(&t0, 0), &first, 0).unwrap();
        assert_eq!(
            channel.watchtower_claim_state(&mut call(&t0, 0), &second, 0),
            Err(ChannelError::AlreadyClaimed { index: 0 })
        );
        assert_eq!(channel.quorum().claim_count(), 1);
        assert_eq!(channel.quorum().highest_claimed_seq(), 1);
    }

    #[test]
    fn highest_seq_is_the_maximum() {
        let towers = watchtower_keys(7);
        let mut channel = open_channel(&towers);
        for (i, seq) in [4u16, 9, 2, 7].into_iter().enumerate() {
            let announcement = co_sign_announcement(&channel_id(), seq, &alice_key(), &bob_key()).unwrap();
            channel.watchtower_claim_state(&mut call(&towers[i].address(), 0), &announcement, i).unwrap();
        }
        assert_eq!(channel.quorum().highest_claimed_seq(), 9);
        assert!(!channel.quorum().is_complete());
    }

    #[test]
    fn claim_preconditions() {
        let towers = watchtower_keys(4);
        let announcement = co_sign_announcement(&channel_id(), 1, &alice_key(), &bob_key()).unwrap();
        let t0 = towers[0].address();

        let mut funded = funded_channel(&towers);
        assert_eq!(funded.watchtower_claim_state(&mut call(&t0, 0), &announcement, 0), Err(ChannelError::NotOpen));

        let mut channel = open_channel(&towers);
        assert_eq!(
            channel.watchtower_claim_state(&mut call(&t0, 0), &announcement, 1),
            Err(ChannelError::WrongWatchtower { index: 1 })
        );
        assert_eq!(
            channel.watchtower_claim_state(&mut call(&eve(), 0), &announcement, 0),
            Err(ChannelError::WrongWatchtower { index: 0 })
        );
        assert_eq!(
            channel.watchtower_claim_state(&mut call(&t0, 3), &announcement, 0),
            Err(ChannelError::NotPayable(wei(3)))
        );
        assert_eq!(channel.quorum().claim_count(), 0);
    }

    #[test]
    fn announcements_need_both_signatures() {
        let towers = watchtower_keys(4);
        let mut channel = open_channel(&towers);
        let alice_sig = sign_announcement(&channel_id(), 5, &alice_key()).unwrap();
        let bob_sig = sign_announcement(&channel_id(), 5, &bob_key()).unwrap();
        let good = Announcement::new(5, alice_sig, bob_sig);
        assert!(channel.valid_announcement(&good));

        let alice_twice = Announcement::new(5, alice_sig, alice_sig);
        let swapped = Announcement::new(5, bob_sig, alice_sig);
        let wrong_seq = Announcement::new(6, alice_sig, bob_sig);
        let other_channel = co_sign_announcement(&eve(), 5, &alice_key(), &bob_key()).unwrap();
        for bad in [alice_twice, swapped, wrong_seq, other_channel] {
            assert!(!channel.valid_announcement(&bad));
            assert_eq!(
                channel.watchtower_claim_state(&mut call(&towers[0].address(), 0), &bad, 0),
                Err(ChannelError::InvalidAnnouncementSignatures)
            );
        }
        assert!(!channel.quorum().has_claimed(0));
        channel.watchtower_claim_state(&mut call(&towers[0].address(), 0), &good, 0).unwrap();
        assert!(channel.quorum().has_claimed(0));
    }

    #[test]
    fn single_watchtower_committee() {
        let towers = watchtower_keys(1);
        let mut channel = open_channel(&towers);
        assert_eq!(channel.quorum().threshold(), 1);
        let announcement = co_sign_announcement(&channel_id(), 0, &alice_key(), &bob_key()).unwrap();
        channel.watchtower_claim_state(&mut call(&towers[0].address(), 0), &announcement, 0).unwrap();
        assert!(channel.quorum().is_complete());
        assert_eq!(channel.quorum().highest_claimed_seq(), 0);
    }
}
