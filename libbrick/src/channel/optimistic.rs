use crate::amount::Amount;
use crate::balance::Balances;
use crate::channel::{Channel, ChannelError, ChannelEvent, ClosePath};
use crate::host::CallContext;
use log::*;

impl Channel {
    /// Alice proposes to close with `alice_value` for herself and the rest of the total for Bob.
    ///
    /// Alice may only concede value, never claim more than her initial share. A new proposal replaces any pending one.
    /// No funds move until Bob accepts.
    pub fn optimistic_alice_close(&mut self, ctx: &mut CallContext, alice_value: Amount) -> Result<(), ChannelError> {
        Self::require_no_value(ctx)?;
        self.require_open()?;
        if ctx.caller() != self.alice {
            return Err(ChannelError::Unauthorized);
        }
        let initial = self.initial.ok_or(ChannelError::NotOpen)?;
        if alice_value > initial.alice {
            return Err(ChannelError::ValueTooHigh { proposed: alice_value, initial: initial.alice });
        }
        if let Some(previous) = self.proposal.replace(alice_value) {
            debug!("Alice replaced her pending proposal of {previous} on channel {}", self.id);
        }
        info!("Alice proposed an optimistic close of channel {} with {alice_value} for herself", self.id);
        ctx.emit(ChannelEvent::OptimisticCloseProposed { alice_value });
        Ok(())
    }

    /// Bob accepts Alice's pending proposal and the channel settles.
    pub fn optimistic_bob_close(&mut self, ctx: &mut CallContext) -> Result<(), ChannelError> {
        Self::require_no_value(ctx)?;
        self.require_open()?;
        if ctx.caller() != self.bob {
            return Err(ChannelError::Unauthorized);
        }
        let alice_value = self.proposal.ok_or(ChannelError::BobCannotCloseAlone)?;
        let total = self.require_total()?;
        let final_balance = Balances::from_alice_share(total, alice_value).ok_or(ChannelError::ArithmeticOverflow)?;
        self.settle(ctx, final_balance, ClosePath::Optimistic)
    }
}

#[cfg(test)]
mod test {
    use crate::balance::Balances;
    use crate::channel::test_utils::*;
    use crate::channel::{ChannelError, ChannelEvent, ClosePath, Phase};
    use crate::host::Payout;

    #[test]
    fn reference_optimistic_close() {
        env_logger::try_init().ok();
        let towers = watchtower_keys(13);
        let mut channel = open_channel(&towers);
        let alice = alice_key().address();
        let bob = bob_key().address();
        channel.optimistic_alice_close(&mut call(&alice, 0), wei(4)).unwrap();
        assert_eq!(channel.pending_proposal(), Some(wei(4)));
        let mut ctx = call(&bob, 0);
        channel.optimistic_bob_close(&mut ctx).unwrap();
        assert_eq!(channel.phase(), Phase::Closed);
        let payouts = ctx.payouts();
        assert_eq!(payouts.len(), 15);
        assert_eq!(payouts[0], Payout::new(alice, wei(14)));
        assert_eq!(payouts[1], Payout::new(bob, wei(23)));
        for (i, key) in towers.iter().enumerate() {
            assert_eq!(payouts[i + 2], Payout::new(key.address(), wei(5)));
        }
        let record = channel.close_record().unwrap();
        assert_eq!(record.final_balance, Balances::new(wei(4), wei(13)));
        assert_eq!(record.path, ClosePath::Optimistic);
        assert_eq!(channel.total(), Some(wei(17)));
        assert_eq!(
            ctx.events().last(),
            Some(&ChannelEvent::Closed { path: ClosePath::Optimistic, balances: Balances::new(wei(4), wei(13)) })
        );
    }

    #[test]
    fn alice_cannot_take_more() {
        let towers = watchtower_keys(4);
        let mut channel = open_channel(&towers);
        let alice = alice_key().address();
        assert_eq!(
            channel.optimistic_alice_close(&mut call(&alice, 0), wei(6)),
            Err(ChannelError::ValueTooHigh { proposed: wei(6), initial: wei(5) })
        );
        assert_eq!(channel.pending_proposal(), None);
        // Conceding everything, or nothing, is fine.
        channel.optimistic_alice_close(&mut call(&alice, 0), wei(5)).unwrap();
        channel.optimistic_alice_close(&mut call(&alice, 0), wei(0)).unwrap();
        assert_eq!(channel.pending_proposal(), Some(wei(0)));
    }

    #[test]
    fn only_the_parties_may_close() {
        let towers = watchtower_keys(4);
        let mut channel = open_channel(&towers);
        let alice = alice_key().address();
        let bob = bob_key().address();
        assert_eq!(channel.optimistic_alice_close(&mut call(&bob, 0), wei(1)), Err(ChannelError::Unauthorized));
        assert_eq!(channel.optimistic_alice_close(&mut call(&eve(), 0), wei(1)), Err(ChannelError::Unauthorized));
        assert_eq!(channel.optimistic_bob_close(&mut call(&bob, 0)), Err(ChannelError::BobCannotCloseAlone));
        channel.optimistic_alice_close(&mut call(&alice, 0), wei(1)).unwrap();
        assert_eq!(channel.optimistic_bob_close(&mut call(&alice, 0)), Err(ChannelError::Unauthorized));
        assert_eq!(channel.phase(), Phase::Open);
    }

    #[test]
    fn requires_open_channel() {
        let towers = watchtower_keys(4);
        let mut channel = funded_channel(&towers);
        let alice = alice_key().address();
        assert_eq!(channel.optimistic_alice_close(&mut call(&alice, 0), wei(1)), Err(ChannelError::NotOpen));
    }

    #[test]
    fn double_close_fails() {
        let towers = watchtower_keys(4);
        let mut channel = open_channel(&towers);
        let alice = alice_key().address();
        let bob = bob_key().address();
        channel.optimistic_alice_close(&mut call(&alice, 0), wei(2)).unwrap();
        channel.optimistic_bob_close(&mut call(&bob, 0)).unwrap();
        let closed = channel.clone();
        let mut ctx = call(&bob, 0);
        assert_eq!(channel.optimistic_bob_close(&mut ctx), Err(ChannelError::AlreadyClosed));
        assert_eq!(channel.optimistic_alice_close(&mut call(&alice, 0), wei(1)), Err(ChannelError::AlreadyClosed));
        assert!(ctx.payouts().is_empty());
        assert_eq!(channel, closed);
        assert_eq!(channel.pending_proposal(), None);
    }

    #[test]
    fn overpaid_collateral_is_returned_in_full() {
        let towers = watchtower_keys(4);
        let mut channel = funded_channel(&towers);
        for (i, key) in towers.iter().enumerate() {
            let deposit = if i == 2 { 8 } else { 5 };
            channel.fund_watchtower(&mut call(&key.address(), deposit), i).unwrap();
        }
        channel.open(&mut call(&eve(), 0)).unwrap();
        channel.optimistic_alice_close(&mut call(&alice_key().address(), 0), wei(5)).unwrap();
        let mut ctx = call(&bob_key().address(), 0);
        channel.optimistic_bob_close(&mut ctx).unwrap();
        assert_eq!(ctx.payouts()[4], Payout::new(towers[2].address(), wei(8)));
        assert_eq!(ctx.payouts()[3], Payout::new(towers[1].address(), wei(5)));
    }
}
