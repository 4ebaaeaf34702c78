use crate::address::Address;
use crate::balance::Balances;
use crate::channel::{Channel, ChannelError, ChannelEvent, ChannelParams, Committee, Escrow, Phase, QuorumTracker};
use crate::host::CallContext;
use log::*;

impl Channel {
    /// Creates a channel. The caller is Alice and the attached value is her deposit, which must cover her fee share.
    ///
    /// `id` is the channel's identity as assigned by the host; every signed message is bound to it. Neither party may
    /// sit on the committee.
    pub fn create(
        ctx: &mut CallContext,
        id: Address,
        bob: Address,
        watchtowers: Vec<Address>,
        params: ChannelParams,
    ) -> Result<Self, ChannelError> {
        let alice = ctx.caller();
        let committee = Committee::new(watchtowers)?;
        if let Some(index) = committee.members().iter().position(|w| *w == alice || *w == bob) {
            return Err(ChannelError::InvalidCommittee { index });
        }
        let deposit = ctx.value();
        let required = params.fee_share();
        if deposit < required {
            return Err(ChannelError::InsufficientFee { deposit, required });
        }
        let quorum = QuorumTracker::new(&committee);
        let n = committee.len();
        info!(
            "Channel {id} created by {alice} for {bob} with {n} watchtowers (f = {}, t = {})",
            committee.fault_tolerance(),
            committee.quorum_threshold()
        );
        ctx.emit(ChannelEvent::Created { channel: id, alice, bob, watchtowers: n });
        Ok(Channel {
            id,
            alice,
            bob,
            committee,
            params,
            phase: Phase::AwaitingFunding,
            alice_escrow: Escrow::funded_with(deposit),
            bob_escrow: Escrow::default(),
            watchtower_escrows: vec![Escrow::default(); n],
            initial: None,
            proposal: None,
            quorum,
            close_record: None,
        })
    }

    /// Bob's deposit. Fixes the initial balance split: each party's deposit less its fee share.
    pub fn fund_bob(&mut self, ctx: &mut CallContext) -> Result<(), ChannelError> {
        if ctx.caller() != self.bob {
            return Err(ChannelError::Unauthorized);
        }
        if self.bob_escrow.funded {
            return Err(ChannelError::AlreadyFunded);
        }
        self.require_awaiting_funding()?;
        if self.is_abandoned() {
            return Err(ChannelError::FundingAbandoned);
        }
        let deposit = ctx.value();
        let fee_share = self.params.fee_share();
        if deposit < fee_share {
            return Err(ChannelError::InsufficientFee { deposit, required: fee_share });
        }
        let alice_value = self.alice_escrow.deposit.checked_sub(fee_share).ok_or(ChannelError::ArithmeticOverflow)?;
        let bob_value = deposit.checked_sub(fee_share).ok_or(ChannelError::ArithmeticOverflow)?;
        let initial = Balances::new(alice_value, bob_value);
        initial.total().ok_or(ChannelError::ArithmeticOverflow)?;
        self.bob_escrow = Escrow::funded_with(deposit);
        self.initial = Some(initial);
        info!("Bob funded channel {} with {deposit}. Initial split {} / {}", self.id, initial.alice, initial.bob);
        ctx.emit(ChannelEvent::BobFunded { initial });
        Ok(())
    }

    /// Watchtower `index` escrows its collateral. Only possible after Bob has funded.
    pub fn fund_watchtower(&mut self, ctx: &mut CallContext, index: usize) -> Result<(), ChannelError> {
        if !self.committee.is_member_at(index, &ctx.caller()) {
            return Err(ChannelError::WrongWatchtower { index });
        }
        if self.watchtower_escrows[index].funded {
            return Err(ChannelError::AlreadyFunded);
        }
        self.require_awaiting_funding()?;
        if self.is_abandoned() {
            return Err(ChannelError::FundingAbandoned);
        }
        if !self.bob_escrow.funded {
            return Err(ChannelError::NotYetFundable);
        }
        let deposit = ctx.value();
        if deposit < self.params.collateral {
            return Err(ChannelError::InsufficientCollateral { deposit, required: self.params.collateral });
        }
        self.watchtower_escrows[index] = Escrow::funded_with(deposit);
        debug!("Watchtower {index} funded channel {} with {deposit}", self.id);
        ctx.emit(ChannelEvent::WatchtowerFunded { index, deposit });
        Ok(())
    }

    /// Pays a depositor back before the channel opens.
    ///
    /// Alice and Bob are recognised by identity and `index` is ignored for them. Any other caller must be watchtower
    /// `index`. Each depositor can withdraw once, and after any withdrawal the channel can no longer open.
    pub fn withdraw_before_open(&mut self, ctx: &mut CallContext, index: usize) -> Result<(), ChannelError> {
        Self::require_no_value(ctx)?;
        self.require_awaiting_funding()?;
        let caller = ctx.caller();
        let escrow = if caller == self.alice {
            &mut self.alice_escrow
        } else if caller == self.bob {
            &mut self.bob_escrow
        } else if self.committee.is_member_at(index, &caller) {
            &mut self.watchtower_escrows[index]
        } else {
            return Err(ChannelError::Unauthorized);
        };
        if escrow.withdrawn {
            return Err(ChannelError::AlreadyWithdrawn);
        }
        if !escrow.funded {
            return Err(ChannelError::NothingToWithdraw);
        }
        escrow.withdrawn = true;
        let amount = escrow.deposit;
        info!("{caller} withdrew {amount} from channel {} before it opened", self.id);
        ctx.pay(caller, amount);
        ctx.emit(ChannelEvent::Withdrawn { account: caller, amount });
        if self.is_dissolved() {
            info!("Every deposit in channel {} has been withdrawn", self.id);
        }
        Ok(())
    }

    /// Opens the channel. Requires Bob's deposit and the collateral of every watchtower.
    pub fn open(&mut self, ctx: &mut CallContext) -> Result<(), ChannelError> {
        Self::require_no_value(ctx)?;
        self.require_awaiting_funding()?;
        if !self.bob_escrow.funded {
            return Err(ChannelError::InvalidPhase(self.phase));
        }
        if self.is_abandoned() {
            return Err(ChannelError::FundingAbandoned);
        }
        if let Some(index) = self.watchtower_escrows.iter().position(|e| !e.funded) {
            return Err(ChannelError::IncompleteFunding { index });
        }
        self.phase = Phase::Open;
        info!("Channel {} is open. Total value {}", self.id, self.require_total()?);
        ctx.emit(ChannelEvent::Opened);
        Ok(())
    }
}
