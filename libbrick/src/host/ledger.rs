use crate::address::Address;
use crate::amount::Amount;
use log::*;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Account {account} holds {available}, but {needed} is needed")]
    InsufficientBalance { account: Address, needed: Amount, available: Amount },
    #[error("The balance of {account} would overflow")]
    Overflow { account: Address },
    #[error("The ledger rejected the transfer: {0}")]
    Rejected(String),
}

/// Native value accounts. A failed call must leave balances untouched.
pub trait Ledger {
    fn balance(&self, account: &Address) -> Amount;
    fn debit(&mut self, account: &Address, amount: Amount) -> Result<(), LedgerError>;
    fn credit(&mut self, account: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Moves `amount` from `from` to `to`. Either both sides change or neither does.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        if let Err(e) = self.credit(to, amount) {
            if let Err(undo) = self.credit(from, amount) {
                error!("Could not restore {amount} to {from} after a failed transfer: {undo}");
            }
            return Err(e);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    balances: HashMap<Address, Amount>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `amount` out of thin air in `account`.
    pub fn mint(&mut self, account: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.credit(account, amount)
    }

    /// The sum of every balance, or `None` on overflow.
    pub fn total_supply(&self) -> Option<Amount> {
        self.balances.values().try_fold(Amount::ZERO, |acc, v| acc.checked_add(*v))
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn debit(&mut self, account: &Address, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance(account);
        let remaining = available.checked_sub(amount).ok_or(LedgerError::InsufficientBalance {
            account: *account,
            needed: amount,
            available,
        })?;
        self.balances.insert(*account, remaining);
        Ok(())
    }

    fn credit(&mut self, account: &Address, amount: Amount) -> Result<(), LedgerError> {
        let updated =
            self.balance(account).checked_add(amount).ok_or(LedgerError::Overflow { account: *account })?;
        self.balances.insert(*account, updated);
        Ok(())
    }
}
