use crate::amount::Amount;
use serde::{Deserialize, Serialize};

//------------------------------------           Balances          ------------------------------------------------//
/// A split of the channel value between Alice and Bob.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub alice: Amount,
    pub bob: Amount,
}

impl Balances {
    pub fn new(alice: Amount, bob: Amount) -> Self {
        Balances { alice, bob }
    }

    /// The total value of the split, or `None` if it cannot be represented.
    pub fn total(&self) -> Option<Amount> {
        self.alice.checked_add(self.bob)
    }

    /// Builds the split in which Alice keeps `alice` out of `total` and Bob receives the remainder.
    pub fn from_alice_share(total: Amount, alice: Amount) -> Option<Self> {
        let bob = total.checked_sub(alice)?;
        Some(Balances::new(alice, bob))
    }

    /// Adds each party's fee share back onto their balance, giving the amounts actually paid out on close.
    pub fn with_fee_refund(&self, fee_share: Amount) -> Option<Self> {
        let alice = self.alice.checked_add(fee_share)?;
        let bob = self.bob.checked_add(fee_share)?;
        Some(Balances::new(alice, bob))
    }
}

#[cfg(test)]
mod test {
    use crate::amount::Amount;
    use crate::balance::Balances;

    fn default_balances() -> Balances {
        Balances::new(Amount::from_wei(5), Amount::from_wei(12))
    }

    #[test]
    fn total() {
        assert_eq!(default_balances().total(), Some(Amount::from_wei(17)));
        let huge = Balances::new(Amount::from_wei(u128::MAX), Amount::from_wei(1));
        assert!(huge.total().is_none());
    }

    #[test]
    fn from_alice_share() {
        let split = Balances::from_alice_share(Amount::from_wei(17), Amount::from_wei(4)).unwrap();
        assert_eq!(split.alice, Amount::from_wei(4));
        assert_eq!(split.bob, Amount::from_wei(13));
        assert!(Balances::from_alice_share(Amount::from_wei(17), Amount::from_wei(18)).is_none());
    }

    #[test]
    fn fee_refund() {
        let paid = default_balances().with_fee_refund(Amount::from_wei(10)).unwrap();
        assert_eq!(paid.alice, Amount::from_wei(15));
        assert_eq!(paid.bob, Amount::from_wei(22));
    }
}
