use crate::address::Address;
use crate::channel::error::ChannelError;
use serde::{Deserialize, Serialize};

/// The number of Byzantine watchtowers a committee of `n` tolerates: `f = ⌊(n - 1) / 3⌋`.
pub const fn fault_tolerance(n: usize) -> usize {
    n.saturating_sub(1) / 3
}

/// The number of claims needed to complete the quorum: `t = min(2f + 1, n)`.
pub const fn quorum_threshold(n: usize) -> usize {
    let t = 2 * fault_tolerance(n) + 1;
    if t < n {
        t
    } else {
        n
    }
}

/// The fixed, ordered watchtower committee of a channel. Membership never changes after creation, and watchtowers
/// are always referred to by their index in this list. Each address appears at most once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    members: Vec<Address>,
}

impl Committee {
    pub fn new(members: Vec<Address>) -> Result<Self, ChannelError> {
        if members.is_empty() {
            return Err(ChannelError::EmptyCommittee);
        }
        if let Some(index) = (1..members.len()).find(|&i| members[..i].contains(&members[i])) {
            return Err(ChannelError::InvalidCommittee { index });
        }
        Ok(Committee { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Address] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&Address> {
        self.members.get(index)
    }

    pub fn contains(&self, who: &Address) -> bool {
        self.members.contains(who)
    }

    /// True if `who` sits at position `index`.
    pub fn is_member_at(&self, index: usize, who: &Address) -> bool {
        self.member(index) == Some(who)
    }

    pub fn fault_tolerance(&self) -> usize {
        fault_tolerance(self.len())
    }

    pub fn quorum_threshold(&self) -> usize {
        quorum_threshold(self.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn thresholds() {
        // (n, f, t)
        let cases = [(1, 0, 1), (2, 0, 1), (3, 0, 1), (4, 1, 3), (6, 1, 3), (7, 2, 5), (10, 3, 7), (13, 4, 9)];
        for (n, f, t) in cases {
            assert_eq!(fault_tolerance(n), f, "f for n={n}");
            assert_eq!(quorum_threshold(n), t, "t for n={n}");
        }
    }

    #[test]
    fn threshold_never_exceeds_committee() {
        for n in 1..100 {
            assert!(quorum_threshold(n) <= n);
            assert!(quorum_threshold(n) > 2 * fault_tolerance(n));
        }
    }

    #[test]
    fn membership() {
        let a = Address::new([1; 20]);
        let b = Address::new([2; 20]);
        let committee = Committee::new(vec![a, b]).unwrap();
        assert!(committee.is_member_at(0, &a));
        assert!(!committee.is_member_at(1, &a));
        assert!(!committee.is_member_at(5, &a));
        assert_eq!(committee.member(1), Some(&b));
        assert!(committee.contains(&b));
        assert!(!committee.contains(&Address::new([3; 20])));
        assert_eq!(Committee::new(vec![]), Err(ChannelError::EmptyCommittee));
    }

    #[test]
    fn members_are_unique() {
        let a = Address::new([1; 20]);
        let b = Address::new([2; 20]);
        assert_eq!(Committee::new(vec![a, b, a]), Err(ChannelError::InvalidCommittee { index: 2 }));
        assert_eq!(Committee::new(vec![b, b]), Err(ChannelError::InvalidCommittee { index: 1 }));
    }
}
