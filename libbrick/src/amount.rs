use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// An amount of native value held in, or paid out of, a channel.
///
/// Values are denominated in wei. On the wire an amount is a 256-bit big-endian word; the upper 128 bits are always
/// zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount {
    wei: u128,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{0}' is not a valid amount")]
pub struct AmountParseError(String);

impl Amount {
    pub const ZERO: Amount = Amount { wei: 0 };

    /// Creates a new `Amount` from a value in wei.
    pub const fn from_wei(wei: u128) -> Self {
        Amount { wei }
    }

    /// Converts the `Amount` to wei.
    pub const fn to_wei(&self) -> u128 {
        self.wei
    }

    /// Creates a new `Amount` from a string representing whole ether units.
    /// Returns `None` if the string is not a valid number representation.
    pub fn from_ether(ether: &str) -> Option<Self> {
        let mut parts = ether.split('.');
        let whole = parts.next()?.parse::<u128>().ok()?;
        let fraction = if let Some(frac_str) = parts.next() {
            if parts.next().is_some() {
                return None;
            }
            if frac_str.is_empty() || frac_str.len() > 18 {
                return None;
            }
            let mut padded_frac = frac_str.to_string();
            while padded_frac.len() < 18 {
                padded_frac.push('0');
            }
            padded_frac.parse::<u128>().ok()?
        } else {
            0
        };
        let wei = whole.checked_mul(WEI_PER_ETHER)?.checked_add(fraction)?;
        Some(Amount { wei })
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.wei.checked_add(other.wei).map(Amount::from_wei)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.wei.checked_sub(other.wei).map(Amount::from_wei)
    }

    /// Half of the amount, rounded down. This is each party's share of the channel fee.
    pub const fn half(&self) -> Amount {
        Amount { wei: self.wei / 2 }
    }

    pub const fn is_zero(&self) -> bool {
        self.wei == 0
    }

    /// The 256-bit big-endian word encoding of this amount.
    pub fn to_be_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[16..].copy_from_slice(&self.wei.to_be_bytes());
        word
    }
}

impl From<u128> for Amount {
    fn from(wei: u128) -> Self {
        Amount::from_wei(wei)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parses either a plain wei integer (`"25"`) or an ether value with an `eth` suffix (`"0.5eth"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let parsed = match lower.strip_suffix("eth") {
            Some(ether) => Amount::from_ether(ether.trim()),
            None => trimmed.parse::<u128>().ok().map(Amount::from_wei),
        };
        parsed.ok_or_else(|| AmountParseError(s.to_string()))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} wei", self.wei)
    }
}

#[cfg(test)]
mod test {
    use crate::amount::Amount;

    #[test]
    fn from_ether_strings() {
        let val = Amount::from_ether("1.0").unwrap();
        assert_eq!(val.to_wei(), 1_000_000_000_000_000_000);

        let val = Amount::from_ether("1.25").unwrap();
        assert_eq!(val.to_wei(), 1_250_000_000_000_000_000);

        let val = Amount::from_ether("0.000000000000000020").unwrap();
        assert_eq!(val.to_wei(), 20);

        let val = Amount::from_ether("123").unwrap();
        assert_eq!(val.to_wei(), 123_000_000_000_000_000_000);

        assert!(Amount::from_ether("1.0000000000000000001").is_none());
        assert!(Amount::from_ether("1.000.1110").is_none());
        assert!(Amount::from_ether("zero").is_none());
        assert!(Amount::from_ether(".5").is_none());
        assert!(Amount::from_ether("5.").is_none());
    }

    #[test]
    fn parse_wei_and_ether() {
        assert_eq!("25".parse::<Amount>().unwrap(), Amount::from_wei(25));
        assert_eq!("0.5eth".parse::<Amount>().unwrap(), Amount::from_wei(500_000_000_000_000_000));
        assert_eq!("2 ETH".parse::<Amount>().unwrap(), Amount::from_wei(2_000_000_000_000_000_000));
        assert!("-3".parse::<Amount>().is_err());
        assert!("ten".parse::<Amount>().is_err());
    }

    #[test]
    fn fee_share_rounds_down() {
        assert_eq!(Amount::from_wei(20).half(), Amount::from_wei(10));
        assert_eq!(Amount::from_wei(21).half(), Amount::from_wei(10));
        assert_eq!(Amount::ZERO.half(), Amount::ZERO);
    }

    #[test]
    fn word_encoding_is_big_endian() {
        let word = Amount::from_wei(0x0102).to_be_word();
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
        assert!(word[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn checked_arithmetic() {
        let a = Amount::from_wei(5);
        let b = Amount::from_wei(12);
        assert_eq!(a.checked_add(b), Some(Amount::from_wei(17)));
        assert_eq!(b.checked_sub(a), Some(Amount::from_wei(7)));
        assert_eq!(a.checked_sub(b), None);
        assert_eq!(Amount::from_wei(u128::MAX).checked_add(a), None);
    }
}
