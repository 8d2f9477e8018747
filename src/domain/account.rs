use crate::error::{Result, ValueViolation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a ledger account.
///
/// Account `0` is the null identity: value sent there would be burned, so the
/// ledger refuses it as a destination and it can never be a participant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl AccountId {
    pub const NULL: Self = Self(0);

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AccountId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A quantity of value held by an account, in the smallest native unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(pub u64);

impl Balance {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, amount: Amount) -> Option<Self> {
        self.0.checked_add(amount.value()).map(Self)
    }

    pub fn checked_sub(self, amount: Amount) -> Option<Self> {
        self.0.checked_sub(amount.value()).map(Self)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

/// A strictly positive quantity of value attached to a call or a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(ValueViolation::ZeroAmount.into())
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Splits the amount into two equal shares and the unit left over by
    /// integer division. The share is `None` for an amount of one.
    pub fn halve(&self) -> (Option<Amount>, Option<Amount>) {
        let share = self.0 / 2;
        let remainder = self.0 % 2;
        ((share > 0).then_some(Self(share)), (remainder > 0).then_some(Self(remainder)))
    }
}

impl TryFrom<u64> for Amount {
    type Error = crate::error::SplitterError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Final state of a ledger account, as reported to observers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct LedgerAccount {
    pub account: AccountId,
    pub balance: Balance,
}

impl LedgerAccount {
    pub fn new(account: AccountId, balance: Balance) -> Self {
        Self { account, balance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SplitterError;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(1).is_ok());
        assert!(matches!(
            Amount::new(0),
            Err(SplitterError::Value(ValueViolation::ZeroAmount))
        ));
    }

    #[test]
    fn test_amount_halve() {
        let (share, remainder) = Amount::new(10).unwrap().halve();
        assert_eq!(share, Some(Amount::new(5).unwrap()));
        assert_eq!(remainder, None);

        let (share, remainder) = Amount::new(11).unwrap().halve();
        assert_eq!(share, Some(Amount::new(5).unwrap()));
        assert_eq!(remainder, Some(Amount::new(1).unwrap()));

        let (share, remainder) = Amount::new(1).unwrap().halve();
        assert_eq!(share, None);
        assert_eq!(remainder, Some(Amount::new(1).unwrap()));
    }

    #[test]
    fn test_balance_checked_arithmetic() {
        let five = Amount::new(5).unwrap();
        assert_eq!(Balance::new(10).checked_add(five), Some(Balance::new(15)));
        assert_eq!(Balance::new(10).checked_sub(five), Some(Balance::new(5)));
        assert_eq!(Balance::new(4).checked_sub(five), None);
        assert_eq!(Balance::new(u64::MAX).checked_add(five), None);
    }

    #[test]
    fn test_amount_deserialization_rejects_zero() {
        assert!(serde_json::from_str::<Amount>("0").is_err());
        assert_eq!(
            serde_json::from_str::<Amount>("7").unwrap(),
            Amount::new(7).unwrap()
        );
    }

    #[test]
    fn test_null_account() {
        assert!(AccountId::NULL.is_null());
        assert!(!AccountId(1).is_null());
        assert_eq!(AccountId::default(), AccountId::NULL);
    }
}
