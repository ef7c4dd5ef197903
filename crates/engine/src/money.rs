use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{Currency, EngineError};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (registry amounts,
/// posting amounts, balances) so the double-entry invariant is checked on
/// exact integers.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34 DOP");
/// assert_eq!(amount.plain(), "12.34");
/// ```
///
/// Amounts read back from ledger text must already be whole cents:
///
/// ```rust
/// use engine::MoneyCents;
/// use rust_decimal::Decimal;
///
/// assert_eq!(MoneyCents::exact(Decimal::new(1050, 2)).unwrap().cents(), 1050);
/// assert!(MoneyCents::exact(Decimal::new(12345, 3)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Checked multiplication by an integer factor.
    #[must_use]
    pub fn checked_mul(self, factor: i64) -> Option<MoneyCents> {
        self.0.checked_mul(factor).map(MoneyCents)
    }

    /// Quantizes an exact decimal amount (in major units) to cents.
    ///
    /// Midpoints round away from zero: `0.005` becomes `0.01`, `-0.005`
    /// becomes `-0.01`.
    pub fn from_decimal(value: Decimal) -> Result<Self, EngineError> {
        let cents = value
            .round_dp_with_strategy(
                u32::from(Currency::Dop.minor_units()),
                RoundingStrategy::MidpointAwayFromZero,
            )
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.to_i64())
            .ok_or_else(|| EngineError::InvalidAmount(format!("amount too large: {value}")))?;
        Ok(Self(cents))
    }

    /// Converts an amount that must already be whole cents, as read from
    /// ledger text. More than two decimals is an error, not a rounding.
    pub fn exact(value: Decimal) -> Result<Self, EngineError> {
        if value.normalize().scale() > u32::from(Currency::Dop.minor_units()) {
            return Err(EngineError::InvalidAmount(format!(
                "too many decimals: {value}"
            )));
        }
        Self::from_decimal(value)
    }

    /// Divides the amount into `parts` equal shares rounded to whole cents,
    /// midpoints away from zero.
    ///
    /// The remainder is **not** distributed: callers that need the shares to
    /// add back up to `self` must book the residual themselves.
    pub fn share(self, parts: usize) -> Result<Self, EngineError> {
        if parts == 0 {
            return Err(EngineError::InvalidSplit(
                "cannot split an amount in zero parts".to_string(),
            ));
        }
        let share = (Decimal::from(self.0) / Decimal::from(parts as u64))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| EngineError::InvalidAmount("share too large".to_string()))?;
        Ok(Self(share))
    }

    /// Formats the amount without the currency code (`-12.34`), as written in
    /// ledger postings.
    #[must_use]
    pub fn plain(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        format!("{sign}{units}.{cents:02}")
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.plain(), Currency::Dop)
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
