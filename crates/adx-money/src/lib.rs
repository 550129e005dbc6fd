//! Fixed-point UST money type.
//!
//! # Motivation
//!
//! Every monetary value in the auction/reward core — bids, CPMs, impression
//! costs, reward shares, wallet balances — uses a 1e-6 (micro-UST)
//! fixed-point representation stored as `i64`.  Raw `i64` money is
//! error-prone: it permits accidental arithmetic with unrelated integers
//! (impression counts, durations, ids) without any compile-time signal, and
//! floating-point money makes the double-entry balance invariant impossible
//! to keep exact at cents-level precision.
//!
//! `Ust` wraps the raw `i64` so the type system prevents:
//! - Implicit construction from raw `i64` (no `From<i64>` impl).
//! - Mixing `Ust` with unrelated `i64` values in arithmetic.
//!
//! # Scale
//!
//! 1 UST = 1_000_000 micro-UST.  All monetary values use this scale.
//! Non-monetary quantities (author counts, impression counters, day
//! durations) remain plain integers and are never implicitly convertible.
//!
//! # Splitting
//!
//! Reward distribution needs an exact even split across N recipients.
//! [`Ust::split_even`] returns N parts whose sum equals the original amount
//! exactly; a non-divisible remainder goes to the first part, never silently
//! dropped.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Micro scale: 1 UST = 1e6 micro-UST.
pub const UST_SCALE: i64 = 1_000_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures from checked `Ust` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Arithmetic overflowed the i64 micro range.
    Overflow,
    /// A relevance multiplier was NaN or infinite.
    InvalidMultiplier,
    /// A split across zero recipients was requested.
    ZeroRecipients,
}

impl std::fmt::Display for MoneyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overflow => write!(f, "money arithmetic overflowed i64 micro-UST"),
            Self::InvalidMultiplier => write!(f, "multiplier must be a finite number"),
            Self::ZeroRecipients => write!(f, "cannot split an amount across zero recipients"),
        }
    }
}

impl std::error::Error for MoneyError {}

// ---------------------------------------------------------------------------
// Ust newtype
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount at 1e-6 scale (micro-UST).
///
/// 1 UST = `Ust::from_micros(1_000_000)`.
///
/// There is intentionally no `From<i64>` implementation — callers must be
/// deliberate about when a raw integer represents money and at what scale.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Ust(i64);

impl Ust {
    /// Zero monetary amount.
    pub const ZERO: Ust = Ust(0);

    /// Maximum representable value.
    pub const MAX: Ust = Ust(i64::MAX);

    /// Construct from raw micro-UST.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Ust(micros)
    }

    /// Construct from whole UST units (convenience for fixtures and tests).
    #[inline]
    pub const fn from_whole(units: i64) -> Self {
        Ust(units * UST_SCALE)
    }

    /// Extract the raw micro-UST value.
    #[inline]
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// `true` if this amount is strictly negative.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `true` if this amount is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Saturating addition — clamps at [`Ust::MAX`] on overflow.
    #[inline]
    pub fn saturating_add(self, rhs: Ust) -> Ust {
        Ust(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    pub fn saturating_sub(self, rhs: Ust) -> Ust {
        Ust(self.0.saturating_sub(rhs.0))
    }

    /// Checked addition.  Overflow in a ledger sum is a critical error, not a
    /// routine saturation, so callers must handle `Err` explicitly.
    #[inline]
    pub fn checked_add(self, rhs: Ust) -> Result<Ust, MoneyError> {
        self.0
            .checked_add(rhs.0)
            .map(Ust)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction.
    #[inline]
    pub fn checked_sub(self, rhs: Ust) -> Result<Ust, MoneyError> {
        self.0
            .checked_sub(rhs.0)
            .map(Ust)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiply by a relevance score in `[0, 1]`.
    ///
    /// Used to weight an `Auto` bid into a bidding CPM.  The result is
    /// rounded to the nearest micro.  Rejects NaN/infinite multipliers;
    /// negative multipliers clamp to zero (a relevance score can never make
    /// a bid negative).
    pub fn mul_score(self, score: f64) -> Result<Ust, MoneyError> {
        if !score.is_finite() {
            return Err(MoneyError::InvalidMultiplier);
        }
        let clamped = if score < 0.0 { 0.0 } else { score };
        let scaled = (self.0 as f64) * clamped;
        if scaled > i64::MAX as f64 {
            return Err(MoneyError::Overflow);
        }
        Ok(Ust(scaled.round() as i64))
    }

    /// Split this amount evenly across `n` recipients.
    ///
    /// Returns exactly `n` parts whose sum equals `self`.  When the amount
    /// does not divide evenly, the remainder (always `< n` micros) is added
    /// to the **first** part, so `Σ parts == self` holds exactly.
    ///
    /// # Errors
    /// [`MoneyError::ZeroRecipients`] when `n == 0`.
    pub fn split_even(self, n: usize) -> Result<Vec<Ust>, MoneyError> {
        if n == 0 {
            return Err(MoneyError::ZeroRecipients);
        }
        let n_i64 = n as i64;
        let base = self.0 / n_i64;
        let remainder = self.0 % n_i64;
        let mut parts = vec![Ust(base); n];
        parts[0] = Ust(base + remainder);
        Ok(parts)
    }
}

// ---------------------------------------------------------------------------
// Arithmetic operators (closed over Ust)
// ---------------------------------------------------------------------------

impl Add for Ust {
    type Output = Ust;
    #[inline]
    fn add(self, rhs: Ust) -> Ust {
        Ust(self.0 + rhs.0)
    }
}

impl Sub for Ust {
    type Output = Ust;
    #[inline]
    fn sub(self, rhs: Ust) -> Ust {
        Ust(self.0 - rhs.0)
    }
}

impl Neg for Ust {
    type Output = Ust;
    #[inline]
    fn neg(self) -> Ust {
        Ust(-self.0)
    }
}

impl AddAssign for Ust {
    #[inline]
    fn add_assign(&mut self, rhs: Ust) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Ust {
    #[inline]
    fn sub_assign(&mut self, rhs: Ust) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Ust {
    fn sum<I: Iterator<Item = Ust>>(iter: I) -> Ust {
        iter.fold(Ust::ZERO, |acc, v| acc.saturating_add(v))
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Ust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = self.0 / UST_SCALE;
        let frac = (self.0 % UST_SCALE).abs();
        if self.0 < 0 && units == 0 {
            write!(f, "-{units}.{frac:06}")
        } else {
            write!(f, "{units}.{frac:06}")
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
