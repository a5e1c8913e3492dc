//! Arm type for the dosing bandit.
//!
//! The arm set is closed: every policy chooses one of three weekly dose
//! classes. [`ArmTable`] stores one value per arm and always iterates in the
//! fixed order low, medium, high, which is also the tie-breaking order.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::BanditError;

/// Upper bound (exclusive) of the low dose class, in mg/week.
pub const LOW_DOSE_LIMIT: f64 = 21.0;

/// Upper bound (inclusive) of the medium dose class, in mg/week.
pub const MEDIUM_DOSE_LIMIT: f64 = 49.0;

/// A weekly warfarin dose class.
///
/// # Examples
///
/// ```
/// use dosebandit::DoseClass;
///
/// let arm: DoseClass = "medium".parse().unwrap();
/// assert_eq!(arm, DoseClass::Medium);
/// assert_eq!(DoseClass::from_weekly_dose(52.5), DoseClass::High);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DoseClass {
    /// Under 21 mg/week
    Low,
    /// 21 to 49 mg/week inclusive
    Medium,
    /// Over 49 mg/week
    High,
}

impl DoseClass {
    /// All arms in tie-breaking order.
    pub const ALL: [DoseClass; 3] = [DoseClass::Low, DoseClass::Medium, DoseClass::High];

    /// Classify a continuous weekly dose.
    pub fn from_weekly_dose(weekly_dose: f64) -> Self {
        if weekly_dose < LOW_DOSE_LIMIT {
            DoseClass::Low
        } else if weekly_dose <= MEDIUM_DOSE_LIMIT {
            DoseClass::Medium
        } else {
            DoseClass::High
        }
    }

    /// Position of this arm in [`DoseClass::ALL`].
    pub fn index(self) -> usize {
        match self {
            DoseClass::Low => 0,
            DoseClass::Medium => 1,
            DoseClass::High => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DoseClass::Low => "low",
            DoseClass::Medium => "medium",
            DoseClass::High => "high",
        }
    }

    /// True when `self` and `other` sit at opposite extremes.
    pub fn is_opposite_extreme(self, other: DoseClass) -> bool {
        matches!(
            (self, other),
            (DoseClass::Low, DoseClass::High) | (DoseClass::High, DoseClass::Low)
        )
    }
}

/// Classify a continuous weekly dose (mg/week) into its dose class.
pub fn dose_class(weekly_dose: f64) -> DoseClass {
    DoseClass::from_weekly_dose(weekly_dose)
}

impl fmt::Display for DoseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoseClass {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(DoseClass::Low),
            "medium" => Ok(DoseClass::Medium),
            "high" => Ok(DoseClass::High),
            _ => Err(BanditError::UnknownArm {
                name: s.to_string(),
            }),
        }
    }
}

/// One value per arm, indexed by [`DoseClass`].
#[derive(Clone, Debug, PartialEq)]
pub struct ArmTable<T>([T; 3]);

impl<T> ArmTable<T> {
    /// Build a table by evaluating `f` for each arm in order.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(DoseClass) -> T,
    {
        Self([
            f(DoseClass::Low),
            f(DoseClass::Medium),
            f(DoseClass::High),
        ])
    }

    /// Iterate over `(arm, value)` pairs in tie-breaking order.
    pub fn iter(&self) -> impl Iterator<Item = (DoseClass, &T)> {
        DoseClass::ALL.into_iter().zip(self.0.iter())
    }

    /// Fallible counterpart of [`ArmTable::from_fn`].
    pub fn try_from_fn<F, E>(mut f: F) -> Result<Self, E>
    where
        F: FnMut(DoseClass) -> Result<T, E>,
    {
        Ok(Self([
            f(DoseClass::Low)?,
            f(DoseClass::Medium)?,
            f(DoseClass::High)?,
        ]))
    }
}

impl<T> Index<DoseClass> for ArmTable<T> {
    type Output = T;

    fn index(&self, arm: DoseClass) -> &T {
        &self.0[arm.index()]
    }
}

impl<T> IndexMut<DoseClass> for ArmTable<T> {
    fn index_mut(&mut self, arm: DoseClass) -> &mut T {
        &mut self.0[arm.index()]
    }
}
