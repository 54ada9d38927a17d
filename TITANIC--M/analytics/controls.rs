//! Widget values. Each type only admits values its control can produce, so
//! views never validate ranges at render time.

use std::{fmt, ops::RangeInclusive};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::record::{PassengerClass, Sex};

/// Age slider value, 1..=80 years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AgeInput(u8);

impl AgeInput {
    /// Slider bounds.
    pub const RANGE: RangeInclusive<u8> = 1..=80;
    /// Slider start position.
    pub const DEFAULT: Self = Self(25);

    /// Validates a slider value.
    pub fn new(years: u8) -> Result<Self, InputError> {
        if Self::RANGE.contains(&years) {
            Ok(Self(years))
        } else {
            Err(out_of_range("age", i64::from(years), &Self::RANGE))
        }
    }

    /// Age in years.
    #[must_use]
    pub const fn years(self) -> u8 {
        self.0
    }
}

impl Default for AgeInput {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for AgeInput {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for AgeInput {
    type Error = InputError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| out_of_range("age", value, &Self::RANGE))
            .and_then(Self::new)
    }
}

impl From<AgeInput> for u8 {
    fn from(age: AgeInput) -> Self {
        age.0
    }
}

impl fmt::Display for AgeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifeboat slider value, 20..=60 boats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LifeboatCount(u8);

impl LifeboatCount {
    /// Slider bounds.
    pub const RANGE: RangeInclusive<u8> = 20..=60;
    /// Slider start position.
    pub const DEFAULT: Self = Self(35);

    /// Validates a slider value.
    pub fn new(boats: u8) -> Result<Self, InputError> {
        if Self::RANGE.contains(&boats) {
            Ok(Self(boats))
        } else {
            Err(out_of_range("lifeboats", i64::from(boats), &Self::RANGE))
        }
    }

    /// Number of boats.
    #[must_use]
    pub const fn boats(self) -> u8 {
        self.0
    }
}

impl Default for LifeboatCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for LifeboatCount {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for LifeboatCount {
    type Error = InputError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| out_of_range("lifeboats", value, &Self::RANGE))
            .and_then(Self::new)
    }
}

impl From<LifeboatCount> for u8 {
    fn from(count: LifeboatCount) -> Self {
        count.0
    }
}

impl fmt::Display for LifeboatCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inputs of the survival prediction view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionInput {
    /// Age slider.
    pub age: AgeInput,
    /// Sex select list.
    pub sex: Sex,
    /// Class select list.
    pub class: PassengerClass,
}

impl Default for PredictionInput {
    fn default() -> Self {
        Self {
            age: AgeInput::DEFAULT,
            sex: Sex::Male,
            class: PassengerClass::First,
        }
    }
}

/// Rejected widget value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Numeric control outside its bounds.
    #[error("{control} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Control name.
        control: &'static str,
        /// Rejected value.
        value: i64,
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },
    /// Sex outside {male, female}.
    #[error("sex must be `male` or `female`, got {0:?}")]
    UnknownSex(String),
    /// Class outside {1, 2, 3}.
    #[error("class must be 1, 2 or 3, got {0}")]
    UnknownClass(i64),
}

fn out_of_range(control: &'static str, value: i64, range: &RangeInclusive<u8>) -> InputError {
    InputError::OutOfRange {
        control,
        value,
        min: i64::from(*range.start()),
        max: i64::from(*range.end()),
    }
}
