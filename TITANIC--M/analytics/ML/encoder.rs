use serde::{Deserialize, Serialize};

use crate::dataset::record::{PassengerRecord, Sex};

/// Feature names in column order.
pub const FEATURE_NAMES: [&str; 3] = ["age", "class", "sex"];

/// Label encoding for `Sex`: categories sorted alphabetically, so
/// `female -> 0` and `male -> 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SexEncoder;

impl SexEncoder {
    /// Encoded indicator.
    #[must_use]
    pub const fn encode(self, sex: Sex) -> f64 {
        match sex {
            Sex::Female => 0.0,
            Sex::Male => 1.0,
        }
    }

    /// Feature row `[age, class, sex]` for a record.
    #[must_use]
    pub fn features(self, record: &PassengerRecord) -> [f64; 3] {
        self.row(record.age, record.class.number(), record.sex)
    }

    /// Feature row `[age, class, sex]` from raw values.
    #[must_use]
    pub fn row(self, age: f64, class: u8, sex: Sex) -> [f64; 3] {
        [age, f64::from(class), self.encode(sex)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_alphabetical() {
        let encoder = SexEncoder;
        assert!((encoder.encode(Sex::Female) - 0.0).abs() < f64::EPSILON);
        assert!((encoder.encode(Sex::Male) - 1.0).abs() < f64::EPSILON);
        assert_eq!(encoder.row(25.0, 3, Sex::Male), [25.0, 3.0, 1.0]);
    }
}
