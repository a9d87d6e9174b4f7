//! Relative expiry durations.

use super::errors::ClockError;
use chrono::Duration;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Days,
    Hours,
    Minutes,
}

impl DurationUnit {
    pub fn suffix(&self) -> char {
        match self {
            DurationUnit::Days => 'd',
            DurationUnit::Hours => 'h',
            DurationUnit::Minutes => 'm',
        }
    }

    fn from_suffix(suffix: char) -> Option<Self> {
        match suffix {
            'd' => Some(DurationUnit::Days),
            'h' => Some(DurationUnit::Hours),
            'm' => Some(DurationUnit::Minutes),
            _ => None,
        }
    }
}

/// A duration written as 1 to 3 digits followed by a unit letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DurationSpec {
    magnitude: u16,
    unit: DurationUnit,
}

impl DurationSpec {
    pub const MAX_MAGNITUDE: u16 = 999;

    pub fn new(magnitude: u16, unit: DurationUnit) -> Result<Self, ClockError> {
        let spec = Self { magnitude, unit };
        if magnitude == 0 {
            return Err(ClockError::InvalidDuration {
                input: spec.to_string(),
                reason: "magnitude must be at least 1",
            });
        }
        if magnitude > Self::MAX_MAGNITUDE {
            return Err(ClockError::InvalidDuration {
                input: spec.to_string(),
                reason: "magnitude exceeds 3 digits",
            });
        }
        Ok(spec)
    }

    pub fn magnitude(&self) -> u16 {
        self.magnitude
    }

    pub fn unit(&self) -> DurationUnit {
        self.unit
    }

    pub fn to_duration(&self) -> Duration {
        let n = i64::from(self.magnitude);
        match self.unit {
            DurationUnit::Days => Duration::days(n),
            DurationUnit::Hours => Duration::hours(n),
            DurationUnit::Minutes => Duration::minutes(n),
        }
    }
}

impl fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

impl FromStr for DurationSpec {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ClockError::InvalidDuration {
            input: s.to_string(),
            reason,
        };

        let unit_char = s.chars().last().ok_or_else(|| invalid("empty"))?;
        let unit = DurationUnit::from_suffix(unit_char).ok_or_else(|| invalid("unit must be d, h or m"))?;
        let digits = &s[..s.len() - unit_char.len_utf8()];
        if digits.is_empty() {
            return Err(invalid("magnitude is missing"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("magnitude is not numeric"));
        }
        if digits.len() > 3 {
            return Err(invalid("magnitude exceeds 3 digits"));
        }
        let magnitude = digits.parse::<u16>().map_err(|_| invalid("magnitude is not numeric"))?;
        Self::new(magnitude, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_unit() {
        assert_eq!("12h".parse::<DurationSpec>().unwrap().to_duration(), Duration::hours(12));
        assert_eq!("3d".parse::<DurationSpec>().unwrap().to_duration(), Duration::days(3));
        assert_eq!("999m".parse::<DurationSpec>().unwrap().to_duration(), Duration::minutes(999));
    }

    #[test]
    fn test_rejects_malformed_specs() {
        for bad in ["", "h", "12", "1000h", "12x", "-1h", "1.5h", "12 h", "0h", "000d"] {
            assert!(
                matches!(bad.parse::<DurationSpec>(), Err(ClockError::InvalidDuration { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        let spec = DurationSpec::new(45, DurationUnit::Minutes).unwrap();
        assert_eq!(spec.to_string(), "45m");
        assert_eq!("045m".parse::<DurationSpec>().unwrap(), spec);
    }
}
