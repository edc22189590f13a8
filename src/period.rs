//! Time periods: a duration measured in one of the supported units.

use crate::error::{NrqlError, NrqlResult};
use crate::render::ToNrql;
use std::fmt;
use std::str::FromStr;

/// Unit a period duration is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    /// All supported units, shortest first.
    pub const ALL: [TimeUnit; 4] = [
        TimeUnit::Minutes,
        TimeUnit::Hours,
        TimeUnit::Days,
        TimeUnit::Weeks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = NrqlError;

    /// Unit names are matched exactly, the way they are spelled in NRQL.
    fn from_str(s: &str) -> NrqlResult<Self> {
        TimeUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| NrqlError::InvalidUnit(s.to_string()))
    }
}

/// Period of time of certain duration, e.g. `5 hours`.
///
/// Immutable once constructed. The duration is not range checked: zero and
/// negative values are carried through to the rendered fragment as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimePeriod {
    duration: i64,
    unit: TimeUnit,
}

impl TimePeriod {
    /// Create a period from a unit name.
    ///
    /// # Example
    ///
    /// ```
    /// use nrql::period::TimePeriod;
    /// use nrql::render::ToNrql;
    ///
    /// let period = TimePeriod::new(5, "hours").unwrap();
    /// assert_eq!(period.to_nrql(), "5 hours");
    /// assert!(TimePeriod::new(1, "bogus").is_err());
    /// ```
    pub fn new(duration: i64, unit: impl AsRef<str>) -> NrqlResult<Self> {
        Ok(Self::of(duration, unit.as_ref().parse()?))
    }

    pub const fn of(duration: i64, unit: TimeUnit) -> Self {
        Self { duration, unit }
    }

    pub const fn minutes(duration: i64) -> Self {
        Self::of(duration, TimeUnit::Minutes)
    }

    pub const fn hours(duration: i64) -> Self {
        Self::of(duration, TimeUnit::Hours)
    }

    pub const fn days(duration: i64) -> Self {
        Self::of(duration, TimeUnit::Days)
    }

    pub const fn weeks(duration: i64) -> Self {
        Self::of(duration, TimeUnit::Weeks)
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }
}

impl ToNrql for TimePeriod {
    fn to_nrql(&self) -> String {
        format!("{} {}", self.duration, self.unit)
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_nrql())
    }
}

impl FromStr for TimePeriod {
    type Err = NrqlError;

    /// Parse `"<duration> <unit>"`, e.g. `"30 minutes"`.
    fn from_str(s: &str) -> NrqlResult<Self> {
        let mut words = s.split_whitespace();
        let (Some(duration), Some(unit), None) = (words.next(), words.next(), words.next()) else {
            return Err(NrqlError::moment(format!(
                "expected '<duration> <unit>', got '{}'",
                s
            )));
        };
        let duration = duration
            .parse::<i64>()
            .map_err(|_| NrqlError::moment(format!("'{}' is not a whole number", duration)))?;
        TimePeriod::new(duration, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let cases = [
            (1, "minutes", "1 minutes"),
            (5, "hours", "5 hours"),
            (14, "days", "14 days"),
            (4, "weeks", "4 weeks"),
        ];
        for (duration, unit, expected) in cases {
            let period = TimePeriod::new(duration, unit).unwrap();
            assert_eq!(period.duration(), duration);
            assert_eq!(period.unit().as_str(), unit);
            assert_eq!(period.to_nrql(), expected);
        }
    }

    #[test]
    fn test_unsupported_unit() {
        let err = TimePeriod::new(1, "unsupported").unwrap_err();
        assert!(matches!(err, NrqlError::InvalidUnit(ref u) if u == "unsupported"));
        assert_eq!(err.to_string(), "Unit 'unsupported' is not supported.");
    }

    #[test]
    fn test_unit_is_case_sensitive() {
        assert!(TimePeriod::new(1, "Hours").is_err());
        assert!(TimePeriod::new(1, "hour").is_err());
    }

    #[test]
    fn test_zero_and_negative_durations_pass_through() {
        assert_eq!(TimePeriod::days(0).to_nrql(), "0 days");
        assert_eq!(TimePeriod::minutes(-15).to_nrql(), "-15 minutes");
    }

    #[test]
    fn test_shorthands() {
        assert_eq!(TimePeriod::hours(1), TimePeriod::of(1, TimeUnit::Hours));
        assert_eq!(TimePeriod::weeks(2).to_string(), "2 weeks");
    }

    #[test]
    fn test_from_str() {
        let period: TimePeriod = "30 minutes".parse().unwrap();
        assert_eq!(period, TimePeriod::minutes(30));
        assert!(matches!(
            "3 fortnights".parse::<TimePeriod>(),
            Err(NrqlError::InvalidUnit(_))
        ));
        assert!(matches!(
            "many days".parse::<TimePeriod>(),
            Err(NrqlError::InvalidMoment(_))
        ));
        assert!("7".parse::<TimePeriod>().is_err());
    }
}
