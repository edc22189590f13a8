//! Moments in time that can be expressed in NRQL syntax.
//!
//! A moment is what `SINCE`, `UNTIL` and `COMPARE WITH` point at:
//!
//! | Variant     | Renders as                      |
//! |-------------|---------------------------------|
//! | `Ago`       | `4 days AGO`                    |
//! | `Yesterday` | `YESTERDAY`                     |
//! | `Exact`     | `'2015-03-08 12:07:36 PDT'`     |

use crate::error::{NrqlError, NrqlResult};
use crate::period::TimePeriod;
use crate::render::ToNrql;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Absolute moment in time, remembered together with the name of its zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactTime {
    time: DateTime<FixedOffset>,
    zone: String,
}

impl ExactTime {
    /// Capture a timestamp in any zone whose offset displays as a zone name.
    ///
    /// `chrono_tz` zones display their abbreviation (`PDT`), `Utc` displays
    /// `UTC` and fixed offsets display as `+02:00`.
    pub fn new<Z>(time: DateTime<Z>) -> Self
    where
        Z: TimeZone,
        Z::Offset: fmt::Display,
    {
        let zone = time.offset().to_string();
        Self {
            time: time.fixed_offset(),
            zone,
        }
    }

    pub fn time(&self) -> DateTime<FixedOffset> {
        self.time
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }
}

impl ToNrql for ExactTime {
    fn to_nrql(&self) -> String {
        format!("'{} {}'", self.time.format(TIMESTAMP_FORMAT), self.zone)
    }
}

impl<Z> From<DateTime<Z>> for ExactTime
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    fn from(time: DateTime<Z>) -> Self {
        Self::new(time)
    }
}

/// A point in time used by the time-range clauses.
///
/// Values are immutable and can be reused across any number of builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Moment {
    /// Relative moment in the past.
    Ago(TimePeriod),
    /// One day in the past.
    Yesterday,
    /// Absolute timestamp.
    Exact(ExactTime),
}

impl Moment {
    pub fn ago(period: TimePeriod) -> Self {
        Moment::Ago(period)
    }

    pub fn exact<Z>(time: DateTime<Z>) -> Self
    where
        Z: TimeZone,
        Z::Offset: fmt::Display,
    {
        Moment::Exact(ExactTime::new(time))
    }

    /// Parse a moment shorthand, reading exact timestamps in `zone`.
    ///
    /// Accepts `yesterday`, `<duration> <unit> ago` and timestamps written as
    /// `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`.
    ///
    /// # Example
    ///
    /// ```
    /// use nrql::moment::Moment;
    /// use nrql::render::ToNrql;
    ///
    /// let since = Moment::parse_in("4 days ago", chrono_tz::UTC).unwrap();
    /// assert_eq!(since.to_nrql(), "4 days AGO");
    /// ```
    pub fn parse_in(text: &str, zone: Tz) -> NrqlResult<Self> {
        let text = text.trim();
        let lower = text.to_ascii_lowercase();

        if lower == "yesterday" {
            return Ok(Moment::Yesterday);
        }

        if let Some(period) = lower.strip_suffix(" ago") {
            // Unit names stay case-sensitive, so slice the input text.
            let period = text[..period.len()].trim();
            return Ok(Moment::Ago(period.parse()?));
        }

        let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(|| {
                NrqlError::moment(format!(
                    "'{}' is not 'yesterday', '<duration> <unit> ago' or a timestamp",
                    text
                ))
            })?;

        let local = zone.from_local_datetime(&naive).single().ok_or_else(|| {
            NrqlError::moment(format!(
                "local time '{}' is ambiguous or does not exist in {}",
                text,
                zone.name()
            ))
        })?;

        Ok(Moment::exact(local))
    }
}

impl ToNrql for Moment {
    fn to_nrql(&self) -> String {
        match self {
            Moment::Ago(period) => format!("{} AGO", period.to_nrql()),
            Moment::Yesterday => "YESTERDAY".to_string(),
            Moment::Exact(time) => time.to_nrql(),
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_nrql())
    }
}

impl From<ExactTime> for Moment {
    fn from(time: ExactTime) -> Self {
        Moment::Exact(time)
    }
}

impl FromStr for Moment {
    type Err = NrqlError;

    /// Parse a moment shorthand, reading exact timestamps as UTC.
    fn from_str(s: &str) -> NrqlResult<Self> {
        Moment::parse_in(s, chrono_tz::UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn test_time_ago() {
        let moment = Moment::ago(TimePeriod::new(365, "days").unwrap());
        assert_eq!(moment.to_nrql(), "365 days AGO");
    }

    #[test]
    fn test_yesterday_is_constant() {
        let moment = Moment::Yesterday;
        assert_eq!(moment.to_nrql(), "YESTERDAY");
        assert_eq!(moment.to_nrql(), moment.to_nrql());
    }

    #[test]
    fn test_exact_time_with_zone_abbreviation() {
        let time = Los_Angeles.with_ymd_and_hms(2015, 3, 8, 12, 7, 36).unwrap();
        let exact = ExactTime::new(time);
        assert_eq!(exact.zone(), "PDT");
        assert_eq!(exact.time(), time.fixed_offset());
        assert_eq!(Moment::from(exact).to_nrql(), "'2015-03-08 12:07:36 PDT'");
    }

    #[test]
    fn test_exact_time_utc_and_fixed_offset() {
        let utc = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Moment::exact(utc).to_nrql(), "'2015-01-01 00:00:00 UTC'");

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let time = offset.with_ymd_and_hms(2020, 7, 4, 9, 5, 0).unwrap();
        assert_eq!(Moment::exact(time).to_nrql(), "'2020-07-04 09:05:00 +02:00'");
    }

    #[test]
    fn test_parse_shorthands() {
        assert_eq!("yesterday".parse::<Moment>().unwrap(), Moment::Yesterday);
        assert_eq!("YESTERDAY".parse::<Moment>().unwrap(), Moment::Yesterday);
        assert_eq!(
            "4 days ago".parse::<Moment>().unwrap(),
            Moment::Ago(TimePeriod::days(4))
        );
        assert_eq!(
            "5 hours AGO".parse::<Moment>().unwrap(),
            Moment::Ago(TimePeriod::hours(5))
        );
    }

    #[test]
    fn test_parse_exact_in_zone() {
        let moment = Moment::parse_in("2015-01-01 00:00:00", Los_Angeles).unwrap();
        assert_eq!(moment.to_nrql(), "'2015-01-01 00:00:00 PST'");

        let midnight = Moment::parse_in("2015-06-01", Los_Angeles).unwrap();
        assert_eq!(midnight.to_nrql(), "'2015-06-01 00:00:00 PDT'");

        let utc: Moment = "2015-01-01 10:30:00".parse().unwrap();
        assert_eq!(utc.to_nrql(), "'2015-01-01 10:30:00 UTC'");
    }

    #[test]
    fn test_parse_rejects_nonexistent_local_time() {
        // Clocks jumped from 02:00 to 03:00 that night.
        let err = Moment::parse_in("2015-03-08 02:30:00", Los_Angeles).unwrap_err();
        assert!(matches!(err, NrqlError::InvalidMoment(_)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "next tuesday".parse::<Moment>(),
            Err(NrqlError::InvalidMoment(_))
        ));
        assert!(matches!(
            "3 fortnights ago".parse::<Moment>(),
            Err(NrqlError::InvalidUnit(_))
        ));
    }
}
