//! Query builder for NRQL.
//!
//! Clauses may be assigned in any order; each one at most once. Rendering
//! validates the clause combination and emits the clauses in their fixed
//! NRQL order.
//!
//! A `QueryBuilder` has no internal locking. One builder is one query under
//! construction by one caller; wrap it in a `Mutex` to share it.

use crate::error::{NrqlError, NrqlResult};
use crate::moment::Moment;
use crate::period::TimePeriod;
use crate::render::ToNrql;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The clauses of an NRQL query, declared in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Clause {
    Select,
    From,
    Where,
    Facet,
    Limit,
    Since,
    Until,
    CompareWith,
    TimeSeries,
    WithTimeZone,
}

impl Clause {
    pub const ALL: [Clause; 10] = [
        Clause::Select,
        Clause::From,
        Clause::Where,
        Clause::Facet,
        Clause::Limit,
        Clause::Since,
        Clause::Until,
        Clause::CompareWith,
        Clause::TimeSeries,
        Clause::WithTimeZone,
    ];

    /// The keyword that introduces this clause in a rendered query.
    pub fn keyword(&self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Where => "WHERE",
            Clause::Facet => "FACET",
            Clause::Limit => "LIMIT",
            Clause::Since => "SINCE",
            Clause::Until => "UNTIL",
            Clause::CompareWith => "COMPARE WITH",
            Clause::TimeSeries => "TIMESERIES",
            Clause::WithTimeZone => "WITH TIMEZONE",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Clause {
    type Err = NrqlError;

    /// Look a clause up by keyword, ignoring case and extra inner whitespace.
    fn from_str(s: &str) -> NrqlResult<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Clause::ALL
            .into_iter()
            .find(|clause| clause.keyword().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| NrqlError::UnknownSlot(s.to_string()))
    }
}

/// Builder of an NRQL query with a fluent interface.
///
/// Only rendered fragments are stored; moments and periods passed in are
/// rendered on assignment and not retained.
///
/// # Example
///
/// ```
/// use nrql::prelude::*;
///
/// let mut query = QueryBuilder::new();
/// query
///     .select_all()?
///     .from(["PageView"])?
///     .since(Moment::ago(TimePeriod::days(4)))?;
/// assert_eq!(query.render()?, "SELECT * FROM PageView SINCE 4 days AGO");
/// # Ok::<(), NrqlError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    parts: BTreeMap<Clause, String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign SELECT to the given attribute names and/or expressions.
    pub fn select<I, S>(&mut self, attributes: I) -> NrqlResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_part(Clause::Select, join_list(attributes))
    }

    /// Assign `SELECT *`.
    pub fn select_all(&mut self) -> NrqlResult<&mut Self> {
        self.set_part(Clause::Select, "*")
    }

    /// Assign FROM to the event type(s) holding the queried attributes.
    pub fn from<I, S>(&mut self, events: I) -> NrqlResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_part(Clause::From, join_list(events))
    }

    /// Assign WHERE. The conditions are passed through verbatim.
    pub fn filter(&mut self, conditions: impl Into<String>) -> NrqlResult<&mut Self> {
        self.set_part(Clause::Where, conditions)
    }

    pub fn facet(&mut self, attribute: impl Into<String>) -> NrqlResult<&mut Self> {
        self.set_part(Clause::Facet, attribute)
    }

    /// Assign LIMIT. A zero count leaves the clause unset.
    pub fn limit(&mut self, count: usize) -> NrqlResult<&mut Self> {
        let value = if count == 0 {
            String::new()
        } else {
            count.to_string()
        };
        self.set_part(Clause::Limit, value)
    }

    /// Assign SINCE, the beginning of the queried time range.
    pub fn since(&mut self, moment: impl Into<Moment>) -> NrqlResult<&mut Self> {
        self.set_part(Clause::Since, moment.into().to_nrql())
    }

    /// Assign UNTIL, the end of the queried time range.
    pub fn until(&mut self, moment: impl Into<Moment>) -> NrqlResult<&mut Self> {
        self.set_part(Clause::Until, moment.into().to_nrql())
    }

    /// Assign COMPARE WITH, the beginning of the range to compare against.
    ///
    /// Requires SINCE or UNTIL at render time.
    pub fn compare_with(&mut self, moment: impl Into<Moment>) -> NrqlResult<&mut Self> {
        self.set_part(Clause::CompareWith, moment.into().to_nrql())
    }

    /// Assign TIMESERIES bucketed by `period`, or `AUTO` when `None`.
    pub fn time_series(&mut self, period: Option<TimePeriod>) -> NrqlResult<&mut Self> {
        self.time_series_or(period, "AUTO")
    }

    /// Assign TIMESERIES bucketed by `period`, or by the `fallback` literal
    /// (such as `MAX`) when `None`.
    pub fn time_series_or(
        &mut self,
        period: Option<TimePeriod>,
        fallback: &str,
    ) -> NrqlResult<&mut Self> {
        let value = match period {
            Some(period) => period.to_nrql(),
            None => fallback.to_string(),
        };
        self.set_part(Clause::TimeSeries, value)
    }

    /// Assign WITH TIMEZONE verbatim. `None` or an empty string leaves it unset.
    pub fn with_time_zone(&mut self, timezone: Option<&str>) -> NrqlResult<&mut Self> {
        self.set_part(Clause::WithTimeZone, timezone.unwrap_or_default())
    }

    /// Escape hatch: assign a verbatim fragment to the clause named by `keyword`.
    ///
    /// ```
    /// use nrql::prelude::*;
    ///
    /// let mut query = QueryBuilder::new();
    /// query.select_all()?.from(["Transaction"])?.set_raw("compare with", "1 week AGO")?;
    /// assert_eq!(query.get(Clause::CompareWith), Some("1 week AGO"));
    /// assert!(query.set_raw("ORDER BY", "duration").is_err());
    /// # Ok::<(), NrqlError>(())
    /// ```
    pub fn set_raw(&mut self, keyword: &str, value: impl Into<String>) -> NrqlResult<&mut Self> {
        let clause = keyword.parse()?;
        self.set_part(clause, value)
    }

    /// Current fragment of a clause, if assigned.
    pub fn get(&self, clause: Clause) -> Option<&str> {
        self.parts.get(&clause).map(String::as_str)
    }

    pub fn is_set(&self, clause: Clause) -> bool {
        self.parts.contains_key(&clause)
    }

    /// Assign a fragment to a clause, refusing to overwrite an assigned one.
    ///
    /// An empty fragment leaves the clause unset.
    fn set_part(&mut self, clause: Clause, value: impl Into<String>) -> NrqlResult<&mut Self> {
        if self.parts.contains_key(&clause) {
            return Err(NrqlError::DuplicateAssignment(clause));
        }
        let value = value.into();
        if !value.is_empty() {
            tracing::debug!("Assigned {} clause: {}", clause, value);
            self.parts.insert(clause, value);
        }
        Ok(self)
    }

    /// Check that required clauses are present and do not contradict each other.
    pub fn validate(&self) -> NrqlResult<()> {
        if !self.is_set(Clause::Select) {
            return Err(NrqlError::MissingClause(Clause::Select));
        }
        if !self.is_set(Clause::From) {
            return Err(NrqlError::MissingClause(Clause::From));
        }
        if self.is_set(Clause::CompareWith)
            && !self.is_set(Clause::Since)
            && !self.is_set(Clause::Until)
        {
            return Err(NrqlError::InvalidCombination(
                "COMPARE WITH clause requires a SINCE or UNTIL clause.",
            ));
        }
        Ok(())
    }

    /// Return the complete query assembled from the assigned clauses.
    ///
    /// Rendering does not change the builder and can be repeated.
    pub fn render(&self) -> NrqlResult<String> {
        self.validate()?;
        let nrql = self
            .parts
            .iter()
            .map(|(clause, value)| format!("{} {}", clause, value))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!("Rendered NRQL: {}", nrql);
        Ok(nrql)
    }

    /// Fallback conversion for contexts that cannot handle an error.
    ///
    /// Failures are reported through `tracing::error!` and yield an empty
    /// string. Prefer [`QueryBuilder::render`] everywhere else.
    pub fn render_lossy(&self) -> String {
        match self.render() {
            Ok(nrql) => nrql,
            Err(e) => {
                tracing::error!("Cannot render NRQL query: {}", e);
                String::new()
            }
        }
    }
}

/// Writes [`QueryBuilder::render_lossy`]: an invalid query displays as nothing.
impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_lossy())
    }
}

fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
