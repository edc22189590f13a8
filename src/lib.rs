//! # nrql — Fluent NRQL builder
//!
//! Assemble New Relic Query Language strings from typed parts, in any order,
//! and render them with every clause in its proper place.
//!
//! ## Quick Example
//!
//! ```
//! use nrql::prelude::*;
//!
//! let mut query = QueryBuilder::new();
//! query
//!     .select(["userAgentName"])?
//!     .from(["PageView"])?
//!     .filter(r#"userAgentOS = "Windows""#)?
//!     .since(Moment::ago(TimePeriod::days(4)))?
//!     .until(Moment::Yesterday)?
//!     .time_series(Some(TimePeriod::hours(1)))?;
//!
//! assert_eq!(
//!     query.render()?,
//!     r#"SELECT userAgentName FROM PageView WHERE userAgentOS = "Windows" SINCE 4 days AGO UNTIL YESTERDAY TIMESERIES 1 hours"#
//! );
//! # Ok::<(), NrqlError>(())
//! ```
//!
//! ## Clause Order
//!
//! | Clause          | Setter            | Fragment                    |
//! |-----------------|-------------------|-----------------------------|
//! | `SELECT`        | `select`, `select_all` | attributes joined by `, ` |
//! | `FROM`          | `from`            | event types joined by `, `  |
//! | `WHERE`         | `filter`          | verbatim                    |
//! | `FACET`         | `facet`           | verbatim                    |
//! | `LIMIT`         | `limit`           | number                      |
//! | `SINCE`         | `since`           | moment                      |
//! | `UNTIL`         | `until`           | moment                      |
//! | `COMPARE WITH`  | `compare_with`    | moment                      |
//! | `TIMESERIES`    | `time_series`     | period or `AUTO`            |
//! | `WITH TIMEZONE` | `with_time_zone`  | verbatim                    |

pub mod builder;
pub mod config;
pub mod error;
pub mod moment;
pub mod period;
pub mod render;

pub mod prelude {
    pub use crate::builder::{Clause, QueryBuilder};
    pub use crate::config::NrqlConfig;
    pub use crate::error::*;
    pub use crate::moment::{ExactTime, Moment};
    pub use crate::period::{TimePeriod, TimeUnit};
    pub use crate::render::ToNrql;
}
