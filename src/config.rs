//! Saved queries loaded from `nrql.toml`.
//!
//! ```toml
//! [defaults]
//! zone = "America/Los_Angeles"
//!
//! [queries.windows_users]
//! select = ["userAgentName"]
//! from = ["PageView"]
//! where = 'userAgentOS = "Windows"'
//! since = "4 days ago"
//! until = "yesterday"
//! timeseries = "1 hours"
//! ```

use crate::builder::QueryBuilder;
use crate::error::{NrqlError, NrqlResult};
use crate::moment::Moment;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE: &str = "nrql.toml";

/// Contents of `nrql.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NrqlConfig {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub queries: BTreeMap<String, QueryDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Zone exact timestamps are read in. UTC when absent.
    #[serde(default)]
    pub zone: Option<String>,
}

impl Defaults {
    pub fn zone(&self) -> NrqlResult<Tz> {
        parse_zone(self.zone.as_deref().unwrap_or("UTC"))
    }
}

/// One saved query. Moments use the shorthands understood by [`Moment::parse_in`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDef {
    /// Attributes; `["*"]` selects everything.
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(rename = "where", default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub facet: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
    #[serde(default)]
    pub compare_with: Option<String>,
    /// `AUTO`, `MAX` or a period such as `1 hours`.
    #[serde(default)]
    pub timeseries: Option<String>,
    /// WITH TIMEZONE fragment, verbatim.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Keyword to fragment overrides.
    #[serde(default)]
    pub raw: BTreeMap<String, String>,
}

impl QueryDef {
    /// Build a query, reading exact moments in `zone`.
    pub fn to_builder(&self, zone: Tz) -> NrqlResult<QueryBuilder> {
        let mut query = QueryBuilder::new();

        if self.select.len() == 1 && self.select[0] == "*" {
            query.select_all()?;
        } else {
            query.select(&self.select)?;
        }
        query.from(&self.from)?;

        if let Some(filter) = &self.filter {
            query.filter(filter)?;
        }
        if let Some(facet) = &self.facet {
            query.facet(facet)?;
        }
        if let Some(limit) = self.limit {
            query.limit(limit)?;
        }
        if let Some(since) = &self.since {
            query.since(Moment::parse_in(since, zone)?)?;
        }
        if let Some(until) = &self.until {
            query.until(Moment::parse_in(until, zone)?)?;
        }
        if let Some(compare_with) = &self.compare_with {
            query.compare_with(Moment::parse_in(compare_with, zone)?)?;
        }
        if let Some(timeseries) = &self.timeseries {
            apply_time_series(&mut query, timeseries)?;
        }
        query.with_time_zone(self.timezone.as_deref())?;

        for (keyword, value) in &self.raw {
            query.set_raw(keyword, value)?;
        }

        Ok(query)
    }
}

impl NrqlConfig {
    pub fn from_toml_str(content: &str) -> NrqlResult<Self> {
        toml::from_str(content).map_err(|e| NrqlError::config(e.to_string()))
    }

    pub fn load(path: &Path) -> NrqlResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            "Loaded {} saved queries from {}",
            config.queries.len(),
            path.display()
        );
        Ok(config)
    }

    /// Load `explicit` if given, else the first `nrql.toml` found in the
    /// working directory or the user config directory.
    pub fn discover(explicit: Option<&Path>) -> NrqlResult<(PathBuf, Self)> {
        if let Some(path) = explicit {
            return Ok((path.to_path_buf(), Self::load(path)?));
        }

        let candidates = search_paths();
        for path in &candidates {
            if path.exists() {
                return Ok((path.clone(), Self::load(path)?));
            }
            tracing::debug!("No config at {}", path.display());
        }

        let looked_in: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        Err(NrqlError::config(format!(
            "{} not found (looked in: {})",
            CONFIG_FILE,
            looked_in.join(", ")
        )))
    }

    /// Build the saved query called `name`.
    pub fn query(&self, name: &str) -> NrqlResult<QueryBuilder> {
        let def = self
            .queries
            .get(name)
            .ok_or_else(|| NrqlError::config(format!("no saved query named '{}'", name)))?;
        def.to_builder(self.defaults.zone()?)
    }
}

/// Assign TIMESERIES from `AUTO`, `MAX` or a period shorthand.
pub fn apply_time_series(query: &mut QueryBuilder, text: &str) -> NrqlResult<()> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("auto") {
        query.time_series(None)?;
    } else if text.eq_ignore_ascii_case("max") {
        query.time_series_or(None, "MAX")?;
    } else {
        query.time_series(Some(text.parse()?))?;
    }
    Ok(())
}

pub fn parse_zone(name: &str) -> NrqlResult<Tz> {
    name.parse::<Tz>()
        .map_err(|e| NrqlError::config(format!("unknown time zone '{}': {}", name, e)))
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("nrql").join(CONFIG_FILE));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[defaults]
zone = "America/Los_Angeles"

[queries.windows_users]
select = ["userAgentName"]
from = ["PageView"]
where = 'userAgentOS = "Windows"'
facet = "countryCode"
limit = 20
since = "4 days ago"
until = "yesterday"
compare_with = "2015-01-01 00:00:00"
timeseries = "1 hours"

[queries.everything]
select = ["*"]
from = ["Transaction", "PageView"]
timeseries = "max"
timezone = "'UTC'"

[queries.everything.raw]
"COMPARE WITH" = "1 weeks AGO"
SINCE = "1 days AGO"
"#;

    #[test]
    fn test_saved_query_renders_every_clause() {
        let config = NrqlConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.queries.len(), 2);
        assert_eq!(
            config.query("windows_users").unwrap().render().unwrap(),
            "SELECT userAgentName FROM PageView WHERE userAgentOS = \"Windows\" \
             FACET countryCode LIMIT 20 SINCE 4 days AGO UNTIL YESTERDAY \
             COMPARE WITH '2015-01-01 00:00:00 PST' TIMESERIES 1 hours"
        );
    }

    #[test]
    fn test_select_star_and_raw_overrides() {
        let config = NrqlConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(
            config.query("everything").unwrap().render().unwrap(),
            "SELECT * FROM Transaction, PageView SINCE 1 days AGO \
             COMPARE WITH 1 weeks AGO TIMESERIES MAX WITH TIMEZONE 'UTC'"
        );
    }

    #[test]
    fn test_unknown_query_name() {
        let config = NrqlConfig::from_toml_str(SAMPLE).unwrap();
        let err = config.query("nope").unwrap_err();
        assert!(matches!(err, NrqlError::Config(_)));
    }

    #[test]
    fn test_default_zone_is_utc() {
        let config = NrqlConfig::from_toml_str(
            r#"
[queries.q]
select = ["count(*)"]
from = ["Transaction"]
since = "2020-02-01"
"#,
        )
        .unwrap();
        assert_eq!(
            config.query("q").unwrap().render().unwrap(),
            "SELECT count(*) FROM Transaction SINCE '2020-02-01 00:00:00 UTC'"
        );
    }

    #[test]
    fn test_unknown_zone() {
        let config = NrqlConfig::from_toml_str(
            "[defaults]\nzone = \"Mars/Olympus\"\n[queries.q]\nselect = [\"*\"]\nfrom = [\"A\"]\n",
        )
        .unwrap();
        assert!(matches!(config.query("q"), Err(NrqlError::Config(_))));
    }

    #[test]
    fn test_bad_raw_keyword() {
        let config = NrqlConfig::from_toml_str(
            "[queries.q]\nselect = [\"*\"]\nfrom = [\"A\"]\n[queries.q.raw]\n\"ORDER BY\" = \"x\"\n",
        )
        .unwrap();
        assert!(matches!(config.query("q"), Err(NrqlError::UnknownSlot(_))));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = NrqlConfig::from_toml_str("[queries.q]\nselectt = [\"*\"]\n").unwrap_err();
        assert!(matches!(err, NrqlError::Config(_)));
    }

    #[test]
    fn test_apply_time_series() {
        let mut query = QueryBuilder::new();
        apply_time_series(&mut query, "Auto").unwrap();
        assert_eq!(query.get(crate::builder::Clause::TimeSeries), Some("AUTO"));

        let mut query = QueryBuilder::new();
        assert!(matches!(
            apply_time_series(&mut query, "5 fortnights"),
            Err(NrqlError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_load_and_discover_explicit_path() {
        let path = std::env::temp_dir().join(format!("nrql-test-{}.toml", std::process::id()));
        fs::write(&path, SAMPLE).unwrap();

        let (found, config) = NrqlConfig::discover(Some(&path)).unwrap();
        assert_eq!(found, path);
        assert_eq!(config, NrqlConfig::load(&path).unwrap());
        assert_eq!(config.defaults.zone().unwrap(), chrono_tz::America::Los_Angeles);

        fs::remove_file(&path).unwrap();
        assert!(matches!(NrqlConfig::load(&path), Err(NrqlError::Io(_))));
    }
}
