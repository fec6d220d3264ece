//! Argument types for history queries

use crate::lens::utils::option_u32_from_str;
use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Number of records requested from the history service per query
pub const DEFAULT_PAGINATE_SIZE: u32 = 1000;

/// Arguments for a VRP history query
///
/// Every filter is optional; unset filters are left out of the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct HistoryQueryArgs {
    /// Filter by origin ASN
    #[cfg_attr(feature = "cli", clap(short, long))]
    #[serde(default, deserialize_with = "option_u32_from_str")]
    pub asn: Option<u32>,

    /// Filter by prefix, e.g. 1.6.4.0/22
    #[cfg_attr(feature = "cli", clap(short, long))]
    #[serde(default)]
    pub prefix: Option<String>,

    /// Only changes observed at or after this time (unix timestamp, RFC3339, or date)
    #[cfg_attr(feature = "cli", clap(short = 't', long))]
    #[serde(default, rename = "observation_timestamp_start")]
    pub start: Option<String>,

    /// Only changes observed at or before this time (unix timestamp, RFC3339, or date)
    #[cfg_attr(feature = "cli", clap(short = 'T', long))]
    #[serde(default, rename = "observation_timestamp_end")]
    pub end: Option<String>,

    /// Number of records to request from the history service [default: 1000]
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub paginate_size: Option<u32>,
}

impl HistoryQueryArgs {
    /// Create new query args with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ASN filter
    pub fn with_asn(mut self, asn: u32) -> Self {
        self.asn = Some(asn);
        self
    }

    /// Set prefix filter
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set observation window start
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Set observation window end
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Set number of records to request
    pub fn with_paginate_size(mut self, paginate_size: u32) -> Self {
        self.paginate_size = Some(paginate_size);
        self
    }

    /// Use `paginate_size` only if no size was given explicitly
    pub fn or_paginate_size(mut self, paginate_size: u32) -> Self {
        self.paginate_size.get_or_insert(paginate_size);
        self
    }

    /// Records to request, falling back to [DEFAULT_PAGINATE_SIZE]
    pub fn effective_paginate_size(&self) -> u32 {
        self.paginate_size.unwrap_or(DEFAULT_PAGINATE_SIZE)
    }

    /// Check the arguments before sending them anywhere
    pub fn validate(&self) -> Result<()> {
        if self.paginate_size == Some(0) {
            return Err(anyhow!("paginate_size must be a positive integer"));
        }
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            if parse_time_string(start)? > parse_time_string(end)? {
                return Err(anyhow!(
                    "observation window start {} is after end {}",
                    start,
                    end
                ));
            }
        }
        Ok(())
    }

    /// Query string parameters in a fixed order, set filters only
    ///
    /// Time bounds are normalized to RFC3339 with whole seconds.
    pub fn query_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        self.validate()?;

        let mut pairs = vec![("paginate_size", self.effective_paginate_size().to_string())];
        if let Some(asn) = self.asn {
            pairs.push(("asn", asn.to_string()));
        }
        if let Some(start) = non_empty(&self.start) {
            pairs.push(("observation_timestamp_start", normalize_time(start)?));
        }
        if let Some(end) = non_empty(&self.end) {
            pairs.push(("observation_timestamp_end", normalize_time(end)?));
        }
        if let Some(prefix) = non_empty(&self.prefix) {
            pairs.push(("prefix", prefix.to_string()));
        }
        Ok(pairs)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Parse a unix timestamp, RFC3339 string, or human-readable date
fn parse_time_string(time_string: &str) -> Result<DateTime<Utc>> {
    dateparser::parse_with(
        time_string,
        &Utc,
        chrono::NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(|| anyhow!("Failed to create time"))?,
    )
    .map_err(|_| {
        anyhow!(
            "Input time must be either Unix timestamp or time string compliant with RFC3339: {}",
            time_string
        )
    })
}

fn normalize_time(time_string: &str) -> Result<String> {
    Ok(parse_time_string(time_string)?.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_args_builder() {
        let args = HistoryQueryArgs::new()
            .with_asn(9583)
            .with_prefix("1.6.4.0/22")
            .with_paginate_size(50);

        assert_eq!(args.asn, Some(9583));
        assert_eq!(args.prefix, Some("1.6.4.0/22".to_string()));
        assert_eq!(args.paginate_size, Some(50));
    }

    #[test]
    fn test_configured_paginate_size_only_fills_unset() {
        let args = HistoryQueryArgs::new().or_paginate_size(250);
        assert_eq!(args.effective_paginate_size(), 250);

        // an explicit size equal to the built-in default still wins
        let args = HistoryQueryArgs::new()
            .with_paginate_size(DEFAULT_PAGINATE_SIZE)
            .or_paginate_size(250);
        assert_eq!(args.effective_paginate_size(), DEFAULT_PAGINATE_SIZE);
        assert_eq!(
            args.query_pairs().unwrap()[0],
            ("paginate_size", "1000".to_string())
        );
    }

    #[test]
    fn test_query_pairs_only_set_filters() {
        let pairs = HistoryQueryArgs::new().with_asn(9583).query_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("paginate_size", "1000".to_string()),
                ("asn", "9583".to_string())
            ]
        );
    }

    #[test]
    fn test_query_pairs_normalize_times() {
        let pairs = HistoryQueryArgs::new()
            .with_prefix(" 1.6.4.0/22 ")
            .with_start("1672876800")
            .with_end("2023-01-06T00:00:00Z")
            .query_pairs()
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("paginate_size", "1000".to_string()),
                (
                    "observation_timestamp_start",
                    "2023-01-05T00:00:00Z".to_string()
                ),
                (
                    "observation_timestamp_end",
                    "2023-01-06T00:00:00Z".to_string()
                ),
                ("prefix", "1.6.4.0/22".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_rejects_bad_args() {
        assert!(HistoryQueryArgs::new()
            .with_paginate_size(0)
            .validate()
            .is_err());
        assert!(HistoryQueryArgs::new()
            .with_start("2023-02-01T00:00:00Z")
            .with_end("2023-01-01T00:00:00Z")
            .validate()
            .is_err());
        assert!(HistoryQueryArgs::new()
            .with_start("not a time at all")
            .query_pairs()
            .is_err());
    }

    #[test]
    fn test_deserialize_from_query_names() {
        let args: HistoryQueryArgs = serde_json::from_str(
            r#"{"asn": "9583", "observation_timestamp_start": "2023-01-05"}"#,
        )
        .unwrap();
        assert_eq!(args.asn, Some(9583));
        assert_eq!(args.start.as_deref(), Some("2023-01-05"));
        assert_eq!(args.paginate_size, None);
        assert_eq!(args.effective_paginate_size(), DEFAULT_PAGINATE_SIZE);
    }
}
