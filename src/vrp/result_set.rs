use super::error::HistoryError;
use super::history::{HistoryEntryFactory, VrpHistoryEntry};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Hit counts at or above this value are reported as a lower bound
pub const HITS_TOTAL_CAP: u64 = 10_000;

/// Search-service response envelope
///
/// Only the parts used for the caption and the hit list are modelled; every
/// field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default, rename = "_shards")]
    pub shards: Option<SearchShards>,
    #[serde(default)]
    pub hits: Option<SearchHits>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchShards {
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub total: Option<SearchHitsTotal>,
    #[serde(default)]
    pub hits: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHitsTotal {
    #[serde(default)]
    pub value: Option<u64>,
}

/// Query statistics shown above the table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultCaption {
    pub took_ms: Option<u64>,
    pub shards: Option<u64>,
    pub hits: Option<u64>,
}

impl std::fmt::Display for ResultCaption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.took_ms.is_none() && self.shards.is_none() && self.hits.is_none() {
            return write!(f, "no history entries");
        }
        let mut parts = vec![];
        if let Some(took) = self.took_ms {
            parts.push(format!("took: {}ms", took));
        }
        if let Some(shards) = self.shards {
            parts.push(format!("shards: {}", shards));
        }
        match self.hits {
            Some(hits) if hits >= HITS_TOTAL_CAP => {
                parts.push(format!("hits: >= {}", HITS_TOTAL_CAP))
            }
            Some(hits) => parts.push(format!("hits: {}", hits)),
            None => {}
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// A record that could not be converted, and why
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position of the record in the response
    pub index: usize,
    pub error: HistoryError,
}

/// The entries of one history query, in service order
///
/// Owned by the caller and replaced as a whole when a new query runs.
#[derive(Debug, Clone, Default)]
pub struct HistoryResultSet {
    entries: Vec<VrpHistoryEntry>,
    skipped: Vec<SkippedRecord>,
    caption: ResultCaption,
}

impl HistoryResultSet {
    /// An empty result set with the neutral caption
    pub fn empty() -> Self {
        Self::default()
    }

    /// Convert raw records, skipping (and logging) those that fail
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut entries = vec![];
        let mut skipped = vec![];
        for (index, record) in records.into_iter().enumerate() {
            match HistoryEntryFactory::from_json(record) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    warn!("skipping history record {}: {}", index, error);
                    skipped.push(SkippedRecord { index, error });
                }
            }
        }
        debug!(
            "converted {} history records, skipped {}",
            entries.len(),
            skipped.len()
        );
        // without service counters, the caption reports what was received
        let hits = if entries.is_empty() && skipped.is_empty() {
            None
        } else {
            Some(entries.len() as u64)
        };
        Self {
            entries,
            skipped,
            caption: ResultCaption {
                hits,
                ..Default::default()
            },
        }
    }

    pub fn from_response(response: &SearchResponse) -> Self {
        let hits: &[Value] = response
            .hits
            .as_ref()
            .map(|h| h.hits.as_slice())
            .unwrap_or(&[]);
        let mut result = Self::from_records(hits);
        result.caption = ResultCaption {
            took_ms: response.took,
            shards: response.shards.as_ref().and_then(|s| s.total),
            hits: response
                .hits
                .as_ref()
                .and_then(|h| h.total.as_ref())
                .and_then(|t| t.value)
                .or(result.caption.hits),
        };
        result
    }

    /// Build from parsed JSON: a search response object, a bare array of
    /// records, or `null`
    pub fn from_json_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Array(records) => Ok(Self::from_records(records)),
            Value::Object(_) => {
                let response = SearchResponse::deserialize(value)
                    .map_err(|e| anyhow!("Failed to parse history response: {}", e))?;
                Ok(Self::from_response(&response))
            }
            other => Err(anyhow!(
                "History response must be an object or array, got {}",
                other
            )),
        }
    }

    /// Build from JSON text; blank text yields an empty result set
    pub fn from_json_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::empty());
        }
        let value: Value = serde_json::from_str(text)
            .map_err(|e| anyhow!("History response is not valid JSON: {}", e))?;
        Self::from_json_value(&value)
    }

    pub fn entries(&self) -> &[VrpHistoryEntry] {
        &self.entries
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn caption(&self) -> &ResultCaption {
        &self.caption
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort key of the last entry, for asking the service for the next batch
    pub fn last_sort_key(&self) -> Option<&Value> {
        self.entries.last().and_then(|e| e.sort_key())
    }
}
