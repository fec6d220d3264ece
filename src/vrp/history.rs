use super::entry::VrpEntry;
use super::error::{HistoryError, RoaSide};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Kind of change a history entry represents
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    New,
    Delete,
    Replace,
    Unchanged,
    /// Any other value sent by the history service, kept verbatim
    Unrecognized(String),
}

impl Verb {
    pub fn parse(s: &str) -> Verb {
        match s {
            "NEW" => Verb::New,
            "DELETE" => Verb::Delete,
            "REPLACE" => Verb::Replace,
            "UNCHANGED" => Verb::Unchanged,
            other => Verb::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verb::New => "NEW",
            Verb::Delete => "DELETE",
            Verb::Replace => "REPLACE",
            Verb::Unchanged => "UNCHANGED",
            Verb::Unrecognized(s) => s.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Verb::Unrecognized(_))
    }

    /// Which snapshots the verb carries, as `(old, new)`
    pub fn required_sides(&self) -> (bool, bool) {
        match self {
            Verb::New => (false, true),
            Verb::Delete => (true, false),
            Verb::Replace | Verb::Unchanged => (true, true),
            Verb::Unrecognized(_) => (false, false),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Verb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One observed change between two VRP snapshots
///
/// Presence of `old_entry`/`new_entry` always agrees with the verb:
///
/// | verb | old | new |
/// |------|-----|-----|
/// | NEW | - | yes |
/// | DELETE | yes | - |
/// | REPLACE | yes | yes |
/// | UNCHANGED | yes | yes |
/// | unrecognized | - | - |
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VrpHistoryEntry {
    old_entry: Option<VrpEntry>,
    new_entry: Option<VrpEntry>,
    verb: Verb,
    observation_timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_key: Option<Value>,
}

impl VrpHistoryEntry {
    pub fn new(
        verb: Verb,
        old_entry: Option<VrpEntry>,
        new_entry: Option<VrpEntry>,
        observation_timestamp: impl Into<String>,
        sort_key: Option<Value>,
    ) -> Result<VrpHistoryEntry, HistoryError> {
        let (needs_old, needs_new) = verb.required_sides();
        if old_entry.is_some() != needs_old || new_entry.is_some() != needs_new {
            return Err(HistoryError::VerbMismatch {
                verb: verb.to_string(),
            });
        }
        let observation_timestamp = observation_timestamp.into();
        if observation_timestamp.trim().is_empty() {
            return Err(HistoryError::MissingObservationTimestamp);
        }
        Ok(VrpHistoryEntry {
            old_entry,
            new_entry,
            verb,
            observation_timestamp,
            sort_key,
        })
    }

    pub fn old_entry(&self) -> Option<&VrpEntry> {
        self.old_entry.as_ref()
    }

    pub fn new_entry(&self) -> Option<&VrpEntry> {
        self.new_entry.as_ref()
    }

    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    pub fn observation_timestamp(&self) -> &str {
        &self.observation_timestamp
    }

    /// Opaque value for resuming pagination against the history service
    pub fn sort_key(&self) -> Option<&Value> {
        self.sort_key.as_ref()
    }
}

/// A history record as returned by the history service
///
/// The ROA snapshots are kept untyped; [`HistoryEntryFactory`] only parses the
/// ones the verb calls for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHistoryRecord {
    #[serde(default)]
    pub verb: String,
    #[serde(default)]
    pub observation_timestamp: Option<String>,
    #[serde(default)]
    pub old_roa: Option<Value>,
    #[serde(default)]
    pub new_roa: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
}

impl RawHistoryRecord {
    /// Parse either a bare record or a search hit `{"_source": {...}, "sort": [...]}`
    pub fn from_value(value: &Value) -> Result<RawHistoryRecord, serde_json::Error> {
        match value.get("_source") {
            Some(source) => {
                let mut record = RawHistoryRecord::deserialize(source)?;
                if let Some(sort) = value.get("sort") {
                    record.sort = Some(sort.clone());
                }
                Ok(record)
            }
            None => RawHistoryRecord::deserialize(value),
        }
    }
}

/// Converts raw history records into [`VrpHistoryEntry`] values
pub struct HistoryEntryFactory;

impl HistoryEntryFactory {
    /// Build a history entry from one raw record
    ///
    /// Only the snapshots required by the verb are validated; the other side
    /// is left absent even when the record carries data for it. The first
    /// validation failure is returned and no entry is produced.
    pub fn from_raw_record(record: &RawHistoryRecord) -> Result<VrpHistoryEntry, HistoryError> {
        let observation_timestamp = record
            .observation_timestamp
            .as_deref()
            .filter(|ts| !ts.trim().is_empty())
            .ok_or(HistoryError::MissingObservationTimestamp)?;

        let verb = Verb::parse(&record.verb);
        let (needs_old, needs_new) = verb.required_sides();

        let old_entry = match needs_old {
            true => Some(build_side(&verb, record.old_roa.as_ref(), RoaSide::Old)?),
            false => None,
        };
        let new_entry = match needs_new {
            true => Some(build_side(&verb, record.new_roa.as_ref(), RoaSide::New)?),
            false => None,
        };

        VrpHistoryEntry::new(
            verb,
            old_entry,
            new_entry,
            observation_timestamp,
            record.sort.clone(),
        )
    }

    /// Parse and convert a JSON record (bare or search-hit shaped)
    pub fn from_json(value: &Value) -> Result<VrpHistoryEntry, HistoryError> {
        let record = RawHistoryRecord::from_value(value)
            .map_err(|e| HistoryError::MalformedRecord(e.to_string()))?;
        Self::from_raw_record(&record)
    }
}

fn build_side(
    verb: &Verb,
    roa: Option<&Value>,
    side: RoaSide,
) -> Result<VrpEntry, HistoryError> {
    let value = roa.ok_or_else(|| HistoryError::MissingRoa {
        verb: verb.to_string(),
        side,
    })?;
    VrpEntry::from_json(value).map_err(|source| HistoryError::Validation { side, source })
}
