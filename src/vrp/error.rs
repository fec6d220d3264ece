//! Error types for VRP construction and history entry conversion.

use std::fmt;

/// A single ROA field failed validation
///
/// Returned by [`VrpEntry::new`](super::VrpEntry::new). Each variant carries a
/// message naming the offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidAsn(String),
    InvalidExpiry(String),
    InvalidPrefix(String),
    InvalidMaxLength(String),
    InvalidTrustAnchor(String),
}

impl ValidationError {
    /// Short machine-friendly name of the failed check
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidAsn(_) => "invalid_asn",
            ValidationError::InvalidExpiry(_) => "invalid_expiry",
            ValidationError::InvalidPrefix(_) => "invalid_prefix",
            ValidationError::InvalidMaxLength(_) => "invalid_max_length",
            ValidationError::InvalidTrustAnchor(_) => "invalid_trust_anchor",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidAsn(msg) => write!(f, "invalid asn: {}", msg),
            ValidationError::InvalidExpiry(msg) => write!(f, "invalid expires: {}", msg),
            ValidationError::InvalidPrefix(msg) => write!(f, "invalid prefix: {}", msg),
            ValidationError::InvalidMaxLength(msg) => write!(f, "invalid maxLength: {}", msg),
            ValidationError::InvalidTrustAnchor(msg) => write!(f, "invalid ta: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Which ROA snapshot of a history record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoaSide {
    Old,
    New,
}

impl fmt::Display for RoaSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoaSide::Old => write!(f, "old_roa"),
            RoaSide::New => write!(f, "new_roa"),
        }
    }
}

/// Errors raised while turning a raw record into a history entry, or while
/// rendering one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A ROA snapshot required by the verb failed validation
    Validation {
        side: RoaSide,
        source: ValidationError,
    },
    /// The verb requires a ROA snapshot that the record does not carry
    MissingRoa { verb: String, side: RoaSide },
    /// Presence of old/new snapshots does not match the verb
    VerbMismatch { verb: String },
    MissingObservationTimestamp,
    /// The record is not shaped like a history record at all
    MalformedRecord(String),
    UnrecognizedVerb(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Validation { side, source } => write!(f, "{}: {}", side, source),
            HistoryError::MissingRoa { verb, side } => {
                write!(f, "verb {} requires {} but the record has none", verb, side)
            }
            HistoryError::VerbMismatch { verb } => {
                write!(f, "old/new snapshots do not match verb {}", verb)
            }
            HistoryError::MissingObservationTimestamp => {
                write!(f, "record has no observation_timestamp")
            }
            HistoryError::MalformedRecord(msg) => write!(f, "malformed history record: {}", msg),
            HistoryError::UnrecognizedVerb(verb) => write!(f, "unrecognized vrp_diff verb {}", verb),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}
