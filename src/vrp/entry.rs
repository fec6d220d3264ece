use super::error::ValidationError;
use super::prefix::{AddressFamily, VrpPrefix};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Earliest accepted `expires` value: 2010-01-01T00:00:00Z
pub const MIN_EXPIRES: i64 = 1_262_304_000;

/// Latest accepted `expires` value: 2100-12-31T23:59:59Z
pub const MAX_EXPIRES: i64 = 4_133_980_799;

/// The displayable fields of a VRP, in table column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VrpField {
    Prefix,
    MaxLength,
    Asn,
    Ta,
    Expires,
}

impl VrpField {
    pub const ALL: [VrpField; 5] = [
        VrpField::Prefix,
        VrpField::MaxLength,
        VrpField::Asn,
        VrpField::Ta,
        VrpField::Expires,
    ];

    /// Field name as used by the history API
    pub fn name(&self) -> &'static str {
        match self {
            VrpField::Prefix => "prefix",
            VrpField::MaxLength => "maxLength",
            VrpField::Asn => "asn",
            VrpField::Ta => "ta",
            VrpField::Expires => "expires",
        }
    }
}

impl fmt::Display for VrpField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One validated ROA payload
///
/// Instances only exist in a fully valid state: every constructor checks all
/// five fields and the family-dependent maxLength bound before returning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VrpEntry {
    asn: u32,
    expires: i64,
    expires_display: String,
    #[serde(rename = "maxLength")]
    max_length: u8,
    prefix: String,
    #[serde(skip)]
    parsed_prefix: VrpPrefix,
    family: AddressFamily,
    ta: String,
}

impl VrpEntry {
    /// Validate and build a VRP entry
    ///
    /// Checks run in order: asn, expires, prefix, maxLength, ta. The maxLength
    /// bound depends on the family detected from `prefix`.
    pub fn new(
        asn: i64,
        expires: i64,
        max_length: i64,
        prefix: &str,
        ta: &str,
    ) -> Result<VrpEntry, ValidationError> {
        let asn = u32::try_from(asn).map_err(|_| {
            ValidationError::InvalidAsn(format!("{} is not between 0 and 4294967295", asn))
        })?;

        if !(MIN_EXPIRES..=MAX_EXPIRES).contains(&expires) {
            return Err(ValidationError::InvalidExpiry(format!(
                "{} is not a unix timestamp between {} and {}",
                expires, MIN_EXPIRES, MAX_EXPIRES
            )));
        }
        let expires_display = format_expires(expires)?;

        let parsed_prefix = VrpPrefix::from_str(prefix).map_err(ValidationError::InvalidPrefix)?;
        let family = parsed_prefix.family();

        let max_length = u8::try_from(max_length)
            .ok()
            .filter(|len| *len <= family.max_prefix_len())
            .ok_or_else(|| {
                ValidationError::InvalidMaxLength(format!(
                    "{} is not between 0 and {} for {} prefix {}",
                    max_length,
                    family.max_prefix_len(),
                    family,
                    prefix
                ))
            })?;

        if ta.trim().is_empty() {
            return Err(ValidationError::InvalidTrustAnchor(
                "ta must be a non-empty name like arin, ripe, apnic".to_string(),
            ));
        }

        Ok(VrpEntry {
            asn,
            expires,
            expires_display,
            max_length,
            prefix: prefix.trim().to_string(),
            parsed_prefix,
            family,
            ta: ta.to_string(),
        })
    }

    /// Build a VRP entry from an untyped `{asn, expires, maxLength, prefix, ta}`
    /// JSON object as returned by the history API
    ///
    /// Type mismatches (a string ASN, a fractional maxLength, a missing field)
    /// map onto the same error variant as an out-of-range value would.
    pub fn from_json(value: &Value) -> Result<VrpEntry, ValidationError> {
        let asn = value
            .get("asn")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                ValidationError::InvalidAsn(format!("{} is not an integer", field_text(value, "asn")))
            })?;

        // fractional seconds are dropped
        let expires = value
            .get("expires")
            .and_then(Value::as_f64)
            .filter(|ts| ts.is_finite())
            .ok_or_else(|| {
                ValidationError::InvalidExpiry(format!(
                    "{} is not a number",
                    field_text(value, "expires")
                ))
            })?;
        if expires < MIN_EXPIRES as f64 || expires >= (MAX_EXPIRES + 1) as f64 {
            return Err(ValidationError::InvalidExpiry(format!(
                "{} is not a unix timestamp between {} and {}",
                expires, MIN_EXPIRES, MAX_EXPIRES
            )));
        }
        let expires = expires.trunc() as i64;

        let prefix = value.get("prefix").and_then(Value::as_str).ok_or_else(|| {
            ValidationError::InvalidPrefix(format!(
                "{} is not a string",
                field_text(value, "prefix")
            ))
        })?;

        let max_length = value
            .get("maxLength")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                ValidationError::InvalidMaxLength(format!(
                    "{} is not an integer",
                    field_text(value, "maxLength")
                ))
            })?;

        let ta = value.get("ta").and_then(Value::as_str).ok_or_else(|| {
            ValidationError::InvalidTrustAnchor(format!(
                "{} is not a string",
                field_text(value, "ta")
            ))
        })?;

        VrpEntry::new(asn, expires, max_length, prefix, ta)
    }

    pub fn asn(&self) -> u32 {
        self.asn
    }

    pub fn expires(&self) -> i64 {
        self.expires
    }

    /// `expires` as ISO-8601 UTC with whole seconds, e.g. `2023-01-05T10:51:39Z`
    pub fn expires_display(&self) -> &str {
        &self.expires_display
    }

    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// The prefix exactly as supplied
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parsed_prefix(&self) -> &VrpPrefix {
        &self.parsed_prefix
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn ta(&self) -> &str {
        &self.ta
    }

    /// Display text of one field
    pub fn field_text(&self, field: VrpField) -> String {
        match field {
            VrpField::Prefix => self.prefix.clone(),
            VrpField::MaxLength => self.max_length.to_string(),
            VrpField::Asn => self.asn.to_string(),
            VrpField::Ta => self.ta.clone(),
            VrpField::Expires => self.expires_display.clone(),
        }
    }
}

impl fmt::Display for VrpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AS{} {} maxLength {} ta {} expires {}",
            self.asn, self.prefix, self.max_length, self.ta, self.expires_display
        )
    }
}

fn format_expires(expires: i64) -> Result<String, ValidationError> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(expires, 0).ok_or_else(|| {
        ValidationError::InvalidExpiry(format!("{} is not a representable time", expires))
    })?;
    Ok(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn field_text(value: &Value, name: &str) -> String {
    match value.get(name) {
        Some(v) => v.to_string(),
        None => "missing value".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn apnic_entry() -> VrpEntry {
        VrpEntry::new(9583, 1672915899, 24, "1.6.4.0/22", "apnic").unwrap()
    }

    #[test]
    fn test_valid_ipv4_entry() {
        let entry = apnic_entry();
        assert_eq!(entry.asn(), 9583);
        assert_eq!(entry.expires(), 1672915899);
        assert_eq!(entry.expires_display(), "2023-01-05T10:51:39Z");
        assert_eq!(entry.max_length(), 24);
        assert_eq!(entry.prefix(), "1.6.4.0/22");
        assert_eq!(entry.family(), AddressFamily::Ipv4);
        assert_eq!(entry.ta(), "apnic");
    }

    #[test]
    fn test_valid_ipv6_entry() {
        let entry = VrpEntry::new(13335, 1700000000, 48, "2606:4700::/32", "arin").unwrap();
        assert_eq!(entry.family(), AddressFamily::Ipv6);
        assert_eq!(entry.max_length(), 48);
        assert_eq!(entry.prefix(), "2606:4700::/32");
    }

    #[test]
    fn test_prefix_padding_is_trimmed() {
        let padded = VrpEntry::new(9583, 1672915899, 24, " 1.6.4.0/22 ", "apnic").unwrap();
        assert_eq!(padded.prefix(), "1.6.4.0/22");
        assert_eq!(
            padded.field_text(VrpField::Prefix),
            apnic_entry().field_text(VrpField::Prefix)
        );
        assert_eq!(padded.to_string(), apnic_entry().to_string());
    }

    #[test]
    fn test_expires_bounds_match_calendar() {
        assert_eq!(
            Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap().timestamp(),
            MIN_EXPIRES
        );
        assert_eq!(
            Utc.with_ymd_and_hms(2100, 12, 31, 23, 59, 59)
                .unwrap()
                .timestamp(),
            MAX_EXPIRES
        );
        assert!(VrpEntry::new(0, MIN_EXPIRES, 0, "0.0.0.0/0", "ripe").is_ok());
        let last = VrpEntry::new(0, MAX_EXPIRES, 128, "::/0", "ripe").unwrap();
        assert_eq!(last.expires_display(), "2100-12-31T23:59:59Z");
    }

    #[test]
    fn test_asn_bounds() {
        assert!(VrpEntry::new(0, 1672915899, 24, "1.6.4.0/22", "apnic").is_ok());
        assert!(VrpEntry::new(4294967295, 1672915899, 24, "1.6.4.0/22", "apnic").is_ok());
        assert!(matches!(
            VrpEntry::new(4294967296, 1672915899, 24, "1.6.4.0/22", "apnic"),
            Err(ValidationError::InvalidAsn(_))
        ));
        assert!(matches!(
            VrpEntry::new(-1, 1672915899, 24, "1.6.4.0/22", "apnic"),
            Err(ValidationError::InvalidAsn(_))
        ));
    }

    #[test]
    fn test_expires_out_of_range() {
        assert!(matches!(
            VrpEntry::new(9583, MIN_EXPIRES - 1, 24, "1.6.4.0/22", "apnic"),
            Err(ValidationError::InvalidExpiry(_))
        ));
        assert!(matches!(
            VrpEntry::new(9583, MAX_EXPIRES + 1, 24, "1.6.4.0/22", "apnic"),
            Err(ValidationError::InvalidExpiry(_))
        ));
    }

    #[test]
    fn test_malformed_prefix() {
        for prefix in ["1.6.4.0", "1.6.4.0/40", "banana/24", "", "1.6.4.0/22/1"] {
            assert!(
                matches!(
                    VrpEntry::new(9583, 1672915899, 24, prefix, "apnic"),
                    Err(ValidationError::InvalidPrefix(_))
                ),
                "{prefix} should be rejected"
            );
        }
    }

    #[test]
    fn test_max_length_family_bounds() {
        assert!(VrpEntry::new(9583, 1672915899, 32, "1.6.4.0/22", "apnic").is_ok());
        assert!(matches!(
            VrpEntry::new(9583, 1672915899, 33, "1.6.4.0/22", "apnic"),
            Err(ValidationError::InvalidMaxLength(_))
        ));
        assert!(matches!(
            VrpEntry::new(9583, 1672915899, -1, "1.6.4.0/22", "apnic"),
            Err(ValidationError::InvalidMaxLength(_))
        ));
        // 33..=128 is fine once the prefix is IPv6
        assert!(VrpEntry::new(9583, 1672915899, 128, "2001:db8::/32", "apnic").is_ok());
        assert!(matches!(
            VrpEntry::new(9583, 1672915899, 129, "2001:db8::/32", "apnic"),
            Err(ValidationError::InvalidMaxLength(_))
        ));
    }

    #[test]
    fn test_empty_trust_anchor() {
        assert!(matches!(
            VrpEntry::new(9583, 1672915899, 24, "1.6.4.0/22", ""),
            Err(ValidationError::InvalidTrustAnchor(_))
        ));
        assert!(matches!(
            VrpEntry::new(9583, 1672915899, 24, "1.6.4.0/22", "   "),
            Err(ValidationError::InvalidTrustAnchor(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let value = json!({
            "asn": 9583,
            "expires": 1672915899,
            "maxLength": 24,
            "prefix": "1.6.4.0/22",
            "ta": "apnic"
        });
        assert_eq!(VrpEntry::from_json(&value).unwrap(), apnic_entry());
    }

    #[test]
    fn test_from_json_truncates_fractional_expires() {
        let value = json!({
            "asn": 9583,
            "expires": 1672915899.75,
            "maxLength": 24,
            "prefix": "1.6.4.0/22",
            "ta": "apnic"
        });
        let entry = VrpEntry::from_json(&value).unwrap();
        assert_eq!(entry.expires(), 1672915899);
        assert_eq!(entry.expires_display(), "2023-01-05T10:51:39Z");
    }

    #[test]
    fn test_from_json_type_mismatches() {
        let base = json!({
            "asn": 9583,
            "expires": 1672915899,
            "maxLength": 24,
            "prefix": "1.6.4.0/22",
            "ta": "apnic"
        });

        let cases: Vec<(&str, Value, &str)> = vec![
            ("asn", json!("AS9583"), "invalid_asn"),
            ("asn", json!(9583.5), "invalid_asn"),
            ("expires", json!("tomorrow"), "invalid_expiry"),
            ("prefix", json!(16), "invalid_prefix"),
            ("maxLength", json!(24.5), "invalid_max_length"),
            ("ta", json!(null), "invalid_trust_anchor"),
        ];
        for (field, bad, kind) in cases {
            let mut value = base.clone();
            value[field] = bad;
            let err = VrpEntry::from_json(&value).unwrap_err();
            assert_eq!(err.kind(), kind, "field {field}");
        }

        let mut missing = base.clone();
        missing.as_object_mut().unwrap().remove("ta");
        assert_eq!(
            VrpEntry::from_json(&missing).unwrap_err().kind(),
            "invalid_trust_anchor"
        );
    }

    #[test]
    fn test_field_text() {
        let entry = apnic_entry();
        assert_eq!(entry.field_text(VrpField::Prefix), "1.6.4.0/22");
        assert_eq!(entry.field_text(VrpField::MaxLength), "24");
        assert_eq!(entry.field_text(VrpField::Asn), "9583");
        assert_eq!(entry.field_text(VrpField::Ta), "apnic");
        assert_eq!(entry.field_text(VrpField::Expires), "2023-01-05T10:51:39Z");
    }

    #[test]
    fn test_serialize() {
        let value = serde_json::to_value(apnic_entry()).unwrap();
        assert_eq!(value["maxLength"], 24);
        assert_eq!(value["expires_display"], "2023-01-05T10:51:39Z");
        assert_eq!(value["prefix"], "1.6.4.0/22");
        assert!(value.get("parsed_prefix").is_none());
    }
}
