//! Field decoding shared by the loader strategies.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// A many-to-one reference as exported by the source system.
///
/// Accepts `[id, "display name"]`, a bare integer id, or `false` for unset.
/// `null` is handled by wrapping the field in `Option`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawReference {
    Named(i64, String),
    Id(i64),
    Unset(bool),
}

impl RawReference {
    pub(crate) fn id(&self) -> Option<i64> {
        match self {
            RawReference::Named(id, _) | RawReference::Id(id) => Some(*id),
            RawReference::Unset(_) => None,
        }
    }

    pub(crate) fn display_name(&self) -> Option<&str> {
        match self {
            RawReference::Named(_, name) => Some(name.as_str()),
            RawReference::Id(_) | RawReference::Unset(_) => None,
        }
    }
}

/// Resolve an optional reference field to its id.
pub(crate) fn reference_id(field: &Option<RawReference>) -> Option<i64> {
    field.as_ref().and_then(RawReference::id)
}

/// Parse a sale timestamp.
///
/// Supported: `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, RFC 3339, and a
/// bare `YYYY-MM-DD` (midnight).
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default)]
        field: Option<RawReference>,
    }

    fn decode(json: &str) -> Option<RawReference> {
        serde_json::from_str::<Holder>(json).unwrap().field
    }

    #[test]
    fn test_reference_shapes() {
        assert_eq!(
            decode(r#"{"field": [3, "Desks"]}"#),
            Some(RawReference::Named(3, "Desks".to_string()))
        );
        assert_eq!(decode(r#"{"field": 3}"#), Some(RawReference::Id(3)));
        assert_eq!(decode(r#"{"field": false}"#), Some(RawReference::Unset(false)));
        assert_eq!(decode(r#"{"field": null}"#), None);
        assert_eq!(decode(r#"{}"#), None);
    }

    #[test]
    fn test_reference_accessors() {
        let named = RawReference::Named(5, "Belgium".to_string());
        assert_eq!(named.id(), Some(5));
        assert_eq!(named.display_name(), Some("Belgium"));
        assert_eq!(reference_id(&Some(RawReference::Unset(false))), None);
        assert_eq!(reference_id(&Some(RawReference::Id(9))), Some(9));
    }

    #[test]
    fn test_reference_rejects_strings() {
        assert!(serde_json::from_str::<Holder>(r#"{"field": "3"}"#).is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        for raw in [
            "2024-05-06 07:08:09",
            "2024-05-06T07:08:09",
            "2024-05-06T07:08:09+00:00",
            "2024-05-06",
        ] {
            let parsed = parse_timestamp(raw).unwrap_or_else(|| panic!("failed on {raw}"));
            assert_eq!(parsed.year(), 2024);
            assert_eq!(parsed.month(), 5);
        }
        assert!(parse_timestamp("yesterday").is_none());
    }
}
