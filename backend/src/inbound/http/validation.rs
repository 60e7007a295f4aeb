//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every 400 produced here carries `details.field` and `details.code` so
//! clients can point at the offending input.

use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidNumber,
    OutOfRange,
    IncompleteLocation,
    Empty,
    TooShort,
    TooLong,
    InvalidFormat,
}

impl ErrorCode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::IncompleteLocation => "incomplete_location",
            ErrorCode::Empty => "empty",
            ErrorCode::TooShort => "too_short",
            ErrorCode::TooLong => "too_long",
            ErrorCode::InvalidFormat => "invalid_format",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Build a 400 with `{field, code}` details.
pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

/// Build a 400 with `{field, value, code}` details.
pub(crate) fn field_value_error(
    field: FieldName,
    code: ErrorCode,
    value: impl Into<String>,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

pub(crate) fn invalid_number_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    field_value_error(
        field,
        ErrorCode::InvalidNumber,
        value,
        format!("{name} must be a number"),
    )
}

/// Parse an optional query-string float. Blank values count as absent.
pub(crate) fn parse_optional_f64(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<f64>, Error> {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .map(Some)
            .ok_or_else(|| invalid_number_error(field, raw)),
    }
}

/// Parse an optional query-string integer. Blank values count as absent.
pub(crate) fn parse_optional_i64(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<i64>, Error> {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid_number_error(field, raw)),
    }
}

/// Require a field that the JSON body left out.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
