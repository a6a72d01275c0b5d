//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns an `invalid_request` [`Error`] whose details name
//! the offending field and a stable machine-readable code.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::domain::{DayOfWeek, Error, IdValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidTime,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidValue => "invalid_value",
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

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String, value: Option<&str>) -> Error {
    let details = match value {
        Some(value) => json!({
            "field": field.as_str(),
            "value": value,
            "code": code.as_str(),
        }),
        None => json!({
            "field": field.as_str(),
            "code": code.as_str(),
        }),
    };
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
        None,
    )
}

/// Wrap a domain validation failure for `field`.
pub(crate) fn invalid_field_error(field: FieldName, reason: impl Display) -> Error {
    field_error(field, ErrorCode::InvalidValue, reason.to_string(), None)
}

pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdValidationError>,
{
    value.parse::<T>().map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{name} must be a valid UUID"),
            Some(value),
        )
    })
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            ErrorCode::InvalidDate,
            format!("{name} must be a date in YYYY-MM-DD form"),
            Some(value),
        )
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

/// Parse a wall-clock time in `HH:MM` or `HH:MM:SS` form.
pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| {
            let name = field.as_str();
            field_error(
                field,
                ErrorCode::InvalidTime,
                format!("{name} must be a time in HH:MM form"),
                Some(value),
            )
        })
}

pub(crate) fn parse_day_of_week(value: i64, field: FieldName) -> Result<DayOfWeek, Error> {
    DayOfWeek::new(value).map_err(|err| invalid_field_error(field, err))
}

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies. Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Render a time the way every response body carries it.
pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
