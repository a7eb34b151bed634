use crate::error::AppError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

// Resolved once so every offset-less deadline in a process shares one offset.
static LOCAL_OFFSET: Lazy<UtcOffset> =
    Lazy::new(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC));

/// A validated point in time that keeps the text it was parsed from.
///
/// Accepted forms: RFC 3339, `YYYY-MM-DDTHH:MM` followed by `Z` or `±HH:MM`,
/// `YYYY-MM-DDTHH:MM[:SS[.fff]]`, the same with a space instead of `T`, and
/// `YYYY-MM-DD` (midnight). Forms without an offset are read in the local
/// offset, or UTC when that cannot be determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Deadline {
    raw: String,
    at: OffsetDateTime,
}

impl Deadline {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("deadline is required"));
        }

        let at = parse_instant(trimmed)
            .ok_or_else(|| AppError::validation("deadline must be a valid timestamp"))?;

        Ok(Self {
            raw: trimmed.to_string(),
            at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> OffsetDateTime {
        self.at
    }
}

fn parse_instant(value: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }

    if let Some(parsed) = parse_minutes_with_offset(value) {
        return Some(parsed);
    }

    parse_local(value).map(|local| local.assume_offset(*LOCAL_OFFSET))
}

fn parse_minutes_with_offset(value: &str) -> Option<OffsetDateTime> {
    if let Some(utc) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        return PrimitiveDateTime::parse(utc, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
            .ok()
            .map(PrimitiveDateTime::assume_utc);
    }

    OffsetDateTime::parse(
        value,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
        ),
    )
    .ok()
}

fn parse_local(value: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(value, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(value, format_description!("[year]-[month]-[day] [hour]:[minute]"))
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
            )
        })
        .or_else(|_| {
            Date::parse(value, format_description!("[year]-[month]-[day]")).map(Date::midnight)
        })
        .ok()
}

impl TryFrom<String> for Deadline {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Deadline> for String {
    fn from(value: Deadline) -> Self {
        value.raw
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
