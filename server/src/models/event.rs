use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserId;
use crate::utils::error::{AppError, AppResult};

pub type EventId = i64;

/// Event timestamps arrive either with an offset or as naive wall-clock
/// times from older clients. Naive times are read as UTC.
mod lenient_utc {
    use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UtcVisitor;

        impl<'de> Visitor<'de> for UtcVisitor {
            type Value = DateTime<Utc>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an ISO 8601 date-time, with or without an offset")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(UtcVisitor)
    }

    pub(super) fn parse(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if let Ok(aware) = value.parse::<DateTime<FixedOffset>>() {
            return Some(aware.with_timezone(&Utc));
        }
        value
            .parse::<NaiveDateTime>()
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub venue: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_capacity: i32,
    pub organizer: UserId,
    pub is_private: bool,
}

/// Caller-supplied event fields. The organizer is never part of it.
#[derive(Debug, Clone, Deserialize)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    pub category: String,
    pub venue: String,
    #[serde(alias = "startdate", deserialize_with = "lenient_utc::deserialize")]
    pub start_date: DateTime<Utc>,
    #[serde(alias = "enddate", deserialize_with = "lenient_utc::deserialize")]
    pub end_date: DateTime<Utc>,
    #[serde(alias = "maxcapacity")]
    pub max_capacity: i32,
    #[serde(alias = "isprivate")]
    pub is_private: bool,
}

impl EventFields {
    pub fn validate(&self) -> AppResult<()> {
        if self.end_date < self.start_date {
            return Err(AppError::ValidationError(
                "end_date must not be before start_date".to_string(),
            ));
        }
        if self.max_capacity < 0 {
            return Err(AppError::ValidationError(
                "max_capacity must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
