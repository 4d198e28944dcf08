/// Documents exchanged with the timetable store
use crate::grid::GenerationResult;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A persisted generation result as the store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTimetable {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub result: GenerationResult,
}

impl SavedTimetable {
    /// Creation (or last update) time, if the store sent a parseable one.
    ///
    /// Timestamps without an offset are read as UTC.
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
    }
}

/// Body of `POST /add` and `PUT /update-timetable/:id`.
#[derive(Debug, Serialize)]
pub(crate) struct SaveRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    #[serde(flatten)]
    pub result: &'a GenerationResult,
}

/// Body of `DELETE /delete-timetable/:id`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeleteResponse {
    #[serde(default)]
    pub message: String,
}
