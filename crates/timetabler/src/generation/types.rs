/// Wire types for the `/generate` endpoint
use crate::grid::{nullable, GenerationResult, TimetableGrid};
use crate::load::FacultyRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Load of one subject for a class, summed over every faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusEntry {
    pub subject: String,
    pub lecture_load: u32,
    pub lab_load: u32,
}

/// Request body for `POST /generate`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub title: String,
    pub working_days: u32,
    pub periods: u32,
    pub classes: Vec<String>,
    pub batches: Vec<String>,
    pub classrooms: Vec<String>,
    pub labs: Vec<String>,
    /// Derived from `faculty`; never edited on its own
    pub syllabus: IndexMap<String, Vec<SyllabusEntry>>,
    pub faculty: Vec<FacultyRecord>,
    pub user_id: String,
}

/// Body of a `/generate` response, success or failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_details: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "nullable")]
    pub class_timetable: TimetableGrid,
    #[serde(default, deserialize_with = "nullable")]
    pub teacher_timetable: TimetableGrid,
    #[serde(default, deserialize_with = "nullable")]
    pub lab_timetable: TimetableGrid,
    #[serde(default, deserialize_with = "nullable")]
    pub classroom_timetable: TimetableGrid,

    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub faculty: Option<Vec<FacultyRecord>>,
    #[serde(default)]
    pub classes: Option<Vec<String>>,
    #[serde(default)]
    pub batches: Option<Vec<String>>,
    #[serde(default)]
    pub classrooms: Option<Vec<String>>,
    #[serde(default)]
    pub labs: Option<Vec<String>>,
    #[serde(rename = "workingDays", default)]
    pub working_days: Option<u32>,
    #[serde(default)]
    pub periods: Option<u32>,
}

impl GenerateResponse {
    pub(crate) fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Builds the result, preferring echoed metadata over the request's.
    pub fn into_result(self, request: &GenerationRequest, subjects: Vec<String>) -> GenerationResult {
        GenerationResult {
            title: self.title.unwrap_or_else(|| request.title.clone()),
            class_timetable: self.class_timetable,
            teacher_timetable: self.teacher_timetable,
            lab_timetable: self.lab_timetable,
            classroom_timetable: self.classroom_timetable,
            faculty: self.faculty.unwrap_or_else(|| request.faculty.clone()),
            classes: self.classes.unwrap_or_else(|| request.classes.clone()),
            subjects,
            classrooms: self.classrooms.unwrap_or_else(|| request.classrooms.clone()),
            labs: self.labs.unwrap_or_else(|| request.labs.clone()),
            batches: self.batches.unwrap_or_else(|| request.batches.clone()),
            working_days: self.working_days.unwrap_or(request.working_days),
            periods: self.periods.unwrap_or(request.periods),
        }
    }
}
