/// Types for faculty load input and its normalized form
use serde::{Deserialize, Serialize};

/// One row of a faculty member's load as the user entered it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawPeriodEntry {
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub subject: String,
    /// Total periods per week; `None` until the user fills it in
    #[serde(rename = "noOfPeriods", default)]
    pub no_of_periods: Option<u32>,
}

impl RawPeriodEntry {
    pub fn new(class_name: impl Into<String>, subject: impl Into<String>, no_of_periods: u32) -> Self {
        Self {
            class_name: class_name.into(),
            subject: subject.into(),
            no_of_periods: Some(no_of_periods),
        }
    }
}

/// A faculty member with the rows entered for them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FacultyInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub periods: Vec<RawPeriodEntry>,
}

impl FacultyInput {
    /// A faculty row with one blank entry, the state a newly added row starts in.
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            periods: vec![RawPeriodEntry::default()],
        }
    }

    pub fn new(name: impl Into<String>, periods: Vec<RawPeriodEntry>) -> Self {
        Self {
            name: name.into(),
            periods,
        }
    }
}

/// Aggregated lecture and lab periods of one subject for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadAssignment {
    pub subject: String,
    pub class_name: String,
    pub lecture_load: u32,
    /// Always even; labs run in double periods
    #[serde(default)]
    pub lab_load: u32,
}

impl LoadAssignment {
    pub fn total(&self) -> u32 {
        self.lecture_load.saturating_add(self.lab_load)
    }
}

/// A faculty member and all of their load assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyRecord {
    pub name: String,
    #[serde(default)]
    pub load_assignments: Vec<LoadAssignment>,
}

impl FacultyRecord {
    pub fn total_load(&self) -> u32 {
        self.load_assignments
            .iter()
            .map(LoadAssignment::total)
            .fold(0, u32::saturating_add)
    }
}
