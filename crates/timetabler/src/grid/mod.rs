/// Timetable grid model: the four resource grids of a generation result
mod types;
pub mod view;

pub use types::*;
pub(crate) use types::nullable;
pub use view::{DisplayRow, DisplayTable, ResourceKind, ResourceView, Selection};

use crate::load::FacultyRecord;
use serde::{Deserialize, Serialize};

/// Everything needed to redisplay or persist a completed generation.
///
/// Field names follow the service's documents, so the same type reads a
/// `/generate` success body and a saved timetable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,

    #[serde(default, deserialize_with = "nullable")]
    pub class_timetable: TimetableGrid,
    #[serde(default, deserialize_with = "nullable")]
    pub teacher_timetable: TimetableGrid,
    #[serde(default, deserialize_with = "nullable")]
    pub lab_timetable: TimetableGrid,
    #[serde(default, deserialize_with = "nullable")]
    pub classroom_timetable: TimetableGrid,

    #[serde(default, alias = "teacherData", deserialize_with = "nullable")]
    pub faculty: Vec<FacultyRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub classes: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub subjects: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub classrooms: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub labs: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub batches: Vec<String>,

    #[serde(rename = "workingDays", default, deserialize_with = "nullable")]
    pub working_days: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub periods: u32,
}

impl GenerationResult {
    /// A result with no grids and the given configured dimensions.
    pub fn empty(title: impl Into<String>, working_days: u32, periods: u32) -> Self {
        Self {
            title: title.into(),
            working_days,
            periods,
            ..Default::default()
        }
    }

    /// The grid backing a view mode.
    pub fn grid(&self, kind: ResourceKind) -> &TimetableGrid {
        match kind {
            ResourceKind::Class => &self.class_timetable,
            ResourceKind::Faculty => &self.teacher_timetable,
            ResourceKind::Lab => &self.lab_timetable,
            ResourceKind::Classroom => &self.classroom_timetable,
        }
    }

    /// Configured working days and periods; used when a view has no data.
    pub fn configured_dimensions(&self) -> Dimensions {
        Dimensions::new(self.working_days as usize, self.periods as usize)
    }

    pub fn view(&self, kind: ResourceKind) -> ResourceView<'_> {
        ResourceView::new(self, kind)
    }

    /// True when the class grid, which every other grid derives from, is empty.
    pub fn is_empty(&self) -> bool {
        self.class_timetable.is_empty()
    }
}
