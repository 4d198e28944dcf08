//! Projection of a generation result onto one resource dimension.

use super::types::{DayRows, Dimensions, PeriodDetail, PeriodEntry, TimetableGrid, FREE_MARKER};
use super::GenerationResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// The four resource dimensions a result can be viewed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Class,
    Faculty,
    Lab,
    Classroom,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Class,
        ResourceKind::Faculty,
        ResourceKind::Lab,
        ResourceKind::Classroom,
    ];

    /// Lowercase mode name, used in filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Class => "class",
            ResourceKind::Faculty => "faculty",
            ResourceKind::Lab => "lab",
            ResourceKind::Classroom => "classroom",
        }
    }

    /// Human-readable label used in headings.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Class => "Class",
            ResourceKind::Faculty => "Faculty",
            ResourceKind::Lab => "Lab",
            ResourceKind::Classroom => "Classroom",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "class" => Ok(ResourceKind::Class),
            "faculty" | "teacher" => Ok(ResourceKind::Faculty),
            "lab" => Ok(ResourceKind::Lab),
            "classroom" => Ok(ResourceKind::Classroom),
            other => Err(format!("unknown view mode '{}'", other)),
        }
    }
}

/// Which resources of a view are in scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    One(String),
}

impl Selection {
    pub fn one(name: impl Into<String>) -> Self {
        Selection::One(name.into())
    }
}

/// Day label for a zero-based day index.
pub fn day_label(index: usize) -> String {
    DAY_NAMES
        .get(index)
        .map(|d| d.to_string())
        .unwrap_or_else(|| format!("Day {}", index + 1))
}

/// `Period 1` .. `Period n`.
pub fn period_labels(count: usize) -> Vec<String> {
    (1..=count).map(|p| format!("Period {}", p)).collect()
}

/// A labelled table exactly as the screen shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTable {
    pub heading: String,
    pub period_labels: Vec<String>,
    pub rows: Vec<DisplayRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub day: String,
    pub cells: Vec<String>,
}

/// Read-only view of one grid of a [`GenerationResult`].
///
/// Switching kind builds a new view; the result itself is never touched.
#[derive(Debug, Clone, Copy)]
pub struct ResourceView<'a> {
    kind: ResourceKind,
    grid: &'a TimetableGrid,
    configured: Dimensions,
}

impl<'a> ResourceView<'a> {
    pub fn new(result: &'a GenerationResult, kind: ResourceKind) -> Self {
        Self {
            kind,
            grid: result.grid(kind),
            configured: result.configured_dimensions(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn grid(&self) -> &'a TimetableGrid {
        self.grid
    }

    /// Resource names in the order the service emitted them.
    pub fn resource_names(&self) -> Vec<&'a str> {
        self.grid.names().collect()
    }

    /// Resources in scope for `selection`. An unknown name yields nothing.
    pub fn scope(&self, selection: &Selection) -> Vec<(&'a str, &'a DayRows)> {
        match selection {
            Selection::All => self.grid.iter().collect(),
            Selection::One(name) => self
                .grid
                .iter()
                .filter(|(n, _)| *n == name.as_str())
                .collect(),
        }
    }

    /// Effective dimensions over the resources in scope.
    pub fn dimensions(&self, selection: &Selection) -> Dimensions {
        let names = self.scope(selection).into_iter().map(|(name, _)| name);
        self.grid.dimensions_of(names, self.configured)
    }

    /// Effective dimensions of a single resource.
    pub fn resource_dimensions(&self, name: &str) -> Dimensions {
        self.grid.dimensions_of([name], self.configured)
    }

    /// Screen text of a cell.
    pub fn render_cell(&self, entry: &PeriodEntry) -> String {
        match entry {
            PeriodEntry::Free => FREE_MARKER.to_string(),
            PeriodEntry::Detail(detail) => self.render_detail(detail),
        }
    }

    fn render_detail(&self, detail: &PeriodDetail) -> String {
        // Faculty already know who they are; show the class instead.
        let mut text = match self.kind {
            ResourceKind::Faculty => format!("{} - {}", detail.subject, detail.class_name),
            _ => format!("{}({})", detail.subject, detail.faculty),
        };

        if detail.is_lab {
            text.push_str(&format!(" [{}] [{}]", detail.room, detail.batch));
        } else {
            text.push_str(&format!(" [{}]", detail.room));
        }
        text
    }

    /// Builds the table shown for one resource, padding short rows with `Free`.
    pub fn display_table(&self, name: &str) -> Option<DisplayTable> {
        let rows = self.grid.get(name)?;
        let dims = self.resource_dimensions(name);

        let rows = rows
            .iter()
            .enumerate()
            .map(|(day, cells)| DisplayRow {
                day: day_label(day),
                cells: (0..dims.periods)
                    .map(|p| {
                        cells
                            .get(p)
                            .map(|entry| self.render_cell(entry))
                            .unwrap_or_else(|| FREE_MARKER.to_string())
                    })
                    .collect(),
            })
            .collect();

        Some(DisplayTable {
            heading: format!("{}: {}", self.kind.label(), name),
            period_labels: period_labels(dims.periods),
            rows,
        })
    }

    /// Tables for every resource in scope.
    pub fn display_tables(&self, selection: &Selection) -> Vec<DisplayTable> {
        self.scope(selection)
            .into_iter()
            .filter_map(|(name, _)| self.display_table(name))
            .collect()
    }
}
