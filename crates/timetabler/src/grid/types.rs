/// Types for timetable grids returned by the generation service
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker the generation service uses for an unoccupied slot.
pub const FREE_MARKER: &str = "Free";

/// Content of an occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDetail {
    pub subject: String,
    pub faculty: String,
    pub class_name: String,
    pub room: String,
    /// `Full Class` for lectures, a batch name for labs
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub is_lab: bool,
}

/// One (day, period) cell of any timetable grid.
///
/// The service writes free slots as `"Free"`, but saved documents may also
/// hold `""` or `null`; all of them deserialize to [`PeriodEntry::Free`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PeriodEntry {
    #[default]
    Free,
    Detail(PeriodDetail),
}

impl PeriodEntry {
    pub fn is_free(&self) -> bool {
        matches!(self, PeriodEntry::Free)
    }

    pub fn detail(&self) -> Option<&PeriodDetail> {
        match self {
            PeriodEntry::Free => None,
            PeriodEntry::Detail(detail) => Some(detail),
        }
    }
}

impl From<PeriodDetail> for PeriodEntry {
    fn from(detail: PeriodDetail) -> Self {
        PeriodEntry::Detail(detail)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireEntry {
    Detail(PeriodDetail),
    Marker(String),
}

impl<'de> Deserialize<'de> for PeriodEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<WireEntry>::deserialize(deserializer)? {
            Some(WireEntry::Detail(detail)) => PeriodEntry::Detail(detail),
            // "Free", "" and null are the same slot
            Some(WireEntry::Marker(_)) | None => PeriodEntry::Free,
        })
    }
}

impl Serialize for PeriodEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PeriodEntry::Free => serializer.serialize_str(FREE_MARKER),
            PeriodEntry::Detail(detail) => detail.serialize(serializer),
        }
    }
}

/// Reads `null` as the type's default; saved documents carry nulls for
/// grids and lists that were never filled.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Day rows of one resource; each row is indexed by period position.
pub type DayRows = Vec<Vec<PeriodEntry>>;

/// Grid dimensions as (days, periods).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub days: usize,
    pub periods: usize,
}

impl Dimensions {
    pub fn new(days: usize, periods: usize) -> Self {
        Self { days, periods }
    }

    /// Observed maxima over `rows`, without any fallback.
    fn observed(rows: &DayRows) -> Self {
        Self {
            days: rows.len(),
            periods: rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Replaces each axis that saw no data with the configured value.
    fn or_configured(self, configured: Dimensions) -> Self {
        Self {
            days: if self.days == 0 { configured.days } else { self.days },
            periods: if self.periods == 0 {
                configured.periods
            } else {
                self.periods
            },
        }
    }
}

/// Resource name to day rows, in the order the service emitted them.
///
/// Resources may report different row counts and row lengths when the
/// service emits partial schedules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimetableGrid(IndexMap<String, DayRows>);

impl TimetableGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a resource, keeping the position of an existing one.
    pub fn insert(&mut self, name: impl Into<String>, rows: DayRows) {
        self.0.insert(name.into(), rows);
    }

    pub fn get(&self, name: &str) -> Option<&DayRows> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DayRows)> {
        self.0.iter().map(|(name, rows)| (name.as_str(), rows))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Effective dimensions over the named resources.
    ///
    /// Each axis is the maximum observed across all of them; an axis with no
    /// observed data falls back to `configured`.
    pub fn dimensions_of<'a, I>(&self, names: I, configured: Dimensions) -> Dimensions
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.get(name))
            .map(Dimensions::observed)
            .fold(Dimensions::new(0, 0), |acc, d| {
                Dimensions::new(acc.days.max(d.days), acc.periods.max(d.periods))
            })
            .or_configured(configured)
    }

    /// Effective dimensions over every resource in the grid.
    pub fn dimensions(&self, configured: Dimensions) -> Dimensions {
        self.dimensions_of(self.0.keys().map(String::as_str), configured)
    }
}

impl FromIterator<(String, DayRows)> for TimetableGrid {
    fn from_iter<T: IntoIterator<Item = (String, DayRows)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
