//! Faculty load normalization.
//!
//! Turns the rows a user enters per faculty member (class, subject, periods
//! per week) into aggregated lecture/lab load assignments, rejecting input
//! that could never be scheduled before anything is sent to the generator.
mod types;

pub use types::*;

use crate::generation::error::{TimetableError, ValidationKind};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static LAB_SUBJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)lab").unwrap());

/// Returns true if the subject runs as a lab (name contains "lab", any case).
pub fn is_lab_subject(subject: &str) -> bool {
    LAB_SUBJECT_REGEX.is_match(subject)
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Checks that every faculty row is complete.
///
/// Runs over all faculty before any aggregation so a missing field is
/// reported even when a later row would also fail the lab parity check.
pub fn check_complete(faculty: &[FacultyInput]) -> Result<(), TimetableError> {
    if faculty.is_empty() {
        return Err(TimetableError::validation(
            ValidationKind::MissingField,
            "Please add at least one faculty member.",
        ));
    }

    for member in faculty {
        if is_blank(&member.name) {
            return Err(TimetableError::validation(
                ValidationKind::MissingField,
                "Please enter all Faculty names.",
            ));
        }

        let incomplete = member.periods.is_empty()
            || member.periods.iter().any(|p| {
                is_blank(&p.class_name) || is_blank(&p.subject) || p.no_of_periods.is_none()
            });
        if incomplete {
            return Err(TimetableError::validation(
                ValidationKind::MissingField,
                format!("Please fill all period assignments for {}", member.name),
            ));
        }
    }

    Ok(())
}

/// Aggregates one faculty member's rows into load assignments.
///
/// Rows sharing `(class_name, subject)` accumulate into one assignment, in
/// the order each pair first appears. The total number of periods is
/// conserved.
pub fn normalize_faculty(input: &FacultyInput) -> Result<FacultyRecord, TimetableError> {
    check_complete(std::slice::from_ref(input))?;

    let mut loads: IndexMap<(&str, &str), (u32, u32)> = IndexMap::new();
    for entry in &input.periods {
        let periods = entry.no_of_periods.unwrap_or(0);
        let slot = loads
            .entry((entry.class_name.as_str(), entry.subject.as_str()))
            .or_insert((0, 0));
        let load = if is_lab_subject(&entry.subject) {
            &mut slot.1
        } else {
            &mut slot.0
        };
        *load = load.checked_add(periods).ok_or_else(|| {
            TimetableError::validation(
                ValidationKind::LoadTooLarge,
                format!(
                    "Load for subject '{}' in class {} assigned to {} is too large.",
                    entry.subject, entry.class_name, input.name
                ),
            )
        })?;
    }

    let mut load_assignments = Vec::with_capacity(loads.len());
    for ((class_name, subject), (lecture_load, lab_load)) in loads {
        if lab_load % 2 != 0 {
            return Err(TimetableError::validation(
                ValidationKind::UnevenLabLoad,
                format!(
                    "Lab subject '{}' load for {} in class {} is {}. Must be an EVEN number for double blocks.",
                    subject, input.name, class_name, lab_load
                ),
            ));
        }
        load_assignments.push(LoadAssignment {
            subject: subject.to_string(),
            class_name: class_name.to_string(),
            lecture_load,
            lab_load,
        });
    }

    debug!(
        faculty = %input.name,
        rows = input.periods.len(),
        assignments = load_assignments.len(),
        "Normalized faculty load"
    );

    Ok(FacultyRecord {
        name: input.name.clone(),
        load_assignments,
    })
}

/// Normalizes every faculty member, stopping at the first violation.
pub fn normalize_all(faculty: &[FacultyInput]) -> Result<Vec<FacultyRecord>, TimetableError> {
    check_complete(faculty)?;
    faculty.iter().map(normalize_faculty).collect()
}

/// Turns a saved record back into editable rows, one per assignment.
pub fn denormalize(record: &FacultyRecord) -> FacultyInput {
    let periods = record
        .load_assignments
        .iter()
        .map(|a| RawPeriodEntry::new(a.class_name.clone(), a.subject.clone(), a.total()))
        .collect::<Vec<_>>();

    FacultyInput {
        name: record.name.clone(),
        periods: if periods.is_empty() {
            vec![RawPeriodEntry::default()]
        } else {
            periods
        },
    }
}

/// Appends a blank faculty row.
pub fn add_faculty(faculty: &[FacultyInput]) -> Vec<FacultyInput> {
    let mut next = faculty.to_vec();
    next.push(FacultyInput::blank());
    next
}

/// Removes the faculty row at `index`; out-of-range indices change nothing.
pub fn remove_faculty(faculty: &[FacultyInput], index: usize) -> Vec<FacultyInput> {
    faculty
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, f)| f.clone())
        .collect()
}

pub fn rename_faculty(faculty: &[FacultyInput], index: usize, name: &str) -> Vec<FacultyInput> {
    faculty
        .iter()
        .enumerate()
        .map(|(i, f)| {
            if i == index {
                FacultyInput {
                    name: name.to_string(),
                    periods: f.periods.clone(),
                }
            } else {
                f.clone()
            }
        })
        .collect()
}

/// Appends a blank row to the faculty member at `index`.
pub fn add_period(faculty: &[FacultyInput], index: usize) -> Vec<FacultyInput> {
    map_periods(faculty, index, |periods| {
        let mut next = periods.to_vec();
        next.push(RawPeriodEntry::default());
        next
    })
}

/// Removes one row; a faculty member always keeps at least one.
pub fn remove_period(faculty: &[FacultyInput], index: usize, period: usize) -> Vec<FacultyInput> {
    map_periods(faculty, index, |periods| {
        if periods.len() <= 1 {
            return periods.to_vec();
        }
        periods
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != period)
            .map(|(_, p)| p.clone())
            .collect()
    })
}

/// Replaces one row.
pub fn update_period(
    faculty: &[FacultyInput],
    index: usize,
    period: usize,
    entry: RawPeriodEntry,
) -> Vec<FacultyInput> {
    map_periods(faculty, index, |periods| {
        periods
            .iter()
            .enumerate()
            .map(|(i, p)| if i == period { entry.clone() } else { p.clone() })
            .collect()
    })
}

fn map_periods<F>(faculty: &[FacultyInput], index: usize, f: F) -> Vec<FacultyInput>
where
    F: Fn(&[RawPeriodEntry]) -> Vec<RawPeriodEntry>,
{
    faculty
        .iter()
        .enumerate()
        .map(|(i, member)| {
            if i == index {
                FacultyInput {
                    name: member.name.clone(),
                    periods: f(&member.periods),
                }
            } else {
                member.clone()
            }
        })
        .collect()
}
