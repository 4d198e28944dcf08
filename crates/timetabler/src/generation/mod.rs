//! Building generation requests and talking to the generation service.
//!
//! The flow for one attempt:
//! 1. `ResourceSetup::validate` checks the resource lists and dimensions
//! 2. `load::normalize_all` turns faculty rows into load records
//! 3. `build_request` derives the syllabus and assembles the request
//! 4. `GenerationClient::generate` posts it and classifies the answer
pub mod client;
pub mod error;
pub mod session;
mod types;

pub use client::GenerationClient;
pub use error::{classify_response, TimetableError, ValidationKind, REMEDIATION_HINTS};
pub use session::{GenerationSession, SessionInputs};
pub use types::*;

use crate::load::FacultyRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Most labs the generator can allocate.
pub const MAX_LABS: usize = 4;
/// Fewer classrooms than this usually cannot host every class at once.
pub const RECOMMENDED_MIN_CLASSROOMS: usize = 3;
pub const MAX_WORKING_DAYS: u32 = 6;
/// The generator never places one subject more than twice a day for a class.
pub const MAX_SUBJECT_PERIODS_PER_DAY: u32 = 2;

fn default_batches() -> Vec<String> {
    vec!["Batch 1".to_string(), "Batch 2".to_string()]
}

fn default_working_days() -> u32 {
    5
}

fn default_periods() -> u32 {
    8
}

/// Resources and dimensions chosen before faculty are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSetup {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_working_days")]
    pub working_days: u32,
    #[serde(default = "default_periods")]
    pub periods: u32,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub classrooms: Vec<String>,
    #[serde(default)]
    pub labs: Vec<String>,
    #[serde(default = "default_batches")]
    pub batches: Vec<String>,
}

impl Default for ResourceSetup {
    fn default() -> Self {
        Self {
            title: String::new(),
            working_days: default_working_days(),
            periods: default_periods(),
            classes: Vec::new(),
            subjects: Vec::new(),
            classrooms: Vec::new(),
            labs: Vec::new(),
            batches: default_batches(),
        }
    }
}

/// Drops blank names, keeping order.
pub fn non_blank(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|n| !n.trim().is_empty())
        .cloned()
        .collect()
}

impl ResourceSetup {
    /// Validates the setup the way the setup form does.
    ///
    /// Fewer than the recommended number of classrooms is only a warning.
    pub fn validate(&self) -> Result<(), TimetableError> {
        if self.title.trim().is_empty() {
            return Err(TimetableError::validation(
                ValidationKind::MissingField,
                "Please provide a title for the timetable.",
            ));
        }

        if self.working_days == 0 || self.periods == 0 {
            return Err(TimetableError::validation(
                ValidationKind::InvalidDimensions,
                "Please enter valid working days and periods per day",
            ));
        }
        if self.working_days > MAX_WORKING_DAYS {
            return Err(TimetableError::validation(
                ValidationKind::InvalidDimensions,
                format!("Number of working days cannot exceed {}", MAX_WORKING_DAYS),
            ));
        }

        let classes = non_blank(&self.classes);
        let subjects = non_blank(&self.subjects);
        let classrooms = non_blank(&self.classrooms);
        let labs = non_blank(&self.labs);

        if classes.is_empty() || subjects.is_empty() || classrooms.is_empty() || labs.is_empty() {
            return Err(TimetableError::validation(
                ValidationKind::MissingField,
                "Please add at least one class, subject, classroom, and lab.",
            ));
        }
        if labs.len() > MAX_LABS {
            return Err(TimetableError::validation(
                ValidationKind::TooManyLabs,
                format!("Number of Labs cannot exceed {}.", MAX_LABS),
            ));
        }
        if classrooms.len() < RECOMMENDED_MIN_CLASSROOMS {
            warn!(
                classrooms = classrooms.len(),
                "It is recommended to have at least {} classrooms", RECOMMENDED_MIN_CLASSROOMS
            );
        }

        Ok(())
    }
}

/// Per-class syllabus: one entry per distinct subject taught to the class,
/// with loads summed across every faculty member teaching it.
///
/// Classes keep the given order; subjects keep first-appearance order across
/// `faculty`. Assignments for classes not in `classes` are ignored.
pub fn derive_syllabus(
    classes: &[String],
    faculty: &[FacultyRecord],
) -> IndexMap<String, Vec<SyllabusEntry>> {
    classes
        .iter()
        .map(|class| {
            let mut subjects: IndexMap<&str, SyllabusEntry> = IndexMap::new();
            for assignment in faculty
                .iter()
                .flat_map(|f| &f.load_assignments)
                .filter(|a| &a.class_name == class)
            {
                let entry = subjects
                    .entry(assignment.subject.as_str())
                    .or_insert_with(|| SyllabusEntry {
                        subject: assignment.subject.clone(),
                        lecture_load: 0,
                        lab_load: 0,
                    });
                entry.lecture_load = entry.lecture_load.saturating_add(assignment.lecture_load);
                entry.lab_load = entry.lab_load.saturating_add(assignment.lab_load);
            }
            (class.clone(), subjects.into_values().collect())
        })
        .collect()
}

/// Assembles the request body for one generation attempt.
pub fn build_request(
    setup: &ResourceSetup,
    faculty: &[FacultyRecord],
    user_id: &str,
) -> GenerationRequest {
    let classes = non_blank(&setup.classes);
    let syllabus = derive_syllabus(&classes, faculty);

    GenerationRequest {
        title: setup.title.clone(),
        working_days: setup.working_days,
        periods: setup.periods,
        classes,
        batches: if setup.batches.is_empty() {
            default_batches()
        } else {
            setup.batches.clone()
        },
        classrooms: non_blank(&setup.classrooms),
        labs: non_blank(&setup.labs),
        syllabus,
        faculty: faculty.to_vec(),
        user_id: user_id.to_string(),
    }
}

/// Kinds of load problems the generator is going to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityIssue {
    /// A class needs more periods than the week has
    PeriodsOverflow,
    /// One subject for a class needs more than two periods every day
    DailySubjectLimit,
    /// A faculty member teaches more periods than the week has
    FacultyOverload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityWarning {
    pub issue: CapacityIssue,
    pub message: String,
}

/// Non-blocking capacity checks run before submission.
pub fn capacity_warnings(request: &GenerationRequest) -> Vec<CapacityWarning> {
    let slots = request.working_days.saturating_mul(request.periods);
    let daily_limit = request.working_days.saturating_mul(MAX_SUBJECT_PERIODS_PER_DAY);
    let mut warnings = Vec::new();

    for (class, entries) in &request.syllabus {
        let required = entries
            .iter()
            .map(|e| e.lecture_load.saturating_add(e.lab_load))
            .fold(0, u32::saturating_add);
        if required > slots {
            warnings.push(CapacityWarning {
                issue: CapacityIssue::PeriodsOverflow,
                message: format!(
                    "Class {} requires {} periods but only {} periods are available.",
                    class, required, slots
                ),
            });
        }
    }

    for member in &request.faculty {
        for assignment in &member.load_assignments {
            if assignment.total() > daily_limit {
                warnings.push(CapacityWarning {
                    issue: CapacityIssue::DailySubjectLimit,
                    message: format!(
                        "Subject '{}' for class {} requires {} periods, exceeding max possible {}.",
                        assignment.subject,
                        assignment.class_name,
                        assignment.total(),
                        daily_limit
                    ),
                });
            }
        }

        let total = member.total_load();
        if total > slots {
            warnings.push(CapacityWarning {
                issue: CapacityIssue::FacultyOverload,
                message: format!(
                    "Faculty {} is assigned {} periods, exceeding max possible {}.",
                    member.name, total, slots
                ),
            });
        }
    }

    warnings
}

/// Short digest of a request body, for correlating regenerations in logs.
pub fn request_fingerprint(request: &GenerationRequest) -> String {
    let body = serde_json::to_vec(request).unwrap_or_default();
    let digest = Sha256::digest(&body);
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::{normalize_all, FacultyInput, LoadAssignment, RawPeriodEntry};

    fn setup() -> ResourceSetup {
        ResourceSetup {
            title: "Odd Sem".to_string(),
            classes: vec!["BE".into(), "".into(), "SE".into()],
            subjects: vec!["DB".into(), "DB Lab".into()],
            classrooms: vec!["C1".into(), "C2".into(), " ".into(), "C3".into()],
            labs: vec!["Lab 1".into(), "Lab 2".into()],
            ..Default::default()
        }
    }

    fn faculty() -> Vec<FacultyRecord> {
        normalize_all(&[
            FacultyInput::new(
                "A",
                vec![
                    RawPeriodEntry::new("BE", "DB", 3),
                    RawPeriodEntry::new("BE", "DB Lab", 2),
                ],
            ),
            FacultyInput::new(
                "B",
                vec![
                    RawPeriodEntry::new("BE", "DB", 1),
                    RawPeriodEntry::new("SE", "OS", 4),
                    RawPeriodEntry::new("BE", "DB Lab", 4),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_setup_validation() {
        assert!(setup().validate().is_ok());

        let mut bad = setup();
        bad.working_days = 7;
        assert_eq!(
            bad.validate().unwrap_err().validation_kind(),
            Some(ValidationKind::InvalidDimensions)
        );

        let mut bad = setup();
        bad.labs = vec!["L1", "L2", "L3", "L4", "L5"].into_iter().map(String::from).collect();
        assert_eq!(
            bad.validate().unwrap_err().validation_kind(),
            Some(ValidationKind::TooManyLabs)
        );

        let mut bad = setup();
        bad.classes = vec!["  ".into()];
        assert_eq!(
            bad.validate().unwrap_err().validation_kind(),
            Some(ValidationKind::MissingField)
        );

        let mut bad = setup();
        bad.title = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_syllabus_sums_across_faculty() {
        let syllabus = derive_syllabus(&["BE".to_string(), "SE".to_string()], &faculty());
        assert_eq!(
            syllabus["BE"],
            vec![
                SyllabusEntry {
                    subject: "DB".into(),
                    lecture_load: 4,
                    lab_load: 0
                },
                SyllabusEntry {
                    subject: "DB Lab".into(),
                    lecture_load: 0,
                    lab_load: 6
                },
            ]
        );
        assert_eq!(syllabus["SE"].len(), 1);
    }

    #[test]
    fn test_syllabus_includes_unassigned_classes() {
        let syllabus = derive_syllabus(&["TE".to_string()], &faculty());
        assert!(syllabus["TE"].is_empty());
    }

    #[test]
    fn test_build_request_filters_blanks() {
        let request = build_request(&setup(), &faculty(), "user-1");
        assert_eq!(request.classes, vec!["BE", "SE"]);
        assert_eq!(request.classrooms, vec!["C1", "C2", "C3"]);
        assert_eq!(request.batches, vec!["Batch 1", "Batch 2"]);
        assert_eq!(request.user_id, "user-1");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["workingDays"], 5);
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["faculty"][0]["load_assignments"][0]["lecture_load"], 3);
        assert_eq!(json["syllabus"]["BE"][1]["lab_load"], 6);
    }

    #[test]
    fn test_capacity_warnings() {
        let mut setup = setup();
        setup.working_days = 1;
        setup.periods = 4;
        let faculty = vec![FacultyRecord {
            name: "A".into(),
            load_assignments: vec![LoadAssignment {
                subject: "DB".into(),
                class_name: "BE".into(),
                lecture_load: 5,
                lab_load: 0,
            }],
        }];
        let request = build_request(&setup, &faculty, "u");
        let issues: Vec<_> = capacity_warnings(&request).into_iter().map(|w| w.issue).collect();
        assert_eq!(
            issues,
            vec![
                CapacityIssue::PeriodsOverflow,
                CapacityIssue::DailySubjectLimit,
                CapacityIssue::FacultyOverload
            ]
        );

        assert!(capacity_warnings(&build_request(&self::setup(), &self::faculty(), "u")).is_empty());
    }

    #[test]
    fn test_large_loads_saturate() {
        let record = |name: &str| FacultyRecord {
            name: name.into(),
            load_assignments: vec![LoadAssignment {
                subject: "DB".into(),
                class_name: "BE".into(),
                lecture_load: u32::MAX,
                lab_load: 0,
            }],
        };
        let faculty = vec![record("A"), record("B")];
        let syllabus = derive_syllabus(&["BE".to_string()], &faculty);
        assert_eq!(syllabus["BE"][0].lecture_load, u32::MAX);

        let mut setup = setup();
        setup.periods = u32::MAX;
        let request = build_request(&setup, &faculty, "u");
        let issues: Vec<_> = capacity_warnings(&request).into_iter().map(|w| w.issue).collect();
        assert!(issues.contains(&CapacityIssue::DailySubjectLimit));
        assert!(!issues.contains(&CapacityIssue::PeriodsOverflow));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = build_request(&setup(), &faculty(), "u");
        let b = build_request(&setup(), &faculty(), "u");
        assert_eq!(request_fingerprint(&a), request_fingerprint(&b));
        assert_eq!(request_fingerprint(&a).len(), 16);

        let c = build_request(&setup(), &faculty(), "other");
        assert_ne!(request_fingerprint(&a), request_fingerprint(&c));
    }
}
