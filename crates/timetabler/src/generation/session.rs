//! One user's generation session.
//!
//! At most one attempt is in flight at a time. The last inputs survive every
//! failure so the user can fix them and retry, and the current result is
//! replaced wholesale on success, never merged.

use super::client::GenerationClient;
use super::error::TimetableError;
use super::{build_request, non_blank, ResourceSetup};
use crate::grid::GenerationResult;
use crate::load::{normalize_all, FacultyInput};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Inputs of the most recent submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInputs {
    pub setup: ResourceSetup,
    pub faculty: Vec<FacultyInput>,
}

pub struct GenerationSession {
    client: GenerationClient,
    /// Held for the whole of an attempt
    in_flight: Mutex<()>,
    current: RwLock<Option<Arc<GenerationResult>>>,
    last_inputs: RwLock<Option<SessionInputs>>,
}

impl GenerationSession {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            in_flight: Mutex::new(()),
            current: RwLock::new(None),
            last_inputs: RwLock::new(None),
        }
    }

    /// True while an attempt is waiting on the service.
    pub fn is_generating(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Validates, normalizes and submits one attempt.
    ///
    /// A second call while one is running fails with `InProgress` and leaves
    /// the running attempt and the stored inputs untouched. Any other
    /// failure keeps the inputs and the previous result.
    pub async fn generate(
        &self,
        setup: ResourceSetup,
        faculty: Vec<FacultyInput>,
    ) -> Result<Arc<GenerationResult>, TimetableError> {
        let _guard = self.in_flight.try_lock().map_err(|_| {
            warn!("Generation already in progress, ignoring submission");
            TimetableError::InProgress
        })?;

        *self.last_inputs.write().await = Some(SessionInputs {
            setup: setup.clone(),
            faculty: faculty.clone(),
        });

        self.submit(&setup, &faculty).await
    }

    /// Clears the current result and resubmits the last inputs.
    pub async fn regenerate(&self) -> Result<Arc<GenerationResult>, TimetableError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| TimetableError::InProgress)?;

        let inputs = self.last_inputs.read().await.clone().ok_or_else(|| {
            TimetableError::validation(
                super::ValidationKind::MissingField,
                "Nothing to regenerate. Please submit a timetable first.",
            )
        })?;

        self.current.write().await.take();
        info!(title = %inputs.setup.title, "Regenerating timetable");

        self.submit(&inputs.setup, &inputs.faculty).await
    }

    async fn submit(
        &self,
        setup: &ResourceSetup,
        faculty: &[FacultyInput],
    ) -> Result<Arc<GenerationResult>, TimetableError> {
        setup.validate()?;
        let records = normalize_all(faculty)?;
        let request = build_request(setup, &records, &self.client.config().user_id);
        debug!(syllabus_classes = request.syllabus.len(), "Built generation request");

        let response = self.client.generate(&request).await?;
        let result = Arc::new(response.into_result(&request, non_blank(&setup.subjects)));

        *self.current.write().await = Some(result.clone());
        Ok(result)
    }

    /// The most recent successful result.
    pub async fn current(&self) -> Option<Arc<GenerationResult>> {
        self.current.read().await.clone()
    }

    pub async fn last_inputs(&self) -> Option<SessionInputs> {
        self.last_inputs.read().await.clone()
    }

    /// Loads a saved result for viewing or re-editing.
    ///
    /// The faculty rows are rebuilt from the saved load records.
    pub async fn restore(&self, result: GenerationResult) -> Result<(), TimetableError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| TimetableError::InProgress)?;

        let setup = ResourceSetup {
            title: result.title.clone(),
            working_days: result.working_days,
            periods: result.periods,
            classes: result.classes.clone(),
            subjects: result.subjects.clone(),
            classrooms: result.classrooms.clone(),
            labs: result.labs.clone(),
            batches: result.batches.clone(),
        };
        let faculty = result.faculty.iter().map(crate::load::denormalize).collect();

        *self.last_inputs.write().await = Some(SessionInputs { setup, faculty });
        *self.current.write().await = Some(Arc::new(result));
        Ok(())
    }

    /// Drops the current result and the stored inputs.
    pub async fn clear(&self) {
        self.current.write().await.take();
        self.last_inputs.write().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::generation::ValidationKind;
    use crate::load::{FacultyRecord, LoadAssignment, RawPeriodEntry};

    fn session() -> GenerationSession {
        // nothing listens here; tests below never reach the network
        let config = ClientConfig::with_base_url("http://127.0.0.1:9/").unwrap();
        GenerationSession::new(GenerationClient::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_inputs() {
        let session = session();
        let setup = ResourceSetup {
            title: "Odd Sem".into(),
            ..Default::default()
        };
        let faculty = vec![FacultyInput::new("A", vec![RawPeriodEntry::new("BE", "DB", 2)])];

        let err = session.generate(setup.clone(), faculty.clone()).await.unwrap_err();
        assert_eq!(err.validation_kind(), Some(ValidationKind::MissingField));
        assert!(err.preserves_input());

        let inputs = session.last_inputs().await.unwrap();
        assert_eq!(inputs.setup, setup);
        assert_eq!(inputs.faculty, faculty);
        assert!(session.current().await.is_none());
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn test_regenerate_without_inputs() {
        let err = session().regenerate().await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_restore_rebuilds_rows() {
        let session = session();
        let mut result = GenerationResult::empty("Saved", 5, 6);
        result.faculty = vec![FacultyRecord {
            name: "Rao".into(),
            load_assignments: vec![LoadAssignment {
                subject: "DB Lab".into(),
                class_name: "BE".into(),
                lecture_load: 0,
                lab_load: 4,
            }],
        }];

        session.restore(result).await.unwrap();
        let inputs = session.last_inputs().await.unwrap();
        assert_eq!(inputs.setup.periods, 6);
        assert_eq!(
            inputs.faculty[0].periods,
            vec![RawPeriodEntry::new("BE", "DB Lab", 4)]
        );
        assert_eq!(session.current().await.unwrap().title, "Saved");

        session.clear().await;
        assert!(session.current().await.is_none());
    }
}
