//! Error taxonomy for generation attempts and the classifier that maps
//! generation-service responses onto it.

use super::types::GenerateResponse;
use reqwest::StatusCode;
use thiserror::Error;

/// Fixed remediation hints shown alongside every generation failure.
pub const REMEDIATION_HINTS: [&str; 4] = [
    "Check if total faculty load exceeds available time slots.",
    "Ensure all lab loads (periods) are even numbers.",
    "Verify that subject loads match what's possible with available resources (Labs/Classrooms).",
    "Make sure you have enough Classrooms and Labs (max 4).",
];

/// Error type the service attaches when the solver proved infeasibility.
const INFEASIBLE_ERROR_TYPE: &str = "INFEASIBLE_SOLUTION";

/// The kind of a client-side validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// A faculty name, class, subject, load, title or resource list is empty.
    MissingField,
    /// A lab subject accumulated an odd number of periods.
    UnevenLabLoad,
    /// Working days outside 1..=6, or zero periods per day.
    InvalidDimensions,
    /// More labs than the generator supports.
    TooManyLabs,
    /// Periods for one class and subject add up past what can be counted.
    LoadTooLarge,
}

/// Errors that can end a generation attempt.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimetableError {
    /// Input rejected before any network call
    #[error("Validation error ({kind:?}): {message}")]
    Validation { kind: ValidationKind, message: String },

    /// The service answered with an explicit failure
    #[error("Generation failed: {message}")]
    Generation {
        message: String,
        error_type: Option<String>,
    },

    /// The service found no schedule satisfying the constraints
    #[error("No feasible timetable: {message}")]
    Infeasible { message: String },

    /// Transport failure or unparseable response
    #[error("Network error: {message}")]
    Network { message: String },

    /// Another submission is still outstanding
    #[error("A timetable generation is already in progress")]
    InProgress,
}

impl TimetableError {
    pub(crate) fn validation(kind: ValidationKind, message: impl Into<String>) -> Self {
        TimetableError::Validation {
            kind,
            message: message.into(),
        }
    }

    /// Returns the validation kind if this error was raised before submission.
    pub fn validation_kind(&self) -> Option<ValidationKind> {
        match self {
            TimetableError::Validation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns true if the error was caught before reaching the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, TimetableError::Validation { .. })
    }

    /// Returns true if the service itself reported the failure.
    pub fn is_service_reported(&self) -> bool {
        matches!(
            self,
            TimetableError::Generation { .. } | TimetableError::Infeasible { .. }
        )
    }

    /// The user's input survives every failure except a rejected duplicate
    /// submission, which leaves the outstanding attempt untouched.
    pub fn preserves_input(&self) -> bool {
        !matches!(self, TimetableError::InProgress)
    }

    /// Original message, when one was available.
    pub fn message(&self) -> Option<&str> {
        match self {
            TimetableError::Validation { message, .. }
            | TimetableError::Generation { message, .. }
            | TimetableError::Infeasible { message }
            | TimetableError::Network { message } => Some(message),
            TimetableError::InProgress => None,
        }
    }

    /// Generic remediation hints for the user.
    pub fn remediation_hints(&self) -> &'static [&'static str] {
        &REMEDIATION_HINTS
    }
}

impl From<reqwest::Error> for TimetableError {
    fn from(err: reqwest::Error) -> Self {
        TimetableError::Network {
            message: err.to_string(),
        }
    }
}

/// Interprets a `/generate` response.
///
/// A body carrying `status: "ERROR"` or `"INFEASIBLE"` wins over the HTTP
/// status; a non-2xx response without such a body is still a generation
/// failure when it carries a message, and a network failure otherwise.
pub fn classify_response(status: StatusCode, body: &str) -> Result<GenerateResponse, TimetableError> {
    let parsed: Result<GenerateResponse, _> = serde_json::from_str(body);

    let response = match parsed {
        Ok(response) => response,
        Err(e) if status.is_success() => {
            return Err(TimetableError::Network {
                message: format!("Failed to parse generation response: {}", e),
            });
        }
        Err(_) => return Err(failure_without_body(status, body)),
    };

    match response.status.as_deref() {
        Some("INFEASIBLE") => Err(TimetableError::Infeasible {
            message: response.message_or("No feasible timetable solution exists"),
        }),
        Some("ERROR") if response.error_type.as_deref() == Some(INFEASIBLE_ERROR_TYPE) => {
            Err(TimetableError::Infeasible {
                message: response.message_or("No feasible timetable solution exists"),
            })
        }
        Some("ERROR") => Err(TimetableError::Generation {
            message: response.message_or("Failed to generate timetable"),
            error_type: response.error_type.clone(),
        }),
        _ if !status.is_success() => Err(TimetableError::Generation {
            message: response.message_or(&format!("Generation service returned status {}", status)),
            error_type: response.error_type.clone(),
        }),
        _ if response.class_timetable.is_empty() => Err(TimetableError::Infeasible {
            message: response.message_or("Generation service returned an empty class timetable"),
        }),
        _ => Ok(response),
    }
}

/// Non-2xx response whose body is not a generation response.
fn failure_without_body(status: StatusCode, body: &str) -> TimetableError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("detail"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    match message {
        Some(message) => TimetableError::Generation {
            message,
            error_type: None,
        },
        None => TimetableError::Network {
            message: format!("Generation service returned status {}", status),
        },
    }
}
