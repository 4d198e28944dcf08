//! Timetabler - faculty load normalization and timetable views.
//!
//! Collects per-faculty teaching loads, turns them into a request for an
//! external schedule-generation service, and projects and exports the four
//! timetables (class, faculty, lab, classroom) it returns.

pub mod config;
pub mod export;
pub mod generation;
pub mod grid;
pub mod load;
pub mod store;

pub use config::ClientConfig;
pub use generation::{GenerationClient, GenerationSession, TimetableError};
pub use grid::GenerationResult;
pub use store::StoreClient;
