// Student Records Service - Core Library
// Exposes the grading engine, record store, and directory service for the
// API server binary and tests.

pub mod api;
pub mod db;
pub mod directory;
pub mod error;
pub mod grading;
pub mod student;

// Re-export commonly used types
pub use db::{ListFilter, StudentStore};
pub use directory::{ListQuery, Pagination, StudentPage, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use error::ApiError;
pub use grading::{compute_grading, Division, SUBJECT_COUNT};
pub use student::{FieldError, Student, StudentInput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
