// Student Directory Service - the five operations over the record store.
// Input is validated before any store interaction; the grading engine runs
// whenever marks are written.

use serde::Serialize;
use uuid::Uuid;

use crate::db::{ListFilter, StudentStore};
use crate::error::ApiError;
use crate::grading::compute_grading;
use crate::student::{Student, StudentInput};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 5;

// ============================================================================
// LISTING
// ============================================================================

/// Listing parameters after explicit parse-with-default of the raw query.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub division: Option<String>,
}

impl ListQuery {
    /// Build from raw query-string values. Missing, non-numeric, or
    /// non-positive `page`/`limit` fall back to the defaults; no upper
    /// clamp is applied.
    pub fn from_raw(
        page: Option<&str>,
        limit: Option<&str>,
        search: Option<String>,
        division: Option<String>,
    ) -> Self {
        ListQuery {
            page: parse_positive(page, DEFAULT_PAGE),
            limit: parse_positive(limit, DEFAULT_LIMIT),
            search: search.filter(|s| !s.is_empty()),
            division: division.filter(|s| !s.is_empty()),
        }
    }
}

fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// One page of listing results.
#[derive(Debug, Serialize)]
pub struct StudentPage {
    pub students: Vec<Student>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_students: i64,
}

pub fn list_students(store: &StudentStore, query: &ListQuery) -> Result<StudentPage, ApiError> {
    let filter = ListFilter {
        search: query.search.clone(),
        division: query.division.clone(),
    };

    let total_students = store.count_students(&filter)?;
    // page and limit are client-supplied and unclamped; saturate instead
    // of overflowing on extreme values
    let skip = (query.page - 1).saturating_mul(query.limit);
    let students = store.list_students(&filter, skip, query.limit)?;

    // ceil(total / limit)
    let total_pages = total_students.saturating_add(query.limit - 1) / query.limit;

    Ok(StudentPage {
        students,
        pagination: Pagination {
            current_page: query.page,
            total_pages,
            total_students,
        },
    })
}

// ============================================================================
// SINGLE-RECORD OPERATIONS
// ============================================================================

pub fn get_student(store: &StudentStore, id: &str) -> Result<Student, ApiError> {
    check_id(id)?;
    store.get_student(id)?.ok_or(ApiError::NotFound)
}

pub fn create_student(store: &StudentStore, input: StudentInput) -> Result<Student, ApiError> {
    let (percentage, division) = compute_grading(&input.marks);
    let student = store.insert_student(&input.name, &input.marks, percentage, division)?;
    Ok(student)
}

pub fn update_student(
    store: &StudentStore,
    id: &str,
    input: StudentInput,
) -> Result<Student, ApiError> {
    check_id(id)?;
    let (percentage, division) = compute_grading(&input.marks);
    store
        .update_student(id, &input.name, &input.marks, percentage, division)?
        .ok_or(ApiError::NotFound)
}

pub fn delete_student(store: &StudentStore, id: &str) -> Result<(), ApiError> {
    check_id(id)?;
    if store.delete_student(id)? {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

/// An id that does not parse as a UUID is malformed for the store's
/// identifier format and surfaces as a store error, not a 404.
fn check_id(id: &str) -> Result<(), ApiError> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|e| ApiError::Store(anyhow::Error::new(e).context("Malformed student id")))
}

// ============================================================================
// TESTS
// ============================================================================
