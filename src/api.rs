// HTTP surface: axum router and handlers.
// Handlers stay thin; the directory service owns validation, grading, and
// store access. Every error is mapped to a status + JSON body here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::db::StudentStore;
use crate::directory::{self, ListQuery};
use crate::error::ApiError;
use crate::student::StudentInput;

/// Raw listing query parameters, before parse-with-default.
#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<String>,
    limit: Option<String>,
    search: Option<String>,
    division: Option<String>,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/students - List with pagination, search, and division filter
async fn list_students(
    State(store): State<StudentStore>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ListQuery::from_raw(
        params.page.as_deref(),
        params.limit.as_deref(),
        params.search,
        params.division,
    );
    let page = directory::list_students(&store, &query)?;
    Ok(Json(page))
}

/// GET /api/students/:id - Fetch one record
async fn get_student(
    State(store): State<StudentStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let student = directory::get_student(&store, &id)?;
    Ok(Json(student))
}

/// POST /api/students - Create a record
async fn create_student(
    State(store): State<StudentStore>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let input = StudentInput::from_body(&body).map_err(ApiError::Validation)?;
    let student = directory::create_student(&store, input)?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// PUT /api/students/:id - Replace name and marks
async fn update_student(
    State(store): State<StudentStore>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let input = StudentInput::from_body(&body).map_err(ApiError::Validation)?;
    let student = directory::update_student(&store, &id, input)?;
    Ok(Json(student))
}

/// DELETE /api/students/:id - Hard delete
async fn delete_student(
    State(store): State<StudentStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    directory::delete_student(&store, &id)?;
    Ok(Json(json!({ "message": "Student deleted successfully" })))
}

/// GET /api/health - Health check with store connectivity
async fn health_check(State(store): State<StudentStore>) -> impl IntoResponse {
    let store_status = if store.is_connected() {
        "connected"
    } else {
        "disconnected"
    };
    Json(json!({ "status": "OK", "store": store_status }))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the application router around an injected store handle.
pub fn router(store: StudentStore) -> Router {
    let student_routes = Router::new()
        .route("/", get(list_students).post(create_student))
        .route(
            "/:id",
            get(get_student).put(update_student).delete(delete_student),
        );

    Router::new()
        .nest("/api/students", student_routes)
        .route("/api/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

// ============================================================================
// TESTS
// ============================================================================
