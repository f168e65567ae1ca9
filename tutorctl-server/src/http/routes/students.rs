//! Student endpoints
//!
//! Same four verbs as the reference entities, over the full student field
//! set. Unknown `college_id` / `funnel_id` values are rejected by the
//! datastore's foreign keys and surface as a 500.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use super::MessageResponse;
use crate::db::Store;
use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson, ValidPage};
use crate::http::server::AppState;
use crate::models::validation::require_id;
use crate::models::{Student, StudentInput, StudentParams, ValidationError};

/// Update student request: the id plus every student field
#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    pub student_id: Option<i64>,
    #[serde(flatten)]
    pub fields: StudentInput,
}

/// POST /students
async fn create_student<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(input): ValidJson<StudentInput>,
) -> Result<Json<Student>, ApiError> {
    let params = StudentParams::try_from(input)?;
    let student = state.store.create_student(params).await?;
    Ok(Json(student))
}

/// GET /students/{id}
async fn get_student<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidId(id): ValidId,
) -> Result<Json<Student>, ApiError> {
    let student = state.store.get_student(id).await?;
    Ok(Json(student))
}

/// GET /students?page_id=N&page_size=M
async fn list_students<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidPage(page): ValidPage,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = state.store.list_students(page).await?;
    Ok(Json(students))
}

/// PUT /students
async fn update_student<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(req): ValidJson<UpdateStudentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = req.student_id.ok_or(ValidationError::Missing {
        field: "student_id",
    })?;
    let id = require_id("student_id", id)?;
    let params = StudentParams::try_from(req.fields)?;

    state.store.update_student(id, params).await?;
    Ok(Json(MessageResponse::updated("Student")))
}

/// Student routes
pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route(
            "/students",
            get(list_students::<S>)
                .post(create_student::<S>)
                .put(update_student::<S>),
        )
        .route("/students/{id}", get(get_student::<S>))
}
