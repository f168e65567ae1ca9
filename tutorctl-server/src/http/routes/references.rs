//! Reference entity endpoints
//!
//! Colleges, funnels, lesson locations, lesson subjects and payment methods
//! share one set of handlers, instantiated per [`Reference`] type:
//!
//! - `POST /<entities>` with `{name}`
//! - `GET /<entities>/{id}`
//! - `GET /<entities>?page_id=N&page_size=M`
//! - `PUT /<entities>` with `{<id field>, name}`

use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::MessageResponse;
use crate::db::Store;
use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson, ValidPage};
use crate::http::server::AppState;
use crate::models::validation::require_id;
use crate::models::{Reference, ReferenceName, ValidationError};

/// Create reference request
#[derive(Debug, Deserialize)]
pub struct CreateReferenceRequest {
    pub name: Option<String>,
}

fn reference_name(name: Option<&str>) -> Result<ReferenceName, ValidationError> {
    let name = name.ok_or(ValidationError::Missing { field: "name" })?;
    ReferenceName::new(name)
}

/// Pull `{<id field>, name}` out of an update body.
///
/// The id field name depends on the entity (`college_id`, `location_id`, ...),
/// so the body is read as a JSON object rather than a fixed struct.
fn parse_update<R: Reference>(
    body: &Map<String, Value>,
) -> Result<(i64, ReferenceName), ValidationError> {
    let field = R::KIND.id_column();
    let id = match body.get(field) {
        None | Some(Value::Null) => return Err(ValidationError::Missing { field }),
        Some(value) => value.as_i64().ok_or(ValidationError::InvalidFormat {
            field,
            reason: "must be an integer",
        })?,
    };
    let id = require_id(field, id)?;

    let name = match body.get("name") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            return Err(ValidationError::InvalidFormat {
                field: "name",
                reason: "must be a string",
            })
        }
    };

    Ok((id, reference_name(name)?))
}

/// POST /<entities>
async fn create<S: Store, R: Reference>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(req): ValidJson<CreateReferenceRequest>,
) -> Result<Json<R>, ApiError> {
    let name = reference_name(req.name.as_deref())?;
    let reference = state.store.create_reference::<R>(name).await?;
    Ok(Json(reference))
}

/// GET /<entities>/{id}
async fn get_one<S: Store, R: Reference>(
    State(state): State<Arc<AppState<S>>>,
    ValidId(id): ValidId,
) -> Result<Json<R>, ApiError> {
    let reference = state.store.get_reference::<R>(id).await?;
    Ok(Json(reference))
}

/// GET /<entities>?page_id=N&page_size=M
async fn list<S: Store, R: Reference>(
    State(state): State<Arc<AppState<S>>>,
    ValidPage(page): ValidPage,
) -> Result<Json<Vec<R>>, ApiError> {
    let references = state.store.list_references::<R>(page).await?;
    Ok(Json(references))
}

/// PUT /<entities>
async fn update<S: Store, R: Reference>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(body): ValidJson<Map<String, Value>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (id, name) = parse_update::<R>(&body)?;
    state.store.update_reference::<R>(id, name).await?;
    Ok(Json(MessageResponse::updated(R::KIND.label())))
}

/// Routes for one reference entity
pub fn router<S: Store, R: Reference>() -> Router<Arc<AppState<S>>> {
    let kind = R::KIND;
    Router::new()
        .route(
            kind.collection_path(),
            get(list::<S, R>).post(create::<S, R>).put(update::<S, R>),
        )
        .route(kind.item_path(), get(get_one::<S, R>))
}
