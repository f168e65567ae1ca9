//! Route handlers organized by resource

pub mod health;
pub mod references;
pub mod students;

use std::sync::Arc;

use axum::Router;
use serde::Serialize;

use super::server::AppState;
use crate::db::Store;
use crate::models::{College, Funnel, LessonLocation, LessonSubject, PaymentMethod};

/// `{"message": ...}` body returned by update endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn updated(label: &str) -> Self {
        Self {
            message: format!("{} updated successfully", label),
        }
    }
}

/// Every route, still waiting for its state.
pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .merge(health::router::<Arc<AppState<S>>>())
        .merge(references::router::<S, College>())
        .merge(references::router::<S, Funnel>())
        .merge(references::router::<S, LessonLocation>())
        .merge(references::router::<S, LessonSubject>())
        .merge(references::router::<S, PaymentMethod>())
        .merge(students::router::<S>())
}
