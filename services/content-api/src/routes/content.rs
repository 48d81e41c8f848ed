// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! CRUD handlers for `/content`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use content_api_core::{Content, ContentStatus, Error};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/content", post(create_content).get(list_content))
        .route(
            "/content/:id",
            get(get_content).put(update_content).delete(delete_content),
        )
}

/// Body of `POST /content`.
#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    /// Client-supplied id; the server assigns one when absent.
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    pub author: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Body of `PUT /content/{id}`. Absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub status: Option<ContentStatus>,
    pub data: Option<Map<String, Value>>,
}

/// Error response mapping for domain errors.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "Content not found".to_string()),
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Storage(msg) => {
                warn!(error = %msg, "Storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn create_content(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateContentRequest>,
) -> Result<Response, ApiError> {
    let content = Content::new(req.id, req.title, req.body, req.author, req.status, req.data);
    content.validate()?;

    info!(content_id = %content.id, title = %content.title, author = %content.author, "Creating new content");
    state.store.create(&content).await?;

    Ok((StatusCode::CREATED, Json(content)).into_response())
}

async fn list_content(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Content>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Content>, ApiError> {
    match state.store.get_by_id(&id).await? {
        Some(content) => Ok(Json(content)),
        None => {
            warn!(content_id = %id, "Content not found");
            Err(Error::not_found(id).into())
        }
    }
}

async fn update_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<Content>, ApiError> {
    let mut content = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found(&id))?;

    // Merge provided fields over the stored record; the id never changes.
    if let Some(title) = req.title {
        content.title = title;
    }
    if let Some(body) = req.body {
        content.body = body;
    }
    if let Some(author) = req.author {
        content.author = author;
    }
    if let Some(status) = req.status {
        content.status = status;
    }
    if let Some(data) = req.data {
        content.data = data;
    }
    content.updated_at = Utc::now();
    content.validate()?;

    state.store.update(&content).await?;
    Ok(Json(content))
}

async fn delete_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
