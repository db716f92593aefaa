//! Axum Handlers for the REST API
//!
//! The message endpoint is the chat transport's entry point: every user
//! interaction is posted here and the reply is rendered by the caller.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};
use vocabot_core::Inbound;

use crate::{
    models::{ErrorResponse, HealthResponse, InboundMessagePayload, ReplyPayload, WordView},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Deliver one user message to the bot and get its reply.
#[utoipa::path(
    post,
    path = "/messages",
    request_body = InboundMessagePayload,
    responses(
        (status = 200, description = "The bot's reply", body = ReplyPayload),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, payload), fields(external_id = payload.external_id))]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InboundMessagePayload>,
) -> Result<Json<ReplyPayload>, ApiError> {
    if payload.display_name.chars().count() > 255 {
        return Err(ApiError::BadRequest(
            "display_name must be at most 255 characters".to_string(),
        ));
    }
    let reply = state.conversations.handle(Inbound::from(payload)).await;
    Ok(Json(reply.into()))
}

/// List a user's vocabulary with quiz counters, oldest first.
#[utoipa::path(
    get,
    path = "/users/{external_id}/words",
    responses(
        (status = 200, description = "The user's words", body = [WordView]),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("external_id" = i64, Path, description = "Transport identity of the user")
    )
)]
#[instrument(skip(state))]
pub async fn list_user_words(
    State(state): State<Arc<AppState>>,
    Path(external_id): Path<i64>,
) -> Result<Json<Vec<WordView>>, ApiError> {
    let user_id = state
        .store
        .lookup_user(external_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", external_id)))?;
    let words = state.store.list_words(user_id).await?;
    Ok(Json(words.into_iter().map(WordView::from).collect()))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
