//! services/api/src/web/reading.rs
//!
//! Personal reading progress and the statistics derived from it.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::loans::find_member;
use crate::web::protocol::{ProgressRequest, ProgressResponse, ReadingStatsResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/users/{id}/reading",
    params(("id" = Uuid, Path, description = "Member id")),
    responses(
        (status = 200, description = "Reading records in creation order", body = [ProgressResponse]),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn list_progress_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ProgressResponse>>, ApiError> {
    find_member(&state, user_id)?;
    let reading = state.reading.read().await;
    Ok(Json(
        reading
            .records_for(user_id)
            .iter()
            .map(ProgressResponse::from)
            .collect(),
    ))
}

/// Create or update the member's record for one book.
///
/// `completed` pins progress at 100 and stamps the finish date; page counts
/// derive progress when no explicit percentage is sent.
#[utoipa::path(
    put,
    path = "/users/{id}/reading/{book_id}",
    request_body = ProgressRequest,
    params(
        ("id" = Uuid, Path, description = "Member id"),
        ("book_id" = Uuid, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Updated record", body = ProgressResponse),
        (status = 400, description = "Unknown status or progress out of range"),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn update_progress_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, book_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>, ApiError> {
    find_member(&state, user_id)?;
    let update = req.into_update(book_id)?;
    let mut reading = state.reading.write().await;
    let record = reading.record_progress(user_id, update, state.clock.today());
    Ok(Json(ProgressResponse::from(record)))
}

#[utoipa::path(
    get,
    path = "/users/{id}/reading/stats",
    params(("id" = Uuid, Path, description = "Member id")),
    responses(
        (status = 200, description = "Reading statistics and achievements", body = ReadingStatsResponse),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn reading_stats_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ReadingStatsResponse>, ApiError> {
    find_member(&state, user_id)?;
    let stats = state.reading.read().await.stats_for(user_id, state.clock.today());
    Ok(Json(ReadingStatsResponse::from(&stats)))
}
