//! services/api/src/web/users.rs

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::protocol::UserResponse;
use crate::web::state::AppState;

/// List the members known to the directory.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "Known members", body = [UserResponse]))
)]
pub async fn list_users_handler(State(state): State<Arc<AppState>>) -> Json<Vec<UserResponse>> {
    Json(state.directory.users().iter().map(UserResponse::from).collect())
}
