//! services/api/src/web/catalog.rs

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::protocol::{CatalogEntryResponse, CatalogQuery};
use crate::web::state::AppState;

/// Look up bibliographic data by ISBN, title or author before adding a book.
#[utoipa::path(
    get,
    path = "/catalog/search",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Matching catalog entries", body = [CatalogEntryResponse]),
        (status = 400, description = "Empty query"),
        (status = 502, description = "Catalog service failed")
    )
)]
pub async fn catalog_search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<CatalogEntryResponse>>, ApiError> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest("q must not be empty".to_string()));
    }
    let entries = state.catalog.search(&query.q).await?;
    Ok(Json(entries.into_iter().map(CatalogEntryResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::state::test_support::fixture;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn searches_the_configured_catalog() {
        let fx = fixture();
        let Json(hits) = catalog_search_handler(
            State(fx.state.clone()),
            Query(CatalogQuery { q: "herbert".into() }),
        )
        .await
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Dune");

        let err = catalog_search_handler(State(fx.state.clone()), Query(CatalogQuery { q: " ".into() }))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
