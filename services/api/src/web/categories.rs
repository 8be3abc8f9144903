//! services/api/src/web/categories.rs
//!
//! A member's own categories and the books filed under them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::loans::find_member;
use crate::web::protocol::{CategoryRequest, CategoryResponse};
use crate::web::reviews::ensure_book;
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/users/{id}/categories",
    params(("id" = Uuid, Path, description = "Member id")),
    responses(
        (status = 200, description = "Categories in creation order", body = [CategoryResponse]),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn list_categories_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    find_member(&state, user_id)?;
    let categories = state.categories.read().await;
    Ok(Json(
        categories
            .categories_for(user_id)
            .iter()
            .map(CategoryResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/users/{id}/categories",
    request_body = CategoryRequest,
    params(("id" = Uuid, Path, description = "Member id")),
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Empty name or malformed colour"),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn create_category_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    find_member(&state, user_id)?;
    let mut categories = state.categories.write().await;
    let category = categories.add(user_id, &req.name, req.color.as_deref())?;
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

#[utoipa::path(
    put,
    path = "/users/{id}/categories/{category_id}",
    request_body = CategoryRequest,
    params(
        ("id" = Uuid, Path, description = "Member id"),
        ("category_id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Empty name or malformed colour"),
        (status = 404, description = "Unknown member or category")
    )
)]
pub async fn update_category_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, category_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    find_member(&state, user_id)?;
    let mut categories = state.categories.write().await;
    let category = categories.edit(user_id, category_id, &req.name, req.color.as_deref())?;
    Ok(Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}/categories/{category_id}",
    params(
        ("id" = Uuid, Path, description = "Member id"),
        ("category_id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Unknown member or category")
    )
)]
pub async fn delete_category_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    find_member(&state, user_id)?;
    state.categories.write().await.delete(user_id, category_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// File a catalog book under the category.
#[utoipa::path(
    put,
    path = "/users/{id}/categories/{category_id}/books/{book_id}",
    params(
        ("id" = Uuid, Path, description = "Member id"),
        ("category_id" = Uuid, Path, description = "Category id"),
        ("book_id" = Uuid, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Category with the book filed", body = CategoryResponse),
        (status = 404, description = "Unknown member, category or book")
    )
)]
pub async fn assign_book_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, category_id, book_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<CategoryResponse>, ApiError> {
    find_member(&state, user_id)?;
    ensure_book(&state, book_id).await?;
    let mut categories = state.categories.write().await;
    let category = categories.assign_book(user_id, category_id, book_id)?;
    Ok(Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}/categories/{category_id}/books/{book_id}",
    params(
        ("id" = Uuid, Path, description = "Member id"),
        ("category_id" = Uuid, Path, description = "Category id"),
        ("book_id" = Uuid, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Category without the book", body = CategoryResponse),
        (status = 404, description = "Unknown member or category")
    )
)]
pub async fn remove_book_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, category_id, book_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<CategoryResponse>, ApiError> {
    find_member(&state, user_id)?;
    let mut categories = state.categories.write().await;
    let category = categories.remove_book(user_id, category_id, book_id)?;
    Ok(Json(CategoryResponse::from(category)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::state::test_support::fixture;
    use lending_ledger_core::NewBook;

    fn request(name: &str, color: Option<&str>) -> Json<CategoryRequest> {
        Json(CategoryRequest {
            name: name.into(),
            color: color.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn categories_lifecycle() {
        let fx = fixture();
        let user = fx.active_user.id;
        let book = fx
            .state
            .ledger
            .write()
            .await
            .add_book(NewBook {
                title: "Pride and Prejudice".into(),
                author: "Jane Austen".into(),
                isbn: "978-0-14-143951-8".into(),
                genre: "Romance".into(),
                quantity: 1,
                available: None,
            })
            .unwrap();

        let (status, Json(created)) = create_category_handler(State(fx.state.clone()), Path(user), request("Classics", None))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!((created.color.as_str(), created.book_count), ("#EF4444", 0));

        let Json(filed) = assign_book_handler(State(fx.state.clone()), Path((user, created.id, book)))
            .await
            .unwrap();
        assert_eq!(filed.book_count, 1);

        let err = assign_book_handler(State(fx.state.clone()), Path((user, created.id, Uuid::new_v4())))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let Json(renamed) = update_category_handler(
            State(fx.state.clone()),
            Path((user, created.id)),
            request("Old favourites", Some("#10B981")),
        )
        .await
        .unwrap();
        assert_eq!((renamed.name.as_str(), renamed.color.as_str()), ("Old favourites", "#10B981"));
        assert_eq!(renamed.book_count, 1);

        let Json(emptied) = remove_book_handler(State(fx.state.clone()), Path((user, created.id, book)))
            .await
            .unwrap();
        assert_eq!(emptied.book_count, 0);

        let status = delete_category_handler(State(fx.state.clone()), Path((user, created.id)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let Json(listed) = list_categories_handler(State(fx.state.clone()), Path(user))
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn invalid_categories_are_rejected() {
        let fx = fixture();
        let user = fx.active_user.id;

        let err = create_category_handler(State(fx.state.clone()), Path(user), request("  ", None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let err = create_category_handler(State(fx.state.clone()), Path(user), request("Blue", Some("blue")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let err = create_category_handler(State(fx.state.clone()), Path(Uuid::new_v4()), request("Mine", None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let (_, Json(created)) = create_category_handler(State(fx.state.clone()), Path(user), request("Mine", None))
            .await
            .unwrap();
        let err = delete_category_handler(State(fx.state.clone()), Path((fx.banned_user.id, created.id)))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
