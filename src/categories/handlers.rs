use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::articles::dto::ArticlePayload;
use crate::articles::repo as articles_repo;
use crate::categories::repo::{self, Category, CategoryWithCount};
use crate::error::ApiError;
use crate::state::AppState;

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list))
        .route("/categories/:id", get(show))
}

#[derive(Debug, Serialize)]
pub struct CategoryPayload {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub article_count: i64,
}

impl From<CategoryWithCount> for CategoryPayload {
    fn from(c: CategoryWithCount) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            created_at: c.created_at,
            article_count: c.article_count,
        }
    }
}

/// Category detail with its published articles inlined.
#[derive(Debug, Serialize)]
pub struct CategoryDetailPayload {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub articles: Vec<ArticlePayload>,
}

#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<CategoryPayload>>, ApiError> {
    let categories = repo::list_with_counts(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(
        categories.into_iter().map(CategoryPayload::from).collect(),
    ))
}

#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryDetailPayload>, ApiError> {
    let Category {
        id,
        name,
        slug,
        description,
        created_at,
    } = repo::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let articles = articles_repo::list_by_category(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(CategoryDetailPayload {
        id,
        name,
        slug,
        description,
        created_at,
        articles: articles.into_iter().map(ArticlePayload::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn category_payload_serializes_count() {
        let payload = CategoryPayload::from(CategoryWithCount {
            id: 1,
            name: "Technology".into(),
            slug: "technology".into(),
            description: "Latest tech news".into(),
            created_at: datetime!(2024-05-01 12:00 UTC),
            article_count: 4,
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["slug"], "technology");
        assert_eq!(json["article_count"], 4);
    }
}
