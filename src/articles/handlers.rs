use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::articles::dto::{
    page_window, ArticlePayload, ArticleResponse, CreateArticleRequest, ListArticlesQuery,
    UpdateArticleRequest,
};
use crate::articles::repo::{self, NewArticle};
use crate::articles::slug::unique_slug;
use crate::auth::dto::MessageResponse;
use crate::auth::extractors::CurrentUser;
use crate::categories;
use crate::error::ApiError;
use crate::state::AppState;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list).post(create))
        .route("/articles/:id", get(show).put(update).delete(destroy))
}

#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<Vec<ArticlePayload>>, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let (limit, offset) = page_window(query.page, query.per_page);

    let articles = repo::list_published(&state.db, search, category, limit, offset)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(articles.into_iter().map(ArticlePayload::from).collect()))
}

#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArticlePayload>, ApiError> {
    let article = repo::find_detail(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;
    Ok(Json(ArticlePayload::from(article)))
}

async fn ensure_category_exists(state: &AppState, category_id: i64) -> Result<(), ApiError> {
    let exists = categories::repo::find_by_id(&state.db, category_id)
        .await
        .map_err(ApiError::Internal)?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(ApiError::validation(vec![
            "The selected category id is invalid.".to_string(),
        ]))
    }
}

#[instrument(skip(state, user, payload))]
async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let input = payload.validate()?;
    ensure_category_exists(&state, input.category_id).await?;

    let article = repo::create_article(
        &state.db,
        &NewArticle {
            title: &input.title,
            content: &input.content,
            excerpt: &input.excerpt,
            image_url: input.image_url.as_deref(),
            category_id: Some(input.category_id),
            user_id: user.id,
            published_at: input.published_at,
        },
    )
    .await?;

    let detail = repo::find_detail(&state.db, article.id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("created article vanished")))?;

    info!(article_id = article.id, user_id = user.id, slug = %article.slug, "article created");
    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse {
            message: "Article created successfully".to_string(),
            article: ArticlePayload::from(detail),
        }),
    ))
}

#[instrument(skip(state, user, payload))]
async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = repo::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

    if article.user_id != user.id {
        warn!(article_id = id, user_id = user.id, "update rejected: not the author");
        return Err(ApiError::Forbidden(
            "You do not have permission to edit this article".to_string(),
        ));
    }

    let changes = payload.validate()?;

    if let Some(category_id) = changes.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    // The slug only moves when the title does, and the article's own slug
    // never counts as a collision against itself.
    let new_slug = match changes.title.as_deref() {
        Some(title) => Some(
            unique_slug(&state.db, title, Some(id))
                .await
                .map_err(ApiError::from)?,
        ),
        None => None,
    };

    if !changes.is_empty() {
        repo::update_article(&state.db, id, &changes, new_slug.as_deref())
            .await
            .map_err(ApiError::Internal)?;
    }

    let detail = repo::find_detail(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

    info!(article_id = id, user_id = user.id, "article updated");
    Ok(Json(ArticleResponse {
        message: "Article updated successfully".to_string(),
        article: ArticlePayload::from(detail),
    }))
}

#[instrument(skip(state, user))]
async fn destroy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let article = repo::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

    if article.user_id != user.id {
        warn!(article_id = id, user_id = user.id, "delete rejected: not the author");
        return Err(ApiError::Forbidden(
            "You do not have permission to delete this article".to_string(),
        ));
    }

    repo::delete_article(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;

    info!(article_id = id, user_id = user.id, "article deleted");
    Ok(Json(MessageResponse {
        message: "Article deleted successfully".to_string(),
    }))
}
