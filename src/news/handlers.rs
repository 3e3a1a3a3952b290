use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::auth::extractors::MaybeUser;
use crate::error::ApiError;
use crate::news::dto::{AutoFetchQuery, FetchNewsRequest};
use crate::news::service::{import_from_provider, ImportSummary};
use crate::state::AppState;

pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/auto-fetch-news", get(auto_fetch))
        .route("/fetch-news", post(fetch))
}

#[instrument(skip(state, query))]
async fn auto_fetch(
    State(state): State<AppState>,
    Query(query): Query<AutoFetchQuery>,
) -> Result<Json<ImportSummary>, ApiError> {
    let news = &state.config.news;
    if !news.auto_fetch_enabled {
        return Err(ApiError::Forbidden("Auto fetch is disabled".to_string()));
    }

    let api_key = news
        .api_key
        .clone()
        .or_else(|| query.api_key.clone().filter(|k| !k.is_empty()))
        .ok_or_else(|| {
            warn!("auto fetch without a configured key");
            ApiError::BadRequest(
                "API key not configured - set NEWS_API_KEY or provide ?api_key=".to_string(),
            )
        })?;

    let category = query
        .category
        .clone()
        .unwrap_or_else(|| news.auto_fetch_category.clone());
    let count = query.count.unwrap_or(news.auto_fetch_count);

    let summary = import_from_provider(&state, &api_key, &category, count, None).await?;
    Ok(Json(summary))
}

#[instrument(skip(state, user, payload))]
async fn fetch(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<FetchNewsRequest>,
) -> Result<Json<ImportSummary>, ApiError> {
    let api_key = payload.api_key.filter(|k| !k.is_empty());

    let api_key = match (api_key, user.is_some()) {
        (Some(key), _) => key,
        (None, false) => {
            return Err(ApiError::Unauthorized(
                "API key required - Please provide a NewsAPI key or log in first".to_string(),
            ))
        }
        (None, true) => {
            return Err(ApiError::BadRequest(
                "API key required - To fetch real news articles, get a free key at \
                 https://newsapi.org/register"
                    .to_string(),
            ))
        }
    };

    let category = payload
        .category
        .unwrap_or_else(|| state.config.news.auto_fetch_category.clone());
    let count = payload.count.unwrap_or(state.config.news.auto_fetch_count);

    let summary = import_from_provider(&state, &api_key, &category, count, user).await?;
    Ok(Json(summary))
}
