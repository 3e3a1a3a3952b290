use serde::Serialize;
use tracing::{info, warn};

use crate::articles::repo::{self as articles_repo, NewArticle};
use crate::auth::repo::User;
use crate::categories::repo as categories_repo;
use crate::error::ApiError;
use crate::news::client::{ExternalArticle, NewsError};
use crate::state::AppState;

pub const MIN_COUNT: i64 = 1;
pub const MAX_COUNT: i64 = 20;
const EXCERPT_LIMIT: usize = 150;

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub message: String,
    pub imported: usize,
    pub skipped: usize,
    pub total: usize,
}

pub fn clamp_count(count: i64) -> i64 {
    count.clamp(MIN_COUNT, MAX_COUNT)
}

/// Body text for the local article: the provider's content, falling back to
/// its description.
pub fn derive_content(item: &ExternalArticle) -> Option<String> {
    item.content
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .or_else(|| item.description.as_deref().filter(|d| !d.trim().is_empty()))
        .map(str::to_string)
}

/// Excerpt: the description when present, otherwise a 150-character snippet
/// of the content with an ellipsis marker.
pub fn derive_excerpt(item: &ExternalArticle, content: &str) -> String {
    if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
        return description.to_string();
    }
    if content.chars().count() <= EXCERPT_LIMIT {
        return content.to_string();
    }
    let snippet: String = content.chars().take(EXCERPT_LIMIT).collect();
    format!("{snippet}...")
}

/// Imports top headlines into the local article set. Per-item problems skip
/// that item; only the upstream call and an unknown category abort the batch.
pub async fn import_from_provider(
    state: &AppState,
    api_key: &str,
    category_slug: &str,
    count: i64,
    acting_user: Option<User>,
) -> Result<ImportSummary, ApiError> {
    let count = clamp_count(count);

    let category = categories_repo::find_by_slug(&state.db, category_slug)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::BadRequest("Category not found".to_string()))?;

    let user = match acting_user {
        Some(user) => user,
        None => User::find_or_create_admin(&state.db, &state.config.admin)
            .await
            .map_err(ApiError::Internal)?,
    };

    let items = state.news.top_headlines(api_key, category_slug, count).await?;
    if items.is_empty() {
        return Err(NewsError::Empty.into());
    }

    let total = items.len();
    let mut imported = 0;
    let mut skipped = 0;

    for item in items {
        let Some(title) = item.title.as_deref().filter(|t| !t.trim().is_empty()) else {
            skipped += 1;
            continue;
        };
        let Some(content) = derive_content(&item) else {
            skipped += 1;
            continue;
        };
        // Title is the dedup key; the provider's own ids are not stored.
        match articles_repo::title_exists(&state.db, title).await {
            Ok(true) => {
                skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, title, "duplicate check failed, skipping item");
                skipped += 1;
                continue;
            }
        }

        let excerpt = derive_excerpt(&item, &content);
        let result = articles_repo::create_article(
            &state.db,
            &NewArticle {
                title,
                content: &content,
                excerpt: &excerpt,
                image_url: item.url_to_image.as_deref(),
                category_id: Some(category.id),
                user_id: user.id,
                published_at: None,
            },
        )
        .await;

        match result {
            Ok(article) => {
                info!(article_id = article.id, slug = %article.slug, "imported article");
                imported += 1;
            }
            Err(e) => {
                warn!(error = %e, title, "import insert failed, skipping item");
                skipped += 1;
            }
        }
    }

    info!(imported, skipped, total, category = category_slug, "import finished");
    Ok(ImportSummary {
        message: "News articles imported successfully".to_string(),
        imported,
        skipped,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_clamps_to_provider_range() {
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(-5), 1);
        assert_eq!(clamp_count(10), 10);
        assert_eq!(clamp_count(25), 20);
    }

    fn item(
        title: Option<&str>,
        description: Option<&str>,
        content: Option<&str>,
    ) -> ExternalArticle {
        ExternalArticle {
            title: title.map(String::from),
            description: description.map(String::from),
            content: content.map(String::from),
            url_to_image: None,
        }
    }

    #[test]
    fn content_prefers_body_over_description() {
        let i = item(Some("T"), Some("the description"), Some("the body"));
        assert_eq!(derive_content(&i).as_deref(), Some("the body"));
    }

    #[test]
    fn content_falls_back_to_description() {
        let i = item(Some("T"), Some("the description"), None);
        assert_eq!(derive_content(&i).as_deref(), Some("the description"));
    }

    #[test]
    fn blank_body_and_description_yield_nothing() {
        let i = item(Some("T"), Some("   "), Some(""));
        assert!(derive_content(&i).is_none());
    }

    #[test]
    fn excerpt_prefers_description() {
        let i = item(Some("T"), Some("short summary"), Some("long body"));
        assert_eq!(derive_excerpt(&i, "long body"), "short summary");
    }

    #[test]
    fn excerpt_truncates_long_content_with_ellipsis() {
        let i = item(Some("T"), None, None);
        let content = "x".repeat(200);
        let excerpt = derive_excerpt(&i, &content);
        assert_eq!(excerpt.chars().count(), 153);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn excerpt_keeps_short_content_untouched() {
        let i = item(Some("T"), None, None);
        assert_eq!(derive_excerpt(&i, "short body"), "short body");
    }

    #[test]
    fn excerpt_truncation_respects_multibyte_boundaries() {
        let i = item(Some("T"), None, None);
        let content = "é".repeat(200);
        let excerpt = derive_excerpt(&i, &content);
        assert_eq!(excerpt.chars().count(), 153);
        assert!(excerpt.ends_with("..."));
    }
}
