use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::articles::repo::{ArticleChanges, ArticleDetail};
use crate::error::ApiError;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 255;
pub const CONTENT_MIN: usize = 10;

/// Query string for the public listing. `per_page` switches between the
/// paginated window and the full filtered set.
#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Translates page/per_page into a SQL window. No `per_page` means no limit;
/// page numbers below 1 clamp to the first page.
pub fn page_window(page: Option<i64>, per_page: Option<i64>) -> (Option<i64>, i64) {
    match per_page {
        Some(per_page) => {
            let per_page = per_page.max(1);
            let page = page.unwrap_or(1).max(1);
            (Some(per_page), (page - 1) * per_page)
        }
        None => (None, 0),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// A create request with every required field checked and unwrapped.
#[derive(Debug)]
pub struct NewArticleInput {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub category_id: i64,
    pub published_at: Option<OffsetDateTime>,
}

fn check_title(title: &str, errors: &mut Vec<String>) {
    let len = title.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&len) {
        errors.push(format!(
            "The title must be between {TITLE_MIN} and {TITLE_MAX} characters."
        ));
    }
}

fn check_content(content: &str, errors: &mut Vec<String>) {
    if content.chars().count() < CONTENT_MIN {
        errors.push(format!(
            "The content must be at least {CONTENT_MIN} characters."
        ));
    }
}

impl CreateArticleRequest {
    pub fn validate(self) -> Result<NewArticleInput, ApiError> {
        let mut errors = Vec::new();

        match self.title.as_deref() {
            None | Some("") => errors.push("The title field is required.".to_string()),
            Some(title) => check_title(title, &mut errors),
        }
        match self.content.as_deref() {
            None | Some("") => errors.push("The content field is required.".to_string()),
            Some(content) => check_content(content, &mut errors),
        }
        if self.category_id.is_none() {
            errors.push("The category id field is required.".to_string());
        }

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(NewArticleInput {
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            excerpt: self.excerpt.unwrap_or_default(),
            image_url: self.image_url,
            category_id: self.category_id.unwrap_or_default(),
            published_at: self.published_at,
        })
    }
}

/// Partial update body. Only supplied fields are validated and applied —
/// never a free-form merge of caller keys into the row.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

impl UpdateArticleRequest {
    pub fn validate(self) -> Result<ArticleChanges, ApiError> {
        let mut errors = Vec::new();

        if let Some(title) = self.title.as_deref() {
            check_title(title, &mut errors);
        }
        if let Some(content) = self.content.as_deref() {
            check_content(content, &mut errors);
        }

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(ArticleChanges {
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            image_url: self.image_url,
            category_id: self.category_id,
            published_at: self.published_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// The article shape every endpoint returns: row fields plus flattened and
/// nested author/category references.
#[derive(Debug, Serialize)]
pub struct ArticlePayload {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user_name: String,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub user: UserRef,
    pub category: Option<CategoryRef>,
}

impl From<ArticleDetail> for ArticlePayload {
    fn from(detail: ArticleDetail) -> Self {
        let category = match (detail.category_id, &detail.category_name, &detail.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef {
                id,
                name: name.clone(),
                slug: slug.clone(),
            }),
            _ => None,
        };
        Self {
            user: UserRef {
                id: detail.user_id,
                name: detail.user_name.clone(),
                email: detail.user_email,
            },
            category,
            id: detail.id,
            title: detail.title,
            slug: detail.slug,
            content: detail.content,
            excerpt: detail.excerpt,
            image_url: detail.image_url,
            category_id: detail.category_id,
            user_id: detail.user_id,
            published_at: detail.published_at,
            created_at: detail.created_at,
            updated_at: detail.updated_at,
            user_name: detail.user_name,
            category_name: detail.category_name,
            category_slug: detail.category_slug,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub message: String,
    pub article: ArticlePayload,
}
