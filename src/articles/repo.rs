use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::warn;

use crate::articles::slug::unique_slug;
use crate::error::ApiError;

/// How many times a create retries after losing a slug race to a concurrent
/// insert. The unique constraint on `articles.slug` is the backstop.
const SLUG_INSERT_RETRIES: u32 = 3;

#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Article joined with its author and category names for API payloads.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleDetail {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub user_name: String,
    pub user_email: String,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

pub struct NewArticle<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub excerpt: &'a str,
    pub image_url: Option<&'a str>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    pub published_at: Option<OffsetDateTime>,
}

/// Fields supplied by a partial update; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub published_at: Option<OffsetDateTime>,
}

impl ArticleChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.image_url.is_none()
            && self.category_id.is_none()
            && self.published_at.is_none()
    }
}

const DETAIL_COLUMNS: &str = r#"
    a.id, a.title, a.slug, a.content, a.excerpt, a.image_url,
    a.category_id, a.user_id, a.published_at, a.created_at, a.updated_at,
    u.name AS user_name, u.email AS user_email,
    c.name AS category_name, c.slug AS category_slug
"#;

/// Published articles matching the filter, newest first, insertion order on
/// ties. A `NULL` limit returns the full filtered set (the client paginates
/// itself in that mode).
pub async fn list_published(
    db: &PgPool,
    search: Option<&str>,
    category_slug: Option<&str>,
    limit: Option<i64>,
    offset: i64,
) -> anyhow::Result<Vec<ArticleDetail>> {
    let sql = format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM articles a
        JOIN users u ON u.id = a.user_id
        LEFT JOIN categories c ON c.id = a.category_id
        WHERE a.published_at IS NOT NULL
          AND ($1::text IS NULL
               OR a.title ILIKE '%' || $1 || '%'
               OR a.content ILIKE '%' || $1 || '%'
               OR a.excerpt ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR c.slug = $2)
        ORDER BY a.published_at DESC, a.id ASC
        LIMIT $3 OFFSET $4
        "#
    );
    let rows = sqlx::query_as::<_, ArticleDetail>(&sql)
        .bind(search)
        .bind(category_slug)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Published articles of one category, same ordering as the public listing.
pub async fn list_by_category(db: &PgPool, category_id: i64) -> anyhow::Result<Vec<ArticleDetail>> {
    let sql = format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM articles a
        JOIN users u ON u.id = a.user_id
        LEFT JOIN categories c ON c.id = a.category_id
        WHERE a.category_id = $1 AND a.published_at IS NOT NULL
        ORDER BY a.published_at DESC, a.id ASC
        "#
    );
    let rows = sqlx::query_as::<_, ArticleDetail>(&sql)
        .bind(category_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_detail(db: &PgPool, id: i64) -> anyhow::Result<Option<ArticleDetail>> {
    let sql = format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM articles a
        JOIN users u ON u.id = a.user_id
        LEFT JOIN categories c ON c.id = a.category_id
        WHERE a.id = $1
        "#
    );
    let row = sqlx::query_as::<_, ArticleDetail>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<Article>> {
    let row = sqlx::query_as::<_, Article>(
        r#"
        SELECT id, title, slug, content, excerpt, image_url, category_id,
               user_id, published_at, created_at, updated_at
        FROM articles
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn slug_exists(
    db: &PgPool,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM articles
            WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(slug)
    .bind(exclude_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn title_exists(db: &PgPool, title: &str) -> anyhow::Result<bool> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM articles WHERE title = $1)")
            .bind(title)
            .fetch_one(db)
            .await?;
    Ok(exists)
}

async fn insert(db: &PgPool, new: &NewArticle<'_>, slug: &str) -> Result<Article, sqlx::Error> {
    sqlx::query_as::<_, Article>(
        r#"
        INSERT INTO articles
            (title, slug, content, excerpt, image_url, category_id, user_id, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, now()))
        RETURNING id, title, slug, content, excerpt, image_url, category_id,
                  user_id, published_at, created_at, updated_at
        "#,
    )
    .bind(new.title)
    .bind(slug)
    .bind(new.content)
    .bind(new.excerpt)
    .bind(new.image_url)
    .bind(new.category_id)
    .bind(new.user_id)
    .bind(new.published_at)
    .fetch_one(db)
    .await
}

fn is_slug_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505")
                && db.constraint().map_or(false, |c| c.contains("slug"))
        }
        _ => false,
    }
}

/// Computes a unique slug and inserts. Two concurrent creates with the same
/// title can both observe the same free candidate; the loser of that race
/// hits the unique constraint and recomputes, a bounded number of times.
pub async fn create_article(db: &PgPool, new: &NewArticle<'_>) -> Result<Article, ApiError> {
    for attempt in 0..SLUG_INSERT_RETRIES {
        let slug = unique_slug(db, new.title, None).await?;
        match insert(db, new, &slug).await {
            Ok(article) => return Ok(article),
            Err(e) if is_slug_conflict(&e) => {
                warn!(%slug, attempt, "slug taken by concurrent insert, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(ApiError::Internal(anyhow::anyhow!(
        "could not allocate a unique slug after {SLUG_INSERT_RETRIES} attempts"
    )))
}

/// Applies only the supplied fields; everything else keeps its value.
pub async fn update_article(
    db: &PgPool,
    id: i64,
    changes: &ArticleChanges,
    new_slug: Option<&str>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE articles SET
            title = COALESCE($2, title),
            slug = COALESCE($3, slug),
            content = COALESCE($4, content),
            excerpt = COALESCE($5, excerpt),
            image_url = COALESCE($6, image_url),
            category_id = COALESCE($7, category_id),
            published_at = COALESCE($8, published_at),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.title.as_deref())
    .bind(new_slug)
    .bind(changes.content.as_deref())
    .bind(changes.excerpt.as_deref())
    .bind(changes.image_url.as_deref())
    .bind(changes.category_id)
    .bind(changes.published_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_article(db: &PgPool, id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_changes_are_detected() {
        assert!(ArticleChanges::default().is_empty());
        let changes = ArticleChanges {
            title: Some("New title".into()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
