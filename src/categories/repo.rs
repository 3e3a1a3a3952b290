use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

/// Category plus how many of its articles are published.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub article_count: i64,
}

pub async fn list_with_counts(db: &PgPool) -> anyhow::Result<Vec<CategoryWithCount>> {
    let rows = sqlx::query_as::<_, CategoryWithCount>(
        r#"
        SELECT c.id, c.name, c.slug, c.description, c.created_at,
               COUNT(a.id) FILTER (WHERE a.published_at IS NOT NULL) AS article_count
        FROM categories c
        LEFT JOIN articles a ON a.category_id = c.id
        GROUP BY c.id
        ORDER BY c.name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, slug, description, created_at
        FROM categories
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_by_slug(db: &PgPool, slug: &str) -> anyhow::Result<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, slug, description, created_at
        FROM categories
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
