use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::auth::password::hash_password;
use crate::config::AdminConfig;

/// User record in the database. The hash never leaves the repo layer.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Resolves the configured admin account, creating it on first use.
    pub async fn find_or_create_admin(db: &PgPool, admin: &AdminConfig) -> anyhow::Result<User> {
        if let Some(user) = Self::find_by_email(db, &admin.email).await? {
            return Ok(user);
        }
        let hash = hash_password(&admin.password)?;
        Self::create(db, &admin.name, &admin.email, &hash).await
    }
}

/// Inserts a new session row for the user.
pub async fn create_token(db: &PgPool, user_id: i64, token: &str) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO tokens (user_id, token) VALUES ($1, $2)")
        .bind(user_id)
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

/// Resolves a presented token string to its user. A TTL, when configured,
/// filters out sessions older than that many minutes.
pub async fn find_user_by_token(
    db: &PgPool,
    token: &str,
    ttl_minutes: Option<i64>,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name, u.email, u.password_hash, u.created_at
        FROM tokens t
        JOIN users u ON u.id = t.user_id
        WHERE t.token = $1
          AND ($2::bigint IS NULL OR t.created_at > now() - ($2 * interval '1 minute'))
        "#,
    )
    .bind(token)
    .bind(ttl_minutes)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Deletes the session row for the presented token. Idempotent.
pub async fn delete_token(db: &PgPool, token: &str) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM tokens WHERE token = $1")
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}
