use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub auto_fetch_enabled: bool,
    pub auto_fetch_category: String,
    pub auto_fetch_count: i64,
}

/// Well-known account that owns articles imported without an
/// authenticated caller. Created lazily on first use.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Sessions older than this are rejected. Unset means tokens never expire.
    pub token_ttl_minutes: Option<i64>,
    pub news: NewsConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let token_ttl_minutes = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok());
        let news = NewsConfig {
            api_key: std::env::var("NEWS_API_KEY").ok().filter(|v| !v.is_empty()),
            auto_fetch_enabled: std::env::var("AUTO_FETCH_ENABLED")
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "off"))
                .unwrap_or(true),
            auto_fetch_category: std::env::var("AUTO_FETCH_CATEGORY")
                .unwrap_or_else(|_| "technology".into()),
            auto_fetch_count: std::env::var("AUTO_FETCH_COUNT")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(10),
        };
        let admin = AdminConfig {
            email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@newsdashboard.com".into()),
            name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin User".into()),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "password123".into()),
        };
        Ok(Self {
            database_url,
            token_ttl_minutes,
            news,
            admin,
        })
    }
}
