use serde::Deserialize;

/// Query string for the server-configured auto fetch. Explicit params win
/// over the configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct AutoFetchQuery {
    pub category: Option<String>,
    pub count: Option<i64>,
    pub api_key: Option<String>,
}

/// Body of the caller-driven fetch.
#[derive(Debug, Default, Deserialize)]
pub struct FetchNewsRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_body_fields_are_all_optional() {
        let req: FetchNewsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.category.is_none());
        assert!(req.count.is_none());
        assert!(req.api_key.is_none());
    }

    #[test]
    fn fetch_body_accepts_full_payload() {
        let req: FetchNewsRequest =
            serde_json::from_str(r#"{"category":"science","count":5,"api_key":"k"}"#).unwrap();
        assert_eq!(req.category.as_deref(), Some("science"));
        assert_eq!(req.count, Some(5));
        assert_eq!(req.api_key.as_deref(), Some("k"));
    }
}
