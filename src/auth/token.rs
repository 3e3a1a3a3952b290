use axum::http::{header::AUTHORIZATION, HeaderMap};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

pub const TOKEN_LENGTH: usize = 64;

/// Mints a fresh opaque session token. Every login/register call gets a new
/// one; tokens are never rotated or reused.
pub fn mint_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Pulls the bearer token out of the Authorization header. The scheme prefix
/// is matched case-sensitively; an empty remainder counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn minted_tokens_are_fixed_length_alphanumeric() {
        let token = mint_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn minted_tokens_differ() {
        assert_ne!(mint_token(), mint_token());
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc123")), Some("abc123"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(bearer_token(&headers_with("Bearer   abc123  ")), Some("abc123"));
    }

    #[test]
    fn scheme_is_case_sensitive() {
        assert_eq!(bearer_token(&headers_with("bearer abc123")), None);
    }

    #[test]
    fn missing_header_yields_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn empty_token_yields_none() {
        assert_eq!(bearer_token(&headers_with("Bearer   ")), None);
    }

    #[test]
    fn other_schemes_yield_none() {
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwdw==")), None);
    }
}
