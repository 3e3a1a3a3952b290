use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserPayload},
    extractors::CurrentUser,
    password::{hash_password, verify_password},
    repo::{self, User},
    token::{bearer_token, mint_token},
};
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/user", get(me))
        .route("/logout", post(logout))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_registration(payload: &RegisterRequest) -> Vec<String> {
    let mut errors = Vec::new();

    match payload.name.as_deref().map(str::trim) {
        None | Some("") => errors.push("The name field is required.".to_string()),
        Some(name) if name.chars().count() > 255 => {
            errors.push("The name may not be greater than 255 characters.".to_string())
        }
        Some(_) => {}
    }

    match payload.email.as_deref().map(str::trim) {
        None | Some("") => errors.push("The email field is required.".to_string()),
        Some(email) if email.chars().count() > 255 => {
            errors.push("The email may not be greater than 255 characters.".to_string())
        }
        Some(email) if !is_valid_email(email) => {
            errors.push("The email must be a valid email address.".to_string())
        }
        Some(_) => {}
    }

    match payload.password.as_deref() {
        None | Some("") => errors.push("The password field is required.".to_string()),
        Some(password) if password.chars().count() < 8 => {
            errors.push("The password must be at least 8 characters.".to_string())
        }
        Some(password) => {
            if payload.password_confirmation.as_deref() != Some(password) {
                errors.push("The password confirmation does not match.".to_string());
            }
        }
    }

    errors
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let errors = validate_registration(&payload);
    if !errors.is_empty() {
        warn!(?errors, "registration validation failed");
        return Err(ApiError::validation(errors));
    }

    let name = payload.name.as_deref().unwrap_or_default().trim().to_string();
    let email = payload
        .email
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    let password = payload.password.as_deref().unwrap_or_default();

    if User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        warn!(%email, "email already registered");
        return Err(ApiError::validation(vec![
            "The email has already been taken.".to_string(),
        ]));
    }

    let hash = hash_password(password).map_err(ApiError::Internal)?;
    let user = User::create(&state.db, &name, &email, &hash)
        .await
        .map_err(ApiError::Internal)?;

    let token = mint_token();
    repo::create_token(&state.db, user.id, &token)
        .await
        .map_err(ApiError::Internal)?;

    info!(user_id = user.id, %email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserPayload::from(user),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.as_deref().map(str::trim).unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push("The email field is required.".to_string());
        }
        if password.is_empty() {
            errors.push("The password field is required.".to_string());
        }
        return Err(ApiError::Validation {
            message: "Email and password are required".to_string(),
            errors,
        });
    }

    let email = email.to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::Internal)?;

    let user = match user {
        Some(user) if verify_password(password, &user.password_hash).unwrap_or(false) => user,
        _ => {
            warn!(%email, "login with invalid credentials");
            return Err(ApiError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }
    };

    let token = mint_token();
    repo::create_token(&state.db, user.id, &token)
        .await
        .map_err(ApiError::Internal)?;

    info!(user_id = user.id, %email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserPayload::from(user),
        token,
    }))
}

#[instrument(skip_all)]
async fn me(CurrentUser(user): CurrentUser) -> Result<Json<UserPayload>, ApiError> {
    Ok(Json(UserPayload::from(user)))
}

#[instrument(skip_all)]
async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        repo::delete_token(&state.db, token)
            .await
            .map_err(ApiError::Internal)?;
    }
    info!(user_id = user.id, "user logged out");
    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a @x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email(""));
    }

    fn request(json: &str) -> RegisterRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn registration_requires_all_fields() {
        let errors = validate_registration(&request("{}"));
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("name")));
        assert!(errors.iter().any(|e| e.contains("email")));
        assert!(errors.iter().any(|e| e.contains("password")));
    }

    #[test]
    fn registration_requires_matching_confirmation() {
        let errors = validate_registration(&request(
            r#"{"name":"A","email":"a@x.com","password":"longenough","password_confirmation":"different"}"#,
        ));
        assert_eq!(errors, vec!["The password confirmation does not match."]);
    }

    #[test]
    fn registration_rejects_short_passwords() {
        let errors = validate_registration(&request(
            r#"{"name":"A","email":"a@x.com","password":"short","password_confirmation":"short"}"#,
        ));
        assert_eq!(errors, vec!["The password must be at least 8 characters."]);
    }

    #[test]
    fn registration_accepts_valid_payload() {
        let errors = validate_registration(&request(
            r#"{"name":"A","email":"a@x.com","password":"longenough","password_confirmation":"longenough"}"#,
        ));
        assert!(errors.is_empty());
    }
}
