use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::cookies::{clear_session_cookie, session_cookie};
use crate::auth::extractors::AuthUser;
use crate::auth::dto::{
    LoginRequest, LogoutRequest, RefreshRequest, SignupRequest, TokenResponse, UpdateMeRequest,
    UserResponse,
};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{RefreshToken, User};
use crate::error::ApiError;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Mint an access/refresh pair, persist the refresh record and build
/// the session cookie. Shared by login, refresh and the OAuth callback.
pub(crate) async fn issue_session(
    state: &AppState,
    user_id: Uuid,
) -> Result<(TokenResponse, Cookie<'static>), ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user_id)?;
    let refresh_token = keys.sign_refresh(user_id)?;
    let expires_at =
        OffsetDateTime::now_utc() + TimeDuration::seconds(keys.refresh_ttl.as_secs() as i64);
    RefreshToken::insert(&state.db, user_id, &refresh_token, expires_at).await?;
    let cookie = session_cookie(
        &state.config.cookie,
        access_token.clone(),
        TimeDuration::seconds(keys.access_ttl.as_secs() as i64),
    );
    Ok((
        TokenResponse {
            access_token,
            refresh_token,
            token_type: "bearer".into(),
        },
        cookie,
    ))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::BadRequest("password too short".into()));
    }
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".into()));
    }

    // Duplicate email must not insert
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::BadRequest("email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.email,
        &hash,
        &name,
        payload.phone.as_deref(),
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("invalid email".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login for disabled account");
        return Err(ApiError::Unauthorized("account disabled".into()));
    }

    User::touch_last_login(&state.db, user.id).await?;
    let (tokens, cookie) = issue_session(&state, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((jar.add(cookie), Json(tokens)))
}

#[instrument(skip(state, jar, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RefreshRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|_| {
        warn!("invalid refresh token");
        ApiError::Unauthorized("invalid refresh token".into())
    })?;

    // One-time use: consuming is atomic, a spent token never re-issues
    let user_id = RefreshToken::consume(&state.db, &payload.refresh_token)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "refresh token reuse");
            ApiError::Unauthorized("refresh token revoked or already used".into())
        })?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user not found".into()))?;
    if !user.is_active {
        return Err(ApiError::Unauthorized("account disabled".into()));
    }

    let (tokens, cookie) = issue_session(&state, user.id).await?;
    info!(user_id = %user.id, "session refreshed");
    Ok((jar.add(cookie), Json(tokens)))
}

#[instrument(skip(state, jar, payload))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<LogoutRequest>>,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if let Some(Json(body)) = payload {
        if let Some(token) = body.refresh_token {
            if RefreshToken::consume(&state.db, &token).await?.is_some() {
                info!("refresh token revoked on logout");
            }
        }
    }
    // Deletion uses the same attribute set as issuance
    let jar = jar.add(clear_session_cookie(&state.config.cookie));
    Ok((jar, StatusCode::NO_CONTENT))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| {
            warn!(%user_id, "user not found");
            ApiError::Unauthorized("user not found".into())
        })?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn patch_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("name must not be empty".into()));
        }
    }
    let password_hash = match payload.password.as_deref() {
        Some(p) if p.len() < 8 => {
            return Err(ApiError::BadRequest("password too short".into()));
        }
        Some(p) => Some(hash_password(p)?),
        None => None,
    };

    let user = User::update_profile(
        &state.db,
        user_id,
        payload.name.as_deref().map(str::trim),
        payload.phone.as_deref(),
        password_hash.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::Unauthorized("user not found".into()))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, jar))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::NotFound("user not found".into()));
    }
    info!(%user_id, "account deleted");
    let jar = jar.add(clear_session_cookie(&state.config.cookie));
    Ok((jar, StatusCode::NO_CONTENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@missing.local"));
    }
}
