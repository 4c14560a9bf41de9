use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::auth::cookies::{clear_state_cookie, state_cookie, state_cookie_name};
use crate::auth::handlers::issue_session;
use crate::auth::oauth::client::{exchange_code, fetch_profile};
use crate::auth::oauth::provider::{ExternalProfile, Provider};
use crate::auth::oauth::state::{authorize_redirect_url, generate_state};
use crate::auth::password::{generate_random_password, hash_password};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

#[instrument(skip(app_state, jar))]
pub async fn login_redirect(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let provider = Provider::from_slug(&slug)
        .ok_or_else(|| ApiError::NotFound("unknown provider".into()))?;
    let creds = provider
        .credentials(&app_state.config.oauth)
        .ok_or_else(|| ApiError::NotFound("provider not configured".into()))?;

    let nonce = generate_state();
    let url = authorize_redirect_url(provider, creds, &nonce)?;
    let jar = jar.add(state_cookie(
        &app_state.config.cookie,
        provider.slug(),
        nonce,
    ));

    info!(provider = provider.slug(), "oauth login started");
    Ok((jar, Redirect::to(url.as_str())))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[instrument(skip(app_state, jar, query))]
pub async fn callback(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(provider) = Provider::from_slug(&slug) else {
        return ApiError::NotFound("unknown provider".into()).into_response();
    };

    // Single use: the state cookie is discarded whatever the outcome
    let stored_state = jar
        .get(&state_cookie_name(provider.slug()))
        .map(|c| c.value().to_owned());
    let jar = jar.add(clear_state_cookie(
        &app_state.config.cookie,
        provider.slug(),
    ));

    match run_callback(&app_state, provider, stored_state, query).await {
        Ok(cookie) => {
            let jar = jar.add(cookie);
            (jar, Redirect::to(&app_state.config.frontend_url)).into_response()
        }
        Err(e) => (jar, e).into_response(),
    }
}

/// Steps 3-7 of the authorization-code flow; returns the session cookie.
async fn run_callback(
    state: &AppState,
    provider: Provider,
    stored_state: Option<String>,
    query: CallbackQuery,
) -> Result<Cookie<'static>, ApiError> {
    let creds = provider
        .credentials(&state.config.oauth)
        .ok_or_else(|| ApiError::NotFound("provider not configured".into()))?;

    if let Some(err) = query.error {
        warn!(provider = provider.slug(), error = %err, "provider reported an error");
        return Err(ApiError::BadRequest("authorization was denied".into()));
    }
    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("missing authorization code".into()))?;
    let returned_state = query
        .state
        .ok_or_else(|| ApiError::BadRequest("missing state".into()))?;
    let stored = stored_state.ok_or_else(|| ApiError::BadRequest("missing state cookie".into()))?;
    if stored != returned_state {
        warn!(provider = provider.slug(), "oauth state mismatch");
        return Err(ApiError::BadRequest("state mismatch".into()));
    }

    let access_token = exchange_code(&state.http, provider, creds, &code, &returned_state).await?;
    let profile = fetch_profile(&state.http, provider, &access_token).await?;

    let user = provision_user(state, provider, &profile).await?;
    if !user.is_active {
        return Err(ApiError::Unauthorized("account disabled".into()));
    }

    User::touch_last_login(&state.db, user.id).await?;
    let (_tokens, cookie) = issue_session(state, user.id).await?;
    info!(provider = provider.slug(), user_id = %user.id, "oauth login complete");
    Ok(cookie)
}

/// Look up the local account, creating one on first OAuth login with a
/// random never-used password.
async fn provision_user(
    state: &AppState,
    provider: Provider,
    profile: &ExternalProfile,
) -> Result<User, ApiError> {
    let email = profile.email.trim().to_lowercase();
    if let Some(user) = User::find_by_email(&state.db, &email).await? {
        return Ok(user);
    }

    let hash = hash_password(&generate_random_password())?;
    let name = display_name(profile);
    let user = User::create(&state.db, &email, &hash, &name, None).await?;
    info!(provider = provider.slug(), user_id = %user.id, "provisioned user from oauth profile");
    Ok(user)
}

fn display_name(profile: &ExternalProfile) -> String {
    match &profile.name {
        Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
        _ => profile
            .email
            .split('@')
            .next()
            .unwrap_or("user")
            .to_owned(),
    }
}
