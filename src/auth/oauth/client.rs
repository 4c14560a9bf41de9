use serde_json::Value;
use tracing::{error, instrument};

use crate::auth::oauth::provider::{extract_profile, ExternalProfile, Provider};
use crate::config::ProviderCredentials;
use crate::error::ApiError;

fn network_error(e: reqwest::Error) -> ApiError {
    error!(error = %e, "oauth provider request failed");
    ApiError::Internal(e.into())
}

/// Exchange the authorization code for a provider access token.
/// Upstream bodies are logged, never forwarded to the client.
#[instrument(skip(http, creds, code, state))]
pub async fn exchange_code(
    http: &reqwest::Client,
    provider: Provider,
    creds: &ProviderCredentials,
    code: &str,
    state: &str,
) -> Result<String, ApiError> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("redirect_uri", creds.redirect_uri.as_str()),
    ];
    if provider.echoes_state_on_exchange() {
        form.push(("state", state));
    }

    let response = http
        .post(provider.token_endpoint())
        .form(&form)
        .send()
        .await
        .map_err(network_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(provider = provider.slug(), %status, body = %body, "token exchange failed");
        return Err(ApiError::upstream_status(status));
    }

    let payload: Value = response.json().await.map_err(network_error)?;
    payload["access_token"]
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            error!(provider = provider.slug(), "token response without access_token");
            ApiError::Upstream("provider returned an unusable token response".into())
        })
}

/// Fetch the userinfo document and reduce it to an email + name.
#[instrument(skip(http, access_token))]
pub async fn fetch_profile(
    http: &reqwest::Client,
    provider: Provider,
    access_token: &str,
) -> Result<ExternalProfile, ApiError> {
    let response = http
        .get(provider.userinfo_endpoint())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(network_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(provider = provider.slug(), %status, body = %body, "profile fetch failed");
        return Err(ApiError::upstream_status(status));
    }

    let payload: Value = response.json().await.map_err(network_error)?;
    extract_profile(provider, &payload)
        .ok_or_else(|| ApiError::BadRequest("provider profile has no email".into()))
}
