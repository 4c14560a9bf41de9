use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use reqwest::Url;

use crate::auth::oauth::provider::Provider;
use crate::config::ProviderCredentials;

/// Per-attempt CSRF nonce bound to the callback through a cookie.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

pub fn authorize_redirect_url(
    provider: Provider,
    creds: &ProviderCredentials,
    state: &str,
) -> anyhow::Result<Url> {
    let mut url = Url::parse(provider.authorize_endpoint())?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("response_type", "code")
            .append_pair("client_id", &creds.client_id)
            .append_pair("redirect_uri", &creds.redirect_uri)
            .append_pair("state", state);
        if let Some(scopes) = provider.scopes() {
            pairs.append_pair("scope", scopes);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn creds() -> ProviderCredentials {
        ProviderCredentials {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:8080/auth/google/callback".into(),
        }
    }

    #[test]
    fn state_values_are_long_and_unique() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        // 32 bytes, unpadded url-safe base64
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn authorize_url_carries_required_params() {
        let state = generate_state();
        let url = authorize_redirect_url(Provider::Google, &creds(), &state).expect("url");
        assert!(url
            .as_str()
            .starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(params.get("client_id").map(String::as_str), Some("client-123"));
        assert_eq!(
            params.get("redirect_uri").map(String::as_str),
            Some("http://localhost:8080/auth/google/callback")
        );
        assert_eq!(params.get("state").map(String::as_str), Some(state.as_str()));
        assert_eq!(
            params.get("scope").map(String::as_str),
            Some("openid email profile")
        );
    }

    #[test]
    fn naver_authorize_url_has_no_scope() {
        let url =
            authorize_redirect_url(Provider::Naver, &creds(), "nonce").expect("url");
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert!(params.get("scope").is_none());
        assert_eq!(params.get("state").map(String::as_str), Some("nonce"));
    }
}
