use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::auth::claims::TokenKind;
use crate::auth::cookies::ACCESS_TOKEN_COOKIE;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts and validates the session token, returning the user ID.
/// Accepts a bearer `Authorization` header first, then falls back to
/// the session cookie.
pub struct AuthUser(pub Uuid);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(&parts.headers) {
            Some(token) => token.to_owned(),
            None => CookieJar::from_headers(&parts.headers)
                .get(ACCESS_TOKEN_COOKIE)
                .map(|c| c.value().to_owned())
                .ok_or_else(|| ApiError::Unauthorized("missing credentials".into()))?,
        };

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("invalid or expired token".into())
        })?;

        if claims.kind != TokenKind::Access {
            return Err(ApiError::Unauthorized("access token required".into()));
        }

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_header(name: &str, value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .uri("/auth/me")
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn bearer_token_parses_both_cases() {
        let parts = parts_with_header(AUTHORIZATION.as_str(), "Bearer abc");
        assert_eq!(bearer_token(&parts.headers), Some("abc"));
        let parts = parts_with_header(AUTHORIZATION.as_str(), "bearer xyz");
        assert_eq!(bearer_token(&parts.headers), Some("xyz"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        let parts = parts_with_header(AUTHORIZATION.as_str(), "Basic abc");
        assert_eq!(bearer_token(&parts.headers), None);
    }

    #[tokio::test]
    async fn extracts_user_from_authorization_header() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");

        let mut parts =
            parts_with_header(AUTHORIZATION.as_str(), &format!("Bearer {token}"));
        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(extracted, user_id);
    }

    #[tokio::test]
    async fn extracts_user_from_session_cookie() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");

        let mut parts =
            parts_with_header("cookie", &format!("{ACCESS_TOKEN_COOKIE}={token}"));
        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(extracted, user_id);
    }

    #[tokio::test]
    async fn rejects_request_without_credentials() {
        let state = AppState::fake();
        let (mut parts, ()) = Request::builder()
            .uri("/auth/me")
            .body(())
            .unwrap()
            .into_parts();
        assert!(AuthUser::from_request_parts(&mut parts, &state)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn rejects_refresh_token_as_session() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign_refresh(Uuid::new_v4()).expect("sign refresh");

        let mut parts =
            parts_with_header(AUTHORIZATION.as_str(), &format!("Bearer {token}"));
        assert!(AuthUser::from_request_parts(&mut parts, &state)
            .await
            .is_err());
    }
}
