use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::config::CookieConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Minutes an OAuth login attempt may take before its state expires.
const STATE_COOKIE_TTL: Duration = Duration::minutes(10);

/// Every cookie goes through here so issuance and revocation always
/// carry identical attributes. Deletion fails in browsers when
/// name/path/domain/SameSite drift between set and delete.
fn base_cookie(cfg: &CookieConfig, name: String, value: String) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(cfg.secure);
    if let Some(domain) = &cfg.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

pub fn session_cookie(cfg: &CookieConfig, token: String, max_age: Duration) -> Cookie<'static> {
    let mut cookie = base_cookie(cfg, ACCESS_TOKEN_COOKIE.into(), token);
    cookie.set_max_age(max_age);
    cookie
}

pub fn clear_session_cookie(cfg: &CookieConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(cfg, ACCESS_TOKEN_COOKIE.into(), String::new());
    cookie.set_max_age(Duration::ZERO);
    cookie
}

pub fn state_cookie_name(provider: &str) -> String {
    format!("oauth_state_{provider}")
}

pub fn state_cookie(cfg: &CookieConfig, provider: &str, value: String) -> Cookie<'static> {
    let mut cookie = base_cookie(cfg, state_cookie_name(provider), value);
    cookie.set_max_age(STATE_COOKIE_TTL);
    cookie
}

pub fn clear_state_cookie(cfg: &CookieConfig, provider: &str) -> Cookie<'static> {
    let mut cookie = base_cookie(cfg, state_cookie_name(provider), String::new());
    cookie.set_max_age(Duration::ZERO);
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_with_domain() -> CookieConfig {
        CookieConfig {
            domain: Some("example.com".into()),
            secure: true,
        }
    }

    #[test]
    fn session_cookie_attributes() {
        let cfg = cfg_with_domain();
        let cookie = session_cookie(&cfg, "token".into(), Duration::minutes(30));
        assert_eq!(cookie.name(), ACCESS_TOKEN_COOKIE);
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::minutes(30)));
    }

    #[test]
    fn set_and_clear_carry_identical_attributes() {
        let cfg = cfg_with_domain();
        let set = session_cookie(&cfg, "token".into(), Duration::minutes(30));
        let clear = clear_session_cookie(&cfg);
        assert_eq!(set.name(), clear.name());
        assert_eq!(set.path(), clear.path());
        assert_eq!(set.domain(), clear.domain());
        assert_eq!(set.same_site(), clear.same_site());
        assert_eq!(set.http_only(), clear.http_only());
        assert_eq!(set.secure(), clear.secure());
        assert_eq!(clear.value(), "");
        assert_eq!(clear.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn state_cookie_is_per_provider_and_short_lived() {
        let cfg = CookieConfig {
            domain: None,
            secure: false,
        };
        let set = state_cookie(&cfg, "google", "nonce".into());
        let clear = clear_state_cookie(&cfg, "google");
        assert_eq!(set.name(), "oauth_state_google");
        assert_eq!(set.name(), clear.name());
        assert_eq!(set.path(), clear.path());
        assert_eq!(set.same_site(), clear.same_site());
        assert_eq!(set.max_age(), Some(Duration::minutes(10)));
        assert_eq!(clear.max_age(), Some(Duration::ZERO));
    }
}
