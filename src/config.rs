use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Cookie attributes shared by every set/delete call. Issuance and
/// revocation must use the same name/path/domain/SameSite or browsers
/// will refuse to drop the cookie.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    pub domain: Option<String>,
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// A provider is enabled only when all three of its env vars are set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthConfig {
    pub google: Option<ProviderCredentials>,
    pub naver: Option<ProviderCredentials>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub oauth: OAuthConfig,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "daybook".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "daybook-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
        };
        let cookie = CookieConfig {
            domain: std::env::var("COOKIE_DOMAIN").ok().filter(|v| !v.is_empty()),
            secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        let oauth = OAuthConfig {
            google: provider_from_env("GOOGLE"),
            naver: provider_from_env("NAVER"),
        };
        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        Ok(Self {
            database_url,
            jwt,
            cookie,
            oauth,
            frontend_url,
        })
    }
}

fn provider_from_env(prefix: &str) -> Option<ProviderCredentials> {
    let client_id = std::env::var(format!("{prefix}_CLIENT_ID")).ok()?;
    let client_secret = std::env::var(format!("{prefix}_CLIENT_SECRET")).ok()?;
    let redirect_uri = std::env::var(format!("{prefix}_REDIRECT_URI")).ok()?;
    Some(ProviderCredentials {
        client_id,
        client_secret,
        redirect_uri,
    })
}
