use serde_json::Value;

use crate::config::{OAuthConfig, ProviderCredentials};

/// External identity providers the service can federate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Naver,
}

impl Provider {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "google" => Some(Self::Google),
            "naver" => Some(Self::Naver),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Naver => "naver",
        }
    }

    pub fn authorize_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Self::Naver => "https://nid.naver.com/oauth2.0/authorize",
        }
    }

    pub fn token_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://oauth2.googleapis.com/token",
            Self::Naver => "https://nid.naver.com/oauth2.0/token",
        }
    }

    pub fn userinfo_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            Self::Naver => "https://openapi.naver.com/v1/nid/me",
        }
    }

    /// Naver scopes are fixed at app registration time, not requested.
    pub fn scopes(self) -> Option<&'static str> {
        match self {
            Self::Google => Some("openid email profile"),
            Self::Naver => None,
        }
    }

    /// Naver expects the state echoed in the token request.
    pub fn echoes_state_on_exchange(self) -> bool {
        matches!(self, Self::Naver)
    }

    pub fn credentials(self, config: &OAuthConfig) -> Option<&ProviderCredentials> {
        match self {
            Self::Google => config.google.as_ref(),
            Self::Naver => config.naver.as_ref(),
        }
    }
}

/// Minimal profile extracted from a provider userinfo response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub email: String,
    pub name: Option<String>,
}

/// `None` when the payload carries no email, which is fatal for provisioning.
pub fn extract_profile(provider: Provider, payload: &Value) -> Option<ExternalProfile> {
    match provider {
        Provider::Google => {
            let email = payload["email"].as_str()?;
            let name = payload["name"].as_str().map(ToOwned::to_owned);
            Some(ExternalProfile {
                email: email.to_owned(),
                name,
            })
        }
        Provider::Naver => {
            let response = &payload["response"];
            let email = response["email"].as_str()?;
            let name = response["name"]
                .as_str()
                .or_else(|| response["nickname"].as_str())
                .map(ToOwned::to_owned);
            Some(ExternalProfile {
                email: email.to_owned(),
                name,
            })
        }
    }
}
