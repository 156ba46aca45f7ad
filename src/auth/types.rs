// Authentication types

use serde::{Deserialize, Serialize};

/// Storage key for the access token
pub const ACCESS_KEY: &str = "access";

/// Storage key for the refresh token
pub const REFRESH_KEY: &str = "refresh";

/// Access and refresh tokens, always written and cleared together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Body of `POST /auth/jwt/create/`
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/jwt/create/`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
}

impl From<LoginResponse> for CredentialPair {
    fn from(resp: LoginResponse) -> Self {
        Self {
            access_token: resp.access,
            refresh_token: resp.refresh,
        }
    }
}

/// Body of `POST /auth/jwt/refresh/` and `POST /auth/jwt/blacklist/`
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response of `POST /auth/jwt/refresh/`
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Body of `POST /auth/users/`
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}
