use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Claims {
    pub fn new(sub: String, email: String, name: String, permissions: Vec<String>) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(12)).timestamp();

        Self { sub, exp, iat: now.timestamp(), permissions, email, name }
    }
}

pub fn generate_jwt(claims: &Claims) -> Result<String, ApiError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(ApiError::internal_server_error("JWT secret is not configured"));
    }
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| ApiError::internal_server_error(format!("JWT generation error: {}", e)))
}

pub fn decode_jwt(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.jwt_secret;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
    Ok(data.claims)
}

/// The identity attached to a request. An anonymous caller has no
/// permissions and blank identity fields.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub name: String,
    pub email: String,
    pub permissions: Vec<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_claims(claims: Claims) -> Self {
        Self { name: claims.name, email: claims.email, permissions: claims.permissions }
    }

    pub fn is_anonymous(&self) -> bool {
        self.permissions.is_empty() && self.email.is_empty()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn require(&self, permission: &str) -> Result<(), ApiError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!("Missing permission: {}", permission)))
        }
    }

    pub fn require_any(&self, permissions: &[&str]) -> Result<(), ApiError> {
        if permissions.iter().any(|p| self.has_permission(p)) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Requires one of: {}",
                permissions.join(", ")
            )))
        }
    }
}

/// Extractor resolving the request's caller. A missing Authorization
/// header yields an anonymous caller; a present but invalid bearer token
/// is a 401.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            None => return Ok(MaybeCaller(Caller::anonymous())),
            Some(value) => value
                .to_str()
                .map_err(|_| ApiError::unauthorized("Malformed Authorization header"))?,
        };
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;
        let claims = decode_jwt(token)?;
        Ok(MaybeCaller(Caller::from_claims(claims)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(perms: &[&str]) -> Caller {
        Caller {
            name: "Test".into(),
            email: "test@x.com".into(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn anonymous_caller_has_nothing() {
        let c = Caller::anonymous();
        assert!(c.is_anonymous());
        assert!(!c.has_permission("read:kits"));
        assert!(c.require("read:kits").is_err());
    }

    #[test]
    fn require_any_accepts_either_permission() {
        let c = caller(&["read:kits:assigned"]);
        assert!(c.require_any(&["read:kits", "read:kits:assigned"]).is_ok());
        assert!(c.require_any(&["write:kits"]).is_err());
    }

    #[test]
    fn roundtrip_token_preserves_claims() {
        std::env::set_var("JWT_SECRET", "test-secret");
        let claims = Claims::new(
            "auth0|123".into(),
            "vol@x.com".into(),
            "Vol".into(),
            vec!["read:kits".into()],
        );
        let token = generate_jwt(&claims).unwrap();
        let decoded = decode_jwt(&token).unwrap();
        assert_eq!(decoded.email, "vol@x.com");
        assert_eq!(decoded.permissions, vec!["read:kits".to_string()]);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        std::env::set_var("JWT_SECRET", "test-secret");
        assert!(decode_jwt("not-a-token").is_err());
    }
}
