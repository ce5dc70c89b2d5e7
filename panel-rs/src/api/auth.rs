//! Bearer token verification
//!
//! Tokens are issued by the panel's login service; this API only checks the
//! HS256 signature and turns the claims into a [`Principal`].

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::accounts::{Principal, Role};

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub role: Role,
    /// Login name
    pub name: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    pub fn principal(&self) -> Option<Principal> {
        let user_id = self.sub.parse().ok()?;
        Some(Principal::new(user_id, self.name.clone(), self.role))
    }
}

/// JWT configuration
pub struct JwtConfig {
    /// Secret key for signing tokens
    secret: String,
    /// Token expiration duration
    expiration: Duration,
}

impl JwtConfig {
    pub fn new(secret: String, expiration_hours: u64) -> Self {
        Self {
            secret,
            expiration: Duration::from_secs(expiration_hours * 3600),
        }
    }

    /// Create a token for a principal
    pub fn create_token(&self, principal: &Principal) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp().max(0) as u64;

        let claims = Claims {
            sub: principal.user_id.to_string(),
            role: principal.role,
            name: principal.username.clone(),
            exp: now + self.expiration.as_secs(),
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate_token() {
        let config = JwtConfig::new("test-secret".to_string(), 1);
        let principal = Principal::new(7, "reseller1", Role::Reseller);

        let token = config.create_token(&principal).unwrap();
        assert!(!token.is_empty());

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.principal(), Some(principal));
    }

    #[test]
    fn test_invalid_token() {
        let config = JwtConfig::new("test-secret".to_string(), 1);
        assert!(config.validate_token("invalid-token").is_err());

        let other = JwtConfig::new("other-secret".to_string(), 1);
        let token = other
            .create_token(&Principal::new(1, "admin", Role::Admin))
            .unwrap();
        assert!(config.validate_token(&token).is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "admin@example.org".to_string(),
            role: Role::Admin,
            name: "admin".to_string(),
            exp: 0,
            iat: 0,
        };
        assert!(claims.principal().is_none());
    }
}
