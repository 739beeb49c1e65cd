//! HS256 JWT implementation of `TokenValidator`.
//!
//! Tokens are issued by the platform's login service with a shared secret.
//! The user id is read from `sub`, falling back to `_id` for tokens minted
//! by older clients.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId, UserRole};
use crate::ports::TokenValidator;

/// Claims carried by platform access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,

    #[serde(default)]
    pub email: String,

    pub role: UserRole,

    /// Expiry timestamp (Unix epoch seconds)
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Verifies HS256-signed access tokens.
pub struct JwtTokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);
        if let Some(issuer) = config.jwt_issuer.as_deref() {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "iss"]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenValidator for JwtTokenValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidIssuer => {
                        tracing::warn!("Invalid issuer in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::warn!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            },
        )?;

        let claims = data.claims;
        let raw_id = claims.sub.or(claims.legacy_id).ok_or_else(|| {
            tracing::warn!("Token carries no user id");
            AuthError::InvalidToken
        })?;
        let id = UserId::new(raw_id).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser::new(id, claims.email, claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use secrecy::SecretString;

    const SECRET: &str = "test-secret-that-is-long-enough-123";

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::new(SECRET.to_string()),
            jwt_issuer: issuer.map(str::to_string),
            leeway_secs: 0,
        }
    }

    fn token(claims: &AccessClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp_offset: i64) -> AccessClaims {
        AccessClaims {
            sub: Some("u-42".to_string()),
            legacy_id: None,
            email: "ann@example.com".to_string(),
            role: UserRole::Instructor,
            exp: chrono::Utc::now().timestamp() + exp_offset,
            iss: None,
        }
    }

    #[tokio::test]
    async fn valid_token_yields_user() {
        let validator = JwtTokenValidator::new(&config(None));
        let user = validator.validate(&token(&claims(600), SECRET)).await.unwrap();

        assert_eq!(user.id.as_str(), "u-42");
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.role, UserRole::Instructor);
    }

    #[tokio::test]
    async fn legacy_id_claim_is_accepted() {
        let validator = JwtTokenValidator::new(&config(None));
        let mut c = claims(600);
        c.sub = None;
        c.legacy_id = Some("64f1c0ffee".to_string());

        let user = validator.validate(&token(&c, SECRET)).await.unwrap();
        assert_eq!(user.id.as_str(), "64f1c0ffee");
    }

    #[tokio::test]
    async fn token_without_user_id_is_rejected() {
        let validator = JwtTokenValidator::new(&config(None));
        let mut c = claims(600);
        c.sub = None;

        assert!(matches!(
            validator.validate(&token(&c, SECRET)).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let validator = JwtTokenValidator::new(&config(None));
        assert!(matches!(
            validator.validate(&token(&claims(-600), SECRET)).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let validator = JwtTokenValidator::new(&config(None));
        assert!(matches!(
            validator
                .validate(&token(&claims(600), "some-other-secret-entirely-000"))
                .await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn issuer_is_enforced_when_configured() {
        let validator = JwtTokenValidator::new(&config(Some("https://auth.example.com")));

        assert!(validator.validate(&token(&claims(600), SECRET)).await.is_err());

        let mut c = claims(600);
        c.iss = Some("https://auth.example.com".to_string());
        assert!(validator.validate(&token(&c, SECRET)).await.is_ok());
    }

    #[tokio::test]
    async fn token_without_issuer_is_rejected_when_issuer_configured() {
        let validator = JwtTokenValidator::new(&config(Some("https://auth.example.com")));

        assert!(matches!(
            validator.validate(&token(&claims(600), SECRET)).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn foreign_issuer_is_rejected() {
        let validator = JwtTokenValidator::new(&config(Some("https://auth.example.com")));
        let mut c = claims(600);
        c.iss = Some("https://evil.example.org".to_string());

        assert!(matches!(
            validator.validate(&token(&c, SECRET)).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn issuer_is_optional_when_not_configured() {
        let validator = JwtTokenValidator::new(&config(None));
        let mut c = claims(600);
        c.iss = Some("https://anyone.example.org".to_string());

        assert!(validator.validate(&token(&c, SECRET)).await.is_ok());
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let validator = JwtTokenValidator::new(&config(None));
        assert!(matches!(
            validator.validate("not.a.jwt").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
