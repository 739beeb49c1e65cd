//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Shortest JWT secret accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Access-token verification settings.
///
/// Tokens are HS256-signed with a secret shared with the platform's login
/// service.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,

    /// Expected `iss` claim; unchecked when absent
    #[serde(default)]
    pub jwt_issuer: Option<String>,

    /// Clock skew tolerated on `exp`, in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_LEN));
        }
        Ok(())
    }
}

fn default_leeway() -> u64 {
    30
}
