//! Authentication adapters.
//!
//! Implementations of the `TokenValidator` port:
//!
//! - `jwt` - HS256 tokens signed with the platform's shared secret
//! - `mock` - Test implementation that doesn't require real tokens

mod jwt;
mod mock;

pub use jwt::{AccessClaims, JwtTokenValidator};
pub use mock::MockTokenValidator;
