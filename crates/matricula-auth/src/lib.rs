//! # Matrícula Auth
//!
//! Authentication types and JWT utilities for the Matrícula API.
//!
//! - [`claims`]: the claims embedded in every access token
//! - [`jwt`]: token creation and verification (HS256)
//!
//! Tokens carry the user id and role and stay valid for
//! [`JwtConfig::expiry`](matricula_config::JwtConfig) seconds (one day by
//! default). There is no revocation: changing a password does not
//! invalidate tokens already issued.
//!
//! # Example
//!
//! ```ignore
//! use matricula_auth::{create_access_token, verify_token};
//! use matricula_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "admin", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, "admin");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
