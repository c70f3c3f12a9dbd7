//! # Matrícula Config
//!
//! Configuration types for the Matrícula API.
//!
//! Every structure is loaded from environment variables (a `.env` file is
//! read by the binaries through `dotenvy` before any of these run):
//!
//! - [`jwt`]: token signing secret and lifetime
//! - [`cors`]: allowed origins
//! - [`server`]: bind address and deployment environment
//!
//! # Example
//!
//! ```ignore
//! use matricula_config::{CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
