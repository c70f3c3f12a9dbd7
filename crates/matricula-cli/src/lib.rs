//! # Matrícula CLI
//!
//! Administrative and seeding utilities for Matrícula development.
//!
//! ## Usage
//!
//! ```ignore
//! use matricula_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(200, 10); // 200 students, 10 course groups
//! seed_all(&pool, config).await?;
//! ```

pub mod admin;
pub mod seeder;
