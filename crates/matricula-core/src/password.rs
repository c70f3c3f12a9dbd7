//! Password hashing with bcrypt.

use anyhow::Context;
use bcrypt::{hash, verify};

use crate::errors::AppError;

/// Work factor used for every stored hash.
pub const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .context("Failed to hash password")
        .map_err(AppError::internal)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .context("Failed to verify password")
        .map_err(AppError::internal)
}
