//! Login and password-change payloads.

use matricula_core::{AppError, FieldError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::users::User;
use crate::validation::{REQUIRED_FIELD_MESSAGE, present};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "admin@example.com")]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// The credential pair. Only the first missing field is reported.
    pub fn into_credentials(self) -> Result<(String, String), AppError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            (email, _) => {
                let field = if present(email.as_deref()).is_none() {
                    "email"
                } else {
                    "password"
                };
                Err(AppError::validation(vec![FieldError::new(
                    field,
                    REQUIRED_FIELD_MESSAGE,
                )]))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChangePasswordDto {
    #[serde(default, rename = "currentPassword", alias = "current_password")]
    pub current_password: Option<String>,
    /// Subject to the password policy
    #[serde(default, rename = "newPassword", alias = "new_password")]
    pub new_password: Option<String>,
}

impl ChangePasswordDto {
    /// `(current, new)`. Only the first missing field is reported.
    pub fn into_parts(self) -> Result<(String, String), AppError> {
        let current = self.current_password.filter(|p| !p.is_empty());
        let new = self.new_password.filter(|p| !p.is_empty());

        match (current, new) {
            (Some(current), Some(new)) => Ok((current, new)),
            (None, _) => Err(AppError::field("currentPassword", REQUIRED_FIELD_MESSAGE)),
            (Some(_), None) => Err(AppError::field("newPassword", REQUIRED_FIELD_MESSAGE)),
        }
    }
}
