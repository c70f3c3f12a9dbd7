//! User account models, DTOs and validation.

use chrono::{DateTime, Utc};
use matricula_core::serde::deserialize_present;
use matricula_core::{FieldError, PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::ids::UserId;
use crate::validation::{
    char_len_between, is_missing, is_valid_email, present, validate_password,
};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "student" => Ok(Self::Student),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin-only account creation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateUserDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, rename = "confirmPassword", alias = "confirm_password")]
    pub confirm_password: Option<String>,
    /// `admin` or `student`, defaults to `student`
    #[serde(default)]
    pub role: Option<String>,
}

/// Admin update of any account.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Requires a matching `confirmPassword`
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, rename = "confirmPassword", alias = "confirm_password")]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Self-service profile update. Unknown keys, `role` included, are ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProfileDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Rejected, passwords change through `PUT /api/users/password`
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
}

impl UpdateProfileDto {
    /// A password key with any non-empty value is rejected.
    pub fn password_error(&self) -> Option<FieldError> {
        let sent = match &self.password {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        };

        sent.then(|| {
            FieldError::new("password", "Use a rota específica para alteração de senha")
        })
    }
}

/// Borrowed view over the validated fields of a user payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFields<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub confirm_password: Option<&'a str>,
    pub role: Option<&'a str>,
}

impl CreateUserDto {
    pub fn fields(&self) -> UserFields<'_> {
        UserFields {
            name: self.name.as_deref(),
            email: self.email.as_deref(),
            password: self.password.as_deref(),
            confirm_password: self.confirm_password.as_deref(),
            role: self.role.as_deref(),
        }
    }
}

impl UpdateUserDto {
    pub fn fields(&self) -> UserFields<'_> {
        UserFields {
            name: self.name.as_deref(),
            email: self.email.as_deref(),
            password: self.password.as_deref(),
            confirm_password: self.confirm_password.as_deref(),
            role: self.role.as_deref(),
        }
    }
}

impl UpdateProfileDto {
    pub fn fields(&self) -> UserFields<'_> {
        UserFields {
            name: self.name.as_deref(),
            email: self.email.as_deref(),
            ..Default::default()
        }
    }
}

/// Shape, format and password policy checks for a user payload.
pub fn validate_user(data: &UserFields<'_>, is_update: bool) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let password = present(data.password);
    let confirm = present(data.confirm_password);

    if is_missing(data.name, is_update) {
        errors.push(FieldError::new("name", "Nome é obrigatório"));
    }
    if is_missing(data.email, is_update) {
        errors.push(FieldError::new("email", "Email é obrigatório"));
    }
    if !is_update && password.is_none() {
        errors.push(FieldError::new("password", "Senha é obrigatória"));
    }

    if let Some(password) = password {
        errors.extend(validate_password(password));
    }

    // On update the confirmation only matters once a password is sent.
    if !is_update || password.is_some() {
        match (password, confirm) {
            (Some(password), Some(confirm)) if password != confirm => {
                errors.push(FieldError::new("confirmPassword", "As senhas não coincidem"));
            }
            (_, None) => {
                errors.push(FieldError::new(
                    "confirmPassword",
                    "Confirmação de senha é obrigatória",
                ));
            }
            _ => {}
        }
    }

    if let Some(email) = present(data.email) {
        if !is_valid_email(email) {
            errors.push(FieldError::new("email", "Email inválido"));
        }
    }
    if let Some(name) = present(data.name) {
        if !char_len_between(name, 3, 255) {
            errors.push(FieldError::new("name", "Nome deve ter entre 3 e 255 caracteres"));
        }
    }
    if let Some(role) = present(data.role) {
        if role.parse::<UserRole>().is_err() {
            errors.push(FieldError::new(
                "role",
                r#"Papel inválido. Deve ser "admin" ou "student""#,
            ));
        }
    }

    errors
}

/// Values written on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Allow-listed columns a user update may touch.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilterParams {
    /// Case-insensitive substring
    pub name: Option<String>,
    /// Exact match
    pub email: Option<String>,
    pub role: Option<UserRole>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub users: Vec<User>,
    #[serde(flatten)]
    pub meta: PaginationMeta,
}
