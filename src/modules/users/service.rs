use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, instrument, warn};

use crate::modules::users::model::{
    CreateUserDto, NewUser, PaginatedUsersResponse, UpdateProfileDto, UpdateUserDto, User,
    UserChanges, UserFilterParams, UserId, UserRole, validate_user,
};
use crate::modules::users::repository::UserRepository;
use matricula_core::{AppError, PaginationMeta, hash_password};

#[cfg(feature = "observability")]
use matricula_observability::metrics;

const EMAIL_IN_USE_MESSAGE: &str = "Este email já está em uso";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    #[instrument(skip(self), fields(db.table = "users"))]
    pub async fn get_users(
        &self,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let (users, total) = self.users.find_all(&filters).await?;

        Ok(PaginatedUsersResponse {
            users,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    pub async fn find_user(&self, id: UserId) -> Result<Option<User>, AppError> {
        self.users.find_by_id(id).await
    }

    #[instrument(skip(self), fields(user.id = %id))]
    pub async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        self.find_user(id)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Usuário"))
    }

    /// Fails when another account already uses `email`.
    async fn ensure_email_available(&self, email: &str, owner: Option<UserId>) -> Result<(), AppError> {
        match self.users.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(AppError::field("email", EMAIL_IN_USE_MESSAGE))
            }
            _ => Ok(()),
        }
    }

    #[instrument(skip(self, dto), fields(db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(&self, dto: CreateUserDto, requester: UserRole) -> Result<User, AppError> {
        if dto.role.as_deref() == Some("admin") && !requester.is_admin() {
            return Err(AppError::forbidden(
                "Apenas administradores podem criar outros administradores",
            ));
        }

        let errors = validate_user(&dto.fields(), false);
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        let email = dto.email.unwrap_or_default();
        self.ensure_email_available(&email, None).await?;

        let role = dto
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or_default();
        let user = self
            .users
            .create(NewUser {
                name: dto.name.unwrap_or_default(),
                email,
                password_hash: hash_password(dto.password.as_deref().unwrap_or_default())?,
                role,
            })
            .await?;

        #[cfg(feature = "observability")]
        metrics::track_user_created(user.role.as_str());

        info!(user.id = %user.id, user.role = %user.role, "User created successfully");
        Ok(user)
    }

    /// Self-service update of name and email.
    #[instrument(skip(self, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_profile(&self, id: UserId, dto: UpdateProfileDto) -> Result<User, AppError> {
        if let Some(error) = dto.password_error() {
            return Err(AppError::validation(vec![error]));
        }

        let errors = validate_user(&dto.fields(), true);
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        if let Some(email) = dto.email.as_deref() {
            self.ensure_email_available(email, Some(id)).await?;
        }

        self.apply_changes(
            id,
            UserChanges {
                name: dto.name,
                email: dto.email,
                ..Default::default()
            },
        )
        .await
    }

    /// Admin update of any account, password and role included.
    #[instrument(skip(self, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_user(&self, id: UserId, dto: UpdateUserDto) -> Result<User, AppError> {
        let errors = validate_user(&dto.fields(), true);
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        if let Some(email) = dto.email.as_deref() {
            self.ensure_email_available(email, Some(id)).await?;
        }

        let password_hash = match dto.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        self.apply_changes(
            id,
            UserChanges {
                name: dto.name,
                email: dto.email,
                password_hash,
                role: dto.role.as_deref().and_then(|r| r.parse().ok()),
            },
        )
        .await
    }

    async fn apply_changes(&self, id: UserId, changes: UserChanges) -> Result<User, AppError> {
        if changes.is_empty() {
            return self.get_user(id).await;
        }

        let user = self
            .users
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Usuário"))?;

        info!(user.id = %user.id, "User updated successfully");
        Ok(user)
    }

    #[instrument(skip(self), fields(user.id = %id, db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(&self, id: UserId, requester: UserId) -> Result<(), AppError> {
        if id == requester {
            warn!(user.id = %id, "User attempted to delete their own account");
            return Err(AppError::bad_request(anyhow!(
                "Você não pode remover seu próprio usuário"
            )));
        }

        if !self.users.delete(id).await? {
            return Err(AppError::resource_not_found("Usuário"));
        }

        info!(user.id = %id, "User deleted successfully");
        Ok(())
    }
}
