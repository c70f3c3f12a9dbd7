use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::modules::auth::model::{ChangePasswordDto, LoginRequest, LoginResponse};
use crate::modules::users::model::{UserChanges, UserId};
use crate::modules::users::repository::UserRepository;
use matricula_auth::create_access_token;
use matricula_config::JwtConfig;
use matricula_core::{AppError, hash_password, verify_password};
use matricula_models::validation::validate_password;

#[cfg(feature = "observability")]
use matricula_observability::metrics;

/// Unknown email and wrong password share this message.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Credenciais inválidas";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_config: JwtConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_config: JwtConfig) -> Self {
        Self { users, jwt_config }
    }

    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let (email, password) = request.into_credentials()?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("Login attempt for unknown email");
            #[cfg(feature = "observability")]
            metrics::track_user_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        };

        if !verify_password(&password, &user.password_hash)? {
            warn!(user.id = %user.id, "Login attempt with wrong password");
            #[cfg(feature = "observability")]
            metrics::track_user_login_failure("invalid_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        }

        let token = create_access_token(user.id.into_inner(), user.role.as_str(), &self.jwt_config)?;

        #[cfg(feature = "observability")]
        {
            metrics::track_jwt_issued();
            metrics::track_user_login_success(user.role.as_str());
        }

        info!(user.id = %user.id, user.role = %user.role, "User logged in");
        Ok(LoginResponse { user, token })
    }

    /// Outstanding tokens stay valid after the change.
    #[instrument(skip(self, dto), fields(user.id = %user_id))]
    pub async fn change_password(&self, user_id: UserId, dto: ChangePasswordDto) -> Result<(), AppError> {
        let (current_password, new_password) = dto.into_parts()?;

        let errors = validate_password(&new_password);
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Usuário"))?;

        if !verify_password(&current_password, &user.password_hash)? {
            return Err(AppError::field("currentPassword", "Senha atual incorreta"));
        }

        let changes = UserChanges {
            password_hash: Some(hash_password(&new_password)?),
            ..Default::default()
        };
        self.users
            .update(user_id, changes)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Usuário"))?;

        info!(user.id = %user_id, "Password changed");
        Ok(())
    }
}
