//! Users service: registration, authentication and account management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{CreateUser, UpdateProfile, UpdateUser, User, UserClaims},
    },
    repository::Repository,
    services::notifier::Notifier,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    notifier: Notifier,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, notifier: Notifier, config: AuthConfig) -> Self {
        Self {
            repository,
            notifier,
            config,
        }
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Issue a JWT for the user
    fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Register a new account with the default `user` role
    pub async fn register(&self, request: &CreateUser) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.get_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(
                &request.email,
                &password_hash,
                request.full_name.as_deref(),
                request.phone.as_deref(),
                Role::User,
            )
            .await?;

        tracing::info!("User {} registered ({})", user.id, user.email);
        Ok(user)
    }

    /// Authenticate by email and password, returning a token and the user
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.issue_token(&user)?;
        tracing::info!("User {} logged in", user.id);
        Ok((token, user))
    }

    /// Reset a forgotten password to a random temporary one and mail it.
    /// Responds identically whether or not the account exists.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let Some(user) = self.repository.users.get_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let temp_password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        let password_hash = self.hash_password(&temp_password)?;
        self.repository
            .users
            .update_password(user.id, &password_hash)
            .await?;

        self.notifier.temp_password(&user.email, &temp_password);
        tracing::info!("Temporary password issued for user {}", user.id);
        Ok(())
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all accounts (admin)
    pub async fn list_users(&self, claims: &UserClaims) -> AppResult<Vec<User>> {
        claims.require_admin()?;
        self.repository.users.list().await
    }

    /// Admin update of another account, including role changes
    pub async fn update_user(
        &self,
        claims: &UserClaims,
        id: i32,
        request: &UpdateUser,
    ) -> AppResult<User> {
        claims.require_admin()?;
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = match &request.password {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository
            .users
            .update(
                id,
                request.role,
                request.full_name.as_deref(),
                request.phone.as_deref(),
                password_hash.as_deref(),
            )
            .await
    }

    /// Update the caller's own profile; role cannot be changed here
    pub async fn update_profile(
        &self,
        claims: &UserClaims,
        request: &UpdateProfile,
    ) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = match &request.password {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository
            .users
            .update(
                claims.user_id,
                None,
                request.full_name.as_deref(),
                request.phone.as_deref(),
                password_hash.as_deref(),
            )
            .await
    }

    /// Delete an account (admin). Self-deletion is rejected so the system
    /// cannot end up without its last administrator by accident.
    pub async fn delete_user(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        if id == claims.user_id {
            return Err(AppError::BadRequest(
                "You cannot delete your own account".to_string(),
            ));
        }
        self.repository.users.delete(id).await?;
        tracing::info!("User {} deleted by admin {}", id, claims.user_id);
        Ok(())
    }
}
