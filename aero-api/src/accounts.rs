use aero_core::account::{Role, User};
use aero_core::repository::UserRepository;
use aero_core::{CoreError, CoreResult};
use aero_shared::validate::is_valid_email;
use aero_shared::Masked;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::middleware::auth::issue_token;
use crate::state::AuthConfig;

const MIN_PASSWORD_LEN: usize = 6;
const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: Masked<String>,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::InternalError(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Registration, login and token issuance for end users and admins.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    auth: AuthConfig,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, auth: AuthConfig) -> Self {
        Self { users, auth }
    }

    pub async fn register(&self, input: RegisterRequest) -> CoreResult<User> {
        self.create_account(input, Role::User).await
    }

    async fn create_account(&self, input: RegisterRequest, role: Role) -> CoreResult<User> {
        let email = input.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(CoreError::ValidationError("a valid email is required".to_string()));
        }
        if input.password.expose().chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::ValidationError(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError("name is required".to_string()));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CoreError::ConflictError("user already exists".to_string()));
        }

        let phone = input.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        let user = User::new(email, hash_password(input.password.expose())?, name.to_string(), phone, role);
        self.users.create(&user).await?;
        info!(user_id = %user.id, role = %user.role, "account created");
        Ok(user)
    }

    pub async fn login(&self, input: LoginRequest) -> CoreResult<LoginResponse> {
        let email = input.email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("login for unknown account");
            return Err(CoreError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        };
        if !verify_password(input.password.expose(), &user.password_hash) {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(CoreError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        }

        let (token, expires_at) = issue_token(&self.auth, &user.id, &user.email, user.role)?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse { token, expires_at, user })
    }

    pub async fn me(&self, user_id: &str) -> CoreResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("user"))
    }

    /// Creates the bootstrap administrator unless an account with that email
    /// already exists.
    pub async fn ensure_admin(&self, email: &str, password: &str, name: &str) -> CoreResult<()> {
        if let Some(existing) = self.users.find_by_email(&email.trim().to_lowercase()).await? {
            if !existing.is_admin() {
                warn!(user_id = %existing.id, "configured admin email belongs to a non-admin account");
            }
            return Ok(());
        }

        let admin = self
            .create_account(
                RegisterRequest {
                    email: email.to_string(),
                    password: Masked::new(password.to_string()),
                    name: name.to_string(),
                    phone: None,
                },
                Role::Admin,
            )
            .await?;
        info!(user_id = %admin.id, "bootstrap admin created");
        Ok(())
    }
}
