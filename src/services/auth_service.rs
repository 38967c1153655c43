//! Authentication flows: registration, login, current-account lookup
//!
//! Login deliberately answers "Invalid credentials" for both an unknown
//! identifier and a wrong password, and hashes either way, so the two cases
//! cannot be told apart by response or by timing.

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::AppConfig,
    error::AppError,
    models::account::{Account, LoginRequest, NewAccount, RegisterRequest, Role},
    repository::AccountDirectory,
};
use std::sync::Arc;
use validator::Validate;

/// Outcome of a successful register or login
pub struct AuthenticatedAccount {
    pub token: String,
    pub account: Account,
}

/// Authentication service
pub struct AuthService {
    accounts: Arc<dyn AccountDirectory>,
    jwt: Arc<JwtService>,
    hasher: Arc<PasswordHasher>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountDirectory>,
        jwt: Arc<JwtService>,
        hasher: Arc<PasswordHasher>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            accounts,
            jwt,
            hasher,
            config,
        }
    }

    /// Register a new account and issue a token for it.
    ///
    /// Uniqueness is pre-checked so the caller gets a field-specific message;
    /// the database constraints remain the authority under concurrency and a
    /// racing insert still surfaces as a conflict.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthenticatedAccount, AppError> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, &self.config)?;

        if self.accounts.username_exists(&req.username).await? {
            return Err(AppError::conflict("Username already exists"));
        }
        if self.accounts.email_exists(&req.email).await? {
            return Err(AppError::conflict("Email already exists"));
        }

        // Argon2 is CPU-bound; keep it off the async workers
        let hasher = self.hasher.clone();
        let password = req.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??;

        let account = self
            .accounts
            .create(NewAccount {
                username: req.username,
                email: req.email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                role: Role::default_role(),
            })
            .await?;

        let token = self.jwt.issue(&account.id)?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(AuthenticatedAccount { token, account })
    }

    /// Authenticate with username or email plus password
    pub async fn login(&self, req: LoginRequest) -> Result<AuthenticatedAccount, AppError> {
        if req.username.is_empty() || req.password.is_empty() {
            return Err(AppError::bad_request("Please provide username and password"));
        }

        let account = match self.accounts.find_by_identifier(&req.username).await? {
            Some(account) => account,
            None => {
                // Burn a verification anyway so latency matches the
                // wrong-password path
                let hasher = self.hasher.clone();
                let password = req.password.clone();
                tokio::task::spawn_blocking(move || hasher.verify_fallback(&password))
                    .await
                    .map_err(|e| {
                        AppError::Internal(format!("Hashing task failed: {}", e))
                    })?;
                return Err(AppError::InvalidCredentials);
            }
        };

        let hasher = self.hasher.clone();
        let password = req.password.clone();
        let digest = account.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?;

        if !verified {
            return Err(AppError::InvalidCredentials);
        }

        // Checked only after the password, so a probe with a bad password
        // learns nothing about account status
        if !account.is_active {
            return Err(AppError::forbidden("Account is disabled"));
        }

        let token = self.jwt.issue(&account.id)?;

        tracing::info!(account_id = %account.id, "Login succeeded");

        Ok(AuthenticatedAccount { token, account })
    }

    /// Resolve the account behind a verified token.
    /// A stale token for a deleted account reads as unauthenticated.
    pub async fn current_account(&self, account_id: uuid::Uuid) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
