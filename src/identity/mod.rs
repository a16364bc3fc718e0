use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::store::{Account, CredentialStore, Role, StoreError};
use crate::utils::{Claims, generate_token, hash_password, verify_password, verify_token};

/// A fresh token plus the account it was issued for.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: Account,
    pub token: String,
}

/// Registers accounts, verifies credentials, and issues/validates session
/// tokens. The store and signing secret are injected, nothing is ambient.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn CredentialStore>,
    config: Config,
}

impl IdentityService {
    pub fn new(store: Arc<dyn CredentialStore>, config: Config) -> Self {
        Self { store, config }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<AuthSession, AppError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let password_hash = hash_password(password, self.config.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;

        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role: role.unwrap_or_default(),
            password_hash,
            created_at: Utc::now(),
        };

        let account = match self.store.insert(account).await {
            Ok(account) => account,
            Err(StoreError::Duplicate) => return Err(AppError::DuplicateAccount),
            Err(e) => return Err(e.into()),
        };

        tracing::info!("registered account {} ({})", account.id, account.role.as_str());
        self.issue(account)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let account = match self.store.find_by_email(email.trim()).await? {
            Some(account) => account,
            None => {
                // burn a hash so an unknown email costs the same as a wrong
                // password; both paths report the identical error
                let _ = hash_password(password, self.config.bcrypt_cost);
                return Err(AppError::InvalidCredentials);
            }
        };

        match verify_password(password, &account.password_hash) {
            Ok(true) => self.issue(account),
            Ok(false) => Err(AppError::InvalidCredentials),
            Err(e) => Err(AppError::Internal(format!(
                "password verification failed: {e}"
            ))),
        }
    }

    /// Pure check of the token against the process signing secret; no store
    /// access.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        verify_token(token, &self.config).map_err(|_| AppError::Unauthenticated)
    }

    pub async fn find_account(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.store.find_by_id(id).await?)
    }

    fn issue(&self, account: Account) -> Result<AuthSession, AppError> {
        let token = generate_token(account.id, account.role, &self.config)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))?;
        Ok(AuthSession { account, token })
    }
}
