//! Authentication service: credential vault and token handling

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{PublicUser, User, UserClaims},
    store::Store,
};

/// Uniform credential failure. Unknown email and wrong password must be
/// indistinguishable so the API does not leak which emails are registered.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthService {
    store: Store,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: Store, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Register a new user with a unique email.
    ///
    /// Returns the created user with the hash stripped. The whole
    /// duplicate-check-then-append cycle runs under the collection's
    /// writer lock so at most one of two concurrent registrations for
    /// the same email can win.
    pub async fn register(&self, email: &str, password: &str) -> AppResult<PublicUser> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let _guard = self.store.users.lock_exclusive().await;
        let mut users = self.store.users.load_all().await?;

        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        users.push(user.clone());
        self.store.users.save_all(&users).await?;

        tracing::info!("Registered user {}", user.id);
        Ok(user.to_public())
    }

    /// Authenticate by email and password, returning a bearer token and
    /// the public user on success.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, PublicUser)> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self.verify_credentials(email, password).await?;
        let token = self.issue_token(&user)?;
        Ok((token, user.to_public()))
    }

    /// Check an email/password pair against the vault.
    ///
    /// Returns the full user record, hash included; callers must strip it
    /// before any external exposure.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> AppResult<User> {
        let users = self.store.users.load_all().await?;
        let user = users
            .into_iter()
            .find(|u| u.email == email)
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&user.password_hash, password)? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user)
    }

    /// Issue a signed token embedding the user's identity claims
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id.clone(),
            email: user.email.clone(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a bearer token and resolve it to the current user record.
    ///
    /// Signature and expiry are checked first (no storage access for a
    /// missing or garbage token); the `userId` claim is then re-resolved
    /// against the vault, so a token for a user that no longer exists is
    /// rejected even though tokens carry no revocation state.
    pub async fn authenticate_token(&self, token: &str) -> AppResult<User> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))?;

        let users = self.store.users.load_all().await?;
        users
            .into_iter()
            .find(|u| u.id == claims.user_id)
            .ok_or_else(|| AppError::Authentication("Invalid token".to_string()))
    }
}

/// Hash a plaintext password with a fresh random salt.
///
/// Cost parameters are argon2's defaults and deliberately not configurable.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(stored_hash: &str, password: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
