//! Signup, login and bearer-token verification.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use smartcrm_core::{
    AuthConfig, AuthUser, Credentials, MAX_JWT_EXPIRATION_HOURS, User, UserRecord, new_id,
    normalize_email,
};
use smartcrm_storage::StorageBackend;
use smartcrm_storage::traits::UserStore;

use crate::ServiceError;

/// JWT claims issued at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// A freshly issued token together with the user it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

pub struct AuthService {
    storage: Arc<StorageBackend>,
    token_ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, config: &AuthConfig) -> Self {
        Self {
            storage,
            token_ttl: Duration::hours(
                config.token_ttl_hours.clamp(-MAX_JWT_EXPIRATION_HOURS, MAX_JWT_EXPIRATION_HOURS),
            ),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    pub async fn signup(&self, credentials: Credentials) -> Result<AuthSession, ServiceError> {
        let email = credentials.validate_signup()?;
        if self.storage.get_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::InvalidInput("Email already registered".to_owned()));
        }

        let password_hash = hash_password(credentials.password).await?;
        let user = User { id: new_id(), email, created_at: Utc::now() };
        let record = UserRecord { user: user.clone(), password_hash };
        self.storage.create_user(&record).await.map_err(|e| {
            if e.is_duplicate() {
                ServiceError::InvalidInput("Email already registered".to_owned())
            } else {
                e.into()
            }
        })?;

        tracing::info!(user_id = %user.id, "User signed up");
        let token = self.issue_token(&user)?;
        Ok(AuthSession { token, user })
    }

    pub async fn login(&self, credentials: Credentials) -> Result<AuthSession, ServiceError> {
        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_owned());
        let email = normalize_email(&credentials.email).map_err(|_| invalid())?;
        let record = self.storage.get_user_by_email(&email).await?.ok_or_else(invalid)?;

        if !verify_password(credentials.password, record.password_hash).await? {
            return Err(invalid());
        }
        let token = self.issue_token(&record.user)?;
        Ok(AuthSession { token, user: record.user })
    }

    pub fn issue_token(&self, user: &User) -> Result<String, ServiceError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| ServiceError::Internal("token expiry out of range".to_owned()))?;
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(format!("token signing failed: {e}")))
    }

    /// Decode a bearer token and resolve it to a live user.
    pub async fn verify_token(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    ServiceError::Unauthorized("Token has expired".to_owned())
                },
                _ => ServiceError::Unauthorized("Invalid token".to_owned()),
            },
        )?;
        let user = self
            .storage
            .get_user(&data.claims.sub)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("User not found".to_owned()))?;
        Ok(AuthUser::from(&user))
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        self.storage.get_user(id).await?.ok_or(ServiceError::NotFound("User"))
    }
}

async fn hash_password(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))
    })
    .await?
}

async fn verify_password(password: String, stored: String) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored)
            .map_err(|e| ServiceError::Internal(format!("stored password hash unreadable: {e}")))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await?
}
