//! Registration, login and bearer-token authentication.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use sweetshop_core::UserId;

use crate::{
    AccessToken, AuthConfig, AuthError, CredentialError, Hs256JwtCodec, Identity, PasswordError,
    PasswordHashing, RegisterUser, Role, UserProfile, UserRecord, UserStore,
};

/// Credential and identity service over a `UserStore`.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt: Hs256JwtCodec,
    hashing: PasswordHashing,
    /// Verified against on unknown-email logins so both rejections cost one hash.
    dummy_digest: Arc<str>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, config: &AuthConfig) -> Result<Self, PasswordError> {
        let hashing = PasswordHashing::new(config.hashing)?;
        let dummy_digest = hashing.hash("sweetshop-unknown-account")?.into();
        Ok(Self {
            store,
            jwt: Hs256JwtCodec::new(config),
            hashing,
            dummy_digest,
        })
    }

    /// Self-service registration. Always creates a `USER`.
    pub async fn register(
        &self,
        req: RegisterUser,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, CredentialError> {
        self.provision(req, Role::User, now).await
    }

    /// Create a user with an explicit role (admin bootstrap, seeding).
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn provision(
        &self,
        req: RegisterUser,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, CredentialError> {
        req.validate()?;

        // Cheap pre-check; the store's unique constraint is the real guard.
        if self.store.find_by_email(&req.email).await?.is_some() {
            debug!("registration rejected: email already registered");
            return Err(CredentialError::DuplicateEmail);
        }

        let password_hash = self.hash_blocking(req.password).await?;
        let record = UserRecord {
            id: UserId::new(),
            name: req.name,
            email: req.email,
            password_hash,
            role,
            created_at: now,
        };

        let stored = self.store.insert(record).await?;
        info!(user_id = %stored.id, "user registered");
        Ok(UserProfile::from(&stored))
    }

    /// Exchange email + password for a bearer token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, CredentialError> {
        let Some(user) = self.store.find_by_email(email).await? else {
            self.verify_blocking(password.to_owned(), self.dummy_digest.to_string())
                .await?;
            debug!("login rejected: unknown email");
            return Err(CredentialError::InvalidCredentials);
        };

        if !self
            .verify_blocking(password.to_owned(), user.password_hash.clone())
            .await?
        {
            debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(CredentialError::InvalidCredentials);
        }

        let token = self.jwt.issue(user.id, user.role, &user.name, now)?;
        info!(user_id = %user.id, "access token issued");
        Ok(token)
    }

    /// Resolve a bearer token to the caller's identity.
    ///
    /// Checks run in order: signature/structure, expiry, subject existence.
    /// The returned role comes from the store, not the token.
    pub async fn authenticate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        let claims = self.jwt.validate(token, now)?;

        let user = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        if user.role != claims.role {
            debug!(
                user_id = %user.id,
                token_role = %claims.role,
                store_role = %user.role,
                "role changed since issuance"
            );
        }

        Ok(Identity::from(&user))
    }

    /// Profile of an authenticated identity.
    pub async fn profile(&self, identity: &Identity) -> Result<UserProfile, AuthError> {
        self.store
            .find_by_id(identity.id)
            .await?
            .map(|u| UserProfile::from(&u))
            .ok_or(AuthError::UnknownSubject)
    }

    async fn hash_blocking(&self, plain: String) -> Result<String, PasswordError> {
        let hashing = self.hashing.clone();
        tokio::task::spawn_blocking(move || hashing.hash(&plain))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    async fn verify_blocking(&self, plain: String, digest: String) -> Result<bool, PasswordError> {
        let hashing = self.hashing.clone();
        tokio::task::spawn_blocking(move || hashing.verify(&plain, &digest))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }
}
