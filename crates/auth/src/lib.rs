//! `sweetshop-auth`: authentication and authorization boundary.
//!
//! Password hashing, bearer-token issuance/validation, identity resolution and
//! the role gate. Decoupled from HTTP; storage is reached through `UserStore`.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod error;
pub mod identity;
pub mod password;
pub mod roles;
pub mod service;
pub mod store;
pub mod token;
pub mod user;

pub use authorize::{require_role, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use config::{AuthConfig, HashingCost, DEFAULT_TOKEN_TTL_MINUTES};
pub use error::{AuthError, CredentialError};
pub use identity::Identity;
pub use password::{PasswordError, PasswordHashing};
pub use roles::Role;
pub use service::AuthService;
pub use store::UserStore;
pub use token::{AccessToken, Hs256JwtCodec};
pub use user::{RegisterUser, UserProfile, UserRecord};
