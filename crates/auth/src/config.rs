use chrono::Duration;

/// Default access-token lifetime.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Argon2 cost parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashingCost {
    /// Cheapest parameters Argon2 accepts. Only for tests and local tooling.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Process-wide auth settings, built once at startup and handed to
/// `AuthService`.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret (used for both issuing and verifying).
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub hashing: HashingCost,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            hashing: HashingCost::default(),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_hashing(mut self, hashing: HashingCost) -> Self {
        self.hashing = hashing;
        self
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("hashing", &self.hashing)
            .finish()
    }
}
