use bcrypt::{DEFAULT_COST, hash, verify};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use sha2::{Digest, Sha256};

/// Length of generated secrets (drawn from `[a-zA-Z0-9]`).
pub const GENERATED_PASSWORD_LENGTH: usize = 8;
/// Minimum length accepted for a user-chosen secret.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// How new secrets are hashed before storage.
///
/// `Sha256` is the unsalted hex digest the existing account table was written
/// with. It is weak against offline attacks; `Bcrypt` is the salted, slow
/// alternative. Verification accepts both formats regardless of the setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordScheme {
    #[default]
    Sha256,
    Bcrypt,
}

impl PasswordScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordScheme::Sha256 => "sha256",
            PasswordScheme::Bcrypt => "bcrypt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Some(PasswordScheme::Sha256),
            "bcrypt" => Some(PasswordScheme::Bcrypt),
            _ => None,
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        match self {
            PasswordScheme::Sha256 => Ok(sha256_hex(password)),
            PasswordScheme::Bcrypt => hash(password, DEFAULT_COST),
        }
    }
}

pub fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if stored_hash.starts_with("$2") {
        return verify(password, stored_hash).unwrap_or(false);
    }
    sha256_hex(password) == stored_hash
}

pub fn generate_password() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}
