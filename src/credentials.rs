use crate::error::app_error::AppError;
use argon2::Argon2;
use password_hash::rand_core::{OsRng, RngCore};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;
use tracing::warn;

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that login requests for non-existent users take the same time as
/// requests for existing users.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", &salt)
        .expect("failed to generate dummy hash")
        .to_string()
});

const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// One-way salted hash of `password`, encoded as a PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::password_hash("Failed to hash password", e))?;

    Ok(hash.to_string())
}

/// Verifies `password` against a stored PHC hash. The final tag comparison is
/// constant time.
pub fn check_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash could not be parsed");
            return false;
        }
    };

    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

/// Perform a throwaway Argon2 verification to equalize response timing
/// regardless of whether the target account exists.
pub fn dummy_verify(password: &str) {
    let _ = check_password(password, &DUMMY_HASH);
}

/// Random alphanumeric password drawn from the OS RNG.
pub fn generate_password(len: usize) -> String {
    // Largest multiple of the alphabet size that fits in a byte; anything above
    // it is rejected so every character is equally likely.
    let limit = (u8::MAX as usize / PASSWORD_ALPHABET.len()) * PASSWORD_ALPHABET.len();
    let mut password = String::with_capacity(len);
    let mut buf = [0u8; 32];

    while password.len() < len {
        OsRng.fill_bytes(&mut buf);
        for byte in buf {
            if (byte as usize) < limit && password.len() < len {
                password.push(PASSWORD_ALPHABET[byte as usize % PASSWORD_ALPHABET.len()] as char);
            }
        }
    }

    password
}
