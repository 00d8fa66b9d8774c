use thiserror::Error;

/// All errors that can occur in OnceVault.
///
/// Retrieval outcomes a caller is expected to handle (wrong password,
/// consumed, expired, rate limited) are *not* errors; they live in
/// `vault::SecretStatus` and `vault::UnlockOutcome`.  Anything here is
/// either internal to a component or a genuine fault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key, truncated input, and tampered input all land here.
    #[error("Authentication failed: wrong password or corrupted data")]
    AuthenticationFailure,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Code errors ---
    #[error("Invalid code '{0}': expected 6 characters from A-Z and 0-9")]
    InvalidCode(String),

    #[error("Code '{0}' is already taken")]
    CodeCollision(String),

    #[error("Could not allocate a unique code after {0} attempts")]
    CodeSpaceExhausted(u32),

    // --- Store errors ---
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt record for code '{code}': {reason}")]
    CorruptRecord { code: String, reason: String },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Input / CLI errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// An unlock that did not release the secret, worded for the user.
    #[error("{0}")]
    UnlockRefused(String),
}

/// Convenience type alias for OnceVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
