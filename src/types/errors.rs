use std::fmt;

// === SyncError ===

/// Errors surfaced by the sync controller to its callers.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// A gated mutation was attempted without a credential. Nothing changed.
    AuthRequired,
    /// The remote store rejected the credential.
    Unauthorized,
    /// The remote store could not be reached or answered with a failure.
    NetworkFailure(String),
    /// No link with the given ID exists in the current snapshot.
    LinkNotFound(String),
    /// No category with the given ID exists in the current snapshot.
    CategoryNotFound(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::AuthRequired => write!(f, "Authentication required"),
            SyncError::Unauthorized => write!(f, "Credential rejected by remote store"),
            SyncError::NetworkFailure(msg) => write!(f, "Remote store unavailable: {}", msg),
            SyncError::LinkNotFound(id) => write!(f, "Link not found: {}", id),
            SyncError::CategoryNotFound(id) => write!(f, "Category not found: {}", id),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unauthorized => SyncError::Unauthorized,
            other => SyncError::NetworkFailure(other.to_string()),
        }
    }
}

// === RemoteError ===

/// Errors from the remote store client.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// The server answered 401 to a credentialed request.
    Unauthorized,
    /// The server answered with a non-success status other than 401.
    Status(u16),
    /// The request could not be sent or the response not received.
    Network(String),
    /// The response body could not be decoded.
    InvalidResponse(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Unauthorized => write!(f, "Unauthorized"),
            RemoteError::Status(code) => write!(f, "Unexpected HTTP status: {}", code),
            RemoteError::Network(msg) => write!(f, "Network error: {}", msg),
            RemoteError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::InvalidResponse(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

// === CacheError ===

/// Errors from the local key-value store.
#[derive(Debug)]
pub enum CacheError {
    /// Database operation failed.
    DatabaseError(String),
    /// A value could not be serialized for storage.
    SerializationError(String),
    /// Sealing or opening a secret failed.
    CryptoError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::DatabaseError(msg) => write!(f, "Cache database error: {}", msg),
            CacheError::SerializationError(msg) => {
                write!(f, "Cache serialization error: {}", msg)
            }
            CacheError::CryptoError(msg) => write!(f, "Cache crypto error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        CacheError::DatabaseError(err.to_string())
    }
}

// === LockError ===

/// Errors from the category lock manager.
#[derive(Debug, Clone, PartialEq)]
pub enum LockError {
    /// The supplied password did not match the category's password.
    WrongPassword(String),
    /// No category with the given ID exists.
    UnknownCategory(String),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::WrongPassword(id) => write!(f, "Wrong password for category: {}", id),
            LockError::UnknownCategory(id) => write!(f, "Unknown category: {}", id),
        }
    }
}

impl std::error::Error for LockError {}

// === ConfigError ===

/// Errors related to loading or saving the application configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// File system I/O error.
    IoError(String),
    /// JSON serialization/deserialization error.
    SerializationError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::SerializationError(msg) => {
                write!(f, "Config serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// === CryptoError ===

/// Errors related to cryptographic operations.
#[derive(Debug)]
pub enum CryptoError {
    /// Failed to derive encryption key from password.
    KeyDerivation(String),
    /// Encryption operation failed.
    Encryption(String),
    /// Decryption operation failed.
    Decryption(String),
    /// Failed to generate random bytes.
    RandomGeneration(String),
    /// The provided key is invalid.
    InvalidKey(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::KeyDerivation(msg) => write!(f, "Key derivation failed: {}", msg),
            CryptoError::Encryption(msg) => write!(f, "Encryption failed: {}", msg),
            CryptoError::Decryption(msg) => write!(f, "Decryption failed: {}", msg),
            CryptoError::RandomGeneration(msg) => {
                write!(f, "Random generation failed: {}", msg)
            }
            CryptoError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}

// === AiError ===

/// Errors from the AI description generator.
#[derive(Debug, Clone, PartialEq)]
pub enum AiError {
    /// No API key is configured.
    MissingApiKey,
    /// The provider returned an error status.
    ProviderError(String),
    /// The request could not be completed.
    NetworkError(String),
    /// The provider answered without any text.
    EmptyResponse,
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::MissingApiKey => write!(f, "AI API key is not configured"),
            AiError::ProviderError(msg) => write!(f, "AI provider error: {}", msg),
            AiError::NetworkError(msg) => write!(f, "AI network error: {}", msg),
            AiError::EmptyResponse => write!(f, "AI provider returned no text"),
        }
    }
}

impl std::error::Error for AiError {}

// === BackupError ===

/// Errors from the WebDAV backup service.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupError {
    /// WebDAV is disabled or has no URL.
    NotConfigured,
    /// The server answered with a non-success status.
    Status(u16),
    /// The request could not be completed.
    NetworkError(String),
    /// The backup file could not be decoded.
    InvalidPayload(String),
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupError::NotConfigured => write!(f, "WebDAV backup is not configured"),
            BackupError::Status(code) => write!(f, "WebDAV server returned status {}", code),
            BackupError::NetworkError(msg) => write!(f, "WebDAV network error: {}", msg),
            BackupError::InvalidPayload(msg) => write!(f, "Invalid backup payload: {}", msg),
        }
    }
}

impl std::error::Error for BackupError {}

// === BulkFillError ===

/// Errors that abort a bulk description fill.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkFillError {
    /// The AI provider is not usable at all.
    Ai(AiError),
    /// A description could not be committed.
    Sync(SyncError),
}

impl fmt::Display for BulkFillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkFillError::Ai(e) => write!(f, "{}", e),
            BulkFillError::Sync(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BulkFillError {}

impl From<AiError> for BulkFillError {
    fn from(err: AiError) -> Self {
        BulkFillError::Ai(err)
    }
}

impl From<SyncError> for BulkFillError {
    fn from(err: SyncError) -> Self {
        BulkFillError::Sync(err)
    }
}
