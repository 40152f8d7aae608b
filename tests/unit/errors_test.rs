use cloudnav::types::errors::*;

// === SyncError Tests ===

#[test]
fn sync_error_display_variants() {
    assert_eq!(SyncError::AuthRequired.to_string(), "Authentication required");
    assert_eq!(
        SyncError::Unauthorized.to_string(),
        "Credential rejected by remote store"
    );
    assert_eq!(
        SyncError::NetworkFailure("timed out".to_string()).to_string(),
        "Remote store unavailable: timed out"
    );
    assert_eq!(
        SyncError::LinkNotFound("l-1".to_string()).to_string(),
        "Link not found: l-1"
    );
    assert_eq!(
        SyncError::CategoryNotFound("c-1".to_string()).to_string(),
        "Category not found: c-1"
    );
}

#[test]
fn sync_error_from_remote_error() {
    assert_eq!(SyncError::from(RemoteError::Unauthorized), SyncError::Unauthorized);
    assert_eq!(
        SyncError::from(RemoteError::Status(503)),
        SyncError::NetworkFailure("Unexpected HTTP status: 503".to_string())
    );
    assert!(matches!(
        SyncError::from(RemoteError::Network("refused".to_string())),
        SyncError::NetworkFailure(_)
    ));
}

#[test]
fn sync_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(SyncError::AuthRequired);
    assert!(err.source().is_none());
}

// === RemoteError Tests ===

#[test]
fn remote_error_display_variants() {
    assert_eq!(RemoteError::Unauthorized.to_string(), "Unauthorized");
    assert_eq!(RemoteError::Status(500).to_string(), "Unexpected HTTP status: 500");
    assert_eq!(
        RemoteError::Network("dns".to_string()).to_string(),
        "Network error: dns"
    );
    assert_eq!(
        RemoteError::InvalidResponse("eof".to_string()).to_string(),
        "Invalid response: eof"
    );
}

// === CacheError Tests ===

#[test]
fn cache_error_display_variants() {
    assert_eq!(
        CacheError::DatabaseError("locked".to_string()).to_string(),
        "Cache database error: locked"
    );
    assert_eq!(
        CacheError::SerializationError("bad".to_string()).to_string(),
        "Cache serialization error: bad"
    );
    assert_eq!(
        CacheError::CryptoError("tag".to_string()).to_string(),
        "Cache crypto error: tag"
    );
}

#[test]
fn cache_error_from_rusqlite() {
    let err: CacheError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, CacheError::DatabaseError(_)));
}

// === LockError Tests ===

#[test]
fn lock_error_display_variants() {
    assert_eq!(
        LockError::WrongPassword("vault".to_string()).to_string(),
        "Wrong password for category: vault"
    );
    assert_eq!(
        LockError::UnknownCategory("x".to_string()).to_string(),
        "Unknown category: x"
    );
}

// === ConfigError Tests ===

#[test]
fn config_error_display_variants() {
    assert_eq!(
        ConfigError::IoError("denied".to_string()).to_string(),
        "Config I/O error: denied"
    );
    assert_eq!(
        ConfigError::SerializationError("line 1".to_string()).to_string(),
        "Config serialization error: line 1"
    );
}

// === CryptoError Tests ===

#[test]
fn crypto_error_display_variants() {
    assert_eq!(
        CryptoError::KeyDerivation("bad salt".to_string()).to_string(),
        "Key derivation failed: bad salt"
    );
    assert_eq!(
        CryptoError::Decryption("invalid tag".to_string()).to_string(),
        "Decryption failed: invalid tag"
    );
    assert_eq!(
        CryptoError::InvalidKey("wrong length".to_string()).to_string(),
        "Invalid key: wrong length"
    );
}

// === Integration Errors ===

#[test]
fn ai_and_backup_error_display_variants() {
    assert_eq!(AiError::MissingApiKey.to_string(), "AI API key is not configured");
    assert_eq!(AiError::EmptyResponse.to_string(), "AI provider returned no text");
    assert_eq!(
        BackupError::NotConfigured.to_string(),
        "WebDAV backup is not configured"
    );
    assert_eq!(
        BackupError::Status(409).to_string(),
        "WebDAV server returned status 409"
    );
}

#[test]
fn bulk_fill_error_wraps_sources() {
    let ai: BulkFillError = AiError::MissingApiKey.into();
    let sync: BulkFillError = SyncError::AuthRequired.into();
    assert_eq!(ai.to_string(), "AI API key is not configured");
    assert_eq!(sync.to_string(), "Authentication required");
}
