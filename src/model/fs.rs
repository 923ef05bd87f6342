use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    /// The configured region alias is not in the alias table. Raised at
    /// adapter construction, never at request time.
    #[error("unknown region alias: {alias}")]
    UnknownRegion { alias: String },

    /// The key does not exist in the bucket.
    #[error("no such key: {key}")]
    NotFound { key: String },

    /// Any other storage-service failure, passed through unchanged. No
    /// retry or backoff happens at this layer.
    #[error("{message}")]
    Service { message: String },

    /// A timestamp could not be parsed or formatted.
    #[error("{message}")]
    Time { message: String },
}

/// One entry of a directory listing, derived entirely from a raw listing
/// entry's key and metadata. Never persisted, recomputed on every listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub kind: &'static str,
    pub path: String,
    /// Epoch seconds.
    pub timestamp: i64,
    /// Bytes.
    pub size: u64,
    pub dirname: String,
    pub basename: String,
    pub extension: String,
    pub filename: String,
}
