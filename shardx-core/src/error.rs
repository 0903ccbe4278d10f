//! Error types for the coding core.

/// Errors raised by field arithmetic, matrix operations, shard layout and
/// the Reed-Solomon codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Inverse of, or division by, the zero element of GF(2^8).
    #[error("division by zero in GF(2^8)")]
    DivisionByZero,

    /// Matrix shapes disagree for the requested operation.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
    },

    /// No nonzero pivot in some column during inversion.
    ///
    /// A coding matrix built by this crate never produces a singular
    /// `data_shards`-row submatrix, so this is a defect, not a user error.
    #[error("matrix is singular (no pivot in column {column})")]
    SingularMatrix {
        column: usize,
    },

    /// A shard's length differs from the agreed shard size.
    #[error("shard {index} has {got} bytes, expected {expected}")]
    ShardSizeMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    /// Encode was given the wrong number of data shards.
    #[error("wrong number of shards: expected {expected}, got {got}")]
    ShardCountMismatch {
        expected: usize,
        got: usize,
    },

    /// A shard or row index is outside `0..total`.
    #[error("shard index {index} out of range (total {total})")]
    ShardIndexOutOfRange {
        index: usize,
        total: usize,
    },

    /// Fewer than `data_shards` shards survive.
    #[error("not enough shards: need {needed}, got {got}")]
    InsufficientShards {
        /// Minimum shards required (data_shards).
        needed: usize,
        /// Shards actually provided.
        got: usize,
    },

    /// The joined data shards are shorter than the length header.
    #[error("truncated header: {available} bytes available, header needs {needed}")]
    TruncatedHeader {
        needed: usize,
        available: usize,
    },

    /// The length header declares more bytes than the shards carry.
    #[error("truncated payload: header declares {declared} bytes, only {available} available")]
    TruncatedPayload {
        declared: usize,
        available: usize,
    },

    /// The input does not fit the 4-byte length header.
    #[error("file of {len} bytes exceeds the 4-byte length header")]
    FileTooLarge {
        len: usize,
    },

    /// A manifest file name that is not a single plain path component.
    #[error("invalid file name in manifest: {0:?}")]
    InvalidFileName(String),

    /// Unusable shard counts.
    #[error("invalid codec config: {0}")]
    InvalidConfig(String),

    /// Manifest (de)serialization failed.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
