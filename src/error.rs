/// Errors that can occur when building or operating on a RingShardMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The key length is not one of the supported sizes (16, 20 or 32 bytes).
    UnsupportedKeyLength(usize),
    /// The shard count is invalid (must be greater than 0).
    InvalidShardCount,
    /// The per-shard depth is invalid (must be greater than 0).
    InvalidDepth,
    /// A key's length does not match the length the map was built with.
    KeyLengthMismatch {
        /// Configured key length.
        expected: usize,
        /// Length of the key that was passed in.
        actual: usize,
    },
    /// A UUID operation was used on a map not configured for 16-byte keys.
    UnsupportedKeyMode {
        /// Configured key length.
        key_len: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsupportedKeyLength(len) => {
                write!(f, "key length {} not supported (expected 16, 20 or 32)", len)
            }
            Error::InvalidShardCount => write!(f, "shard count must be greater than 0"),
            Error::InvalidDepth => write!(f, "depth must be greater than 0"),
            Error::KeyLengthMismatch { expected, actual } => {
                write!(f, "length of key bytes should be {}, got {}", expected, actual)
            }
            Error::UnsupportedKeyMode { key_len } => {
                write!(f, "map key type is not uuid (key length is {})", key_len)
            }
        }
    }
}

impl std::error::Error for Error {}
