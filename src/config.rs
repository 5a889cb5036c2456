use crate::error::Error;
use crate::hash::{Fnv32a, KeyTraversal};
use crate::key::KeyLen;
use std::num::NonZeroUsize;

/// Which key bytes feed the shard hash.
#[derive(Default)]
pub enum Traversal {
    /// Hash every byte (default).
    #[default]
    Full,
    /// Hash every `step`-th byte, starting at 0.
    Strided(NonZeroUsize),
    /// User-provided traversal.
    Custom(Box<dyn KeyTraversal>),
}

impl std::fmt::Debug for Traversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Traversal::Full => write!(f, "Traversal::Full"),
            Traversal::Strided(step) => write!(f, "Traversal::Strided({})", step),
            Traversal::Custom(_) => write!(f, "Traversal::Custom(...)"),
        }
    }
}

/// Configuration for a RingShardMap instance.
#[derive(Debug)]
pub struct Config {
    pub(crate) shard_count: usize,
    pub(crate) depth: usize,
    pub(crate) key_len: KeyLen,
    pub(crate) traversal: Traversal,
}

impl Config {
    /// Create a new config with defaults (16 shards, depth 1024, 32-byte keys,
    /// full traversal).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Must be greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        if count == 0 {
            return Err(Error::InvalidShardCount);
        }
        self.shard_count = count;
        Ok(self)
    }

    /// Set the maximum number of keys each shard holds. Must be greater than 0.
    pub fn depth(mut self, depth: usize) -> Result<Self, Error> {
        if depth == 0 {
            return Err(Error::InvalidDepth);
        }
        self.depth = depth;
        Ok(self)
    }

    /// Set the key length in bytes. Must be 16, 20 or 32.
    pub fn key_len(mut self, len: usize) -> Result<Self, Error> {
        self.key_len = KeyLen::try_from(len)?;
        Ok(self)
    }

    /// Set how keys are traversed when hashing.
    pub fn traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: 16,
            depth: 1024,
            key_len: KeyLen::Hash,
            traversal: Traversal::Full,
        }
    }
}

/// Builder for creating a RingShardMap with custom configuration.
pub struct RingShardMapBuilder {
    config: Config,
}

impl RingShardMapBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the number of shards. Must be greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.shard_count(count)?;
        Ok(self)
    }

    /// Set the per-shard depth. Must be greater than 0.
    pub fn depth(mut self, depth: usize) -> Result<Self, Error> {
        self.config = self.config.depth(depth)?;
        Ok(self)
    }

    /// Set the key length in bytes (16, 20 or 32).
    pub fn key_len(mut self, len: usize) -> Result<Self, Error> {
        self.config = self.config.key_len(len)?;
        Ok(self)
    }

    /// Hash only every `step`-th key byte.
    pub fn strided(mut self, step: NonZeroUsize) -> Self {
        self.config = self.config.traversal(Traversal::Strided(step));
        self
    }

    /// Set the key traversal.
    pub fn traversal(mut self, traversal: Traversal) -> Self {
        self.config = self.config.traversal(traversal);
        self
    }

    /// Build a RingShardMap with the configured settings.
    pub fn build<V>(self) -> Result<crate::RingShardMap<V>, Error>
    where
        V: Send + Sync,
    {
        crate::RingShardMap::with_config(self.config)
    }
}

impl Default for RingShardMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the shard hasher for a configuration.
pub(crate) fn create_hasher(traversal: Traversal, shard_count: usize) -> Fnv32a {
    Fnv32a::new(traversal, shard_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.shard_count, 16);
        assert_eq!(config.depth, 1024);
        assert_eq!(config.key_len, KeyLen::Hash);
        assert!(matches!(config.traversal, Traversal::Full));
    }

    #[test]
    fn test_validation() {
        assert_eq!(Config::new().shard_count(0).unwrap_err(), Error::InvalidShardCount);
        assert_eq!(Config::new().depth(0).unwrap_err(), Error::InvalidDepth);
        assert_eq!(
            Config::new().key_len(64).unwrap_err(),
            Error::UnsupportedKeyLength(64)
        );
        // Any positive shard count works, not just powers of two.
        assert!(Config::new().shard_count(7).is_ok());
    }

    #[test]
    fn test_traversal_debug() {
        let step = NonZeroUsize::new(4).unwrap();
        assert_eq!(format!("{:?}", Traversal::Strided(step)), "Traversal::Strided(4)");
    }
}
