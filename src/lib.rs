//! # RingShard
//!
//! A bounded, sharded concurrent map for fixed-length byte keys.
//!
//! RingShard is built for deduplication and membership caching over keys such
//! as UUIDs (16 bytes), addresses (20 bytes) and content hashes (32 bytes).
//! Keys are spread across shards with FNV-1a, each shard has its own lock,
//! and each shard holds at most `depth` keys. Once a shard is full, every new
//! key evicts the oldest insertion in that shard, so memory stays at
//! `shard_count * depth` entries for the life of the map.
//!
//! ## Features
//!
//! - **Bounded**: Fixed capacity chosen at construction, never resized
//! - **Thread-Safe**: One read-write lock per shard, no global lock
//! - **Deterministic**: Same key always maps to the same shard
//! - **Tunable Hashing**: Hash every key byte or only every n-th byte
//! - **Statistics**: Per-shard operation tracking (`metrics` feature)
//!
//! Eviction follows insertion order only. Reads and value swaps do not
//! protect a key from eviction.
//!
//! ## Example
//!
//! ```rust
//! use ringshard::RingShardMap;
//!
//! // 1 shard of depth 4 for 32-byte keys.
//! let map = RingShardMap::new(1, 4, 32)?;
//!
//! for n in 1..=5u8 {
//!     map.get_and_swap(&[n; 32], Some(n))?;
//! }
//!
//! // The first key was pushed out by the fifth.
//! assert!(!map.contains(&[1; 32])?);
//! assert!(map.contains(&[5; 32])?);
//! assert_eq!(map.len(), 4);
//! # Ok::<(), ringshard::Error>(())
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use ringshard::RingShardMapBuilder;
//! use std::num::NonZeroUsize;
//!
//! // Hash every 4th byte and make up for the extra collisions with depth.
//! let map = RingShardMapBuilder::new()
//!     .shard_count(64)?
//!     .depth(4096)?
//!     .key_len(32)?
//!     .strided(NonZeroUsize::new(4).unwrap())
//!     .build::<u64>()?;
//!
//! assert_eq!(map.capacity(), 64 * 4096);
//! # Ok::<(), ringshard::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Key traversal and shard hashing.
pub mod hash;
/// Fixed-length key types.
pub mod key;
/// Main RingShardMap implementation.
pub mod map;
/// Internal shard implementation.
mod shard;
/// Statistics and metrics collection.
pub mod stats;

// Re-export main types
pub use config::{Config, RingShardMapBuilder, Traversal};
pub use error::Error;
pub use hash::{Fnv32a, FullScan, KeyTraversal, Strided};
pub use key::{FixedKey, KeyLen};
pub use map::RingShardMap;
pub use stats::{ShardOps, Stats};
