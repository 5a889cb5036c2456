//! Statistics types.

#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-shard operation statistics.
#[derive(Debug, Clone, Default)]
pub struct ShardOps {
    /// Number of lookups that found their key.
    pub reads: u64,
    /// Number of inserts and value swaps.
    pub writes: u64,
    /// Number of explicit removals that found their key.
    pub removes: u64,
    /// Number of keys pushed out by the ring buffer.
    pub evictions: u64,
    /// Number of lock acquisitions (0 when metrics feature disabled).
    pub lock_acquisitions: u64,
    /// Cumulative lock wait time in nanoseconds (0 when lock-timing disabled).
    pub lock_wait_nanos: u64,
}

/// Thread-safe statistics tracker for a single shard.
#[cfg(feature = "metrics")]
pub(crate) struct ShardStats {
    reads: AtomicU64,
    writes: AtomicU64,
    removes: AtomicU64,
    evictions: AtomicU64,
    lock_acquisitions: AtomicU64,
    #[cfg(feature = "lock-timing")]
    lock_wait_nanos: AtomicU64,
}

#[cfg(feature = "metrics")]
impl ShardStats {
    pub fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            removes: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            lock_acquisitions: AtomicU64::new(0),
            #[cfg(feature = "lock-timing")]
            lock_wait_nanos: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_lock_acquisition(&self) {
        self.lock_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg(feature = "lock-timing")]
    #[inline]
    pub fn record_lock_wait(&self, nanos: u64) {
        self.lock_wait_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ShardOps {
        ShardOps {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            lock_acquisitions: self.lock_acquisitions.load(Ordering::Relaxed),
            #[cfg(feature = "lock-timing")]
            lock_wait_nanos: self.lock_wait_nanos.load(Ordering::Relaxed),
            #[cfg(not(feature = "lock-timing"))]
            lock_wait_nanos: 0,
        }
    }
}

/// Zero-sized placeholder when metrics are disabled.
#[cfg(not(feature = "metrics"))]
pub(crate) struct ShardStats;

#[cfg(not(feature = "metrics"))]
impl ShardStats {
    pub fn new() -> Self {
        ShardStats
    }

    #[inline]
    pub fn record_read(&self) {}

    #[inline]
    pub fn record_write(&self) {}

    #[inline]
    pub fn record_remove(&self) {}

    #[inline]
    pub fn record_eviction(&self) {}

    #[inline]
    pub fn record_lock_acquisition(&self) {}

    pub fn snapshot(&self) -> ShardOps {
        ShardOps::default()
    }
}

/// Aggregate statistics for a RingShardMap instance.
#[derive(Debug, Clone)]
pub struct Stats {
    /// Total number of entries across all shards.
    pub size: usize,
    /// Maximum number of entries the map can hold (`shard_count * depth`).
    pub capacity: usize,
    /// Number of entries in each shard.
    pub shard_sizes: Vec<usize>,
    /// Operation counts for each shard.
    pub operations: Vec<ShardOps>,
}

impl Stats {
    /// Sum of evictions over all shards (0 when metrics disabled).
    pub fn total_evictions(&self) -> u64 {
        self.operations.iter().map(|op| op.evictions).sum()
    }
}
