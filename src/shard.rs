use crate::key::FixedKey;
use crate::stats::ShardStats;
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

#[cfg(not(feature = "fxhash"))]
type StoreHasher = ahash::RandomState;
#[cfg(feature = "fxhash")]
type StoreHasher = fxhash::FxBuildHasher;

/// What a shard stores under a key.
pub(crate) enum Slot<V> {
    /// Key is present without a value (written by `contains_with_add`).
    Marker,
    /// Key holds a value.
    Value(Arc<V>),
}

impl<V> Slot<V> {
    pub fn into_value(self) -> Option<Arc<V>> {
        match self {
            Slot::Marker => None,
            Slot::Value(value) => Some(value),
        }
    }

    pub fn value(&self) -> Option<&Arc<V>> {
        match self {
            Slot::Marker => None,
            Slot::Value(value) => Some(value),
        }
    }
}

impl<V> Clone for Slot<V> {
    fn clone(&self) -> Self {
        match self {
            Slot::Marker => Slot::Marker,
            Slot::Value(value) => Slot::Value(Arc::clone(value)),
        }
    }
}

/// Result of writing a slot into a shard.
pub(crate) enum Upsert<V> {
    /// The key was new. Carries the key pushed out of the ring, if any.
    Inserted { evicted: Option<FixedKey> },
    /// The key existed and its slot was replaced.
    Replaced(Slot<V>),
    /// The key existed and the predicate kept its slot.
    Kept(Slot<V>),
}

impl<V> Upsert<V> {
    /// The slot held before the write, if the key was present.
    pub fn into_previous(self) -> Option<Slot<V>> {
        match self {
            Upsert::Inserted { .. } => None,
            Upsert::Replaced(previous) | Upsert::Kept(previous) => Some(previous),
        }
    }
}

/// A single shard: a bounded store behind a read-write lock.
pub(crate) struct Shard<V> {
    state: RwLock<ShardState<V>>,
    stats: ShardStats,
}

impl<V> Shard<V>
where
    V: Send + Sync,
{
    pub fn new(depth: usize) -> Self {
        Self {
            state: RwLock::new(ShardState::new(depth)),
            stats: ShardStats::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ShardState<V>> {
        #[cfg(feature = "lock-timing")]
        let start = std::time::Instant::now();
        let guard = self.state.read();
        #[cfg(feature = "lock-timing")]
        self.stats.record_lock_wait(start.elapsed().as_nanos() as u64);
        self.stats.record_lock_acquisition();
        guard
    }

    fn write(&self) -> RwLockWriteGuard<'_, ShardState<V>> {
        #[cfg(feature = "lock-timing")]
        let start = std::time::Instant::now();
        let guard = self.state.write();
        #[cfg(feature = "lock-timing")]
        self.stats.record_lock_wait(start.elapsed().as_nanos() as u64);
        self.stats.record_lock_acquisition();
        guard
    }

    /// Check whether a key is present (marker or value).
    pub fn contains(&self, key: &FixedKey) -> bool {
        let found = self.read().lookup(key).is_some();
        if found {
            self.stats.record_read();
        }
        found
    }

    /// Get the value stored under a key. Marked keys have none.
    pub fn get(&self, key: &FixedKey) -> Option<Arc<V>> {
        let state = self.read();
        let slot = state.lookup(key)?;
        self.stats.record_read();
        slot.value().cloned()
    }

    /// Report whether the key was present, marking it present if not.
    pub fn contains_or_mark(&self, key: FixedKey) -> bool {
        let mut state = self.write();
        if state.lookup(&key).is_some() {
            self.stats.record_read();
            return true;
        }
        let outcome = state.upsert_if(key, Slot::Marker, |_| true);
        self.record(&outcome);
        false
    }

    /// Insert or replace. Returns the previous slot if the key was present.
    pub fn upsert(&self, key: FixedKey, slot: Slot<V>) -> Option<Slot<V>> {
        self.upsert_if(key, slot, |_| true)
    }

    /// Like `upsert`, but an existing key is only replaced if `predicate`
    /// accepts its current value (`None` for a marker). New keys are
    /// inserted without consulting it.
    pub fn upsert_if<P>(&self, key: FixedKey, slot: Slot<V>, predicate: P) -> Option<Slot<V>>
    where
        P: FnOnce(Option<&V>) -> bool,
    {
        let outcome = self.write().upsert_if(key, slot, predicate);
        self.record(&outcome);
        outcome.into_previous()
    }

    /// Remove a key, returning its slot.
    pub fn remove(&self, key: &FixedKey) -> Option<Slot<V>> {
        let result = self.write().remove(key);
        if result.is_some() {
            self.stats.record_remove();
        }
        result
    }

    fn record(&self, outcome: &Upsert<V>) {
        match outcome {
            Upsert::Inserted { evicted } => {
                if let Some(evicted) = evicted {
                    self.stats.record_eviction();
                    tracing::trace!(key = ?evicted.as_bytes(), "evicted oldest key");
                }
                self.stats.record_write();
            }
            Upsert::Replaced(_) => self.stats.record_write(),
            Upsert::Kept(_) => {}
        }
    }

    /// Get the number of entries in this shard.
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    /// Get a snapshot of statistics for this shard.
    pub fn stats(&self) -> crate::stats::ShardOps {
        self.stats.snapshot()
    }
}

/// Shard contents. Only reachable through the shard's lock: shared for
/// `lookup`, exclusive for the rest.
pub(crate) struct ShardState<V> {
    store: HashMap<FixedKey, Slot<V>, StoreHasher>,
    /// Keys in insertion order; `cursor` points at the next one to evict.
    ring: Box<[Option<FixedKey>]>,
    cursor: usize,
}

impl<V> ShardState<V> {
    fn new(depth: usize) -> Self {
        Self {
            store: HashMap::with_capacity_and_hasher(depth, StoreHasher::default()),
            ring: vec![None; depth].into_boxed_slice(),
            cursor: 0,
        }
    }

    pub fn lookup(&self, key: &FixedKey) -> Option<&Slot<V>> {
        self.store.get(key)
    }

    /// Write `slot` under `key`. An existing key is replaced only if
    /// `predicate` accepts its current value, `None` standing for a marker.
    /// A new key takes the ring slot under the cursor, evicting its owner.
    pub fn upsert_if<P>(&mut self, key: FixedKey, slot: Slot<V>, predicate: P) -> Upsert<V>
    where
        P: FnOnce(Option<&V>) -> bool,
    {
        if let Some(current) = self.store.get_mut(&key) {
            if predicate(current.value().map(|v| v.as_ref())) {
                return Upsert::Replaced(std::mem::replace(current, slot));
            }
            return Upsert::Kept(current.clone());
        }

        let evicted = self.insert_new(key, slot);
        Upsert::Inserted { evicted }
    }

    /// Remove from the store. The ring slot stays; evicting it later is a no-op.
    pub fn remove(&mut self, key: &FixedKey) -> Option<Slot<V>> {
        self.store.remove(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    fn insert_new(&mut self, key: FixedKey, slot: Slot<V>) -> Option<FixedKey> {
        let evicted = self.ring[self.cursor]
            .take()
            .filter(|oldest| self.store.remove(oldest).is_some());
        self.ring[self.cursor] = Some(key);
        self.store.insert(key, slot);
        self.cursor = (self.cursor + 1) % self.ring.len();
        evicted
    }
}
