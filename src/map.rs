use crate::config::{create_hasher, Config};
use crate::error::Error;
use crate::hash::Fnv32a;
use crate::key::{FixedKey, KeyLen};
use crate::shard::{Shard, Slot};
use crate::stats::{ShardOps, Stats};
use std::sync::Arc;

/// Bounded concurrent map over fixed-length byte keys.
///
/// Keys are spread across shards by FNV-1a; each shard has its own lock and
/// holds at most `depth` keys. When a shard is full, inserting a new key
/// evicts the key that was inserted `depth` insertions earlier, no matter
/// how recently it was read or updated. Values are stored as `Arc<V>`.
///
/// # Example
///
/// ```rust
/// use ringshard::RingShardMap;
///
/// let map = RingShardMap::new(64, 1024, 32)?;
/// let tx_hash = [0xabu8; 32];
///
/// assert!(map.get_and_swap(&tx_hash, Some("seen"))?.is_none());
/// assert_eq!(*map.get(&tx_hash)?.unwrap(), "seen");
/// assert!(map.contains(&tx_hash)?);
/// # Ok::<(), ringshard::Error>(())
/// ```
pub struct RingShardMap<V> {
    shards: Vec<Shard<V>>,
    hasher: Fnv32a,
    depth: usize,
    key_len: KeyLen,
}

impl<V> RingShardMap<V>
where
    V: Send + Sync,
{
    /// Create a map with `shard_count` shards of `depth` entries each, for
    /// keys of `key_len` bytes (16, 20 or 32).
    pub fn new(shard_count: usize, depth: usize, key_len: usize) -> Result<Self, Error> {
        let config = Config::new()
            .key_len(key_len)?
            .shard_count(shard_count)?
            .depth(depth)?;
        Self::with_config(config)
    }

    /// Create a new map with custom config.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        let shard_count = config.shard_count;
        let depth = config.depth;
        let mut shards = Vec::with_capacity(shard_count);
        for _ in 0..shard_count {
            shards.push(Shard::new(depth));
        }

        tracing::debug!(
            shard_count,
            depth,
            key_len = config.key_len.bytes(),
            traversal = ?config.traversal,
            "created ring shard map"
        );

        Ok(Self {
            shards,
            hasher: create_hasher(config.traversal, shard_count),
            depth,
            key_len: config.key_len,
        })
    }

    #[inline]
    fn index_of(&self, key: &[u8]) -> usize {
        let index = self.hasher.index(key);
        // A single-shard hasher leaves the hash unclamped.
        if self.shards.len() == 1 {
            0
        } else {
            index
        }
    }

    /// Validate and copy the key, and find its shard.
    fn route(&self, key: &[u8]) -> Result<(&Shard<V>, FixedKey), Error> {
        let fixed = FixedKey::copy_from(self.key_len, key)?;
        Ok((&self.shards[self.index_of(key)], fixed))
    }

    fn route_uuid(&self, key: &[u8; 16]) -> Result<(&Shard<V>, FixedKey), Error> {
        if self.key_len != KeyLen::Uuid {
            return Err(Error::UnsupportedKeyMode {
                key_len: self.key_len.bytes(),
            });
        }
        Ok((&self.shards[self.index_of(key)], FixedKey::from(*key)))
    }

    /// Index of the shard `key` belongs to.
    pub fn shard_index(&self, key: &[u8]) -> Result<usize, Error> {
        FixedKey::copy_from(self.key_len, key)?;
        Ok(self.index_of(key))
    }

    /// Check whether `key` is present. Takes the shard's read lock.
    pub fn contains(&self, key: &[u8]) -> Result<bool, Error> {
        let (shard, key) = self.route(key)?;
        Ok(shard.contains(&key))
    }

    /// Check whether `key` is present, marking it present if it was not.
    ///
    /// Returns whether the key was present before the call. A key added this
    /// way has no value: `get` returns `None` for it while `contains`
    /// returns `true`, and a later swap fills it in place.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ringshard::RingShardMap;
    ///
    /// let map: RingShardMap<()> = RingShardMap::new(16, 128, 20)?;
    /// let address = [1u8; 20];
    ///
    /// assert!(!map.contains_with_add(&address)?);
    /// assert!(map.contains_with_add(&address)?);
    /// # Ok::<(), ringshard::Error>(())
    /// ```
    pub fn contains_with_add(&self, key: &[u8]) -> Result<bool, Error> {
        let (shard, key) = self.route(key)?;
        Ok(shard.contains_or_mark(key))
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Arc<V>>, Error> {
        let (shard, key) = self.route(key)?;
        Ok(shard.get(&key))
    }

    /// Store `value` under `key` and return the previous value.
    ///
    /// Passing `None` removes the key instead. Inserting a new key into a
    /// full shard evicts that shard's oldest insertion.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ringshard::RingShardMap;
    ///
    /// let map = RingShardMap::new(8, 64, 16)?;
    /// let id = [9u8; 16];
    ///
    /// map.get_and_swap(&id, Some(1))?;
    /// assert_eq!(*map.get_and_swap(&id, Some(2))?.unwrap(), 1);
    /// assert_eq!(*map.get_and_swap(&id, None)?.unwrap(), 2);
    /// assert!(map.get(&id)?.is_none());
    /// # Ok::<(), ringshard::Error>(())
    /// ```
    pub fn get_and_swap(&self, key: &[u8], value: Option<V>) -> Result<Option<Arc<V>>, Error> {
        let (shard, key) = self.route(key)?;
        Ok(Self::swap(shard, key, value))
    }

    /// Like [`get_and_swap`](Self::get_and_swap), but an existing key is
    /// only replaced if `predicate` returns `true` for its current value.
    /// The predicate sees `None` for a key marked by
    /// [`contains_with_add`](Self::contains_with_add). A missing key is
    /// inserted without calling `predicate`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ringshard::RingShardMap;
    ///
    /// let map = RingShardMap::new(8, 64, 32)?;
    /// let key = [7u8; 32];
    ///
    /// // Keep the highest value seen.
    /// for n in [3, 9, 4] {
    ///     map.get_and_swap_if(&key, n, |current| current.map_or(true, |c| n > *c))?;
    /// }
    /// assert_eq!(*map.get(&key)?.unwrap(), 9);
    /// # Ok::<(), ringshard::Error>(())
    /// ```
    pub fn get_and_swap_if<P>(
        &self,
        key: &[u8],
        value: V,
        predicate: P,
    ) -> Result<Option<Arc<V>>, Error>
    where
        P: FnOnce(Option<&V>) -> bool,
    {
        let (shard, key) = self.route(key)?;
        let slot = Slot::Value(Arc::new(value));
        Ok(shard
            .upsert_if(key, slot, predicate)
            .and_then(Slot::into_value))
    }

    /// Remove `key`, returning its value. Same as `get_and_swap(key, None)`.
    pub fn remove(&self, key: &[u8]) -> Result<Option<Arc<V>>, Error> {
        self.get_and_swap(key, None)
    }

    /// [`get`](Self::get) for maps built with 16-byte keys.
    pub fn get_uuid(&self, key: &[u8; 16]) -> Result<Option<Arc<V>>, Error> {
        let (shard, key) = self.route_uuid(key)?;
        Ok(shard.get(&key))
    }

    /// [`get_and_swap`](Self::get_and_swap) for maps built with 16-byte keys.
    pub fn get_and_swap_uuid(
        &self,
        key: &[u8; 16],
        value: Option<V>,
    ) -> Result<Option<Arc<V>>, Error> {
        let (shard, key) = self.route_uuid(key)?;
        Ok(Self::swap(shard, key, value))
    }

    fn swap(shard: &Shard<V>, key: FixedKey, value: Option<V>) -> Option<Arc<V>> {
        let previous = match value {
            Some(value) => shard.upsert(key, Slot::Value(Arc::new(value))),
            None => shard.remove(&key),
        };
        previous.and_then(Slot::into_value)
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Maximum number of keys per shard.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Key length in bytes.
    pub fn key_len(&self) -> usize {
        self.key_len.bytes()
    }

    /// Maximum number of keys the map can hold.
    pub fn capacity(&self) -> usize {
        self.shards.len() * self.depth
    }

    /// Get the total number of entries across all shards.
    ///
    /// Takes every shard's read lock in turn, so the result may be stale
    /// under concurrent writes.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.len() == 0)
    }

    /// Number of entries in each shard.
    pub fn shard_loads(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.len()).collect()
    }

    /// Get detailed statistics about the map and its shards.
    pub fn stats(&self) -> Stats {
        let shard_sizes = self.shard_loads();
        let operations: Vec<ShardOps> = self.shards.iter().map(|s| s.stats()).collect();
        let size: usize = shard_sizes.iter().sum();

        Stats {
            size,
            capacity: self.capacity(),
            shard_sizes,
            operations,
        }
    }
}

impl<V> std::fmt::Debug for RingShardMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingShardMap")
            .field("shard_count", &self.shards.len())
            .field("depth", &self.depth)
            .field("key_len", &self.key_len)
            .field("hasher", &self.hasher)
            .finish()
    }
}
