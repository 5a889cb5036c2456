use crate::config::Traversal;
use std::num::NonZeroUsize;

/// FNV-1a 32-bit offset basis.
pub const OFFSET_BASIS: u32 = 2166136261;
/// FNV-1a 32-bit prime.
pub const PRIME: u32 = 16777619;

/// Decides which bytes of a key feed the shard hash.
///
/// `byte_at` is called for every `i` in `0..length(key)`, so implementations
/// must keep the indices they read inside `key`.
pub trait KeyTraversal: Send + Sync {
    /// The `i`-th byte visited.
    fn byte_at(&self, key: &[u8], i: usize) -> u8;

    /// Number of bytes visited.
    fn length(&self, key: &[u8]) -> usize;
}

/// Visits every byte of the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullScan;

impl KeyTraversal for FullScan {
    #[inline]
    fn byte_at(&self, key: &[u8], i: usize) -> u8 {
        key[i]
    }

    #[inline]
    fn length(&self, key: &[u8]) -> usize {
        key.len()
    }
}

/// Visits bytes `0, step, 2 * step, ...`.
///
/// Cheaper than [`FullScan`] but keys that only differ at skipped positions
/// land on the same shard. Pair it with a larger depth to make up for the
/// extra collisions.
#[derive(Debug, Clone, Copy)]
pub struct Strided {
    step: NonZeroUsize,
}

impl Strided {
    /// Create a strided traversal with the given step.
    pub fn new(step: NonZeroUsize) -> Self {
        Self { step }
    }

    /// The step between visited bytes.
    pub fn step(&self) -> NonZeroUsize {
        self.step
    }
}

impl KeyTraversal for Strided {
    #[inline]
    fn byte_at(&self, key: &[u8], i: usize) -> u8 {
        key[i * self.step.get()]
    }

    #[inline]
    fn length(&self, key: &[u8]) -> usize {
        key.len().div_ceil(self.step.get())
    }
}

impl KeyTraversal for Traversal {
    #[inline]
    fn byte_at(&self, key: &[u8], i: usize) -> u8 {
        match self {
            Traversal::Full => FullScan.byte_at(key, i),
            Traversal::Strided(step) => Strided::new(*step).byte_at(key, i),
            Traversal::Custom(custom) => custom.byte_at(key, i),
        }
    }

    #[inline]
    fn length(&self, key: &[u8]) -> usize {
        match self {
            Traversal::Full => FullScan.length(key),
            Traversal::Strided(step) => Strided::new(*step).length(key),
            Traversal::Custom(custom) => custom.length(key),
        }
    }
}

/// FNV-1a (32-bit) over the bytes picked by a traversal, clamped to a
/// shard domain.
///
/// The clamp is a plain modulo, so shard selection is slightly biased when
/// the domain size does not divide 2^32.
#[derive(Debug)]
pub struct Fnv32a {
    traversal: Traversal,
    domain_size: usize,
}

impl Fnv32a {
    /// Create a hasher for indices in `[0, domain_size)`. A domain size of
    /// 0 or 1 leaves the raw 32-bit hash unclamped.
    pub fn new(traversal: Traversal, domain_size: usize) -> Self {
        Self {
            traversal,
            domain_size,
        }
    }

    /// Size of the index domain.
    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    /// Raw 32-bit FNV-1a hash of the traversed bytes.
    pub fn hash32(&self, key: &[u8]) -> u32 {
        let mut hash = OFFSET_BASIS;
        for i in 0..self.traversal.length(key) {
            hash ^= u32::from(self.traversal.byte_at(key, i));
            hash = hash.wrapping_mul(PRIME);
        }
        hash
    }

    /// Fold a raw hash into the domain.
    #[inline]
    pub fn clamp(&self, hash: u32) -> usize {
        if self.domain_size <= 1 {
            hash as usize
        } else {
            hash as usize % self.domain_size
        }
    }

    /// Hash a key to its index.
    #[inline]
    pub fn index(&self, key: &[u8]) -> usize {
        self.clamp(self.hash32(key))
    }
}
