//! # nibblemap
//!
//! A fixed-capacity, memory-dense map from non-negative integer keys to small
//! 4-bit values (1-15), where 0 means "absent".
//!
//! The map is built for key spaces that are huge and mostly sparse: capacity
//! is fixed up front as a maximum decimal key length, and every addressable
//! key owns exactly one packed 4-bit slot. Storage cost is half a byte per
//! addressable key, regardless of how many entries are live; the full 9-digit
//! key space costs about 500 MB.
//!
//! ## Example
//!
//! ```rust
//! use nibblemap::PackedMap;
//!
//! let mut map = PackedMap::new(6); // keys 0..=999999
//! map.set(100u64, 1u8);
//! map.set(200u64, 2u8);
//! map.set(300u64, 3u8);
//! map.remove(100u64);
//!
//! assert_eq!(map.get(200u64), 2);
//! assert!(!map.contains(100u64));
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.pop(200u64), 2);
//! assert_eq!(map.keys().collect::<Vec<_>>(), vec![300]);
//!
//! // Keys and values are also accepted in decimal string form.
//! map.set("400", "4");
//! assert_eq!(map.get(400u64), 4);
//! ```
//!
//! ## Limits
//!
//! - Keys are non-negative integers with at most `digits` decimal digits.
//! - Values are integers in `[0, 15]`; setting 0 is the same as removing.
//! - Capacity never changes after construction, except through the explicit
//!   opt-in path in [`PackedMap::load`].
//! - The map is single-threaded; wrap it in a lock for shared access.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bucket;
pub mod error;
pub mod iter;
pub mod key;
mod persist;

pub use error::{Error, Result};
pub use iter::{Items, Keys, Values};
pub use key::{MapKey, MapValue};

use std::path::Path;

use log::warn;

use bucket::{Bucket, BUCKET_BYTES, SLOTS_PER_BUCKET};

/// Smallest accepted capacity, in decimal digits.
pub const MIN_DIGITS: u32 = 3;

/// Largest accepted capacity. 19 is the last length for which every in-range
/// key fits in a `u64`.
pub const MAX_DIGITS: u32 = 19;

/// Largest storable value; slots are 4 bits wide.
pub const MAX_VALUE: u8 = 15;

/// How an operation reacts to a key that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Panic with a descriptive message, like slice indexing.
    #[default]
    Raise,
    /// Log a warning and treat the operation as a no-op: reads return 0,
    /// writes do nothing.
    WarnAndIgnore,
}

/// Construction-time configuration. Fixed for the lifetime of the map; only
/// the opt-in capacity fix in [`PackedMap::load`] can change `digits` later.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum decimal-digit length of a key, `3..=19`.
    pub digits: u32,
    /// Reaction to keys that fail validation.
    pub on_invalid_key: KeyPolicy,
    /// Skip the key range check for speed. The caller guarantees keys are in
    /// range; an out-of-range key then hits the natural slice bounds panic.
    pub skip_key_validation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            digits: 9,
            on_invalid_key: KeyPolicy::Raise,
            skip_key_validation: false,
        }
    }
}

/// A fixed-capacity map from integer keys to 4-bit values.
///
/// Keys with at most `digits` decimal digits map bijectively onto slots:
/// bucket `key / 100`, offset `key % 100`. Each bucket packs 100 slots into
/// 50 bytes. A slot value of 0 means the key is absent; a key set to 0 is
/// indistinguishable from a key never set.
pub struct PackedMap {
    buckets: Vec<Bucket>,
    digits: u32,
    on_invalid_key: KeyPolicy,
    skip_key_validation: bool,
}

impl PackedMap {
    /// Create an empty map accepting keys of at most `digits` decimal digits.
    ///
    /// # Panics
    ///
    /// Panics when `digits` is outside `3..=19`.
    pub fn new(digits: u32) -> Self {
        Self::with_config(Config {
            digits,
            ..Config::default()
        })
    }

    /// Create an empty map with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics when `config.digits` is outside `3..=19`.
    pub fn with_config(config: Config) -> Self {
        assert!(
            (MIN_DIGITS..=MAX_DIGITS).contains(&config.digits),
            "digits must be in {MIN_DIGITS}..={MAX_DIGITS}, got {}",
            config.digits
        );
        Self {
            buckets: vec![Bucket::ZERO; Self::bucket_count_for(config.digits)],
            digits: config.digits,
            on_invalid_key: config.on_invalid_key,
            skip_key_validation: config.skip_key_validation,
        }
    }

    fn bucket_count_for(digits: u32) -> usize {
        10usize.pow(digits - 2)
    }

    /// First key past the addressable range: `10^digits`.
    fn key_limit(&self) -> u64 {
        10u64.pow(self.digits)
    }

    #[inline]
    fn address(key: u64) -> (usize, usize) {
        (
            (key / SLOTS_PER_BUCKET) as usize,
            (key % SLOTS_PER_BUCKET) as usize,
        )
    }

    /// Validate a key down to its canonical integer, honoring the configured
    /// policy. `None` means the calling operation must no-op.
    fn check_key<K: MapKey>(&self, key: &K) -> Option<u64> {
        let parsed = key.to_key();
        if self.skip_key_validation {
            // Even unchecked mode needs an integer to form an address; input
            // with no numeric interpretation has no slot to touch.
            if parsed.is_none() {
                warn!("key has no numeric interpretation, ignoring");
            }
            return parsed;
        }
        let err = match parsed {
            None => Error::InvalidKey {
                reason: "key is not numeric".into(),
            },
            Some(k) if k >= self.key_limit() => Error::InvalidKey {
                reason: format!("key {k} out of range (max {} digits)", self.digits),
            },
            Some(k) => return Some(k),
        };
        match self.on_invalid_key {
            KeyPolicy::Raise => panic!("{err}"),
            KeyPolicy::WarnAndIgnore => {
                warn!("{err}, ignoring");
                None
            }
        }
    }

    /// Validate a value. Always non-fatal, regardless of the key policy.
    fn check_value<V: MapValue>(value: &V) -> Option<u8> {
        let err = match value.to_value() {
            Some(v) if v <= MAX_VALUE as u64 => return Some(v as u8),
            Some(v) => Error::InvalidValue {
                reason: format!("value {v} outside storable range 0..={MAX_VALUE}"),
            },
            None => Error::InvalidValue {
                reason: "value is not numeric".into(),
            },
        };
        warn!("{err}, ignoring");
        None
    }

    /// Look up the value for `key`. Returns 0 when the key is absent, or when
    /// the key is invalid under [`KeyPolicy::WarnAndIgnore`].
    pub fn get(&self, key: impl MapKey) -> u8 {
        let Some(k) = self.check_key(&key) else {
            return 0;
        };
        let (bucket, slot) = Self::address(k);
        self.buckets[bucket].get(slot)
    }

    /// Store `value` for `key`, overwriting only the one target slot.
    ///
    /// Setting 0 removes the entry. An invalid value is never fatal: a
    /// warning is logged and the map is left untouched.
    pub fn set(&mut self, key: impl MapKey, value: impl MapValue) {
        let Some(k) = self.check_key(&key) else {
            return;
        };
        let Some(v) = Self::check_value(&value) else {
            return;
        };
        let (bucket, slot) = Self::address(k);
        self.buckets[bucket].set(slot, v);
    }

    /// Remove the entry for `key`. Equivalent to `set(key, 0)`.
    pub fn remove(&mut self, key: impl MapKey) {
        let Some(k) = self.check_key(&key) else {
            return;
        };
        let (bucket, slot) = Self::address(k);
        self.buckets[bucket].set(slot, 0);
    }

    /// True when `key` holds a non-zero value.
    pub fn contains(&self, key: impl MapKey) -> bool {
        self.get(key) > 0
    }

    /// Remove the entry for `key` and return the value it held (0 when it
    /// held nothing).
    pub fn pop(&mut self, key: impl MapKey) -> u8 {
        let Some(k) = self.check_key(&key) else {
            return 0;
        };
        let (bucket, slot) = Self::address(k);
        let value = self.buckets[bucket].get(slot);
        self.buckets[bucket].set(slot, 0);
        value
    }

    /// Number of keys holding a non-zero value. Scans every bucket.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Bucket::count_nonzero).sum()
    }

    /// True when no key holds a non-zero value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, keeping the configured capacity.
    pub fn clear(&mut self) {
        self.buckets = vec![Bucket::ZERO; self.buckets.len()];
    }

    /// Lazy iterator over keys with a non-zero value, in ascending order.
    pub fn keys(&self) -> Keys<'_> {
        iter::keys(&self.buckets)
    }

    /// Lazy iterator over non-zero values, in ascending key order.
    pub fn values(&self) -> Values<'_> {
        iter::values(&self.buckets)
    }

    /// Lazy iterator over `(key, value)` pairs, in ascending key order.
    pub fn items(&self) -> Items<'_> {
        iter::items(&self.buckets)
    }

    /// Configured capacity, in decimal digits.
    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Number of buckets in the backing store: `10^(digits - 2)`.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bytes of backing storage.
    pub fn memory_usage(&self) -> usize {
        self.buckets.len() * BUCKET_BYTES
    }

    /// Serialize the map to `path`.
    ///
    /// The blob is staged in a temporary file in the destination directory
    /// and atomically renamed over the target, so readers never observe a
    /// partial file. I/O failures come back as `Err`; the map is unchanged
    /// either way.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::write_atomic(path.as_ref(), &self.buckets)
    }

    /// Replace the map's contents with the blob at `path`.
    ///
    /// The file's capacity is recovered from its bucket count. When it
    /// differs from this map's `digits`, the load is rejected with
    /// [`Error::CapacityMismatch`] unless `fix_incorrect_length` is true, in
    /// which case the map adopts the file's capacity. That path is a
    /// destructive reconfiguration: the previous capacity is gone.
    ///
    /// On any error the current contents are left untouched; the blob is
    /// fully validated before any state is replaced.
    pub fn load(&mut self, path: impl AsRef<Path>, fix_incorrect_length: bool) -> Result<()> {
        let buckets = persist::read_buckets(path.as_ref())?;
        let file_digits = digits_for_bucket_count(buckets.len() as u64).ok_or_else(|| {
            Error::CorruptFile {
                reason: format!("bucket count {} is not a valid capacity", buckets.len()),
            }
        })?;
        if file_digits != self.digits {
            if !fix_incorrect_length {
                return Err(Error::CapacityMismatch {
                    file_digits,
                    current_digits: self.digits,
                });
            }
            self.digits = file_digits;
        }
        self.buckets = buckets;
        Ok(())
    }
}

/// Capacity whose backing store has exactly `bucket_count` buckets, i.e. the
/// decimal digit count of the largest addressable key. `None` when no valid
/// capacity produces that bucket count.
fn digits_for_bucket_count(bucket_count: u64) -> Option<u32> {
    (MIN_DIGITS..=MAX_DIGITS).find(|&d| 10u64.pow(d - 2) == bucket_count)
}

impl Default for PackedMap {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl std::fmt::Debug for PackedMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}


#[cfg(test)]
mod proptests;
