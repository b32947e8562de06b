//! Lazy iteration over non-zero entries.
//!
//! All three iterators walk buckets in ascending index order and slots in
//! ascending offset order, which is ascending numeric key order since
//! `key = bucket * 100 + offset`. Buckets holding no entries are skipped
//! without a per-slot scan.

use crate::bucket::{Bucket, SLOTS_PER_BUCKET};

/// Shared walker yielding `(key, value)` for every non-zero slot.
struct Entries<'a> {
    buckets: &'a [Bucket],
    bucket: usize,
    slot: usize,
}

impl<'a> Entries<'a> {
    fn new(buckets: &'a [Bucket]) -> Self {
        Self {
            buckets,
            bucket: 0,
            slot: 0,
        }
    }
}

impl Iterator for Entries<'_> {
    type Item = (u64, u8);

    fn next(&mut self) -> Option<(u64, u8)> {
        while self.bucket < self.buckets.len() {
            let b = &self.buckets[self.bucket];
            if self.slot == 0 && b.is_zero() {
                self.bucket += 1;
                continue;
            }
            while self.slot < SLOTS_PER_BUCKET as usize {
                let slot = self.slot;
                self.slot += 1;
                let value = b.get(slot);
                if value != 0 {
                    let key = self.bucket as u64 * SLOTS_PER_BUCKET + slot as u64;
                    return Some((key, value));
                }
            }
            self.slot = 0;
            self.bucket += 1;
        }
        None
    }
}

/// Iterator over keys with a non-zero value. Created by
/// [`PackedMap::keys`](crate::PackedMap::keys).
pub struct Keys<'a> {
    inner: Entries<'a>,
}

impl Iterator for Keys<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// Iterator over non-zero values, in key order. Created by
/// [`PackedMap::values`](crate::PackedMap::values).
pub struct Values<'a> {
    inner: Entries<'a>,
}

impl Iterator for Values<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.inner.next().map(|(_, value)| value)
    }
}

/// Iterator over `(key, value)` pairs with a non-zero value. Created by
/// [`PackedMap::items`](crate::PackedMap::items).
pub struct Items<'a> {
    inner: Entries<'a>,
}

impl Iterator for Items<'_> {
    type Item = (u64, u8);

    fn next(&mut self) -> Option<(u64, u8)> {
        self.inner.next()
    }
}

pub(crate) fn keys(buckets: &[Bucket]) -> Keys<'_> {
    Keys {
        inner: Entries::new(buckets),
    }
}

pub(crate) fn values(buckets: &[Bucket]) -> Values<'_> {
    Values {
        inner: Entries::new(buckets),
    }
}

pub(crate) fn items(buckets: &[Bucket]) -> Items<'_> {
    Items {
        inner: Entries::new(buckets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets_with(entries: &[(u64, u8)], bucket_count: usize) -> Vec<Bucket> {
        let mut buckets = vec![Bucket::ZERO; bucket_count];
        for &(key, value) in entries {
            let bucket = (key / SLOTS_PER_BUCKET) as usize;
            let slot = (key % SLOTS_PER_BUCKET) as usize;
            buckets[bucket].set(slot, value);
        }
        buckets
    }

    #[test]
    fn test_empty() {
        let buckets = vec![Bucket::ZERO; 10];
        assert_eq!(keys(&buckets).next(), None);
        assert_eq!(values(&buckets).next(), None);
        assert_eq!(items(&buckets).next(), None);
    }

    #[test]
    fn test_ascending_key_order() {
        let buckets = buckets_with(&[(950, 3), (0, 1), (99, 15), (100, 2)], 10);
        let got: Vec<u64> = keys(&buckets).collect();
        assert_eq!(got, vec![0, 99, 100, 950]);

        let got: Vec<(u64, u8)> = items(&buckets).collect();
        assert_eq!(got, vec![(0, 1), (99, 15), (100, 2), (950, 3)]);

        let got: Vec<u8> = values(&buckets).collect();
        assert_eq!(got, vec![1, 15, 2, 3]);
    }

    #[test]
    fn test_skips_empty_buckets() {
        // Only the last bucket holds anything.
        let buckets = buckets_with(&[(9_999, 7)], 100);
        let got: Vec<(u64, u8)> = items(&buckets).collect();
        assert_eq!(got, vec![(9_999, 7)]);
    }

    #[test]
    fn test_restartable() {
        let buckets = buckets_with(&[(5, 1), (6, 2)], 1);
        let first: Vec<u64> = keys(&buckets).collect();
        let second: Vec<u64> = keys(&buckets).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_early_break() {
        let buckets = buckets_with(&[(1, 1), (2, 2), (300, 3)], 10);
        let first = keys(&buckets).next();
        assert_eq!(first, Some(1));
    }
}
