//! Bucket: the fixed-width storage unit of the map.
//!
//! A bucket packs 100 independent 4-bit slots into 50 bytes, two slots per
//! byte. Slot `s` lives in byte `s / 2`; even slots occupy the high nibble,
//! so slot 0 is the most significant nibble of byte 0.

/// Number of nibble slots in one bucket.
pub const SLOTS_PER_BUCKET: u64 = 100;

/// Bytes of storage per bucket (two slots per byte).
pub const BUCKET_BYTES: usize = 50;

/// 100 packed 4-bit slots.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bucket([u8; BUCKET_BYTES]);

impl Bucket {
    /// A bucket with every slot zero.
    pub const ZERO: Bucket = Bucket([0; BUCKET_BYTES]);

    /// Read the slot at `slot` (0..100).
    #[inline]
    pub fn get(&self, slot: usize) -> u8 {
        debug_assert!(slot < SLOTS_PER_BUCKET as usize);
        let byte = self.0[slot / 2];
        if slot % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    }

    /// Overwrite the slot at `slot` with `value` (<= 15), leaving the other
    /// 99 slots untouched.
    #[inline]
    pub fn set(&mut self, slot: usize, value: u8) {
        debug_assert!(slot < SLOTS_PER_BUCKET as usize);
        debug_assert!(value <= 0x0F);
        let byte = &mut self.0[slot / 2];
        if slot % 2 == 0 {
            *byte = (*byte & 0x0F) | (value << 4);
        } else {
            *byte = (*byte & 0xF0) | value;
        }
    }

    /// True when every slot is zero. Lets iteration skip whole buckets.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; BUCKET_BYTES]
    }

    /// Number of non-zero slots, counted two nibbles per byte.
    pub fn count_nonzero(&self) -> usize {
        self.0
            .iter()
            .map(|&b| usize::from(b >> 4 != 0) + usize::from(b & 0x0F != 0))
            .sum()
    }

    /// Raw storage, for serialization.
    pub fn as_bytes(&self) -> &[u8; BUCKET_BYTES] {
        &self.0
    }

    /// Rebuild a bucket from its raw storage.
    pub fn from_bytes(bytes: [u8; BUCKET_BYTES]) -> Self {
        Bucket(bytes)
    }
}

impl Default for Bucket {
    fn default() -> Self {
        Self::ZERO
    }
}
