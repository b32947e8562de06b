//! Key and value input conversions.
//!
//! Keys and values are accepted both as native integers and as their decimal
//! string form; every accepted shape funnels to one canonical integer.
//! `None` means the input has no numeric interpretation (non-digit
//! characters, or a negative number).

/// Types usable as a map key.
pub trait MapKey {
    /// Canonical non-negative integer form of the key, if it has one.
    fn to_key(&self) -> Option<u64>;
}

/// Types usable as a map value.
pub trait MapValue {
    /// Canonical non-negative integer form of the value, if it has one.
    ///
    /// Range checking against the storable maximum happens at the call site,
    /// so out-of-range positives still convert here.
    fn to_value(&self) -> Option<u64>;
}

macro_rules! impl_unsigned {
    ($($t:ty)*) => {$(
        impl MapKey for $t {
            #[inline]
            fn to_key(&self) -> Option<u64> {
                Some(*self as u64)
            }
        }

        impl MapValue for $t {
            #[inline]
            fn to_value(&self) -> Option<u64> {
                Some(*self as u64)
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($t:ty)*) => {$(
        impl MapKey for $t {
            #[inline]
            fn to_key(&self) -> Option<u64> {
                u64::try_from(*self).ok()
            }
        }

        impl MapValue for $t {
            #[inline]
            fn to_value(&self) -> Option<u64> {
                u64::try_from(*self).ok()
            }
        }
    )*};
}

impl_unsigned!(u8 u16 u32 u64 usize);
impl_signed!(i8 i16 i32 i64 isize);

impl MapKey for str {
    fn to_key(&self) -> Option<u64> {
        self.parse::<u64>().ok()
    }
}

impl MapValue for str {
    fn to_value(&self) -> Option<u64> {
        self.parse::<u64>().ok()
    }
}

impl MapKey for String {
    fn to_key(&self) -> Option<u64> {
        self.as_str().to_key()
    }
}

impl MapValue for String {
    fn to_value(&self) -> Option<u64> {
        self.as_str().to_value()
    }
}

impl<T: MapKey + ?Sized> MapKey for &T {
    fn to_key(&self) -> Option<u64> {
        (**self).to_key()
    }
}

impl<T: MapValue + ?Sized> MapValue for &T {
    fn to_value(&self) -> Option<u64> {
        (**self).to_value()
    }
}
