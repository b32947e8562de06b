//! Error types for map operations.

use thiserror::Error;

/// Error type for map operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Key is not numeric, is negative, or has more decimal digits than the
    /// map's capacity allows.
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected.
        reason: String,
    },

    /// Value is not numeric or is outside the storable range `[0, 15]`.
    #[error("invalid value: {reason}")]
    InvalidValue {
        /// Why the value was rejected.
        reason: String,
    },

    /// A loaded file was written with a different capacity.
    #[error("different lengths: {file_digits} digits in file, {current_digits} in current map")]
    CapacityMismatch {
        /// Capacity recorded in the file, in decimal digits.
        file_digits: u32,
        /// Capacity of the map performing the load.
        current_digits: u32,
    },

    /// File does not start with the expected magic bytes.
    #[error("not a nibblemap file: bad magic")]
    BadMagic,

    /// File uses a format version this build does not understand.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    /// File structure is inconsistent with its own header.
    #[error("corrupt file: {reason}")]
    CorruptFile {
        /// What was inconsistent.
        reason: String,
    },

    /// Underlying I/O failure during save or load.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for map operations.
pub type Result<T> = std::result::Result<T, Error>;
