//! Versioned binary persistence.
//!
//! File layout, little-endian throughout:
//!
//! ```text
//! [magic b"NMAP"][version u8 = 1][bucket_count u64][bucket_count * 50 bytes]
//! ```
//!
//! `write_atomic` stages the blob in a temporary file in the destination's
//! directory and renames it over the target, so a reader never observes a
//! partially written file. `read_buckets` fully validates the blob before
//! returning; callers swap in the result only on success.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::bucket::{Bucket, BUCKET_BYTES};
use crate::error::{Error, Result};

const MAGIC: &[u8; 4] = b"NMAP";
const VERSION: u8 = 1;
const HEADER_BYTES: usize = 4 + 1 + 8;

pub(crate) fn write_atomic(path: &Path, buckets: &[Bucket]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut w = BufWriter::new(tmp.as_file());
        w.write_all(MAGIC)?;
        w.write_all(&[VERSION])?;
        w.write_all(&(buckets.len() as u64).to_le_bytes())?;
        for bucket in buckets {
            w.write_all(bucket.as_bytes())?;
        }
        w.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

pub(crate) fn read_buckets(path: &Path) -> Result<Vec<Bucket>> {
    let mut file = File::open(path)?;
    let mut blob = Vec::new();
    file.read_to_end(&mut blob)?;
    decode(&blob)
}

fn decode(blob: &[u8]) -> Result<Vec<Bucket>> {
    if blob.len() < 4 || &blob[0..4] != MAGIC {
        return Err(Error::BadMagic);
    }
    if blob.len() < HEADER_BYTES {
        return Err(Error::CorruptFile {
            reason: format!("{} bytes is too short for a header", blob.len()),
        });
    }
    let version = blob[4];
    if version != VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&blob[5..HEADER_BYTES]);
    let bucket_count = u64::from_le_bytes(count_bytes);

    let body = &blob[HEADER_BYTES..];
    let expected = bucket_count
        .checked_mul(BUCKET_BYTES as u64)
        .ok_or_else(|| Error::CorruptFile {
            reason: format!("implausible bucket count {bucket_count}"),
        })?;
    if body.len() as u64 != expected {
        return Err(Error::CorruptFile {
            reason: format!(
                "header declares {bucket_count} buckets ({expected} bytes), body has {}",
                body.len()
            ),
        });
    }

    let mut buckets = Vec::with_capacity(bucket_count as usize);
    for chunk in body.chunks_exact(BUCKET_BYTES) {
        let mut bytes = [0u8; BUCKET_BYTES];
        bytes.copy_from_slice(chunk);
        buckets.push(Bucket::from_bytes(bytes));
    }
    Ok(buckets)
}
