//! SHA-256 digests for checking what the server says it received.

use crate::core::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Hash calculator for uploaded files.
pub struct HashCalculator;

impl HashCalculator {
    /// Hex SHA-256 of a file, streamed from disk.
    pub fn sha256_file(path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut BufReader::new(file), &mut hasher)
            .map_err(|e| Error::file_read(path, e))?;
        Ok(hex::encode(hasher.finalize()))
    }

    /// Hex SHA-256 of an in-memory buffer.
    pub fn sha256_bytes(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Compare a file against a digest reported by the server (case-insensitive).
    pub fn verify_sha256(path: &Path, expected: &str) -> Result<bool> {
        Ok(Self::sha256_file(path)?.eq_ignore_ascii_case(expected.trim()))
    }
}
