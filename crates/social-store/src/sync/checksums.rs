//! Checksums of generated DDL
//!
//! Computes SHA256 checksums so a changed declaration is detected against
//! an already materialized table

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
