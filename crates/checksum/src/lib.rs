//! Checksum Engine
//!
//! Pure functions that map an algorithm name and payload to a fixed-length
//! digest. Unknown or empty algorithm names degrade to "no checksum" (a
//! zero-length digest) so a misconfiguration never halts a deframing pipeline.

mod algorithm;
mod crc;
mod error;
mod sum;

pub use algorithm::Algorithm;
pub use error::ChecksumError;

/// Digest length for `algorithm`, or 0 if the name is empty or unknown
pub fn length_of(algorithm: &str) -> usize {
    Algorithm::lookup(algorithm).map_or(0, |alg| alg.digest_len())
}

/// Compute the digest of `data` with the named algorithm.
///
/// Returns an empty vector for an empty or unknown name.
pub fn compute(algorithm: &str, data: &[u8], seed: Option<u32>) -> Vec<u8> {
    match Algorithm::lookup(algorithm) {
        Some(alg) => alg.compute(data, seed),
        None => Vec::new(),
    }
}

/// Check `expected` against the digest of `data`; exact byte comparison
pub fn verify(algorithm: &str, data: &[u8], expected: &[u8]) -> bool {
    compute(algorithm, data, None) == expected
}

/// Canonical names of every supported algorithm
pub fn supported_algorithms() -> Vec<&'static str> {
    Algorithm::ALL.iter().map(|alg| alg.name()).collect()
}

/// Whether `algorithm` resolves. The empty name means "none" and is accepted.
pub fn is_supported(algorithm: &str) -> bool {
    algorithm.is_empty() || Algorithm::lookup(algorithm).is_some()
}
