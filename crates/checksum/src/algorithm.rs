//! Checksum Algorithm Definitions

use crate::crc;
use crate::error::ChecksumError;
use crate::sum;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Supported checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// CRC-8/SMBUS (poly 0x07)
    Crc8,
    /// CRC-16/ARC (ANSI/IBM poly 0x8005)
    Crc16,
    /// CRC-16/XMODEM (CCITT poly 0x1021)
    Crc16Ccitt,
    /// CRC-32 (IEEE 802.3)
    Crc32,
    /// 8-bit additive sum
    Sum8,
    /// 8-bit XOR
    Xor8,
    /// Fletcher-16
    Fletcher16,
    /// Fletcher-32
    Fletcher32,
    /// MD5 digest
    Md5,
    /// SHA-1 digest
    Sha1,
    /// SHA-256 digest
    Sha256,
}

impl Algorithm {
    /// Every supported algorithm, in display order
    pub const ALL: [Algorithm; 11] = [
        Algorithm::Crc8,
        Algorithm::Crc16,
        Algorithm::Crc16Ccitt,
        Algorithm::Crc32,
        Algorithm::Sum8,
        Algorithm::Xor8,
        Algorithm::Fletcher16,
        Algorithm::Fletcher32,
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha256,
    ];

    /// Resolve an algorithm name.
    ///
    /// Matching ignores case, `-` and `_`, so `"CRC-16"`, `"crc16"` and
    /// `"CRC_16"` all resolve to [`Algorithm::Crc16`].
    pub fn lookup(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match key.as_str() {
            "CRC8" => Some(Algorithm::Crc8),
            "CRC16" | "CRC16ARC" | "CRC16IBM" => Some(Algorithm::Crc16),
            "CRC16CCITT" | "CRC16XMODEM" => Some(Algorithm::Crc16Ccitt),
            "CRC32" => Some(Algorithm::Crc32),
            "SUM" | "SUM8" | "CHECKSUM" => Some(Algorithm::Sum8),
            "XOR" | "XOR8" => Some(Algorithm::Xor8),
            "FLETCHER16" => Some(Algorithm::Fletcher16),
            "FLETCHER32" => Some(Algorithm::Fletcher32),
            "MD5" => Some(Algorithm::Md5),
            "SHA1" => Some(Algorithm::Sha1),
            "SHA256" => Some(Algorithm::Sha256),
            _ => None,
        }
    }

    /// Canonical display name
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Crc8 => "CRC-8",
            Algorithm::Crc16 => "CRC-16",
            Algorithm::Crc16Ccitt => "CRC-16-CCITT",
            Algorithm::Crc32 => "CRC-32",
            Algorithm::Sum8 => "Sum",
            Algorithm::Xor8 => "XOR",
            Algorithm::Fletcher16 => "Fletcher-16",
            Algorithm::Fletcher32 => "Fletcher-32",
            Algorithm::Md5 => "MD5",
            Algorithm::Sha1 => "SHA-1",
            Algorithm::Sha256 => "SHA-256",
        }
    }

    /// Digest length in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            Algorithm::Crc8 | Algorithm::Sum8 | Algorithm::Xor8 => 1,
            Algorithm::Crc16 | Algorithm::Crc16Ccitt | Algorithm::Fletcher16 => 2,
            Algorithm::Crc32 | Algorithm::Fletcher32 => 4,
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 => 32,
        }
    }

    /// Whether this is a cryptographic digest (seed is ignored)
    pub fn is_hash(&self) -> bool {
        matches!(self, Algorithm::Md5 | Algorithm::Sha1 | Algorithm::Sha256)
    }

    /// Compute the digest of `data`.
    ///
    /// `seed` replaces the initial register of CRCs and the initial
    /// accumulator of sums, truncated to the register width. Hashes ignore it.
    /// Multi-byte results are big-endian.
    pub fn compute(&self, data: &[u8], seed: Option<u32>) -> Vec<u8> {
        match self {
            Algorithm::Crc8 => vec![crc::crc8(data, seed.unwrap_or(0) as u8)],
            Algorithm::Crc16 => crc::crc16_arc(data, seed.unwrap_or(0) as u16)
                .to_be_bytes()
                .to_vec(),
            Algorithm::Crc16Ccitt => crc::crc16_ccitt(data, seed.unwrap_or(0) as u16)
                .to_be_bytes()
                .to_vec(),
            Algorithm::Crc32 => crc::crc32(data, seed.unwrap_or(crc::CRC32_INIT))
                .to_be_bytes()
                .to_vec(),
            Algorithm::Sum8 => vec![sum::sum8(data, seed.unwrap_or(0) as u8)],
            Algorithm::Xor8 => vec![sum::xor8(data, seed.unwrap_or(0) as u8)],
            Algorithm::Fletcher16 => sum::fletcher16(data, seed.unwrap_or(0) as u16).to_vec(),
            Algorithm::Fletcher32 => sum::fletcher32(data, seed.unwrap_or(0)).to_vec(),
            Algorithm::Md5 => Md5::digest(data).to_vec(),
            Algorithm::Sha1 => Sha1::digest(data).to_vec(),
            Algorithm::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::lookup(s).ok_or_else(|| ChecksumError::UnsupportedAlgorithm(s.to_string()))
    }
}
