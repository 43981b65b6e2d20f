//! Compiled search patterns (Knuth-Morris-Pratt)

/// A delimiter with its precomputed KMP failure table.
///
/// Build once per configuration and reuse for every search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<u8>,
    /// `failure[i]` is the length of the longest proper prefix of
    /// `bytes[..=i]` that is also a suffix of it
    failure: Vec<usize>,
}

impl Pattern {
    /// Compile a pattern
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            failure: failure_table(bytes),
        }
    }

    /// Raw pattern bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pattern length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the pattern is empty (an empty pattern never matches)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The KMP failure table
    pub fn failure(&self) -> &[usize] {
        &self.failure
    }

    /// Feed one haystack byte into a running match of `matched` bytes and
    /// return the new matched length.
    #[inline]
    pub(crate) fn step(&self, mut matched: usize, byte: u8) -> usize {
        while matched > 0 && self.bytes[matched] != byte {
            matched = self.failure[matched - 1];
        }
        if self.bytes[matched] == byte {
            matched += 1;
        }
        matched
    }

    /// First occurrence in a contiguous slice
    pub fn find_in(&self, haystack: &[u8]) -> Option<usize> {
        if self.is_empty() || haystack.len() < self.len() {
            return None;
        }
        let mut matched = 0;
        for (i, &byte) in haystack.iter().enumerate() {
            matched = self.step(matched, byte);
            if matched == self.len() {
                return Some(i + 1 - self.len());
            }
        }
        None
    }
}

impl From<&[u8]> for Pattern {
    fn from(bytes: &[u8]) -> Self {
        Pattern::new(bytes)
    }
}

fn failure_table(pattern: &[u8]) -> Vec<usize> {
    let mut table = vec![0; pattern.len()];
    let mut len = 0;
    let mut i = 1;
    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            table[i] = len;
            i += 1;
        } else if len != 0 {
            len = table[len - 1];
        } else {
            table[i] = 0;
            i += 1;
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_table() {
        assert_eq!(Pattern::new(b"AAAA").failure(), &[0, 1, 2, 3]);
        assert_eq!(Pattern::new(b"ABAB").failure(), &[0, 0, 1, 2]);
        assert_eq!(Pattern::new(b"AABAAA").failure(), &[0, 1, 0, 1, 2, 2]);
        assert!(Pattern::new(b"").failure().is_empty());
    }

    #[test]
    fn test_find_in_with_partial_matches() {
        let pattern = Pattern::new(b"ABABC");
        assert_eq!(pattern.find_in(b"ABABABABC"), Some(4));
        assert_eq!(pattern.find_in(b"ABABAB"), None);
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        assert_eq!(Pattern::new(b"").find_in(b"abc"), None);
    }
}
