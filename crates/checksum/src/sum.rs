//! Additive and XOR checksums

/// 8-bit additive checksum. Wraps modulo 256 rather than saturating, so
/// every input byte affects the result.
pub fn sum8(data: &[u8], init: u8) -> u8 {
    data.iter().fold(init, |acc, &x| acc.wrapping_add(x))
}

/// 8-bit longitudinal XOR
pub fn xor8(data: &[u8], init: u8) -> u8 {
    data.iter().fold(init, |acc, &x| acc ^ x)
}

/// Fletcher-16, returned as `[sum2, sum1]`
pub fn fletcher16(data: &[u8], init: u16) -> [u8; 2] {
    let mut sum1 = init % 255;
    let mut sum2: u16 = 0;
    for &byte in data {
        sum1 = (sum1 + byte as u16) % 255;
        sum2 = (sum2 + sum1) % 255;
    }
    [sum2 as u8, sum1 as u8]
}

/// Fletcher-32 over big-endian 16-bit words; odd input is zero-padded.
/// Returned as `sum2` then `sum1`, both big-endian.
pub fn fletcher32(data: &[u8], init: u32) -> [u8; 4] {
    let mut sum1 = init % 65535;
    let mut sum2: u32 = 0;
    for word in data.chunks(2) {
        let hi = word[0] as u32;
        let lo = word.get(1).copied().unwrap_or(0) as u32;
        sum1 = (sum1 + ((hi << 8) | lo)) % 65535;
        sum2 = (sum2 + sum1) % 65535;
    }
    let [_, _, a, b] = sum2.to_be_bytes();
    let [_, _, c, d] = sum1.to_be_bytes();
    [a, b, c, d]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum8_wraps() {
        assert_eq!(sum8(&[0xFF, 0x02], 0), 0x01);
        assert_eq!(sum8(&[0x41, 0x0C, 0x1A, 0x2B], 0), 0x92);
    }

    #[test]
    fn test_xor8() {
        assert_eq!(xor8(&[0x01, 0x02, 0x04], 0), 0x07);
        assert_eq!(xor8(b"AA", 0), 0);
    }

    #[test]
    fn test_fletcher16_reference() {
        assert_eq!(fletcher16(b"abcde", 0), [0xC8, 0xF0]);
    }

    #[test]
    fn test_fletcher32_pads_odd_input() {
        assert_eq!(fletcher32(b"abcd", 0), [0x26, 0x29, 0xC4, 0xC6]);
        assert_eq!(fletcher32(b"a", 0), fletcher32(b"a\0", 0));
    }
}
