//! Table-driven CRC implementations
//!
//! Lookup tables are generated at compile time from the polynomial.

/// CRC-8 polynomial (x^8 + x^2 + x + 1)
const CRC8_POLY: u8 = 0x07;
/// CRC-16 ANSI/IBM polynomial 0x8005, bit-reflected
const CRC16_ARC_POLY_REFLECTED: u16 = 0xA001;
/// CRC-16 CCITT polynomial
const CRC16_CCITT_POLY: u16 = 0x1021;
/// IEEE 802.3 polynomial 0x04C11DB7, bit-reflected
const CRC32_POLY_REFLECTED: u32 = 0xEDB8_8320;

/// Initial register value for CRC-32
pub const CRC32_INIT: u32 = 0xFFFF_FFFF;

static CRC8_TABLE: [u8; 256] = crc8_table();
static CRC16_ARC_TABLE: [u16; 256] = crc16_reflected_table();
static CRC16_CCITT_TABLE: [u16; 256] = crc16_ccitt_table();
static CRC32_TABLE: [u32; 256] = crc32_table();

const fn crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn crc16_reflected_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC16_ARC_POLY_REFLECTED
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn crc16_ccitt_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_CCITT_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC32_POLY_REFLECTED
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// CRC-8/SMBUS (poly 0x07, non-reflected, no final xor)
pub fn crc8(data: &[u8], init: u8) -> u8 {
    data.iter()
        .fold(init, |crc, &byte| CRC8_TABLE[(crc ^ byte) as usize])
}

/// CRC-16/ARC (ANSI/IBM poly 0x8005, reflected, no final xor)
pub fn crc16_arc(data: &[u8], init: u16) -> u16 {
    data.iter().fold(init, |crc, &byte| {
        (crc >> 8) ^ CRC16_ARC_TABLE[((crc ^ byte as u16) & 0xFF) as usize]
    })
}

/// CRC-16/XMODEM (CCITT poly 0x1021, non-reflected, no final xor)
pub fn crc16_ccitt(data: &[u8], init: u16) -> u16 {
    data.iter().fold(init, |crc, &byte| {
        (crc << 8) ^ CRC16_CCITT_TABLE[(((crc >> 8) ^ byte as u16) & 0xFF) as usize]
    })
}

/// CRC-32 as used by IEEE 802.3 (reflected, final xor 0xFFFFFFFF)
pub fn crc32(data: &[u8], init: u32) -> u32 {
    let crc = data.iter().fold(init, |crc, &byte| {
        (crc >> 8) ^ CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize]
    });
    crc ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK: &[u8] = b"123456789";

    #[test]
    fn test_crc8_check_value() {
        assert_eq!(crc8(CHECK, 0), 0xF4);
    }

    #[test]
    fn test_crc16_arc_check_value() {
        assert_eq!(crc16_arc(CHECK, 0), 0xBB3D);
    }

    #[test]
    fn test_crc16_ccitt_check_value() {
        assert_eq!(crc16_ccitt(CHECK, 0), 0x31C3);
    }

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(crc32(CHECK, CRC32_INIT), 0xCBF4_3926);
        assert_eq!(crc32(b"", CRC32_INIT), 0);
    }
}
