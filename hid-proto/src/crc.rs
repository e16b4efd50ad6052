//! CRC-32 checksum for controller output reports.
//!
//! Sony controllers reject Bluetooth output reports unless they end with a
//! little-endian CRC-32 (ISO-HDLC, the zlib polynomial) computed over the
//! transaction header byte followed by the report itself.

use crc::{Crc, CRC_32_ISO_HDLC};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Calculate the CRC-32 of a byte slice.
#[inline]
#[must_use]
pub fn calculate_crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// CRC-32 digest for incremental calculation.
///
/// Lets the caller feed the header byte and the report body separately.
pub struct Crc32Digest {
    digest: crc::Digest<'static, u32>,
}

impl Crc32Digest {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: CRC32.digest(),
        }
    }

    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.digest.update(&[byte]);
    }

    #[inline]
    pub fn update_slice(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    #[inline]
    #[must_use]
    pub fn finalize(self) -> u32 {
        self.digest.finalize()
    }
}

impl Default for Crc32Digest {
    fn default() -> Self {
        Self::new()
    }
}
