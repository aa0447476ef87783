const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      k += 1;
    }
    out[n] = c;
    n += 1;
  }
  out
}

/// Running CRC-32 (ISO 3309 / ITU-T V.42), as used by PNG chunks.
///
/// A chunk's CRC covers the chunk type and the chunk data, but not the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crc32(u32);
impl Crc32 {
  /// A fresh CRC with nothing fed in yet.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self(u32::MAX)
  }

  /// Feeds more bytes in.
  #[inline]
  pub fn update(&mut self, bytes: &[u8]) {
    let mut crc = self.0;
    for &byte in bytes {
      let i = (crc ^ u32::from(byte)) as u8 as usize;
      crc = CRC_TABLE[i] ^ (crc >> 8);
    }
    self.0 = crc;
  }

  /// The CRC of everything fed in so far.
  #[inline]
  #[must_use]
  pub const fn finish(self) -> u32 {
    self.0 ^ u32::MAX
  }
}
impl Default for Crc32 {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

/// Computes the CRC that a chunk with this type and data should declare.
#[inline]
#[must_use]
pub fn chunk_crc(chunk_ty: [u8; 4], data: &[u8]) -> u32 {
  let mut crc = Crc32::new();
  crc.update(&chunk_ty);
  crc.update(data);
  crc.finish()
}

#[test]
fn test_crc32_check_value() {
  let mut crc = Crc32::new();
  crc.update(b"12345");
  crc.update(b"6789");
  assert_eq!(crc.finish(), 0xCBF4_3926);
  assert_eq!(Crc32::new().finish(), 0);
  // the IEND chunk is always the same 12 bytes, ending in AE 42 60 82.
  assert_eq!(chunk_crc(*b"IEND", &[]), 0xAE42_6082);
}
