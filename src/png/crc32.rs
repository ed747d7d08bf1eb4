//! The CRC-32 that guards every chunk.
//!
//! Reflected polynomial `0xEDB8_8320`, seeded with `!0`, and complemented at
//! the end. It covers the chunk tag and the chunk data, but not the length.

const CRC_TABLE: [u32; 256] = {
  let mut table = [0_u32; 256];
  let mut n = 0;
  while n < 256 {
    let mut c: u32 = n as _;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      //
      k += 1;
    }
    table[n] = c;
    //
    n += 1;
  }
  table
};

/// A running CRC-32 accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crc32(u32);
impl Default for Crc32 {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}
impl Crc32 {
  /// A fresh accumulator.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self(u32::MAX)
  }

  /// Feeds more bytes into the checksum.
  #[inline]
  pub fn update(&mut self, bytes: &[u8]) {
    let mut c = self.0;
    for b in bytes.iter().copied() {
      c = CRC_TABLE[((c ^ u32::from(b)) & 0xFF) as usize] ^ (c >> 8);
    }
    self.0 = c;
  }

  /// The final checksum of everything fed in so far.
  #[inline]
  #[must_use]
  pub const fn finish(&self) -> u32 {
    self.0 ^ u32::MAX
  }
}

/// Computes the CRC of a chunk tag followed by its data.
#[inline]
#[must_use]
pub fn chunk_crc(tag: [u8; 4], data: &[u8]) -> u32 {
  let mut crc = Crc32::new();
  crc.update(&tag);
  crc.update(data);
  crc.finish()
}

#[test]
fn test_crc32_check_value() {
  let mut crc = Crc32::new();
  crc.update(b"123456789");
  assert_eq!(crc.finish(), 0xCBF4_3926);
  // split updates give the same answer
  let mut split = Crc32::new();
  split.update(b"1234");
  split.update(b"56789");
  assert_eq!(split.finish(), 0xCBF4_3926);
}

#[test]
fn test_crc32_iend() {
  // Every PNG ends with the same 12 bytes, CRC included.
  assert_eq!(chunk_crc(*b"IEND", &[]), 0xAE42_6082);
}
