//! Module for pixel formats.
//!
//! The codec's canonical in-memory pixel is [`RGBA8`]: four 8-bit channels,
//! straight (non-premultiplied) alpha. Every PNG color type and bit depth is
//! converted to and from this format.
//!
//! ## Between Gray and RGB
//! When going from grayscale to RGB one just simply copies the gray value to
//! each of the RGB channels.
//!
//! However, the reverse isn't quite true. Because the human eyes don't respond
//! equally to all three colors, converting an RGB image to grayscale isn't a
//! plain average. Instead, there's some weighting, as follows:
//! ```text
//! Y = 0.299 * R + 0.587 * G + 0.114 * B
//! ```
//!
//! ## Between Bit Depths
//! * Going *up* to 8 bits from 1, 2, or 4 bits replicates the bit pattern
//!   downward until all 8 bits are filled, so the darkest and brightest values
//!   of each depth map to 0 and 255.
//! * Going *down* from 16 bits to 8 bits divides by 257, which maps the full
//!   16-bit range onto the full 8-bit range and exactly undoes an 8-to-16
//!   widening (`v * 257`).

use bytemuck::{Pod, Zeroable};

/// An RGB value, 8-bits per channel.
///
/// This is the layout of a PNG palette entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bits per channel RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
impl RGBA8 {
  /// Fully opaque black.
  pub const OPAQUE_BLACK: Self = Self { r: 0, g: 0, b: 0, a: 255 };

  /// A gray pixel with the given alpha.
  #[inline]
  #[must_use]
  pub const fn gray(y: u8, a: u8) -> Self {
    Self { r: y, g: y, b: y, a }
  }

  /// If all three color channels hold the same value.
  #[inline]
  #[must_use]
  pub const fn is_gray(self) -> bool {
    self.r == self.g && self.g == self.b
  }

  /// Weighted luma of the color channels, using integer math.
  #[inline]
  #[must_use]
  pub const fn luma(self) -> u8 {
    ((self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114) / 1000) as u8
  }

  /// Packs the pixel into a single `u32` (`r` in the low byte).
  #[inline]
  #[must_use]
  pub const fn to_u32(self) -> u32 {
    u32::from_le_bytes([self.r, self.g, self.b, self.a])
  }
}
impl From<RGB8> for RGBA8 {
  #[inline]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    Self { r, g, b, a: 255 }
  }
}

/// Reduces a 16-bit channel value to 8 bits.
///
/// This divides by 257 rather than dropping the low byte.
#[inline]
#[must_use]
pub const fn u16_to_u8_channel(u: u16) -> u8 {
  (u / 257) as u8
}

#[test]
fn test_u16_to_u8_channel() {
  for u in 0..=255_u8 {
    assert_eq!(u16_to_u8_channel(u as u16 * 257), u);
  }
  assert_eq!(u16_to_u8_channel(u16::MAX), 255);
  assert_eq!(u16_to_u8_channel(256), 0);
}

#[test]
fn test_luma() {
  assert_eq!(RGBA8::gray(77, 255).luma(), 77);
  assert_eq!(RGBA8 { r: 255, g: 255, b: 255, a: 0 }.luma(), 255);
  assert_eq!(RGBA8 { r: 255, g: 0, b: 0, a: 0 }.luma(), 76);
}
