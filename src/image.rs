#![forbid(unsafe_code)]

//! Provides the heap-allocated image type.

use alloc::vec::Vec;

use crate::{
  png::{self, EncodeOptions},
  PngResult, RGBA8,
};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
///
/// You don't ever need to call this function yourself, but it's how the image
/// container converts 2d coordinates into index values within its payload
/// vector.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// A direct-color image.
///
/// Pixels are stored row-major, top row first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Bitmap<P> {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<P>,
}
impl<P> Bitmap<P> {
  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&P> {
    if x < self.width && y < self.height {
      self.pixels.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Borrows one full row of pixels.
  #[inline]
  #[must_use]
  pub fn row_mut(&mut self, y: u32) -> Option<&mut [P]> {
    if y < self.height {
      let start = xy_width_to_index(0, y, self.width);
      self.pixels.get_mut(start..start + self.width as usize)
    } else {
      None
    }
  }
}

impl Bitmap<RGBA8> {
  /// Attempts to make an image from PNG bytes.
  ///
  /// See [`png::decode`] for the details.
  #[inline]
  pub fn try_from_png_bytes(mut bytes: &[u8]) -> PngResult<Self> {
    png::decode(&mut bytes)
  }

  /// Encodes the image as PNG bytes.
  ///
  /// See [`png::encode`] for the details.
  #[inline]
  pub fn to_png_bytes(&self, options: &EncodeOptions) -> PngResult<Vec<u8>> {
    let mut out = Vec::new();
    png::encode(&mut out, &self.pixels, self.width, self.height, options)?;
    Ok(out)
  }
}
