use super::*;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }

  /// If the given bit depth is allowed with this color type.
  #[inline]
  #[must_use]
  pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
    match self {
      Self::Y => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
      Self::Index => matches!(bit_depth, 1 | 2 | 4 | 8),
      Self::RGB | Self::YA | Self::RGBA => matches!(bit_depth, 8 | 16),
    }
  }

  /// If the pixels carry their own alpha channel.
  #[inline]
  #[must_use]
  pub const fn has_alpha_channel(self) -> bool {
    matches!(self, Self::YA | Self::RGBA)
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::IllegalHeader),
    })
  }
}

/// The header data exactly as it's laid out in the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
struct RawIHDR {
  width: U32BE,
  height: U32BE,
  bit_depth: u8,
  color_type: u8,
  compression_method: u8,
  filter_method: u8,
  interlace_method: u8,
}

/// Image Header
///
/// A value of this type has always been validated: the dimensions are
/// non-zero and `width * height` fits in a `u32`, and the bit depth is legal
/// for the color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// if the image data is stored interlaced (seven passes).
  pub is_interlaced: bool,
}
impl IHDR {
  /// The size of the header chunk's data.
  pub const LEN: usize = 13;

  /// Makes a header, checking all the same rules as parsing does.
  pub fn new(
    width: u32, height: u32, bit_depth: u8, color_type: PngColorType, is_interlaced: bool,
  ) -> PngResult<Self> {
    if width == 0 || height == 0 {
      return Err(PngError::WidthOrHeightZero);
    }
    if width.checked_mul(height).is_none() {
      return Err(PngError::DimensionsOverflow);
    }
    if !color_type.allows_bit_depth(bit_depth) {
      return Err(PngError::IllegalHeader);
    }
    Ok(Self { width, height, bit_depth, color_type, is_interlaced })
  }

  /// The header chunk's data bytes.
  #[must_use]
  pub fn to_bytes(&self) -> [u8; Self::LEN] {
    bytemuck::cast(RawIHDR {
      width: U32BE::from_u32(self.width),
      height: U32BE::from_u32(self.height),
      bit_depth: self.bit_depth,
      color_type: self.color_type as u8,
      compression_method: 0,
      filter_method: 0,
      interlace_method: self.is_interlaced as u8,
    })
  }

  /// Bits used by one pixel within a scanline.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// How far back the "left" byte is when filtering: the bytes per complete
  /// pixel, rounded up to 1 for pixels smaller than a byte.
  #[inline]
  #[must_use]
  pub const fn filter_stride(&self) -> usize {
    (self.bits_per_pixel() + 7) / 8
  }

  /// `log2(bit_depth)`, which is `0..=4` for all legal depths.
  #[inline]
  #[must_use]
  pub const fn bit_depth_log2(&self) -> usize {
    self.bit_depth.trailing_zeros() as usize
  }

  /// Bytes of pixel data in a scanline `width` pixels wide (the filter type
  /// byte not included).
  #[inline]
  pub fn bytes_per_scanline(&self, width: u32) -> PngResult<usize> {
    let bits =
      self.bits_per_pixel().checked_mul(width as usize).ok_or(PngError::DimensionsOverflow)?;
    Ok(bits / 8 + (bits % 8 != 0) as usize)
  }

  /// Bytes in one filtered line: the filter type byte plus the scanline.
  #[inline]
  pub fn bytes_per_filterline(&self, width: u32) -> PngResult<usize> {
    self.bytes_per_scanline(width)?.checked_add(1).ok_or(PngError::DimensionsOverflow)
  }

  /// The reduced images that make up the data stream, in stream order.
  ///
  /// A non-interlaced image is one "reduced image" the size of the full image.
  /// Interlaced images give the seven passes, but passes that come out 0
  /// pixels wide or tall carry no data and are left out.
  pub fn reduced_images(&self) -> impl Iterator<Item = ReducedImage> {
    const NOT_INTERLACED: [PassGeometry; 1] = [PassGeometry::FULL];
    let passes: &'static [PassGeometry] =
      if self.is_interlaced { &ADAM7 } else { &NOT_INTERLACED };
    let (full_width, full_height) = (self.width, self.height);
    passes
      .iter()
      .map(move |g| ReducedImage {
        geometry: *g,
        width: g.reduced_width(full_width),
        height: g.reduced_height(full_height),
      })
      .filter(|r| r.width != 0 && r.height != 0)
  }

  /// Gets the buffer size required to perform Zlib decompression: the total
  /// bytes of every filtered line of every reduced image.
  pub fn zlib_decompression_requirement(&self) -> PngResult<usize> {
    let mut total = 0_usize;
    for reduced in self.reduced_images() {
      let this_image = self
        .bytes_per_filterline(reduced.width)?
        .checked_mul(reduced.height as usize)
        .ok_or(PngError::DimensionsOverflow)?;
      total = total.checked_add(this_image).ok_or(PngError::DimensionsOverflow)?;
    }
    Ok(total)
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = PngError;
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    let bytes: [u8; Self::LEN] = value.try_into().map_err(|_| PngError::BadChunkLength)?;
    let raw: RawIHDR = bytemuck::cast(bytes);
    if raw.compression_method != 0 || raw.filter_method != 0 {
      return Err(PngError::IllegalHeader);
    }
    let is_interlaced = match raw.interlace_method {
      0 => false,
      1 => true,
      _ => return Err(PngError::IllegalHeader),
    };
    let color_type = PngColorType::try_from(raw.color_type)?;
    Self::new(raw.width.to_u32(), raw.height.to_u32(), raw.bit_depth, color_type, is_interlaced)
  }
}

/// Where one interlace pass's pixels sit within the full image.
///
/// Pass pixel `(rx, ry)` is full image pixel
/// `(x_offset + rx * x_step, y_offset + ry * y_step)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct PassGeometry {
  pub x_offset: u32,
  pub x_step: u32,
  pub y_offset: u32,
  pub y_step: u32,
}
impl PassGeometry {
  /// The geometry of a non-interlaced image: every pixel, in order.
  pub const FULL: Self = Self::new(0, 1, 0, 1);

  #[inline]
  #[must_use]
  #[allow(missing_docs)]
  pub const fn new(x_offset: u32, x_step: u32, y_offset: u32, y_step: u32) -> Self {
    Self { x_offset, x_step, y_offset, y_step }
  }

  /// Width of this pass given the full image width.
  #[inline]
  #[must_use]
  pub const fn reduced_width(&self, full_width: u32) -> u32 {
    if full_width > self.x_offset {
      (full_width - self.x_offset).div_ceil(self.x_step)
    } else {
      0
    }
  }

  /// Height of this pass given the full image height.
  #[inline]
  #[must_use]
  pub const fn reduced_height(&self, full_height: u32) -> u32 {
    if full_height > self.y_offset {
      (full_height - self.y_offset).div_ceil(self.y_step)
    } else {
      0
    }
  }

  /// Converts a reduced image location into the full image location.
  #[inline]
  #[must_use]
  pub const fn full_pos(&self, reduced_x: u32, reduced_y: u32) -> (u32, u32) {
    (self.x_offset + reduced_x * self.x_step, self.y_offset + reduced_y * self.y_step)
  }
}

/// The seven interlace passes, in the order they're stored.
///
/// ```text
/// 1 6 4 6 2 6 4 6
/// 7 7 7 7 7 7 7 7
/// 5 6 5 6 5 6 5 6
/// 7 7 7 7 7 7 7 7
/// 3 6 4 6 3 6 4 6
/// 7 7 7 7 7 7 7 7
/// 5 6 5 6 5 6 5 6
/// 7 7 7 7 7 7 7 7
/// ```
pub const ADAM7: [PassGeometry; 7] = [
  PassGeometry::new(0, 8, 0, 8),
  PassGeometry::new(4, 8, 0, 8),
  PassGeometry::new(0, 4, 4, 8),
  PassGeometry::new(2, 4, 0, 4),
  PassGeometry::new(0, 2, 2, 4),
  PassGeometry::new(1, 2, 0, 2),
  PassGeometry::new(0, 1, 1, 2),
];

/// One reduced image within the data stream, with its derived size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct ReducedImage {
  pub geometry: PassGeometry,
  pub width: u32,
  pub height: u32,
}

/// Given the dimensions of the full PNG image, computes the size of each
/// reduced image.
///
/// The output uses index 0 as the base image size, and indexes 1 through 7 for
/// the size of reduced images 1 through 7.
#[inline]
#[must_use]
pub const fn reduced_image_dimensions(full_width: u32, full_height: u32) -> [(u32, u32); 8] {
  let mut out = [(full_width, full_height); 8];
  let mut i = 0;
  while i < 7 {
    out[i + 1] = (ADAM7[i].reduced_width(full_width), ADAM7[i].reduced_height(full_height));
    i += 1;
  }
  out
}
