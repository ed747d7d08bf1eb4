//! The encoder: image analysis, then header, palette, data, and terminator.

use alloc::borrow::Cow;

use bitfrob::u8_replicate_bits;

use super::*;

/// Options for [`encode`].
///
/// ```
/// use imagine_png::png::{CompressionEffort, EncodeOptions, FilterPolicy, FilterType};
///
/// let opts = EncodeOptions::default()
///   .with_filter(FilterPolicy::Fixed(FilterType::Paeth))
///   .with_effort(CompressionEffort::Best)
///   .with_try_indexed(true);
/// assert!(opts.analyze);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
  /// How each line's filter is picked.
  pub filter: FilterPolicy,
  /// How hard the compressor works.
  pub effort: CompressionEffort,
  /// Look for grayscale and fully opaque images and store them with fewer
  /// channels. This never loses information.
  pub analyze: bool,
  /// Convert every pixel to gray (by luma) before encoding. Lossy.
  pub force_gray: bool,
  /// Make every pixel fully opaque before encoding. Lossy.
  pub force_opaque: bool,
  /// Try storing the image with a palette of at most 256 colors. If there
  /// are more colors than that the image is stored directly instead.
  pub try_indexed: bool,
}
impl Default for EncodeOptions {
  #[inline]
  fn default() -> Self {
    Self {
      filter: FilterPolicy::Adaptive,
      effort: CompressionEffort::Balanced,
      analyze: true,
      force_gray: false,
      force_opaque: false,
      try_indexed: false,
    }
  }
}
#[allow(missing_docs)]
impl EncodeOptions {
  #[inline]
  #[must_use]
  pub const fn with_filter(self, filter: FilterPolicy) -> Self {
    Self { filter, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_effort(self, effort: CompressionEffort) -> Self {
    Self { effort, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_analyze(self, analyze: bool) -> Self {
    Self { analyze, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_force_gray(self, force_gray: bool) -> Self {
    Self { force_gray, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_force_opaque(self, force_opaque: bool) -> Self {
    Self { force_opaque, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_try_indexed(self, try_indexed: bool) -> Self {
    Self { try_indexed, ..self }
  }
}

/// The color type chosen for the output and what it needs.
enum Layout {
  Gray { bit_depth: u8 },
  GrayAlpha,
  Rgb,
  Rgba,
  Indexed(Quantized),
}

/// Encodes `width * height` pixels (row-major, top row first) as a PNG data
/// stream.
///
/// * With [`analyze`](EncodeOptions::analyze) on, opaque gray images are
///   stored as gray at the smallest bit depth that holds every gray level
///   exactly, other gray images as gray + alpha, and opaque images as RGB.
/// * With [`try_indexed`](EncodeOptions::try_indexed) on, images of 256 or
///   fewer colors that aren't opaque gray are stored with a palette.
/// * Otherwise the image is stored as 8-bit RGBA.
///
/// The output is never interlaced.
///
/// If this fails, whatever was already written to the sink is not a usable
/// PNG and should be thrown away.
pub fn encode<W: ByteSink + ?Sized>(
  sink: &mut W, pixels: &[RGBA8], width: u32, height: u32, options: &EncodeOptions,
) -> PngResult<()> {
  if width == 0 || height == 0 {
    return Err(PngError::WidthOrHeightZero);
  }
  let count = width.checked_mul(height).ok_or(PngError::DimensionsOverflow)?;
  if pixels.len() != usize::try_from(count)? {
    return Err(PngError::PixelCountMismatch);
  }

  let pixels: Cow<'_, [RGBA8]> = if options.force_gray || options.force_opaque {
    let mut v = Vec::new();
    v.try_reserve_exact(pixels.len())?;
    v.extend(pixels.iter().map(|p| {
      let p = if options.force_gray { RGBA8::gray(p.luma(), p.a) } else { *p };
      if options.force_opaque {
        RGBA8 { a: 255, ..p }
      } else {
        p
      }
    }));
    Cow::Owned(v)
  } else {
    Cow::Borrowed(pixels)
  };

  let layout = choose_layout(&pixels, options)?;
  let header = match &layout {
    Layout::Gray { bit_depth } => IHDR::new(width, height, *bit_depth, PngColorType::Y, false)?,
    Layout::GrayAlpha => IHDR::new(width, height, 8, PngColorType::YA, false)?,
    Layout::Rgb => IHDR::new(width, height, 8, PngColorType::RGB, false)?,
    Layout::Rgba => IHDR::new(width, height, 8, PngColorType::RGBA, false)?,
    Layout::Indexed(q) => IHDR::new(width, height, q.bit_depth, PngColorType::Index, false)?,
  };
  debug!("encoding as {header:?}");

  let indexes: &[u8] = match &layout {
    Layout::Indexed(q) => &q.indexes,
    _ => &[],
  };
  let filtered = filter_lines(&header, &pixels, indexes, options.filter)?;
  let compressed = compress_filtered(&filtered, options.effort)?;

  sink.write_all(&PNG_SIGNATURE)?;
  write_chunk(sink, ChunkTy::IHDR, &header.to_bytes())?;
  if let Layout::Indexed(q) = &layout {
    write_chunk(sink, ChunkTy::PLTE, &q.table.plte_bytes()?)?;
    if let Some(alphas) = q.table.trns_bytes()? {
      write_chunk(sink, ChunkTy::tRNS, &alphas)?;
    }
  }
  for piece in compressed.chunks(MAX_CHUNK_LEN as usize) {
    write_chunk(sink, ChunkTy::IDAT, piece)?;
  }
  write_chunk(sink, ChunkTy::IEND, &[])
}

fn choose_layout(pixels: &[RGBA8], options: &EncodeOptions) -> PngResult<Layout> {
  let (mut gray, mut opaque) = (options.force_gray, options.force_opaque);
  if options.analyze {
    gray |= pixels.iter().all(|p| p.is_gray());
    opaque |= pixels.iter().all(|p| p.a == 255);
  }
  if gray && opaque {
    let bit_depth = if options.analyze { smallest_gray_depth(pixels) } else { 8 };
    return Ok(Layout::Gray { bit_depth });
  }
  if options.try_indexed {
    match quantize(pixels) {
      Ok(q) => return Ok(Layout::Indexed(q)),
      Err(PngError::TooManyColors) => debug!("over 256 colors, storing direct color"),
      Err(e) => return Err(e),
    }
  }
  Ok(match (gray, opaque) {
    (true, _) => Layout::GrayAlpha,
    (false, true) => Layout::Rgb,
    (false, false) => Layout::Rgba,
  })
}

/// The smallest gray bit depth whose brightness ramp has every gray level in
/// the image.
fn smallest_gray_depth(pixels: &[RGBA8]) -> u8 {
  for depth in [1_u8, 2, 4] {
    let shift = 8 - depth;
    if pixels.iter().all(|p| u8_replicate_bits(u32::from(depth), p.r >> shift) == p.r) {
      return depth;
    }
  }
  8
}

/// Packs and filters every line, giving the bytes to compress.
fn filter_lines(
  header: &IHDR, pixels: &[RGBA8], indexes: &[u8], policy: FilterPolicy,
) -> PngResult<Vec<u8>> {
  let pack = packer_for(header).ok_or(PngError::IllegalHeader)?;
  let mut filterer = LineFilterer::new(policy, header)?;
  let width = header.width as usize;
  let scanline = header.bytes_per_scanline(header.width)?;

  let total = header.zlib_decompression_requirement()?;
  let mut filtered = Vec::new();
  filtered.try_reserve_exact(total)?;
  filtered.resize(total, 0);

  let mut prev = Vec::new();
  prev.try_reserve_exact(scanline)?;
  prev.resize(scanline, 0_u8);
  let mut cur = prev.clone();

  for (y, out) in filtered.chunks_exact_mut(scanline + 1).enumerate() {
    let row = &pixels[y * width..(y + 1) * width];
    let row_indexes =
      if indexes.is_empty() { &[][..] } else { &indexes[y * width..(y + 1) * width] };
    pack(row, row_indexes, &mut cur);
    filterer.filter_line(&cur, &prev, out);
    core::mem::swap(&mut prev, &mut cur);
  }
  Ok(filtered)
}
