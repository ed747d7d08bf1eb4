//! Palette, transparency, and background color bookkeeping.
//!
//! On the decode side the `PLTE`, `tRNS`, and `bKGD` chunks are folded into a
//! [`ColorTable`] and a [`Transparency`] key. On the encode side
//! [`quantize`] tries to express an image with at most 256 colors.

use super::*;

/// A palette of up to 256 RGBA entries.
///
/// Entries past the declared length read as opaque black.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ColorTable {
  entries: [RGBA8; 256],
  len: usize,
}
impl core::fmt::Debug for ColorTable {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("ColorTable").field(&&self.entries[..self.len.min(4)]).field(&self.len).finish()
  }
}
impl ColorTable {
  /// Builds a table from `PLTE` chunk data.
  ///
  /// The data must be 1 to 256 `RGB8` entries. All entries start fully
  /// opaque.
  pub fn from_plte(data: &[u8]) -> PngResult<Self> {
    let rgb: &[RGB8] = bytemuck::try_cast_slice(data).map_err(|_| PngError::BadPalette)?;
    if rgb.is_empty() || rgb.len() > 256 {
      return Err(PngError::BadPalette);
    }
    let mut entries = [RGBA8::OPAQUE_BLACK; 256];
    entries.iter_mut().zip(rgb.iter().copied()).for_each(|(e, c)| *e = RGBA8::from(c));
    Ok(Self { entries, len: rgb.len() })
  }

  /// Builds a table from a list of colors.
  pub fn from_colors(colors: &[RGBA8]) -> PngResult<Self> {
    if colors.len() > 256 {
      return Err(PngError::TooManyColors);
    }
    let mut entries = [RGBA8::OPAQUE_BLACK; 256];
    entries[..colors.len()].copy_from_slice(colors);
    Ok(Self { entries, len: colors.len() })
  }

  /// Overwrites the alpha of the first `alphas.len()` entries (`tRNS` data
  /// for indexed images).
  pub fn apply_alphas(&mut self, alphas: &[u8]) -> PngResult<()> {
    if alphas.len() > self.len {
      return Err(PngError::BadTransparency);
    }
    self.entries.iter_mut().zip(alphas.iter().copied()).for_each(|(e, a)| e.a = a);
    Ok(())
  }

  /// The number of declared entries.
  #[inline]
  #[must_use]
  pub const fn len(&self) -> usize {
    self.len
  }

  #[inline]
  #[must_use]
  #[allow(missing_docs)]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// The declared entries.
  #[inline]
  #[must_use]
  pub fn entries(&self) -> &[RGBA8] {
    &self.entries[..self.len]
  }

  /// Looks up an index. Indexes past the declared length give opaque black.
  #[inline]
  #[must_use]
  pub fn get(&self, index: u8) -> RGBA8 {
    self.entries[usize::from(index)]
  }

  /// The `PLTE` chunk data for this table.
  pub fn plte_bytes(&self) -> PngResult<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(self.len * 3)?;
    for RGBA8 { r, g, b, a: _ } in self.entries().iter().copied() {
      v.extend_from_slice(&[r, g, b]);
    }
    Ok(v)
  }

  /// The `tRNS` chunk data for this table, or `None` if every entry is fully
  /// opaque.
  ///
  /// Only the alphas up to the last non-opaque entry are kept, the rest
  /// default to opaque when decoding.
  pub fn trns_bytes(&self) -> PngResult<Option<Vec<u8>>> {
    let used = match self.entries().iter().rposition(|e| e.a != 255) {
      Some(last) => last + 1,
      None => return Ok(None),
    };
    let mut v = Vec::new();
    v.try_reserve_exact(used)?;
    v.extend(self.entries[..used].iter().map(|e| e.a));
    Ok(Some(v))
  }
}

/// A single color marked fully transparent, for images that have no alpha
/// channel and aren't indexed.
///
/// The values are raw samples at the image's bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transparency {
  /// The gray level that's transparent.
  Y(u16),
  /// The RGB value that's transparent.
  RGB([u16; 3]),
}
impl Transparency {
  /// Parses `tRNS` data for a grayscale or RGB image.
  ///
  /// Gives `Ok(None)` for color types that can't use a transparent color
  /// (indexed images put their `tRNS` into the [`ColorTable`] instead, and
  /// types with an alpha channel don't use `tRNS` at all).
  pub fn parse(color_type: PngColorType, data: &[u8]) -> PngResult<Option<Self>> {
    if !matches!(color_type, PngColorType::Y | PngColorType::RGB) {
      return Ok(None);
    }
    let samples: &[U16BE] =
      bytemuck::try_cast_slice(data).map_err(|_| PngError::BadTransparency)?;
    Ok(Some(match (color_type, samples) {
      (PngColorType::Y, [y]) => Self::Y(y.to_u16()),
      (PngColorType::RGB, [r, g, b]) => Self::RGB([r.to_u16(), g.to_u16(), b.to_u16()]),
      _ => return Err(PngError::BadTransparency),
    }))
  }
}

/// Parses `bKGD` data into the background color it names.
///
/// Indexed images must have their palette parsed first.
pub fn parse_background(
  header: &IHDR, data: &[u8], table: Option<&ColorTable>,
) -> PngResult<RGBA8> {
  if header.color_type == PngColorType::Index {
    let table = table.ok_or(PngError::ChunkOrder)?;
    return match data {
      [i] if usize::from(*i) < table.len() => Ok(table.get(*i)),
      [_] => Err(PngError::BadPalette),
      _ => Err(PngError::BadChunkLength),
    };
  }
  let samples: &[U16BE] =
    bytemuck::try_cast_slice(data).map_err(|_| PngError::BadChunkLength)?;
  let to_u8 = |s: &U16BE| sample_to_u8(header.bit_depth, s.to_u16());
  Ok(match (header.color_type, samples) {
    (PngColorType::Y | PngColorType::YA, [y]) => RGBA8::gray(to_u8(y), 255),
    (PngColorType::RGB | PngColorType::RGBA, [r, g, b]) => {
      RGBA8 { r: to_u8(r), g: to_u8(g), b: to_u8(b), a: 255 }
    }
    _ => return Err(PngError::BadChunkLength),
  })
}

/// An image re-expressed as palette indexes.
#[derive(Debug, Clone)]
pub struct Quantized {
  /// The palette, with every non-opaque entry before every opaque entry.
  pub table: ColorTable,
  /// One index per pixel.
  pub indexes: Vec<u8>,
  /// The smallest indexed bit depth that can hold every index.
  pub bit_depth: u8,
}

const SLOT_BITS: u32 = 10;
const SLOT_COUNT: usize = 1 << SLOT_BITS;
const EMPTY: u16 = u16::MAX;

#[derive(Debug, Clone, Copy)]
struct Slot {
  color: u32,
  index: u16,
}

/// Fixed size open addressed map from packed colors to palette indexes.
///
/// It never holds more than 257 colors, so it never gets close to full.
struct ColorSlots {
  slots: Vec<Slot>,
}
impl ColorSlots {
  fn new() -> PngResult<Self> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(SLOT_COUNT)?;
    slots.resize(SLOT_COUNT, Slot { color: 0, index: EMPTY });
    Ok(Self { slots })
  }

  /// The slot that holds `color`, or the empty slot where it would go.
  #[inline]
  fn find(&self, color: u32) -> usize {
    let mut i = (color.wrapping_mul(0x9E37_79B9) >> (32 - SLOT_BITS)) as usize;
    loop {
      let slot = self.slots[i];
      if slot.index == EMPTY || slot.color == color {
        return i;
      }
      i = (i + 1) & (SLOT_COUNT - 1);
    }
  }
}

/// Tries to express the pixels with a palette of at most 256 colors.
///
/// Fails with [`PngError::TooManyColors`] as soon as a 257th distinct color
/// turns up.
pub fn quantize(pixels: &[RGBA8]) -> PngResult<Quantized> {
  let mut slots = ColorSlots::new()?;
  let mut colors: Vec<RGBA8> = Vec::new();
  colors.try_reserve_exact(256)?;
  let mut last: Option<RGBA8> = None;
  for px in pixels.iter().copied() {
    if last == Some(px) {
      continue;
    }
    last = Some(px);
    let i = slots.find(px.to_u32());
    if slots.slots[i].index == EMPTY {
      if colors.len() == 256 {
        return Err(PngError::TooManyColors);
      }
      slots.slots[i] = Slot { color: px.to_u32(), index: colors.len() as u16 };
      colors.push(px);
    }
  }

  // Opaque entries go last so the transparency chunk can stop early.
  colors.sort_by_key(|c| c.a == 255);
  for (new_index, c) in colors.iter().enumerate() {
    let i = slots.find(c.to_u32());
    slots.slots[i].index = new_index as u16;
  }

  let mut indexes = Vec::new();
  indexes.try_reserve_exact(pixels.len())?;
  indexes.extend(pixels.iter().map(|px| slots.slots[slots.find(px.to_u32())].index as u8));

  let bit_depth = match colors.len() {
    0..=2 => 1,
    3..=4 => 2,
    5..=16 => 4,
    _ => 8,
  };
  Ok(Quantized { table: ColorTable::from_colors(&colors)?, indexes, bit_depth })
}
