//! Turning unfiltered scanline bytes into [`RGBA8`] pixels.
//!
//! There's one routine per (color type, bit depth) pair, picked out of
//! [`UNPACKERS`] once per image. Each routine writes `count` pixels into a row
//! of the final image, starting at `first` and moving `step` pixels each time,
//! so the passes of an interlaced image land directly in their final spots.

use core::cell::Cell;

use bitfrob::u8_replicate_bits;

use super::*;

/// What the unpackers need besides the scanline itself.
pub(crate) struct UnpackContext<'a> {
  pub table: &'a ColorTable,
  pub transparency: Option<Transparency>,
  /// Set when an index past the end of the palette was seen.
  pub index_out_of_range: Cell<bool>,
}

pub(crate) type UnpackFn = fn(
  line: &[u8],
  ctx: &UnpackContext<'_>,
  out: &mut [RGBA8],
  first: usize,
  step: usize,
  count: usize,
);

/// Unpackers by `[color_type as usize][bit_depth_log2]`.
pub(crate) const UNPACKERS: [[Option<UnpackFn>; 5]; 7] = [
  // Y
  [
    Some(unpack_y_low::<1>),
    Some(unpack_y_low::<2>),
    Some(unpack_y_low::<4>),
    Some(unpack_y8),
    Some(unpack_y16),
  ],
  [None; 5],
  // RGB
  [None, None, None, Some(unpack_rgb8), Some(unpack_rgb16)],
  // Index
  [
    Some(unpack_index::<1>),
    Some(unpack_index::<2>),
    Some(unpack_index::<4>),
    Some(unpack_index::<8>),
    None,
  ],
  // YA
  [None, None, None, Some(unpack_ya8), Some(unpack_ya16)],
  [None; 5],
  // RGBA
  [None, None, None, Some(unpack_rgba8), Some(unpack_rgba16)],
];

#[inline]
pub(crate) fn unpacker_for(header: &IHDR) -> Option<UnpackFn> {
  UNPACKERS.get(header.color_type as usize)?.get(header.bit_depth_log2()).copied().flatten()
}

/// Scales a raw sample at the given bit depth to 8 bits.
#[inline]
#[must_use]
pub(crate) fn sample_to_u8(bit_depth: u8, sample: u16) -> u8 {
  match bit_depth {
    16 => u16_to_u8_channel(sample),
    8 => sample as u8,
    _ => u8_replicate_bits(u32::from(bit_depth), sample as u8),
  }
}

/// Gets the `i`th `BITS` sized sample from a packed line. The first sample is
/// in the high bits of the first byte.
#[inline]
#[must_use]
pub(crate) fn packed_sample<const BITS: usize>(line: &[u8], i: usize) -> u8 {
  let per_byte = 8 / BITS;
  let shift = 8 - BITS * (i % per_byte + 1);
  (line[i / per_byte] >> shift) & ((1 << BITS) - 1) as u8
}

#[inline]
fn be16(bytes: &[u8], i: usize) -> u16 {
  u16::from_be_bytes([bytes[i], bytes[i + 1]])
}

#[inline]
fn alpha_for_y(ctx: &UnpackContext<'_>, y: u16) -> u8 {
  if ctx.transparency == Some(Transparency::Y(y)) {
    0
  } else {
    255
  }
}

#[inline]
fn alpha_for_rgb(ctx: &UnpackContext<'_>, rgb: [u16; 3]) -> u8 {
  if ctx.transparency == Some(Transparency::RGB(rgb)) {
    0
  } else {
    255
  }
}

fn unpack_y_low<const BITS: usize>(
  line: &[u8], ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  for i in 0..count {
    let s = packed_sample::<BITS>(line, i);
    let y = u8_replicate_bits(BITS as u32, s);
    out[first + i * step] = RGBA8::gray(y, alpha_for_y(ctx, u16::from(s)));
  }
}

fn unpack_y8(
  line: &[u8], ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  for (i, y) in line[..count].iter().copied().enumerate() {
    out[first + i * step] = RGBA8::gray(y, alpha_for_y(ctx, u16::from(y)));
  }
}

fn unpack_y16(
  line: &[u8], ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  for i in 0..count {
    let y = be16(line, i * 2);
    out[first + i * step] = RGBA8::gray(u16_to_u8_channel(y), alpha_for_y(ctx, y));
  }
}

fn unpack_rgb8(
  line: &[u8], ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  let rgb: &[RGB8] = bytemuck::cast_slice(&line[..count * 3]);
  for (i, RGB8 { r, g, b }) in rgb.iter().copied().enumerate() {
    let a = alpha_for_rgb(ctx, [r.into(), g.into(), b.into()]);
    out[first + i * step] = RGBA8 { r, g, b, a };
  }
}

fn unpack_rgb16(
  line: &[u8], ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  for i in 0..count {
    let rgb = [be16(line, i * 6), be16(line, i * 6 + 2), be16(line, i * 6 + 4)];
    let [r, g, b] = rgb.map(u16_to_u8_channel);
    out[first + i * step] = RGBA8 { r, g, b, a: alpha_for_rgb(ctx, rgb) };
  }
}

fn unpack_index<const BITS: usize>(
  line: &[u8], ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  let declared = ctx.table.len();
  for i in 0..count {
    let index = if BITS == 8 { line[i] } else { packed_sample::<BITS>(line, i) };
    if usize::from(index) >= declared {
      ctx.index_out_of_range.set(true);
    }
    out[first + i * step] = ctx.table.get(index);
  }
}

fn unpack_ya8(
  line: &[u8], _ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  for (i, ya) in line[..count * 2].chunks_exact(2).enumerate() {
    out[first + i * step] = RGBA8::gray(ya[0], ya[1]);
  }
}

fn unpack_ya16(
  line: &[u8], _ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  for i in 0..count {
    let y = u16_to_u8_channel(be16(line, i * 4));
    let a = u16_to_u8_channel(be16(line, i * 4 + 2));
    out[first + i * step] = RGBA8::gray(y, a);
  }
}

fn unpack_rgba8(
  line: &[u8], _ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  let src: &[RGBA8] = bytemuck::cast_slice(&line[..count * 4]);
  if step == 1 {
    out[first..first + count].copy_from_slice(src);
  } else {
    for (i, px) in src.iter().copied().enumerate() {
      out[first + i * step] = px;
    }
  }
}

fn unpack_rgba16(
  line: &[u8], _ctx: &UnpackContext<'_>, out: &mut [RGBA8], first: usize, step: usize, count: usize,
) {
  for i in 0..count {
    let [r, g, b, a] =
      [0, 2, 4, 6].map(|offset| u16_to_u8_channel(be16(line, i * 8 + offset)));
    out[first + i * step] = RGBA8 { r, g, b, a };
  }
}
