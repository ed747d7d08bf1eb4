//! Turning [`RGBA8`] rows back into scanline bytes for the encoder.
//!
//! These are the inverse of the unpackers for every format the encoder
//! writes, which is everything at 8 bits per channel or less.

use super::*;

/// Packs one row. `indexes` is only used (and only non-empty) for indexed
/// images. `out` is exactly one scanline long.
pub(crate) type PackFn = fn(pixels: &[RGBA8], indexes: &[u8], out: &mut [u8]);

/// Packers by `[color_type as usize][bit_depth_log2]`.
pub(crate) const PACKERS: [[Option<PackFn>; 5]; 7] = [
  // Y
  [Some(pack_y_low::<1>), Some(pack_y_low::<2>), Some(pack_y_low::<4>), Some(pack_y8), None],
  [None; 5],
  // RGB
  [None, None, None, Some(pack_rgb8), None],
  // Index
  [
    Some(pack_index::<1>),
    Some(pack_index::<2>),
    Some(pack_index::<4>),
    Some(pack_index::<8>),
    None,
  ],
  // YA
  [None, None, None, Some(pack_ya8), None],
  [None; 5],
  // RGBA
  [None, None, None, Some(pack_rgba8), None],
];

#[inline]
pub(crate) fn packer_for(header: &IHDR) -> Option<PackFn> {
  PACKERS.get(header.color_type as usize)?.get(header.bit_depth_log2()).copied().flatten()
}

/// Packs `BITS` sized samples into bytes, first sample in the high bits.
#[inline]
fn pack_samples<const BITS: usize>(samples: impl Iterator<Item = u8>, out: &mut [u8]) {
  let per_byte = 8 / BITS;
  out.iter_mut().for_each(|b| *b = 0);
  for (i, s) in samples.enumerate() {
    let shift = 8 - BITS * (i % per_byte + 1);
    out[i / per_byte] |= (s & ((1 << BITS) - 1) as u8) << shift;
  }
}

fn pack_y_low<const BITS: usize>(pixels: &[RGBA8], _indexes: &[u8], out: &mut [u8]) {
  pack_samples::<BITS>(pixels.iter().map(|p| p.r >> (8 - BITS)), out);
}

fn pack_y8(pixels: &[RGBA8], _indexes: &[u8], out: &mut [u8]) {
  out.iter_mut().zip(pixels.iter()).for_each(|(o, p)| *o = p.r);
}

fn pack_rgb8(pixels: &[RGBA8], _indexes: &[u8], out: &mut [u8]) {
  let rgb: &mut [RGB8] = bytemuck::cast_slice_mut(out);
  rgb.iter_mut().zip(pixels.iter()).for_each(|(o, p)| *o = RGB8 { r: p.r, g: p.g, b: p.b });
}

fn pack_index<const BITS: usize>(_pixels: &[RGBA8], indexes: &[u8], out: &mut [u8]) {
  if BITS == 8 {
    out.copy_from_slice(indexes);
  } else {
    pack_samples::<BITS>(indexes.iter().copied(), out);
  }
}

fn pack_ya8(pixels: &[RGBA8], _indexes: &[u8], out: &mut [u8]) {
  for (o, p) in out.chunks_exact_mut(2).zip(pixels.iter()) {
    o[0] = p.r;
    o[1] = p.a;
  }
}

fn pack_rgba8(pixels: &[RGBA8], _indexes: &[u8], out: &mut [u8]) {
  out.copy_from_slice(bytemuck::cast_slice(pixels));
}

#[test]
fn test_pack_sub_byte_samples() {
  let mut out = [0xFF_u8; 2];
  pack_samples::<2>([3, 0, 1, 2, 3].into_iter(), &mut out);
  assert_eq!(out, [0b11_00_01_10, 0b11_00_00_00]);
  let mut out = [0_u8; 1];
  pack_samples::<4>([0xA, 0x5].into_iter(), &mut out);
  assert_eq!(out, [0xA5]);
}
