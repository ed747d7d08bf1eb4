//! Compression of the filtered image data.

use miniz_oxide::deflate::core::{
  compress, create_comp_flags_from_zip_params, CompressorOxide, TDEFLFlush, TDEFLStatus,
};

use super::*;

/// How hard the compressor works.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompressionEffort {
  /// Fastest compression (level 1).
  Fast,
  /// The usual trade off (level 6).
  #[default]
  Balanced,
  /// Smallest output (level 9).
  Best,
}
impl CompressionEffort {
  /// The zlib compression level.
  #[inline]
  #[must_use]
  pub const fn level(self) -> u8 {
    match self {
      Self::Fast => 1,
      Self::Balanced => 6,
      Self::Best => 9,
    }
  }
}

/// The most bytes a zlib stream of `len` input bytes can take.
#[inline]
#[must_use]
pub const fn deflate_bound(len: usize) -> usize {
  let a = 128 + (len / 100) * 110 + ((len % 100) * 110) / 100;
  let b = 128 + len + ((len / (31 * 1024)) + 1) * 5;
  if a > b {
    a
  } else {
    b
  }
}

/// Compresses all of the filtered lines as a single zlib stream.
pub(crate) fn compress_filtered(data: &[u8], effort: CompressionEffort) -> PngResult<Vec<u8>> {
  let flags = create_comp_flags_from_zip_params(i32::from(effort.level()), 15, 0);
  let mut compressor = CompressorOxide::new(flags);
  let mut out = Vec::new();
  let bound = deflate_bound(data.len());
  out.try_reserve_exact(bound)?;
  out.resize(bound, 0);
  let mut in_pos = 0;
  let mut out_pos = 0;
  loop {
    let (status, consumed, produced) =
      compress(&mut compressor, &data[in_pos..], &mut out[out_pos..], TDEFLFlush::Finish);
    in_pos += consumed;
    out_pos += produced;
    match status {
      TDEFLStatus::Done => break,
      TDEFLStatus::Okay => {
        // the bound is generous, this only happens for pathological input
        let more = (out.len() / 2).max(64);
        out.try_reserve(more)?;
        out.resize(out.len() + more, 0);
      }
      _ => return Err(PngError::Compression),
    }
  }
  out.truncate(out_pos);
  debug!("compressed {} filtered bytes to {}", data.len(), out.len());
  Ok(out)
}

#[test]
fn test_compress_filtered_inflates_back() {
  let data: Vec<u8> = (0..10_000_u32).map(|i| (i % 251) as u8 ^ (i / 97) as u8).collect();
  for effort in [CompressionEffort::Fast, CompressionEffort::Balanced, CompressionEffort::Best] {
    let packed = compress_filtered(&data, effort).unwrap();
    assert!(packed.len() <= deflate_bound(data.len()));
    assert_eq!(miniz_oxide::inflate::decompress_to_vec_zlib(&packed).unwrap(), data);
  }
}
