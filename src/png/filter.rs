//! Scanline filtering.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! Each filter predicts a byte from its neighbors and stores the difference:
//! `a` is the byte one whole pixel to the left (`stride` bytes back), `b` is
//! the byte directly above in the previous scanline, and `c` is the byte above
//! `a`. Neighbors outside the image (left of the first pixel, above the first
//! line) are 0.

use super::*;

/// The per-line filter type byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  /// The bytes are stored unaltered.
  #[default]
  None = 0,
  /// Difference from the byte to the left.
  Sub = 1,
  /// Difference from the byte above.
  Up = 2,
  /// Difference from the floored average of left and above.
  Average = 3,
  /// Difference from the [Paeth predictor](paeth_predict).
  Paeth = 4,
}
impl FilterType {
  /// All filter types, in tag order.
  pub const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}
impl TryFrom<u8> for FilterType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      _ => return Err(PngError::IllegalFilterType),
    })
  }
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring bytes (left `a`, above `b`, upper left `c`).
///
/// The output is whichever neighbor is closest to `a + b - c`, with ties going
/// to `a`, then `b`, then `c`.
#[inline]
#[must_use]
pub const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // Note(Lokathor): The PNG spec is extremely specific that you shall not,
  // under any circumstances, alter the order of evaluation of this
  // expression's tests.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// The value a filter predicts for one byte, given its neighbors.
#[inline]
#[must_use]
const fn predict(filter: FilterType, a: u8, b: u8, c: u8) -> u8 {
  match filter {
    FilterType::None => 0,
    FilterType::Sub => a,
    FilterType::Up => b,
    FilterType::Average => ((a as u16 + b as u16) / 2) as u8,
    FilterType::Paeth => paeth_predict(a, b, c),
  }
}

/// Undoes a filter on one scanline, in place.
///
/// * `prev` is the already reconstructed previous scanline of the same
///   reduced image, or all zeroes for the first line.
/// * `stride` is the [filter stride](IHDR::filter_stride).
pub fn reconstruct_row(filter: FilterType, row: &mut [u8], prev: &[u8], stride: usize) {
  debug_assert_eq!(row.len(), prev.len());
  debug_assert!(stride > 0);
  match filter {
    FilterType::None => (),
    FilterType::Sub => {
      for i in stride..row.len() {
        row[i] = row[i].wrapping_add(row[i - stride]);
      }
    }
    FilterType::Up => {
      row.iter_mut().zip(prev.iter().copied()).for_each(|(x, b)| *x = x.wrapping_add(b));
    }
    FilterType::Average | FilterType::Paeth => {
      // the first pixel has no left or upper left neighbor
      let lead = stride.min(row.len());
      for i in 0..lead {
        row[i] = row[i].wrapping_add(predict(filter, 0, prev[i], 0));
      }
      for i in lead..row.len() {
        let p = predict(filter, row[i - stride], prev[i], prev[i - stride]);
        row[i] = row[i].wrapping_add(p);
      }
    }
  }
}

/// Applies a filter to one scanline, writing the filtered bytes to `out`.
///
/// `row`, `prev`, and `out` must all be the same length. `prev` is the
/// unfiltered previous scanline, or all zeroes for the first line.
pub fn filter_row(filter: FilterType, row: &[u8], prev: &[u8], stride: usize, out: &mut [u8]) {
  debug_assert_eq!(row.len(), prev.len());
  debug_assert_eq!(row.len(), out.len());
  debug_assert!(stride > 0);
  for i in 0..row.len() {
    let (a, c) = if i >= stride { (row[i - stride], prev[i - stride]) } else { (0, 0) };
    out[i] = row[i].wrapping_sub(predict(filter, a, prev[i], c));
  }
}

/// The "minimum sum of absolute differences" score of a filtered line.
///
/// Each byte is taken as a signed value, so small differences in either
/// direction score low.
#[inline]
#[must_use]
pub fn filtered_line_cost(filtered: &[u8]) -> u64 {
  filtered.iter().map(|&b| u64::from((b as i8).unsigned_abs())).sum()
}

/// How the encoder picks a filter for each line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterPolicy {
  /// Use one filter type for every line.
  Fixed(FilterType),
  /// Try all five filters on each line and keep the one with the lowest
  /// [cost](filtered_line_cost).
  ///
  /// This is a per-line greedy choice, not a search for the best overall
  /// compression.
  #[default]
  Adaptive,
}

/// Filters scanlines for the encoder, reusing its scratch space between lines.
#[derive(Debug, Clone)]
pub(crate) struct LineFilterer {
  policy: FilterPolicy,
  stride: usize,
  candidate: Vec<u8>,
}
impl LineFilterer {
  /// Images below 8 bits per channel always use [`FilterType::None`].
  pub fn new(policy: FilterPolicy, header: &IHDR) -> PngResult<Self> {
    let policy = if header.bit_depth < 8 { FilterPolicy::Fixed(FilterType::None) } else { policy };
    let mut candidate = Vec::new();
    if policy == FilterPolicy::Adaptive {
      let len = header.bytes_per_scanline(header.width)?;
      candidate.try_reserve_exact(len)?;
      candidate.resize(len, 0);
    }
    Ok(Self { policy, stride: header.filter_stride(), candidate })
  }

  /// Writes the filter type byte and the filtered `row` into `out`, which
  /// must be one byte longer than `row`.
  pub fn filter_line(&mut self, row: &[u8], prev: &[u8], out: &mut [u8]) -> FilterType {
    let (tag, filtered) = match out.split_first_mut() {
      Some(split) => split,
      None => return FilterType::None,
    };
    let chosen = match self.policy {
      FilterPolicy::Fixed(filter) => {
        filter_row(filter, row, prev, self.stride, filtered);
        filter
      }
      FilterPolicy::Adaptive => {
        let candidate = &mut self.candidate[..row.len()];
        filter_row(FilterType::None, row, prev, self.stride, filtered);
        let mut best = (FilterType::None, filtered_line_cost(filtered));
        for filter in [FilterType::Sub, FilterType::Up, FilterType::Average, FilterType::Paeth] {
          filter_row(filter, row, prev, self.stride, candidate);
          let cost = filtered_line_cost(candidate);
          if cost < best.1 {
            best = (filter, cost);
            filtered.copy_from_slice(candidate);
          }
        }
        best.0
      }
    };
    *tag = chosen as u8;
    chosen
  }
}
