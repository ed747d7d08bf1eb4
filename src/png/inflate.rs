//! Decompression of the image data, fed one data chunk at a time.

use miniz_oxide::inflate::{
  core::{decompress, inflate_flags, DecompressorOxide},
  TINFLStatus,
};

use super::*;

/// The decompressed part of the window starts out this big and doubles as
/// output arrives, so a header that claims a huge image doesn't commit memory
/// until the data is actually there.
const INITIAL_HEAD: usize = 32 * 1024;

/// One buffer holding both the decompressed output and the compressed input
/// that hasn't been consumed yet.
///
/// ```text
/// [ decompressed .. | free .. | consumed compressed .. | pending compressed .. ]
/// 0             output       head                  input                   len
/// ```
///
/// * The *output cursor* only moves forward as the decompressor produces
///   bytes, and never passes `head`.
/// * `head` grows toward `expected` whenever the output cursor reaches it.
///   The consumed compressed bytes are dropped first, so the pending input
///   just slides further back.
/// * The *input cursor* only moves forward as the decompressor consumes bytes.
///   When more compressed bytes arrive the consumed ones are dropped and the
///   cursor resets to `head`.
pub(crate) struct InflateWindow {
  buf: Vec<u8>,
  expected: usize,
  head: usize,
  output: usize,
  input: usize,
  decomp: Box<DecompressorOxide>,
  stream_done: bool,
}
impl InflateWindow {
  /// A window for a zlib stream that should decompress to `expected` bytes.
  pub fn new(expected: usize) -> PngResult<Self> {
    let head = expected.min(INITIAL_HEAD);
    let mut buf = Vec::new();
    buf.try_reserve_exact(head)?;
    buf.resize(head, 0);
    Ok(Self {
      buf,
      expected,
      head,
      output: 0,
      input: head,
      decomp: Box::default(),
      stream_done: false,
    })
  }

  #[inline]
  #[must_use]
  pub const fn output_cursor(&self) -> usize {
    self.output
  }

  #[inline]
  #[must_use]
  pub const fn input_cursor(&self) -> usize {
    self.input
  }

  /// Compressed bytes that have arrived but haven't been consumed.
  #[inline]
  #[must_use]
  pub fn pending_input(&self) -> usize {
    self.buf.len() - self.input
  }

  /// If all of the expected output has been produced.
  #[inline]
  #[must_use]
  pub const fn is_complete(&self) -> bool {
    self.output >= self.expected
  }

  /// Makes room for `n` more compressed bytes at the end of the buffer and
  /// gives back that space to be filled.
  pub fn append_input(&mut self, n: usize) -> PngResult<&mut [u8]> {
    self.buf.drain(self.head..self.input);
    self.input = self.head;
    let old_len = self.buf.len();
    let new_len = old_len.checked_add(n).ok_or(PngError::Alloc)?;
    self.buf.try_reserve(n)?;
    self.buf.resize(new_len, 0);
    Ok(&mut self.buf[old_len..])
  }

  /// Doubles the decompressed part of the window, up to `expected`.
  fn grow_head(&mut self) -> PngResult<()> {
    let new_head = self.head.saturating_mul(2).max(INITIAL_HEAD).min(self.expected);
    let extra = new_head - self.head;
    self.buf.drain(self.head..self.input);
    self.buf.try_reserve(extra)?;
    self.buf.resize(self.buf.len() + extra, 0);
    self.buf[self.head..].rotate_right(extra);
    self.head = new_head;
    self.input = new_head;
    Ok(())
  }

  /// Runs the decompressor over the pending input until it runs out of input
  /// or the expected output is all there.
  pub fn inflate(&mut self) -> PngResult<()> {
    let flags = inflate_flags::TINFL_FLAG_PARSE_ZLIB_HEADER
      | inflate_flags::TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF
      | inflate_flags::TINFL_FLAG_HAS_MORE_INPUT;
    while !self.is_complete() && !self.stream_done {
      if self.output == self.head {
        self.grow_head()?;
      }
      debug_assert!(self.output < self.head && self.head <= self.input);
      let (front, rest) = self.buf.split_at_mut(self.input);
      let out = &mut front[..self.head];
      let (status, consumed, produced) =
        decompress(&mut self.decomp, rest, out, self.output, flags);
      self.input += consumed;
      self.output += produced;
      match status {
        TINFLStatus::Done => self.stream_done = true,
        TINFLStatus::NeedsMoreInput => break,
        TINFLStatus::HasMoreOutput if consumed == 0 && produced == 0 => break,
        TINFLStatus::HasMoreOutput => (),
        _ => {
          debug!("inflate failed: {status:?}");
          return Err(PngError::Decompression);
        }
      }
    }
    Ok(())
  }

  /// The decompressed bytes, once the window [is complete](Self::is_complete).
  #[inline]
  pub fn decompressed_mut(&mut self) -> PngResult<&mut [u8]> {
    if self.is_complete() {
      Ok(&mut self.buf[..self.expected])
    } else {
      Err(PngError::MissingImageData)
    }
  }
}
