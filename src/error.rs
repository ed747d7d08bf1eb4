use core::{fmt, num::TryFromIntError};

use crate::png::ChunkTy;

/// The broad category of a [`PngError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// The data isn't a well formed PNG: bad signature, malformed or out of
  /// order chunks, illegal header field combinations, and so on.
  Format,
  /// A chunk's CRC didn't match its contents.
  Checksum,
  /// A count was outside the allowed range.
  Range,
  /// The zlib stream couldn't be compressed or decompressed.
  Compression,
  /// The allocator couldn't give us enough space.
  Resource,
  /// The byte stream itself failed.
  Stream,
}

/// An error from the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PngError {
  /// The first eight bytes are not the PNG signature.
  BadSignature,

  /// The byte source ran out before a read could be completed.
  UnexpectedEof,

  /// The byte sink refused a write.
  StreamWrite,

  /// A chunk showed up somewhere it's not allowed: before the header, a
  /// transparency or background chunk before the palette, image data with no
  /// palette for an indexed image, and similar.
  ChunkOrder,

  /// A chunk declared a length larger than `2^31 - 1`.
  ChunkTooLong,

  /// A chunk with a fixed size (header, terminator) had the wrong length.
  BadChunkLength,

  /// The header had an illegal bit depth / color type pairing, or a
  /// compression, filter, or interlace method we don't know.
  IllegalHeader,

  /// The declared width and/or height of this image is 0.
  WidthOrHeightZero,

  /// The image dimensions overflow the sizes we can compute with.
  DimensionsOverflow,

  /// A scanline started with a filter type byte outside `0..=4`.
  IllegalFilterType,

  /// The palette chunk isn't a whole number of entries, or has 0 or more
  /// than 256 of them.
  BadPalette,

  /// The transparency chunk has more alpha values than the palette has
  /// entries.
  BadTransparency,

  /// The terminator chunk came before enough image data was decompressed.
  MissingImageData,

  /// The CRC stored after a chunk doesn't match the chunk.
  ChecksumMismatch {
    /// The tag of the chunk that failed.
    chunk: ChunkTy,
  },

  /// More than 256 distinct colors were found while building a palette.
  TooManyColors,

  /// The pixel slice given to the encoder isn't `width * height` long.
  PixelCountMismatch,

  /// The decompressor reported an unrecoverable stream error.
  Decompression,

  /// The compressor reported an unrecoverable stream error.
  Compression,

  /// The allocator couldn't give us enough space.
  Alloc,
}
impl PngError {
  /// Which category of failure this is.
  #[inline]
  #[must_use]
  pub const fn kind(self) -> ErrorKind {
    match self {
      Self::ChecksumMismatch { .. } => ErrorKind::Checksum,
      Self::TooManyColors | Self::PixelCountMismatch => ErrorKind::Range,
      Self::Decompression | Self::Compression => ErrorKind::Compression,
      Self::Alloc => ErrorKind::Resource,
      Self::UnexpectedEof | Self::StreamWrite => ErrorKind::Stream,
      Self::BadSignature
      | Self::ChunkOrder
      | Self::ChunkTooLong
      | Self::BadChunkLength
      | Self::IllegalHeader
      | Self::WidthOrHeightZero
      | Self::DimensionsOverflow
      | Self::IllegalFilterType
      | Self::BadPalette
      | Self::BadTransparency
      | Self::MissingImageData => ErrorKind::Format,
    }
  }
}
impl fmt::Display for PngError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BadSignature => f.write_str("not a PNG signature"),
      Self::UnexpectedEof => f.write_str("unexpected end of input"),
      Self::StreamWrite => f.write_str("the output stream refused a write"),
      Self::ChunkOrder => f.write_str("chunk out of order"),
      Self::ChunkTooLong => f.write_str("chunk length exceeds 2^31-1"),
      Self::BadChunkLength => f.write_str("chunk has the wrong length"),
      Self::IllegalHeader => f.write_str("illegal image header"),
      Self::WidthOrHeightZero => f.write_str("image width or height is zero"),
      Self::DimensionsOverflow => f.write_str("image dimensions are too large"),
      Self::IllegalFilterType => f.write_str("illegal scanline filter type"),
      Self::BadPalette => f.write_str("malformed palette"),
      Self::BadTransparency => f.write_str("malformed transparency"),
      Self::MissingImageData => f.write_str("not enough image data"),
      Self::ChecksumMismatch { chunk } => write!(f, "CRC mismatch in {chunk:?} chunk"),
      Self::TooManyColors => f.write_str("more than 256 distinct colors"),
      Self::PixelCountMismatch => f.write_str("pixel count doesn't match width * height"),
      Self::Decompression => f.write_str("zlib decompression failed"),
      Self::Compression => f.write_str("zlib compression failed"),
      Self::Alloc => f.write_str("allocation failed"),
    }
  }
}
#[cfg(feature = "std")]
impl std::error::Error for PngError {}

impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
impl From<TryFromIntError> for PngError {
  #[inline]
  fn from(_: TryFromIntError) -> Self {
    Self::DimensionsOverflow
  }
}

/// Shorthand for results with a [`PngError`].
pub type PngResult<T> = Result<T, PngError>;
