use super::*;

/// The largest length a chunk is allowed to declare.
pub const MAX_CHUNK_LEN: u32 = (1 << 31) - 1;

/// The 4-byte tag that identifies a chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct ChunkTy(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkTy {
  /// Image Header
  pub const IHDR: Self = Self(*b"IHDR");
  /// Palette
  pub const PLTE: Self = Self(*b"PLTE");
  /// Image Data
  pub const IDAT: Self = Self(*b"IDAT");
  /// Image End
  pub const IEND: Self = Self(*b"IEND");
  /// Transparency
  pub const tRNS: Self = Self(*b"tRNS");
  /// Background Color
  pub const bKGD: Self = Self(*b"bKGD");

  /// Critical chunks have an uppercase first letter.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 0b0010_0000) == 0
  }
}
impl core::fmt::Debug for ChunkTy {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Debug::fmt(core::str::from_utf8(self.0.as_slice()).unwrap_or("?"), f)
  }
}

/// The length and tag that start every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
struct RawChunkPrefix {
  length: U32BE,
  ty: ChunkTy,
}

/// Reads one chunk's data from a stream while keeping its CRC.
///
/// Each chunk is `length, tag, data, crc`. A reader is made after the length
/// and tag have been read, then the data is pulled out in as many pieces as
/// the caller likes, then [`finish`](Self::finish) reads the stored CRC and
/// compares it against the CRC of everything that was read.
#[derive(Debug, Clone)]
pub struct ChunkReader {
  ty: ChunkTy,
  length: u32,
  remaining: usize,
  crc: Crc32,
}
impl ChunkReader {
  /// Reads the next chunk's length and tag.
  pub fn begin<S: ByteSource + ?Sized>(src: &mut S) -> PngResult<Self> {
    let prefix: RawChunkPrefix = bytemuck::cast(src.read_array::<8>()?);
    let length = prefix.length.to_u32();
    if length > MAX_CHUNK_LEN {
      return Err(PngError::ChunkTooLong);
    }
    let mut crc = Crc32::new();
    crc.update(&prefix.ty.0);
    trace!("chunk {:?}, {} bytes", prefix.ty, length);
    Ok(Self { ty: prefix.ty, length, remaining: length as usize, crc })
  }

  #[inline]
  #[must_use]
  #[allow(missing_docs)]
  pub const fn ty(&self) -> ChunkTy {
    self.ty
  }

  /// The declared data length.
  #[inline]
  #[must_use]
  pub const fn len(&self) -> usize {
    self.length as usize
  }

  /// If the chunk declared no data at all.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.length == 0
  }

  /// How many data bytes haven't been read yet.
  #[inline]
  #[must_use]
  pub const fn remaining(&self) -> usize {
    self.remaining
  }

  /// Reads the next `buf.len()` data bytes.
  ///
  /// Asking for more bytes than remain in the chunk is a format error.
  pub fn read<S: ByteSource + ?Sized>(&mut self, src: &mut S, buf: &mut [u8]) -> PngResult<()> {
    if buf.len() > self.remaining {
      return Err(PngError::BadChunkLength);
    }
    src.read_exact(buf)?;
    self.crc.update(buf);
    self.remaining -= buf.len();
    Ok(())
  }

  /// Reads all of the data into a new vector.
  pub fn read_to_vec<S: ByteSource + ?Sized>(&mut self, src: &mut S) -> PngResult<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(self.remaining)?;
    v.resize(self.remaining, 0);
    self.read(src, &mut v)?;
    Ok(v)
  }

  /// Reads (and checksums) whatever data is left, throwing it away.
  pub fn discard<S: ByteSource + ?Sized>(&mut self, src: &mut S) -> PngResult<()> {
    let mut scratch = [0_u8; 512];
    while self.remaining > 0 {
      let step = self.remaining.min(scratch.len());
      self.read(src, &mut scratch[..step])?;
    }
    Ok(())
  }

  /// Reads the stored CRC and checks it.
  ///
  /// Any data not yet read is read and checksummed first.
  pub fn finish<S: ByteSource + ?Sized>(mut self, src: &mut S) -> PngResult<()> {
    self.discard(src)?;
    let declared = src.read_u32_be()?;
    if declared == self.crc.finish() {
      Ok(())
    } else {
      Err(PngError::ChecksumMismatch { chunk: self.ty })
    }
  }

  /// Skips the rest of the data and the stored CRC without checking it.
  pub fn skip<S: ByteSource + ?Sized>(self, src: &mut S) -> PngResult<()> {
    src.skip(self.remaining)?;
    src.skip(4)
  }
}

/// Writes a complete chunk: length, tag, data, then CRC.
pub fn write_chunk<W: ByteSink + ?Sized>(sink: &mut W, ty: ChunkTy, data: &[u8]) -> PngResult<()> {
  let length = u32::try_from(data.len()).map_err(|_| PngError::ChunkTooLong)?;
  if length > MAX_CHUNK_LEN {
    return Err(PngError::ChunkTooLong);
  }
  trace!("writing {:?}, {} bytes", ty, length);
  let prefix = RawChunkPrefix { length: U32BE::from_u32(length), ty };
  sink.write_all(bytemuck::bytes_of(&prefix))?;
  sink.write_all(data)?;
  sink.write_u32_be(chunk_crc(ty.0, data))
}
