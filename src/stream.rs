//! Sequential byte streams the codec reads from and writes to.
//!
//! The codec only ever moves forward through a stream. Slices and `Vec<u8>`
//! work out of the box, and with the `std` feature any [`std::io::Read`] or
//! [`std::io::Write`] can be wrapped with [`IoSource`] / [`IoSink`].

use alloc::vec::Vec;

use crate::{PngError, PngResult};

/// A source of bytes.
pub trait ByteSource {
  /// Fills all of `buf`, or fails with [`PngError::UnexpectedEof`].
  fn read_exact(&mut self, buf: &mut [u8]) -> PngResult<()>;

  /// Discards the next `n` bytes.
  fn skip(&mut self, mut n: usize) -> PngResult<()> {
    let mut scratch = [0_u8; 256];
    while n > 0 {
      let step = n.min(scratch.len());
      self.read_exact(&mut scratch[..step])?;
      n -= step;
    }
    Ok(())
  }

  /// Reads a fixed size byte array.
  #[inline]
  fn read_array<const N: usize>(&mut self) -> PngResult<[u8; N]> {
    let mut a = [0_u8; N];
    self.read_exact(&mut a)?;
    Ok(a)
  }

  #[inline]
  #[allow(missing_docs)]
  fn read_u8(&mut self) -> PngResult<u8> {
    self.read_array::<1>().map(|[u]| u)
  }

  #[inline]
  #[allow(missing_docs)]
  fn read_u16_be(&mut self) -> PngResult<u16> {
    self.read_array().map(u16::from_be_bytes)
  }

  #[inline]
  #[allow(missing_docs)]
  fn read_u32_be(&mut self) -> PngResult<u32> {
    self.read_array().map(u32::from_be_bytes)
  }

  #[inline]
  #[allow(missing_docs)]
  fn read_u16_le(&mut self) -> PngResult<u16> {
    self.read_array().map(u16::from_le_bytes)
  }

  #[inline]
  #[allow(missing_docs)]
  fn read_u32_le(&mut self) -> PngResult<u32> {
    self.read_array().map(u32::from_le_bytes)
  }
}

impl ByteSource for &[u8] {
  #[inline]
  fn read_exact(&mut self, buf: &mut [u8]) -> PngResult<()> {
    if self.len() < buf.len() {
      *self = &[];
      return Err(PngError::UnexpectedEof);
    }
    let (head, tail) = self.split_at(buf.len());
    buf.copy_from_slice(head);
    *self = tail;
    Ok(())
  }

  #[inline]
  fn skip(&mut self, n: usize) -> PngResult<()> {
    if self.len() < n {
      *self = &[];
      return Err(PngError::UnexpectedEof);
    }
    *self = &self[n..];
    Ok(())
  }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
  #[inline]
  fn read_exact(&mut self, buf: &mut [u8]) -> PngResult<()> {
    (**self).read_exact(buf)
  }
  #[inline]
  fn skip(&mut self, n: usize) -> PngResult<()> {
    (**self).skip(n)
  }
}

/// A sink for bytes.
pub trait ByteSink {
  /// Writes all of `bytes`, or fails with [`PngError::StreamWrite`].
  fn write_all(&mut self, bytes: &[u8]) -> PngResult<()>;

  #[inline]
  #[allow(missing_docs)]
  fn write_u8(&mut self, u: u8) -> PngResult<()> {
    self.write_all(&[u])
  }

  #[inline]
  #[allow(missing_docs)]
  fn write_u16_be(&mut self, u: u16) -> PngResult<()> {
    self.write_all(&u.to_be_bytes())
  }

  #[inline]
  #[allow(missing_docs)]
  fn write_u32_be(&mut self, u: u32) -> PngResult<()> {
    self.write_all(&u.to_be_bytes())
  }

  #[inline]
  #[allow(missing_docs)]
  fn write_u16_le(&mut self, u: u16) -> PngResult<()> {
    self.write_all(&u.to_le_bytes())
  }

  #[inline]
  #[allow(missing_docs)]
  fn write_u32_le(&mut self, u: u32) -> PngResult<()> {
    self.write_all(&u.to_le_bytes())
  }
}

impl ByteSink for Vec<u8> {
  #[inline]
  fn write_all(&mut self, bytes: &[u8]) -> PngResult<()> {
    self.try_reserve(bytes.len())?;
    self.extend_from_slice(bytes);
    Ok(())
  }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
  #[inline]
  fn write_all(&mut self, bytes: &[u8]) -> PngResult<()> {
    (**self).write_all(bytes)
  }
}

/// Adapts any [`std::io::Read`] into a [`ByteSource`].
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoSource<R>(pub R);
#[cfg(feature = "std")]
impl<R: std::io::Read> ByteSource for IoSource<R> {
  #[inline]
  fn read_exact(&mut self, buf: &mut [u8]) -> PngResult<()> {
    // Note: every io failure, not just a short read, means we can't get the
    // bytes we need.
    self.0.read_exact(buf).map_err(|_| PngError::UnexpectedEof)
  }
}

/// Adapts any [`std::io::Write`] into a [`ByteSink`].
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoSink<W>(pub W);
#[cfg(feature = "std")]
impl<W: std::io::Write> ByteSink for IoSink<W> {
  #[inline]
  fn write_all(&mut self, bytes: &[u8]) -> PngResult<()> {
    self.0.write_all(bytes).map_err(|_| PngError::StreamWrite)
  }
}

#[test]
fn test_slice_source_eof() {
  let mut src: &[u8] = &[0, 0, 1, 2, 9];
  assert_eq!(src.read_u32_be(), Ok(0x0102));
  assert_eq!(src.read_u16_be(), Err(PngError::UnexpectedEof));
  assert!(src.is_empty());
}
