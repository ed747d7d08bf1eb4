#![forbid(unsafe_code)]

//! Module for working with PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Decoding
//!
//! Call [`decode`] (or [`decode_full`] to also get the header and background
//! color) with any [`ByteSource`]. The chunks are read in order, the image
//! data is decompressed as each `IDAT` chunk arrives, and at the `IEND` chunk
//! the scanlines are unfiltered and converted to [`RGBA8`].
//!
//! ## Encoding
//!
//! Call [`encode`] with the pixels and an [`EncodeOptions`]. Before anything
//! is written the image is (optionally) analyzed to pick the smallest color
//! type that holds it losslessly, and (optionally) converted to a palette.
//!
//! ## Parts
//!
//! The pieces the codec is built from are public too:
//!
//! * [`Crc32`] and [`ChunkReader`] / [`write_chunk`] for chunk framing.
//! * [`IHDR`], [`PassGeometry`], and [`ADAM7`] for image geometry.
//! * [`FilterType`], [`filter_row`], and [`reconstruct_row`] for scanline
//!   filters.
//! * [`ColorTable`], [`Transparency`], and [`quantize`] for palettes.

use alloc::{boxed::Box, vec::Vec};

use bytemuck::{Pod, Zeroable};
use log::{debug, trace, warn};

use crate::{
  u16_to_u8_channel, Bitmap, ByteSink, ByteSource, PngError, PngResult, RGB8, RGBA8, U16BE, U32BE,
};

mod crc32;
pub use crc32::*;

mod chunk;
pub use chunk::*;

mod ihdr;
pub use ihdr::*;

mod filter;
pub use filter::*;

mod palette;
pub use palette::*;

mod inflate;
use inflate::*;

mod deflate;
pub use deflate::*;

mod unpack;
use unpack::*;

mod pack;
use pack::*;

mod decode;
pub use decode::*;

mod encode;
pub use encode::*;


/// The first eight bytes of a PNG data stream.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];
