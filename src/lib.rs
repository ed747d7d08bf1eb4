#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for PNG decoding and encoding.
//!
//! The codec reads from any [`ByteSource`] and writes to any [`ByteSink`].
//! Decoded images are always handed back as 8-bit-per-channel straight alpha
//! [`RGBA8`] pixels, regardless of the bit depth and color type stored in the
//! PNG data stream.
//!
//! ```
//! use imagine_png::{png::EncodeOptions, Bitmap, RGBA8};
//!
//! let pixels = vec![RGBA8 { r: 255, g: 0, b: 0, a: 255 }; 4];
//! let image = Bitmap { width: 2, height: 2, pixels };
//! let bytes = image.to_png_bytes(&EncodeOptions::default()).unwrap();
//! let back = Bitmap::<RGBA8>::try_from_png_bytes(&bytes).unwrap();
//! assert_eq!(image, back);
//! ```

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod int_endian;
pub use int_endian::*;

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod image;
pub use image::*;

pub mod stream;
pub use stream::*;

pub mod png;
