//! The decoder: signature, chunk sequence, then pixels.

use core::cell::Cell;

use super::*;

/// `IDAT` data is read in pieces this big, so a bogus chunk length runs out of
/// input before it can cause a huge allocation.
const IDAT_PIECE: usize = 64 * 1024;

/// A decoded image along with the header and background it came with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedPng {
  /// The pixels, converted to `RGBA8`.
  pub image: Bitmap<RGBA8>,
  /// The header as it appeared in the data stream.
  pub header: IHDR,
  /// The `bKGD` color, if the data stream had one.
  pub background: Option<RGBA8>,
}

/// Decodes a PNG data stream into an image.
///
/// The whole data stream is read, up through the `IEND` chunk, before the
/// image is returned. On any error no image is returned.
///
/// * Every known chunk has its CRC checked. Chunks this decoder doesn't use
///   are skipped over without looking at their CRC.
/// * Pixels of every color type and bit depth are converted to `RGBA8`.
///   16-bit channels are scaled down by dividing by 257.
/// * Interlaced images are de-interlaced into the normal row-major layout.
#[inline]
pub fn decode<S: ByteSource + ?Sized>(src: &mut S) -> PngResult<Bitmap<RGBA8>> {
  decode_full(src).map(|decoded| decoded.image)
}

/// Like [`decode`], but also gives back the header and background color.
pub fn decode_full<S: ByteSource + ?Sized>(src: &mut S) -> PngResult<DecodedPng> {
  if src.read_array::<8>()? != PNG_SIGNATURE {
    return Err(PngError::BadSignature);
  }
  let header = read_header(src)?;
  debug!("decoding {header:?}");

  let mut window = InflateWindow::new(header.zlib_decompression_requirement()?)?;
  let mut table: Option<ColorTable> = None;
  let mut transparency: Option<Transparency> = None;
  let mut background: Option<RGBA8> = None;
  let mut seen_idat = false;

  loop {
    let mut chunk = ChunkReader::begin(src)?;
    match chunk.ty() {
      ChunkTy::IHDR => return Err(PngError::ChunkOrder),
      ChunkTy::PLTE => {
        if seen_idat {
          return Err(PngError::ChunkOrder);
        }
        if chunk.len() > 256 * 3 {
          return Err(PngError::BadPalette);
        }
        let data = chunk.read_to_vec(src)?;
        chunk.finish(src)?;
        if header.color_type == PngColorType::Index {
          if table.is_some() {
            return Err(PngError::ChunkOrder);
          }
          table = Some(ColorTable::from_plte(&data)?);
        } else {
          debug!("ignoring a suggested palette of {} bytes", data.len());
        }
      }
      ChunkTy::tRNS => {
        if seen_idat {
          return Err(PngError::ChunkOrder);
        }
        if chunk.len() > 256 {
          return Err(PngError::BadTransparency);
        }
        let data = chunk.read_to_vec(src)?;
        chunk.finish(src)?;
        match header.color_type {
          PngColorType::Index => {
            table.as_mut().ok_or(PngError::ChunkOrder)?.apply_alphas(&data)?;
          }
          PngColorType::YA | PngColorType::RGBA => {
            warn!("ignoring tRNS on {:?}, which has an alpha channel", header.color_type);
          }
          other => transparency = Transparency::parse(other, &data)?,
        }
      }
      ChunkTy::bKGD => {
        if seen_idat {
          return Err(PngError::ChunkOrder);
        }
        if chunk.len() > 6 {
          warn!("ignoring bKGD of {} bytes", chunk.len());
          chunk.finish(src)?;
          continue;
        }
        let data = chunk.read_to_vec(src)?;
        chunk.finish(src)?;
        match parse_background(&header, &data, table.as_ref()) {
          Ok(color) => background = Some(color),
          Err(PngError::ChunkOrder) => return Err(PngError::ChunkOrder),
          Err(e) => warn!("ignoring bKGD: {e}"),
        }
      }
      ChunkTy::IDAT => {
        if header.color_type == PngColorType::Index && table.is_none() {
          return Err(PngError::ChunkOrder);
        }
        seen_idat = true;
        if window.is_complete() {
          warn!("{} bytes of extra image data", chunk.len());
          chunk.finish(src)?;
          continue;
        }
        // the data is only inflated after its CRC checks out
        while chunk.remaining() > 0 {
          let step = chunk.remaining().min(IDAT_PIECE);
          chunk.read(src, window.append_input(step)?)?;
        }
        chunk.finish(src)?;
        window.inflate()?;
        trace!(
          "inflate window: output at {}, input at {}, {} bytes pending",
          window.output_cursor(),
          window.input_cursor(),
          window.pending_input()
        );
      }
      ChunkTy::IEND => {
        if !chunk.is_empty() {
          return Err(PngError::BadChunkLength);
        }
        chunk.finish(src)?;
        break;
      }
      other => {
        trace!("skipping {other:?}");
        chunk.skip(src)?;
      }
    }
  }

  let empty_table;
  let table = match table.as_ref() {
    Some(table) => table,
    None => {
      empty_table = ColorTable::from_colors(&[])?;
      &empty_table
    }
  };
  let ctx = UnpackContext { table, transparency, index_out_of_range: Cell::new(false) };
  let image = unfilter_and_unpack(&header, window.decompressed_mut()?, &ctx)?;
  if ctx.index_out_of_range.get() {
    warn!("palette indexes past the {} palette entries were drawn as black", table.len());
  }
  Ok(DecodedPng { image, header, background })
}

/// Reads the `IHDR` chunk, which must come first.
fn read_header<S: ByteSource + ?Sized>(src: &mut S) -> PngResult<IHDR> {
  let mut chunk = ChunkReader::begin(src)?;
  if chunk.ty() != ChunkTy::IHDR {
    return Err(PngError::ChunkOrder);
  }
  if chunk.len() != IHDR::LEN {
    return Err(PngError::BadChunkLength);
  }
  let mut bytes = [0_u8; IHDR::LEN];
  chunk.read(src, &mut bytes)?;
  chunk.finish(src)?;
  IHDR::try_from(&bytes[..])
}

/// Reconstructs every filtered line of every reduced image and unpacks each
/// line straight into its final spot in the output image.
fn unfilter_and_unpack(
  header: &IHDR, mut data: &mut [u8], ctx: &UnpackContext<'_>,
) -> PngResult<Bitmap<RGBA8>> {
  let unpack = unpacker_for(header).ok_or(PngError::IllegalHeader)?;
  let stride = header.filter_stride();

  let pixel_count = (header.width as usize) * (header.height as usize);
  let mut pixels = Vec::new();
  pixels.try_reserve_exact(pixel_count)?;
  pixels.resize(pixel_count, RGBA8::default());
  let mut image = Bitmap { width: header.width, height: header.height, pixels };

  let mut zeroes = Vec::new();
  let widest = header.bytes_per_scanline(header.width)?;
  zeroes.try_reserve_exact(widest)?;
  zeroes.resize(widest, 0_u8);

  for reduced in header.reduced_images() {
    let line_len = header.bytes_per_filterline(reduced.width)?;
    let pass_len = line_len * reduced.height as usize;
    let (pass, rest) = core::mem::take(&mut data).split_at_mut(pass_len);
    data = rest;

    let g = reduced.geometry;
    let mut prev: &[u8] = &zeroes[..line_len - 1];
    for (reduced_y, line) in pass.chunks_exact_mut(line_len).enumerate() {
      let (tag, row) = line.split_at_mut(1);
      reconstruct_row(FilterType::try_from(tag[0])?, row, prev, stride);
      let full_y = g.y_offset + (reduced_y as u32) * g.y_step;
      let out = image.row_mut(full_y).ok_or(PngError::DimensionsOverflow)?;
      unpack(row, ctx, out, g.x_offset as usize, g.x_step as usize, reduced.width as usize);
      prev = row;
    }
  }
  Ok(image)
}
