use imagine_png::{
  png::{
    chunk_crc, decode, decode_full, encode, filter_row, CompressionEffort, EncodeOptions,
    FilterPolicy, FilterType, PngColorType, IHDR, PNG_SIGNATURE,
  },
  Bitmap, ErrorKind, PngError, RGBA8,
};
use miniz_oxide::deflate::compress_to_vec_zlib;
use walkdir::WalkDir;

fn push_chunk(out: &mut Vec<u8>, ty: &[u8; 4], data: &[u8]) {
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(ty);
  out.extend_from_slice(data);
  out.extend_from_slice(&chunk_crc(*ty, data).to_be_bytes());
}

/// Builds a PNG by hand: header, any extra chunks, the compressed data as one
/// `IDAT`, then `IEND`.
fn assemble(header: &IHDR, extra: &[(&[u8; 4], &[u8])], filtered: &[u8]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  push_chunk(&mut out, b"IHDR", &header.to_bytes());
  for (ty, data) in extra {
    push_chunk(&mut out, ty, data);
  }
  push_chunk(&mut out, b"IDAT", &compress_to_vec_zlib(filtered, 6));
  push_chunk(&mut out, b"IEND", &[]);
  out
}

/// Splits a PNG into `(offset of the chunk's data, length)` for each chunk.
fn chunk_spans(png: &[u8]) -> Vec<(usize, usize)> {
  let mut spans = Vec::new();
  let mut i = 8;
  while i + 8 <= png.len() {
    let len = u32::from_be_bytes(png[i..i + 4].try_into().unwrap()) as usize;
    spans.push((i + 8, len));
    i += 12 + len;
  }
  spans
}

fn round_trip(image: &Bitmap<RGBA8>, options: &EncodeOptions) -> Bitmap<RGBA8> {
  let bytes = image.to_png_bytes(options).unwrap();
  Bitmap::try_from_png_bytes(&bytes).unwrap()
}

fn image_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> RGBA8) -> Bitmap<RGBA8> {
  let mut pixels = Vec::new();
  for y in 0..height {
    for x in 0..width {
      pixels.push(f(x, y));
    }
  }
  Bitmap { width, height, pixels }
}

fn noise_image(width: u32, height: u32) -> Bitmap<RGBA8> {
  let bytes = super::rand_bytes((width * height * 4) as usize);
  Bitmap { width, height, pixels: bytemuck::cast_slice(&bytes).to_vec() }
}

#[test]
fn test_round_trips() {
  let images = [
    image_from_fn(17, 9, |_, _| RGBA8 { r: 10, g: 200, b: 30, a: 255 }),
    image_from_fn(64, 33, |x, y| RGBA8 {
      r: (x * 4) as u8,
      g: (y * 7) as u8,
      b: (x ^ y) as u8,
      a: 255,
    }),
    image_from_fn(31, 31, |x, y| RGBA8::gray((x * 8 + y) as u8, 255)),
    image_from_fn(20, 20, |x, y| RGBA8::gray((x * y) as u8, (x * 12) as u8)),
    image_from_fn(12, 5, |x, y| RGBA8 {
      r: (x % 3) as u8 * 100,
      g: (y % 2) as u8 * 50,
      b: 9,
      a: if x == y { 0 } else { 255 },
    }),
    image_from_fn(3, 40, |x, y| RGBA8 { r: x as u8, g: y as u8, b: 128, a: (y * 6) as u8 }),
    noise_image(40, 23),
    noise_image(1, 1),
  ];
  let policies = [
    FilterPolicy::Adaptive,
    FilterPolicy::Fixed(FilterType::None),
    FilterPolicy::Fixed(FilterType::Sub),
    FilterPolicy::Fixed(FilterType::Up),
    FilterPolicy::Fixed(FilterType::Average),
    FilterPolicy::Fixed(FilterType::Paeth),
  ];
  for image in &images {
    for filter in policies {
      for try_indexed in [false, true] {
        for analyze in [false, true] {
          let options = EncodeOptions::default()
            .with_filter(filter)
            .with_try_indexed(try_indexed)
            .with_analyze(analyze);
          assert_eq!(&round_trip(image, &options), image, "{options:?}");
        }
      }
    }
    for effort in [CompressionEffort::Fast, CompressionEffort::Best] {
      let options = EncodeOptions::default().with_effort(effort);
      assert_eq!(&round_trip(image, &options), image, "{options:?}");
    }
  }
}

#[test]
fn test_two_by_two_example() {
  let pixels = vec![
    RGBA8 { r: 255, g: 0, b: 0, a: 255 },
    RGBA8 { r: 0, g: 255, b: 0, a: 255 },
    RGBA8 { r: 0, g: 0, b: 255, a: 255 },
    RGBA8 { r: 255, g: 255, b: 255, a: 0 },
  ];
  let mut bytes = Vec::new();
  encode(&mut bytes, &pixels, 2, 2, &EncodeOptions::default()).unwrap();
  let image = decode(&mut &bytes[..]).unwrap();
  assert_eq!((image.width, image.height), (2, 2));
  assert_eq!(image.pixels, pixels);
}

#[test]
fn test_opaque_image_is_stored_as_rgb() {
  let image = image_from_fn(5, 5, |x, y| RGBA8 { r: x as u8, g: y as u8, b: 3, a: 255 });
  let bytes = image.to_png_bytes(&EncodeOptions::default()).unwrap();
  // signature, chunk length, "IHDR", width, height, bit depth, color type
  assert_eq!(bytes[25], PngColorType::RGB as u8);
  let decoded = decode_full(&mut &bytes[..]).unwrap();
  assert_eq!(decoded.header.color_type, PngColorType::RGB);
  assert_eq!(decoded.header.bit_depth, 8);
  assert_eq!(decoded.image, image);

  // without analysis it stays RGBA
  let bytes = image.to_png_bytes(&EncodeOptions::default().with_analyze(false)).unwrap();
  assert_eq!(bytes[25], PngColorType::RGBA as u8);
}

#[test]
fn test_opaque_gray_uses_smallest_depth() {
  let image = image_from_fn(9, 3, |x, _| RGBA8::gray([0, 85, 170, 255][x as usize % 4], 255));
  let options = EncodeOptions::default().with_try_indexed(true);
  let bytes = image.to_png_bytes(&options).unwrap();
  let decoded = decode_full(&mut &bytes[..]).unwrap();
  assert_eq!(decoded.header.color_type, PngColorType::Y);
  assert_eq!(decoded.header.bit_depth, 2);
  assert_eq!(decoded.image, image);
}

#[test]
fn test_lossy_reductions() {
  let image =
    image_from_fn(4, 4, |x, y| RGBA8 { r: 255, g: (x * 60) as u8, b: 0, a: (y * 80) as u8 });
  let options = EncodeOptions::default().with_force_gray(true).with_force_opaque(true);
  let bytes = image.to_png_bytes(&options).unwrap();
  let decoded = decode_full(&mut &bytes[..]).unwrap();
  assert_eq!(decoded.header.color_type, PngColorType::Y);
  for (got, src) in decoded.image.pixels.iter().zip(image.pixels.iter()) {
    assert_eq!(*got, RGBA8::gray(src.luma(), 255));
  }
}

#[test]
fn test_quantization_boundary() {
  let options = EncodeOptions::default().with_try_indexed(true);

  let colors_256 =
    image_from_fn(16, 16, |x, y| RGBA8 { r: (x * 16) as u8, g: (y * 16) as u8, b: 1, a: 255 });
  let bytes = colors_256.to_png_bytes(&options).unwrap();
  let decoded = decode_full(&mut &bytes[..]).unwrap();
  assert_eq!(decoded.header.color_type, PngColorType::Index);
  assert_eq!(decoded.header.bit_depth, 8);
  assert_eq!(decoded.image, colors_256);

  let colors_257 =
    image_from_fn(257, 1, |x, _| RGBA8 { r: x as u8, g: (x >> 8) as u8, b: 1, a: 255 });
  let bytes = colors_257.to_png_bytes(&options).unwrap();
  let decoded = decode_full(&mut &bytes[..]).unwrap();
  assert_eq!(decoded.header.color_type, PngColorType::RGB);
  assert_eq!(decoded.image, colors_257);
}

#[test]
fn test_indexed_with_partial_alpha() {
  let image = image_from_fn(10, 3, |x, _| match x % 3 {
    0 => RGBA8 { r: 255, g: 0, b: 0, a: 255 },
    1 => RGBA8 { r: 0, g: 0, b: 0, a: 0 },
    _ => RGBA8 { r: 0, g: 90, b: 0, a: 77 },
  });
  let options = EncodeOptions::default().with_try_indexed(true);
  let bytes = image.to_png_bytes(&options).unwrap();
  let decoded = decode_full(&mut &bytes[..]).unwrap();
  assert_eq!(decoded.header.color_type, PngColorType::Index);
  assert_eq!(decoded.header.bit_depth, 2);
  assert_eq!(decoded.image, image);
}

#[test]
fn test_checksum_sensitivity() {
  let image =
    image_from_fn(6, 6, |x, y| RGBA8 { r: (x * 40) as u8, g: (y * 40) as u8, b: 0, a: 200 });
  let options = EncodeOptions::default().with_try_indexed(true);
  let bytes = image.to_png_bytes(&options).unwrap();
  let spans = chunk_spans(&bytes);
  assert!(spans.len() >= 4);
  for (start, len) in spans {
    // the data and the stored CRC after it
    for byte in start..start + len + 4 {
      for bit in 0..8 {
        let mut broken = bytes.clone();
        broken[byte] ^= 1 << bit;
        let err = decode(&mut &broken[..]).unwrap_err();
        assert!(matches!(err, PngError::ChecksumMismatch { .. }), "byte {byte} bit {bit}: {err:?}");
        assert_eq!(err.kind(), ErrorKind::Checksum);
      }
    }
  }
}

#[test]
fn test_truncation_fails() {
  let image = noise_image(12, 12);
  let bytes = image.to_png_bytes(&EncodeOptions::default()).unwrap();
  for cut in 0..bytes.len() {
    assert!(decode(&mut &bytes[..cut]).is_err(), "cut at {cut}");
  }

  // a well formed stream that's just missing compressed data
  let header = IHDR::new(8, 8, 8, PngColorType::RGB, false).unwrap();
  let filtered: Vec<u8> = (0..8 * 25).map(|i| (i * 31 % 256) as u8 & 0x03).collect();
  let full = compress_to_vec_zlib(&filtered, 6);
  let mut png = PNG_SIGNATURE.to_vec();
  push_chunk(&mut png, b"IHDR", &header.to_bytes());
  // just the zlib header and one byte
  push_chunk(&mut png, b"IDAT", &full[..3]);
  push_chunk(&mut png, b"IEND", &[]);
  assert_eq!(decode(&mut &png[..]), Err(PngError::MissingImageData));
}

#[test]
fn test_data_split_across_many_idat_chunks() {
  let header = IHDR::new(9, 4, 8, PngColorType::Y, false).unwrap();
  let mut filtered = Vec::new();
  for y in 0..4_u8 {
    filtered.push(0);
    filtered.extend((0..9).map(|x| x * 20 + y));
  }
  let z = compress_to_vec_zlib(&filtered, 6);
  let mut png = PNG_SIGNATURE.to_vec();
  push_chunk(&mut png, b"IHDR", &header.to_bytes());
  for piece in z.chunks(3) {
    push_chunk(&mut png, b"IDAT", piece);
  }
  push_chunk(&mut png, b"IDAT", &[1, 2, 3]);
  push_chunk(&mut png, b"IEND", &[]);
  let image = decode(&mut &png[..]).unwrap();
  assert_eq!(image.get(8, 3), Some(&RGBA8::gray(163, 255)));
  assert_eq!(image.get(0, 0), Some(&RGBA8::gray(0, 255)));
}

/// Lays out interlaced filtered data (all lines unfiltered) from a per pixel
/// function, along with the image it should decode to.
fn interlaced(
  header: &IHDR, pixel_bytes: impl Fn(u32, u32) -> Vec<u8>, pixel: impl Fn(u32, u32) -> RGBA8,
) -> (Vec<u8>, Bitmap<RGBA8>) {
  let mut filtered = Vec::new();
  for reduced in header.reduced_images() {
    for ry in 0..reduced.height {
      filtered.push(0);
      for rx in 0..reduced.width {
        let (x, y) = reduced.geometry.full_pos(rx, ry);
        filtered.extend(pixel_bytes(x, y));
      }
    }
  }
  assert_eq!(filtered.len(), header.zlib_decompression_requirement().unwrap());
  (filtered, image_from_fn(header.width, header.height, pixel))
}

#[test]
fn test_interlaced_decode() {
  for (w, h) in [(1, 1), (3, 3), (8, 8), (13, 7), (2, 17)] {
    let header = IHDR::new(w, h, 8, PngColorType::RGBA, true).unwrap();
    let color =
      |x: u32, y: u32| RGBA8 { r: x as u8, g: y as u8, b: (x * y) as u8, a: 255 - x as u8 };
    let (filtered, expected) =
      interlaced(&header, |x, y| bytemuck::bytes_of(&color(x, y)).to_vec(), &color);
    let png = assemble(&header, &[], &filtered);
    let decoded = decode_full(&mut &png[..]).unwrap();
    assert!(decoded.header.is_interlaced);
    assert_eq!(decoded.image, expected, "{w}x{h}");
  }
}

/// Lays out interlaced data for a one channel image, packing samples high
/// bits first and going through the filter types line by line.
fn interlaced_packed(header: &IHDR, sample: impl Fn(u32, u32) -> u8) -> Vec<u8> {
  let bits = header.bit_depth as usize;
  let stride = header.filter_stride();
  let mut filtered = Vec::new();
  let mut line_number = 0;
  for reduced in header.reduced_images() {
    let len = header.bytes_per_scanline(reduced.width).unwrap();
    let mut prev = vec![0_u8; len];
    for ry in 0..reduced.height {
      let mut row = vec![0_u8; len];
      for rx in 0..reduced.width {
        let (x, y) = reduced.geometry.full_pos(rx, ry);
        let bit = rx as usize * bits;
        row[bit / 8] |= sample(x, y) << (8 - bits - bit % 8);
      }
      let filter = FilterType::ALL[line_number % 5];
      line_number += 1;
      let mut out = vec![0_u8; len];
      filter_row(filter, &row, &prev, stride, &mut out);
      filtered.push(filter as u8);
      filtered.extend_from_slice(&out);
      prev = row;
    }
  }
  assert_eq!(filtered.len(), header.zlib_decompression_requirement().unwrap());
  filtered
}

#[test]
fn test_interlaced_sub_byte_decode() {
  let black = RGBA8 { r: 0, g: 0, b: 0, a: 255 };
  let white = RGBA8 { r: 255, g: 255, b: 255, a: 255 };
  let plte = [0, 0, 0, 255, 255, 255];
  for (w, h) in [(5, 5), (9, 3), (13, 7)] {
    let header = IHDR::new(w, h, 1, PngColorType::Index, true).unwrap();
    let bit = |x: u32, y: u32| ((x * 3 + y * 5) % 7 % 2) as u8;
    let png = assemble(&header, &[(b"PLTE", &plte)], &interlaced_packed(&header, bit));
    let expected = image_from_fn(w, h, |x, y| if bit(x, y) == 1 { white } else { black });
    assert_eq!(decode(&mut &png[..]).unwrap(), expected, "{w}x{h}");
  }

  for depth in [2_u8, 4] {
    let header = IHDR::new(11, 6, depth, PngColorType::Y, true).unwrap();
    let max = (1_u32 << depth) - 1;
    let level = |x: u32, y: u32| ((x + 2 * y) % (max + 1)) as u8;
    let png = assemble(&header, &[], &interlaced_packed(&header, level));
    let expected =
      image_from_fn(11, 6, |x, y| RGBA8::gray((u32::from(level(x, y)) * 255 / max) as u8, 255));
    assert_eq!(decode(&mut &png[..]).unwrap(), expected, "depth {depth}");
  }
}

#[test]
fn test_widest_interlaced_header_fails_cleanly() {
  let header = IHDR::new(u32::MAX, 1, 1, PngColorType::Y, true).unwrap();
  let mut png = PNG_SIGNATURE.to_vec();
  push_chunk(&mut png, b"IHDR", &header.to_bytes());
  push_chunk(&mut png, b"IEND", &[]);
  assert_eq!(decode(&mut &png[..]), Err(PngError::MissingImageData));

  // some data, but nowhere near enough
  let mut png = PNG_SIGNATURE.to_vec();
  push_chunk(&mut png, b"IHDR", &header.to_bytes());
  push_chunk(&mut png, b"IDAT", &compress_to_vec_zlib(&[0; 100_000], 6));
  push_chunk(&mut png, b"IEND", &[]);
  assert_eq!(decode(&mut &png[..]), Err(PngError::MissingImageData));
}

#[test]
fn test_interlaced_first_line_of_each_pass_uses_zero_previous() {
  // every line uses Up, so each pass has to start over from zeroes
  let header = IHDR::new(8, 8, 8, PngColorType::Y, true).unwrap();
  let mut filtered = Vec::new();
  for (pass, reduced) in header.reduced_images().enumerate() {
    // the first pass is a single pixel holding 50, every later byte adds 0
    let value = if pass == 0 { 50 } else { 0 };
    for _ in 0..reduced.height {
      filtered.push(FilterType::Up as u8);
      filtered.extend(core::iter::repeat(value).take(reduced.width as usize));
    }
  }
  let png = assemble(&header, &[], &filtered);
  let image = decode(&mut &png[..]).unwrap();
  assert_eq!(image.get(0, 0), Some(&RGBA8::gray(50, 255)));
  assert!(image.pixels[1..].iter().all(|p| *p == RGBA8::gray(0, 255)));
}

#[test]
fn test_sixteen_bit_decode() {
  let header = IHDR::new(2, 1, 16, PngColorType::RGBA, false).unwrap();
  let filtered = [
    0, // filter type
    0xFF, 0xFF, 0x80, 0xFF, 0x00, 0x00, 0x12, 0x34, // first pixel
    0xFF, 0x00, 0x01, 0x01, 0x7F, 0x7F, 0x00, 0xFF, // second pixel
  ];
  let png = assemble(&header, &[], &filtered);
  let image = decode(&mut &png[..]).unwrap();
  assert_eq!(
    image.pixels,
    [RGBA8 { r: 255, g: 128, b: 0, a: 18 }, RGBA8 { r: 254, g: 1, b: 127, a: 0 }]
  );

  // gray with a transparent key
  let header = IHDR::new(3, 1, 16, PngColorType::Y, false).unwrap();
  let filtered = [0, 0x12, 0x34, 0xAB, 0xCD, 0x12, 0x35];
  let png = assemble(&header, &[(b"tRNS", &[0x12, 0x34])], &filtered);
  let image = decode(&mut &png[..]).unwrap();
  assert_eq!(
    image.pixels,
    [RGBA8::gray(0x12, 0), RGBA8::gray(0xAB, 255), RGBA8::gray(0x12, 255)]
  );
}

#[test]
fn test_sixteen_bit_color_and_gray_alpha_decode() {
  let header = IHDR::new(2, 1, 16, PngColorType::RGB, false).unwrap();
  let filtered = [
    0, // filter type
    0xFF, 0x00, 0x01, 0x01, 0x80, 0x80, // first pixel
    0x00, 0x01, 0x00, 0x02, 0x00, 0x03, // second pixel, the transparent key
  ];
  let png = assemble(&header, &[(b"tRNS", &[0, 1, 0, 2, 0, 3])], &filtered);
  let image = decode(&mut &png[..]).unwrap();
  assert_eq!(
    image.pixels,
    [RGBA8 { r: 254, g: 1, b: 128, a: 255 }, RGBA8 { r: 0, g: 0, b: 0, a: 0 }]
  );

  // two lines of two pixels, both lines using Average
  let header = IHDR::new(2, 2, 16, PngColorType::YA, false).unwrap();
  let top = [0xFF, 0xFF, 0x80, 0x80, 0x12, 0x34, 0xFF, 0xFF];
  let bottom = [0x12, 0x34, 0xFF, 0xFF, 0xFF, 0xFF, 0x80, 0x80];
  let mut filtered = Vec::new();
  let mut prev = [0_u8; 8];
  for raw in [top, bottom] {
    let mut out = [0_u8; 8];
    filter_row(FilterType::Average, &raw, &prev, header.filter_stride(), &mut out);
    filtered.push(FilterType::Average as u8);
    filtered.extend_from_slice(&out);
    prev = raw;
  }
  let png = assemble(&header, &[], &filtered);
  let image = decode(&mut &png[..]).unwrap();
  assert_eq!(
    image.pixels,
    [RGBA8::gray(255, 128), RGBA8::gray(18, 255), RGBA8::gray(18, 255), RGBA8::gray(255, 128)]
  );
}

#[test]
fn test_sub_byte_decode() {
  let header = IHDR::new(5, 2, 1, PngColorType::Y, false).unwrap();
  let png = assemble(&header, &[], &[0, 0b1010_1000, 0, 0b0111_1000]);
  let image = decode(&mut &png[..]).unwrap();
  let ys: Vec<u8> = image.pixels.iter().map(|p| p.r).collect();
  assert_eq!(ys, [255, 0, 255, 0, 255, 0, 255, 255, 255, 255]);

  let header = IHDR::new(3, 1, 4, PngColorType::Y, false).unwrap();
  let png = assemble(&header, &[(b"tRNS", &[0x00, 0x0F])], &[0, 0x0F, 0x70]);
  let image = decode(&mut &png[..]).unwrap();
  assert_eq!(image.pixels, [RGBA8::gray(0, 255), RGBA8::gray(255, 0), RGBA8::gray(0x77, 255)]);

  // 2-bit indexed with a partial tRNS and a background
  let header = IHDR::new(4, 1, 2, PngColorType::Index, false).unwrap();
  let plte = [10, 20, 30, 40, 50, 60, 70, 80, 90];
  let png = assemble(
    &header,
    &[(b"PLTE", &plte), (b"tRNS", &[0]), (b"bKGD", &[2])],
    &[0, 0b00_01_10_11],
  );
  let decoded = decode_full(&mut &png[..]).unwrap();
  assert_eq!(decoded.background, Some(RGBA8 { r: 70, g: 80, b: 90, a: 255 }));
  assert_eq!(
    decoded.image.pixels,
    [
      RGBA8 { r: 10, g: 20, b: 30, a: 0 },
      RGBA8 { r: 40, g: 50, b: 60, a: 255 },
      RGBA8 { r: 70, g: 80, b: 90, a: 255 },
      // index 3 is past the palette
      RGBA8::OPAQUE_BLACK,
    ]
  );
}

#[test]
fn test_chunk_order_rules() {
  let header = IHDR::new(1, 1, 8, PngColorType::Index, false).unwrap();
  // image data before the palette
  let mut png = PNG_SIGNATURE.to_vec();
  push_chunk(&mut png, b"IHDR", &header.to_bytes());
  push_chunk(&mut png, b"IDAT", &compress_to_vec_zlib(&[0, 0], 6));
  push_chunk(&mut png, b"PLTE", &[1, 2, 3]);
  push_chunk(&mut png, b"IEND", &[]);
  assert_eq!(decode(&mut &png[..]), Err(PngError::ChunkOrder));

  // transparency before the palette
  let png = assemble(&header, &[(b"tRNS", &[0]), (b"PLTE", &[1, 2, 3])], &[0, 0]);
  assert_eq!(decode(&mut &png[..]), Err(PngError::ChunkOrder));

  // something before the header
  let mut png = PNG_SIGNATURE.to_vec();
  push_chunk(&mut png, b"tEXt", b"hello");
  assert_eq!(decode(&mut &png[..]), Err(PngError::ChunkOrder));

  // a palette in the right spot is fine
  let png = assemble(&header, &[(b"PLTE", &[1, 2, 3]), (b"tRNS", &[9])], &[0, 0]);
  assert_eq!(decode(&mut &png[..]).unwrap().pixels, [RGBA8 { r: 1, g: 2, b: 3, a: 9 }]);
}

#[test]
fn test_unknown_and_ignored_chunks() {
  let header = IHDR::new(2, 1, 8, PngColorType::RGBA, false).unwrap();
  let filtered = [0, 1, 2, 3, 4, 5, 6, 7, 8];
  let mut png = PNG_SIGNATURE.to_vec();
  push_chunk(&mut png, b"IHDR", &header.to_bytes());
  // an unknown chunk's CRC isn't looked at
  png.extend_from_slice(&4_u32.to_be_bytes());
  png.extend_from_slice(b"teSt");
  png.extend_from_slice(&[1, 2, 3, 4, 0xDE, 0xAD, 0xBE, 0xEF]);
  // tRNS makes no sense with an alpha channel, PLTE is only a suggestion
  push_chunk(&mut png, b"tRNS", &[0, 1]);
  push_chunk(&mut png, b"PLTE", &[9, 9, 9]);
  push_chunk(&mut png, b"IDAT", &compress_to_vec_zlib(&filtered, 6));
  push_chunk(&mut png, b"IEND", &[]);
  let image = decode(&mut &png[..]).unwrap();
  assert_eq!(image.pixels, [RGBA8 { r: 1, g: 2, b: 3, a: 4 }, RGBA8 { r: 5, g: 6, b: 7, a: 8 }]);
}

#[test]
fn test_header_errors() {
  let good = IHDR::new(1, 1, 8, PngColorType::Y, false).unwrap().to_bytes();
  let with = |i: usize, v: u8| {
    let mut h = good;
    h[i] = v;
    let mut png = PNG_SIGNATURE.to_vec();
    push_chunk(&mut png, b"IHDR", &h);
    decode(&mut &png[..]).unwrap_err()
  };
  assert_eq!(with(3, 0), PngError::WidthOrHeightZero);
  assert_eq!(with(8, 3), PngError::IllegalHeader);
  assert_eq!(with(9, 1), PngError::IllegalHeader);
  assert_eq!(with(10, 1), PngError::IllegalHeader);
  assert_eq!(with(11, 1), PngError::IllegalHeader);
  assert_eq!(with(12, 2), PngError::IllegalHeader);
  assert_eq!(decode(&mut &b"GIF89a.."[..]), Err(PngError::BadSignature));
  assert_eq!(decode(&mut &PNG_SIGNATURE[..]), Err(PngError::UnexpectedEof));
}

#[cfg(feature = "std")]
#[test]
fn test_io_adapters() {
  use imagine_png::{IoSink, IoSource};
  let image = image_from_fn(7, 3, |x, y| RGBA8 { r: x as u8, g: y as u8, b: 0, a: 255 });
  let mut sink = IoSink(std::io::Cursor::new(Vec::new()));
  encode(&mut sink, &image.pixels, 7, 3, &EncodeOptions::default()).unwrap();
  let bytes = sink.0.into_inner();
  let mut source = IoSource(std::io::Cursor::new(bytes));
  assert_eq!(decode(&mut source).unwrap(), image);
}

#[test]
fn test_decode_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = decode(&mut &v[..]);
  }
  // even totally random data should never panic the decoder!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    let _ = decode(&mut &v[..]);
    let mut signed = PNG_SIGNATURE.to_vec();
    signed.extend_from_slice(&v);
    let _ = decode(&mut &signed[..]);
  }
  // nor should random damage to a real image
  let bytes = noise_image(9, 9).to_png_bytes(&EncodeOptions::default()).unwrap();
  for _ in 0..50 {
    let noise = super::rand_bytes(3);
    let mut broken = bytes.clone();
    let i = (usize::from(noise[0]) << 8 | usize::from(noise[1])) % broken.len();
    broken[i] ^= noise[2] | 1;
    let _ = decode(&mut &broken[..]);
  }
}
