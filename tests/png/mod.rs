use pixelfeed::{
  codec::{decode, decode_with_limits, DecodeError},
  limits::DecodeLimits,
  png::{chunk_crc, push_chunk, ChunkType, PngColorType, RawChunkIter, IHDR, PNG_SIGNATURE},
  FailureReason,
};

use super::{png_bytes, rand_bytes, two_by_two_png, zlib_stored, TWO_BY_TWO};

fn header(width: u32, height: u32, bit_depth: u8, color_type: PngColorType) -> IHDR {
  IHDR { width, height, bit_depth, color_type, is_interlaced: false }
}

fn decoded(png: &[u8]) -> Vec<[u8; 4]> {
  decode(png).unwrap().rgba8().iter().map(|&p| p.into()).collect()
}

fn malformed(png: &[u8]) -> FailureReason {
  match decode(png) {
    Err(DecodeError::Malformed(why)) => why,
    other => panic!("{other:?}"),
  }
}

#[test]
fn test_RawChunkIter_no_panics() {
  for _ in 0..10 {
    let v = rand_bytes(1024);
    for _ in RawChunkIter::new(&v) {
      //
    }
  }
  let types: Vec<_> = RawChunkIter::new(&two_by_two_png()).map(|c| c.ty).collect();
  assert_eq!(types, [ChunkType::IHDR, ChunkType::IDAT, ChunkType::IEND]);
}

#[test]
fn test_gray_depths() {
  use PngColorType::Y;
  let cases: [(u8, u32, &[u8], &[u8]); 5] = [
    (1, 3, &[0b101_00000], &[255, 0, 255]),
    (2, 4, &[0b00_01_10_11], &[0, 85, 170, 255]),
    (4, 3, &[0x0F, 0x80], &[0, 255, 0x88]),
    (8, 2, &[0x42, 0x00], &[0x42, 0x00]),
    (16, 2, &[0xAB, 0xCD, 0x01, 0xFF], &[0xAB, 0x01]),
  ];
  for (depth, width, row, expected) in cases {
    let mut filtered = vec![0];
    filtered.extend_from_slice(row);
    let png = png_bytes(&header(width, 1, depth, Y), &[], &filtered);
    let gray: Vec<[u8; 4]> = expected.iter().map(|&y| [y, y, y, 255]).collect();
    assert_eq!(decoded(&png), gray, "depth {depth}");
  }
}

#[test]
fn test_gray_key_at_low_depth() {
  // the key is compared with the raw 2-bit value, not the widened one.
  let png = png_bytes(
    &header(4, 1, 2, PngColorType::Y),
    &[(b"tRNS", &[0, 1])],
    &[0, 0b00_01_10_11],
  );
  assert_eq!(
    decoded(&png),
    [[0, 0, 0, 255], [85, 85, 85, 0], [170, 170, 170, 255], [255, 255, 255, 255]]
  );
}

#[test]
fn test_other_color_types() {
  use PngColorType::*;
  let cases: [(PngColorType, u8, &[u8], [u8; 4]); 6] = [
    (RGB, 8, &[1, 2, 3], [1, 2, 3, 255]),
    (RGB, 16, &[1, 0, 2, 0, 3, 0], [1, 2, 3, 255]),
    (YA, 8, &[10, 20], [10, 10, 10, 20]),
    (YA, 16, &[1, 2, 3, 4], [1, 1, 1, 3]),
    (RGBA, 8, &[1, 2, 3, 4], [1, 2, 3, 4]),
    (RGBA, 16, &[1, 9, 2, 9, 3, 9, 4, 9], [1, 2, 3, 4]),
  ];
  for (color, depth, px, expected) in cases {
    let mut filtered = vec![0];
    filtered.extend_from_slice(px);
    let png = png_bytes(&header(1, 1, depth, color), &[], &filtered);
    assert_eq!(decoded(&png), [expected], "{color:?} {depth}");
  }
}

#[test]
fn test_rgb_key_transparency() {
  let png = png_bytes(
    &header(2, 1, 8, PngColorType::RGB),
    &[(b"tRNS", &[0, 1, 0, 2, 0, 3])],
    &[0, 1, 2, 3, 1, 2, 4],
  );
  assert_eq!(decoded(&png), [[1, 2, 3, 0], [1, 2, 4, 255]]);
}

#[test]
fn test_indexed_depths() {
  let plte: Vec<u8> = (0..16).flat_map(|i| [i * 16, 255 - i * 16, i]).collect();
  let entry = |i: u8| [i * 16, 255 - i * 16, i, 255];
  let cases: [(u8, u32, &[u8], &[u8]); 4] = [
    (1, 3, &[0b010_00000], &[0, 1, 0]),
    (2, 3, &[0b11_10_01_00], &[3, 2, 1]),
    (4, 2, &[0xF7], &[15, 7]),
    (8, 2, &[9, 15], &[9, 15]),
  ];
  for (depth, width, row, indexes) in cases {
    let mut filtered = vec![0];
    filtered.extend_from_slice(row);
    let ihdr = header(width, 1, depth, PngColorType::Index);
    let png = png_bytes(&ihdr, &[(b"PLTE", &plte)], &filtered);
    let expected: Vec<[u8; 4]> = indexes.iter().map(|&i| entry(i)).collect();
    assert_eq!(decoded(&png), expected, "depth {depth}");
  }
}

#[test]
fn test_palette_transparency_and_out_of_range() {
  let plte = [10, 20, 30, 40, 50, 60, 70, 80, 90];
  let png = png_bytes(
    &header(4, 1, 8, PngColorType::Index),
    &[(b"PLTE", &plte), (b"tRNS", &[0, 200])],
    &[0, 0, 1, 2, 3],
  );
  assert_eq!(
    decoded(&png),
    [[10, 20, 30, 0], [40, 50, 60, 200], [70, 80, 90, 255], [0, 0, 0, 255]]
  );
}

#[test]
fn test_filters_across_rows() {
  // 2x3 gray, each row using a different filter over the same raw values.
  let raw = [[10_u8, 20], [30, 50], [35, 60]];
  let filtered = [
    0, 10, 20, // none
    2, 20, 30, // up
    4, 5, 10, // paeth: both predictions come from above here
  ];
  let png = png_bytes(&header(2, 3, 8, PngColorType::Y), &[], &filtered);
  let expected: Vec<[u8; 4]> = raw.iter().flatten().map(|&y| [y, y, y, 255]).collect();
  assert_eq!(decoded(&png), expected);
}

/// Writes RGBA8 pixels as Adam7 reduced images, each line with filter 0.
fn interlace_rgba8(pixels: &[u8], w: usize, h: usize) -> Vec<u8> {
  const PASSES: [(usize, usize, usize, usize); 7] = [
    (0, 0, 8, 8),
    (4, 0, 8, 8),
    (0, 4, 4, 8),
    (2, 0, 4, 4),
    (0, 2, 2, 4),
    (1, 0, 2, 2),
    (0, 1, 1, 2),
  ];
  let mut out = Vec::new();
  for (x0, y0, dx, dy) in PASSES {
    let xs: Vec<usize> = (x0..w).step_by(dx).collect();
    if xs.is_empty() {
      continue;
    }
    for y in (y0..h).step_by(dy) {
      out.push(0);
      for &x in &xs {
        out.extend_from_slice(&pixels[(y * w + x) * 4..][..4]);
      }
    }
  }
  out
}

#[test]
fn test_adam7_matches_progressive() {
  for (w, h) in [(1, 1), (3, 2), (7, 5), (9, 9), (16, 3)] {
    let pixels = rand_bytes(w * h * 4);
    let mut flat = Vec::new();
    for row in pixels.chunks_exact(w * 4) {
      flat.push(0);
      flat.extend_from_slice(row);
    }
    let plain = header(w as u32, h as u32, 8, PngColorType::RGBA);
    let laced = IHDR { is_interlaced: true, ..plain };
    let a = decode(&png_bytes(&plain, &[], &flat)).unwrap();
    let b = decode(&png_bytes(&laced, &[], &interlace_rgba8(&pixels, w, h))).unwrap();
    assert_eq!(a.pixels(), &pixels[..], "{w}x{h}");
    assert_eq!(a, b, "{w}x{h}");
  }
}

#[test]
fn test_image_data_split_over_many_chunks() {
  let mut filtered = vec![0];
  filtered.extend_from_slice(&TWO_BY_TWO[..8]);
  filtered.push(0);
  filtered.extend_from_slice(&TWO_BY_TWO[8..]);
  let z = zlib_stored(&filtered);
  let build = |text_at: usize| {
    let mut png = PNG_SIGNATURE.to_vec();
    push_chunk(&mut png, ChunkType::IHDR, &header(2, 2, 8, PngColorType::RGBA).to_bytes());
    for (i, part) in z.chunks(3).enumerate() {
      if i == text_at {
        push_chunk(&mut png, ChunkType(*b"tEXt"), b"Comment\0hi");
      }
      push_chunk(&mut png, ChunkType::IDAT, part);
    }
    push_chunk(&mut png, ChunkType::IEND, &[]);
    png
  };
  // ancillary chunks before the image data are fine.
  assert_eq!(decode(&build(0)).unwrap().pixels(), &TWO_BY_TWO);
  // image data chunks must be consecutive.
  assert_eq!(malformed(&build(2)), FailureReason::ChunkOrder);
}

#[test]
fn test_error_classification() {
  let gray = header(1, 1, 8, PngColorType::Y);

  let mut bad_crc = png_bytes(&gray, &[], &[0, 1]);
  let last = bad_crc.len() - 1;
  bad_crc[last] ^= 1;
  assert_eq!(malformed(&bad_crc), FailureReason::ChecksumMismatch);

  assert_eq!(malformed(&png_bytes(&gray, &[], &[5, 1])), FailureReason::BadFilter);

  let indexed = header(1, 1, 8, PngColorType::Index);
  assert_eq!(malformed(&png_bytes(&indexed, &[], &[0, 0])), FailureReason::MissingPalette);

  assert_eq!(
    malformed(&png_bytes(&gray, &[(b"ZZZZ", &[])], &[0, 1])),
    FailureReason::UnknownCriticalChunk
  );

  let wide = header(17_001, 1, 8, PngColorType::Y);
  assert_eq!(malformed(&png_bytes(&wide, &[], &[])), FailureReason::DimensionsTooLarge);
  assert_eq!(
    decode_with_limits(&png_bytes(&wide, &[], &[]), DecodeLimits::unlimited()),
    Err(DecodeError::Malformed(FailureReason::ImageDataTruncated))
  );

  let mut too_long = PNG_SIGNATURE.to_vec();
  too_long.extend_from_slice(&[0x80, 0, 0, 0]);
  assert_eq!(malformed(&too_long), FailureReason::ChunkTooLong);

  let mut bad_type = PNG_SIGNATURE.to_vec();
  bad_type.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'9']);
  assert_eq!(malformed(&bad_type), FailureReason::BadChunkType);

  let mut corrupt_deflate = PNG_SIGNATURE.to_vec();
  push_chunk(&mut corrupt_deflate, ChunkType::IHDR, &gray.to_bytes());
  // a final block of the reserved block type 3.
  push_chunk(&mut corrupt_deflate, ChunkType::IDAT, &[0x78, 0x01, 0x07, 0, 0, 0, 0]);
  push_chunk(&mut corrupt_deflate, ChunkType::IEND, &[]);
  assert_eq!(malformed(&corrupt_deflate), FailureReason::Decompression);

  let mut bad_ihdr_len = PNG_SIGNATURE.to_vec();
  push_chunk(&mut bad_ihdr_len, ChunkType::IHDR, &gray.to_bytes()[..12]);
  assert_eq!(malformed(&bad_ihdr_len), FailureReason::BadHeader);
  assert_eq!(chunk_crc(*b"IEND", &[]), 0xAE42_6082);
}
