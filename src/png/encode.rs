use alloc::vec::Vec;

use log::trace;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::output::rgba8_byte_len;

use super::{
  chunk::{ChunkType, PNG_SIGNATURE},
  crc32::chunk_crc,
  filtering::{filter_line, FILTER_NONE, FILTER_PAETH},
  header::{PngColorType, IHDR},
};

/// The most image data bytes written into a single IDAT chunk.
pub const IDAT_CHUNK_SIZE: usize = 8 * 1024;

/// How [`encode_rgba8`] picks the filter of each line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterStrategy {
  /// Every line is stored with no filter.
  None,
  /// Each line tries all five filters and keeps the one whose output has the
  /// smallest sum of absolute values (bytes read as `i8`).
  #[default]
  MinSum,
}

/// Appends a chunk, with its length and CRC, to `out`.
pub fn push_chunk(out: &mut Vec<u8>, ty: ChunkType, data: &[u8]) {
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(&ty.0);
  out.extend_from_slice(data);
  out.extend_from_slice(&chunk_crc(ty.0, data).to_be_bytes());
}

/// Encodes RGBA8 pixels as a non-interlaced, 8-bit RGBA PNG.
///
/// * `pixels` must be exactly `width * height * 4` bytes.
/// * `level` is the deflate level, `1..=9` (out of range values are clamped).
///
/// Gives `None` if either dimension is 0, if the sizes overflow, or if
/// `pixels` is the wrong length. [`encode`](crate::codec::encode) tells those
/// cases apart.
#[must_use]
pub fn encode_rgba8(
  pixels: &[u8], width: u32, height: u32, level: u8, strategy: FilterStrategy,
) -> Option<Vec<u8>> {
  if width == 0 || height == 0 || rgba8_byte_len(width, height)? != pixels.len() {
    return None;
  }
  let ihdr = IHDR {
    width,
    height,
    bit_depth: 8,
    color_type: PngColorType::RGBA,
    is_interlaced: false,
  };
  let line_len = (width as usize).checked_mul(4)?;
  let filtered_len = line_len.checked_add(1)?.checked_mul(height as usize)?;
  let mut filtered = Vec::with_capacity(filtered_len);
  let mut scratch = Vec::new();
  let mut prev: Option<&[u8]> = None;
  for line in pixels.chunks_exact(line_len) {
    let filter = match strategy {
      FilterStrategy::None => FILTER_NONE,
      FilterStrategy::MinSum => pick_filter(prev, line, &mut scratch),
    };
    filtered.push(filter);
    let start = filtered.len();
    filtered.resize(start + line.len(), 0);
    filter_line(filter, 4, prev, line, &mut filtered[start..]);
    prev = Some(line);
  }
  let compressed = compress_to_vec_zlib(&filtered, level.clamp(1, 9));
  trace!("{width}x{height} filtered to {} bytes, deflated to {}", filtered.len(), compressed.len());

  let mut out = Vec::with_capacity(PNG_SIGNATURE.len() + compressed.len() + 64);
  out.extend_from_slice(&PNG_SIGNATURE);
  push_chunk(&mut out, ChunkType::IHDR, &ihdr.to_bytes());
  for idat in compressed.chunks(IDAT_CHUNK_SIZE) {
    push_chunk(&mut out, ChunkType::IDAT, idat);
  }
  push_chunk(&mut out, ChunkType::IEND, &[]);
  Some(out)
}

fn pick_filter(prev: Option<&[u8]>, line: &[u8], scratch: &mut Vec<u8>) -> u8 {
  scratch.resize(line.len(), 0);
  let mut best_filter = FILTER_NONE;
  let mut best_score = u64::MAX;
  for filter in FILTER_NONE..=FILTER_PAETH {
    filter_line(filter, 4, prev, line, scratch);
    let score: u64 = scratch.iter().map(|&b| u64::from((b as i8).unsigned_abs())).sum();
    // ties keep the earlier filter
    if score < best_score {
      best_score = score;
      best_filter = filter;
    }
  }
  best_filter
}
