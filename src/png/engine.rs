use alloc::vec::Vec;

use bitfrob::u8_replicate_bits;
use log::{debug, trace};
use miniz_oxide::inflate::{decompress_slice_iter_to_slice, TINFLStatus};

use crate::{
  engine::{CodecEngine, EngineReport},
  error::FailureReason,
  limits::DecodeLimits,
  output::{rgba8_byte_len, DecodeOutput},
  pixel_formats::RGBA8,
};

use super::{
  chunk::{check_signature, frame_chunk, ChunkFraming, ChunkType, RawChunk, RawChunkIter},
  filtering::unfilter_image,
  header::{PngColorType, IHDR},
};

/// What's been learned from the complete chunks seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ScanState {
  /// Offset of the first byte not yet accepted.
  cursor: usize,
  header: Option<IHDR>,
  seen_palette: bool,
  seen_idat: bool,
  /// A chunk other than IDAT came after the first IDAT.
  idat_ended: bool,
  /// Offset just past the end chunk, once it's been seen.
  end: Option<usize>,
}
impl ScanState {
  fn accept(&mut self, chunk: &RawChunk<'_>, limits: &DecodeLimits) -> Result<(), FailureReason> {
    if !chunk.crc_matches() {
      return Err(FailureReason::ChecksumMismatch);
    }
    let header = match self.header {
      Some(header) => header,
      None if chunk.ty == ChunkType::IHDR => {
        let ihdr = IHDR::try_from(chunk.data)?;
        limits.check(ihdr.width, ihdr.height)?;
        if ihdr.get_zlib_decompression_requirement().is_none()
          || rgba8_byte_len(ihdr.width, ihdr.height).is_none()
        {
          return Err(FailureReason::DimensionsTooLarge);
        }
        trace!("header: {ihdr:?}");
        self.header = Some(ihdr);
        return Ok(());
      }
      None => return Err(FailureReason::MissingHeader),
    };
    if self.seen_idat && chunk.ty != ChunkType::IDAT {
      self.idat_ended = true;
    }
    match chunk.ty {
      ChunkType::IHDR => return Err(FailureReason::ChunkOrder),
      ChunkType::PLTE => {
        if self.seen_palette || self.seen_idat {
          return Err(FailureReason::ChunkOrder);
        }
        let len = chunk.data.len();
        if len == 0 || len % 3 != 0 || len > 256 * 3 {
          return Err(FailureReason::BadPalette);
        }
        self.seen_palette = true;
      }
      ChunkType::IDAT => {
        if self.idat_ended {
          return Err(FailureReason::ChunkOrder);
        }
        if header.color_type == PngColorType::Index && !self.seen_palette {
          return Err(FailureReason::MissingPalette);
        }
        self.seen_idat = true;
      }
      ChunkType::IEND => {
        if !self.seen_idat {
          return Err(FailureReason::MissingImageData);
        }
      }
      ChunkType::tRNS => {
        let needs_palette = header.color_type == PngColorType::Index && !self.seen_palette;
        if self.seen_idat || needs_palette {
          return Err(FailureReason::ChunkOrder);
        }
      }
      ty if ty.is_critical() => return Err(FailureReason::UnknownCriticalChunk),
      ty => trace!("skipping chunk {ty:?}"),
    }
    Ok(())
  }
}

/// Decodes PNG data, checking everything it can as early as it can.
///
/// Bytes are judged chunk by chunk as they arrive, so a broken stream is
/// reported as malformed at the first chunk that gives it away. Decompression
/// and unfiltering only happen once the end chunk is present.
///
/// The engine remembers how far it has already checked, so each
/// [`submit`](CodecEngine::submit) should pass the previous bytes with new
/// bytes added at the end. A buffer shorter than what was checked, or one with
/// a different signature or header chunk, makes it start over from the
/// signature. Call [`reset`](CodecEngine::reset) before switching to
/// unrelated bytes that share that prefix.
#[derive(Debug, Clone)]
pub struct PngEngine {
  limits: DecodeLimits,
  scan: ScanState,
}
impl PngEngine {
  /// Makes an engine that enforces the limits given.
  #[inline]
  #[must_use]
  pub const fn new(limits: DecodeLimits) -> Self {
    Self {
      limits,
      scan: ScanState {
        cursor: 0,
        header: None,
        seen_palette: false,
        seen_idat: false,
        idat_ended: false,
        end: None,
      },
    }
  }

  /// The limits this engine enforces.
  #[inline]
  #[must_use]
  pub const fn limits(&self) -> &DecodeLimits {
    &self.limits
  }

  /// The image header, once it has been seen and accepted.
  #[inline]
  #[must_use]
  pub const fn header(&self) -> Option<IHDR> {
    self.scan.header
  }

  /// Checks all complete chunks past the cursor.
  ///
  /// Gives the offset just past the end chunk once it's present.
  fn scan(&mut self, bytes: &[u8]) -> Result<Option<usize>, FailureReason> {
    if !self.prefix_matches(bytes) {
      trace!("input no longer matches the {} bytes checked, rescanning", self.scan.cursor);
      self.scan = ScanState::default();
    }
    if let Some(end) = self.scan.end {
      return Ok(Some(end));
    }
    if self.scan.cursor == 0 {
      if !check_signature(bytes)? {
        return Ok(None);
      }
      self.scan.cursor = 8;
    }
    loop {
      let chunk = match frame_chunk(&bytes[self.scan.cursor..]) {
        ChunkFraming::Complete(chunk) => chunk,
        ChunkFraming::Partial => return Ok(None),
        ChunkFraming::Invalid(why) => return Err(why),
      };
      self.scan.accept(&chunk, &self.limits)?;
      self.scan.cursor += chunk.stream_len();
      if chunk.ty == ChunkType::IEND {
        self.scan.end = Some(self.scan.cursor);
        return Ok(self.scan.end);
      }
    }
  }

  /// If `bytes` is long enough and still starts with the signature and header
  /// chunk that were already accepted.
  fn prefix_matches(&self, bytes: &[u8]) -> bool {
    if bytes.len() < self.scan.cursor {
      return false;
    }
    if self.scan.cursor == 0 {
      return true;
    }
    if check_signature(bytes) != Ok(true) {
      return false;
    }
    match self.scan.header {
      None => true,
      Some(header) => match frame_chunk(&bytes[8..]) {
        ChunkFraming::Complete(chunk) => {
          chunk.ty == ChunkType::IHDR && chunk.data == header.to_bytes() && chunk.crc_matches()
        }
        _ => false,
      },
    }
  }

  /// Decodes the image from bytes that are known to end with the end chunk.
  fn finish(&self, bytes: &[u8]) -> Result<DecodeOutput, FailureReason> {
    let ihdr = self.scan.header.ok_or(FailureReason::MissingHeader)?;
    let palette = first_chunk_data(bytes, ChunkType::PLTE);
    let transparency = first_chunk_data(bytes, ChunkType::tRNS);
    let idat = RawChunkIter::new(bytes).filter(|c| c.ty == ChunkType::IDAT).map(|c| c.data);

    let need =
      ihdr.get_zlib_decompression_requirement().ok_or(FailureReason::DimensionsTooLarge)?;
    let mut zlib_buffer: Vec<u8> = Vec::new();
    zlib_buffer.try_reserve(need).map_err(|_| FailureReason::OutOfMemory)?;
    zlib_buffer.resize(need, 0);
    match decompress_slice_iter_to_slice(&mut zlib_buffer, idat, true, false) {
      Ok(count) if count < need => {
        debug!("image data inflated to {count} bytes, expected {need}");
        return Err(FailureReason::ImageDataTruncated);
      }
      Ok(_) => (),
      Err(TINFLStatus::HasMoreOutput) => trace!("image data has bytes past the last line"),
      Err(status) => {
        debug!("inflate failed: {status:?}");
        return Err(FailureReason::Decompression);
      }
    }

    let pixel_len =
      rgba8_byte_len(ihdr.width, ihdr.height).ok_or(FailureReason::DimensionsTooLarge)?;
    let mut pixels: Vec<u8> = Vec::new();
    pixels.try_reserve(pixel_len).map_err(|_| FailureReason::OutOfMemory)?;
    pixels.resize(pixel_len, 0);
    {
      let converter = Converter { ihdr, palette, transparency };
      let out: &mut [RGBA8] = bytemuck::cast_slice_mut(&mut pixels);
      let width = ihdr.width as usize;
      unfilter_image(&ihdr, &mut zlib_buffer, |x, y, data| {
        if let Some(px) = out.get_mut(y as usize * width + x as usize) {
          *px = converter.convert(data);
        }
      })?;
    }
    DecodeOutput::new(pixels, ihdr.width, ihdr.height).ok_or(FailureReason::Corrupt)
  }
}
impl Default for PngEngine {
  #[inline]
  fn default() -> Self {
    Self::new(DecodeLimits::default())
  }
}
impl CodecEngine for PngEngine {
  fn submit(&mut self, bytes: &[u8]) -> EngineReport {
    let result = self.scan(bytes).and_then(|end| match end {
      Some(end) => self.finish(&bytes[..end]).map(Some),
      None => Ok(None),
    });
    match result {
      Ok(Some(output)) => EngineReport::Ready(output),
      Ok(None) => EngineReport::NeedsMoreInput,
      Err(why) => EngineReport::Malformed(why),
    }
  }

  #[inline]
  fn reset(&mut self) {
    self.scan = ScanState::default();
  }
}

fn first_chunk_data(bytes: &[u8], ty: ChunkType) -> &[u8] {
  RawChunkIter::new(bytes).find(|c| c.ty == ty).map(|c| c.data).unwrap_or(&[])
}

/// Turns the bytes of one pixel into RGBA8.
struct Converter<'b> {
  ihdr: IHDR,
  palette: &'b [u8],
  transparency: &'b [u8],
}
impl Converter<'_> {
  /// Channel `i` at full precision, for comparing against a transparency key.
  #[inline]
  fn sample(&self, data: &[u8], i: usize) -> u16 {
    if self.ihdr.bit_depth == 16 {
      u16::from_be_bytes([data[i * 2], data[i * 2 + 1]])
    } else {
      u16::from(data[i])
    }
  }

  /// Channel `i` scaled to 8 bits.
  #[inline]
  fn channel(&self, data: &[u8], i: usize) -> u8 {
    match self.ihdr.bit_depth {
      16 => data[i * 2],
      8 => data[i],
      depth => u8_replicate_bits(u32::from(depth), data[i]),
    }
  }

  /// The transparency key color, as big-endian `u16` values.
  #[inline]
  fn key<const N: usize>(&self) -> Option<[u16; N]> {
    let mut out = [0; N];
    for (i, o) in out.iter_mut().enumerate() {
      let bytes = self.transparency.get(i * 2..i * 2 + 2)?;
      *o = u16::from_be_bytes([bytes[0], bytes[1]]);
    }
    Some(out)
  }

  fn convert(&self, data: &[u8]) -> RGBA8 {
    match self.ihdr.color_type {
      PngColorType::Y => {
        let a = if self.key::<1>() == Some([self.sample(data, 0)]) { 0 } else { 255 };
        RGBA8::gray(self.channel(data, 0), a)
      }
      PngColorType::YA => RGBA8::gray(self.channel(data, 0), self.channel(data, 1)),
      PngColorType::RGB => {
        let full = [self.sample(data, 0), self.sample(data, 1), self.sample(data, 2)];
        let a = if self.key::<3>() == Some(full) { 0 } else { 255 };
        RGBA8 {
          r: self.channel(data, 0),
          g: self.channel(data, 1),
          b: self.channel(data, 2),
          a,
        }
      }
      PngColorType::RGBA => RGBA8 {
        r: self.channel(data, 0),
        g: self.channel(data, 1),
        b: self.channel(data, 2),
        a: self.channel(data, 3),
      },
      PngColorType::Index => {
        let i = usize::from(data[0]);
        match self.palette.get(i * 3..i * 3 + 3) {
          Some(&[r, g, b]) => {
            RGBA8 { r, g, b, a: self.transparency.get(i).copied().unwrap_or(255) }
          }
          _ => RGBA8::OPAQUE_BLACK,
        }
      }
    }
  }
}
