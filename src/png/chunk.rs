use core::fmt::{Debug, Write};

use crate::error::FailureReason;

use super::crc32::chunk_crc;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// The largest length a chunk is allowed to declare.
pub const MAX_CHUNK_LEN: u32 = (1 << 31) - 1;

/// Bytes of framing around each chunk's data: length, type, and CRC.
pub const CHUNK_OVERHEAD: usize = 12;

/// The four-letter type code of a chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
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

  /// Every byte must be an ASCII letter.
  #[inline]
  #[must_use]
  pub const fn is_valid(self) -> bool {
    let [a, b, c, d] = self.0;
    a.is_ascii_alphabetic()
      && b.is_ascii_alphabetic()
      && c.is_ascii_alphabetic()
      && d.is_ascii_alphabetic()
  }

  /// Critical chunks have an uppercase first letter. A decoder that finds a
  /// critical chunk it doesn't know can't safely show the image.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    self.0[0].is_ascii_uppercase()
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for byte in self.0 {
      if byte.is_ascii_graphic() {
        f.write_char(byte as char)?;
      } else {
        write!(f, "\\x{byte:02X}")?;
      }
    }
    Ok(())
  }
}

/// A chunk whose framing is complete, but whose data isn't interpreted yet.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  /// The chunk's type code.
  pub ty: ChunkType,
  /// The chunk's data bytes.
  pub data: &'b [u8],
  /// The CRC written after the data.
  pub declared_crc: u32,
}
impl RawChunk<'_> {
  /// The CRC of the chunk's type and data as actually present.
  #[inline]
  #[must_use]
  pub fn actual_crc(&self) -> u32 {
    chunk_crc(self.ty.0, self.data)
  }

  /// If the declared CRC matches the actual CRC.
  #[inline]
  #[must_use]
  pub fn crc_matches(&self) -> bool {
    self.actual_crc() == self.declared_crc
  }

  /// Total bytes this chunk takes up in the stream, framing included.
  #[inline]
  #[must_use]
  pub const fn stream_len(&self) -> usize {
    CHUNK_OVERHEAD + self.data.len()
  }
}
impl Debug for RawChunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("ty", &self.ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}

/// How much of a chunk is present at the start of some bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFraming<'b> {
  /// The whole chunk is present.
  Complete(RawChunk<'b>),
  /// The bytes end before the chunk does.
  Partial,
  /// What's present already can't be a chunk.
  Invalid(FailureReason),
}

/// Checks the bytes seen so far against the PNG signature.
///
/// Gives `Ok(true)` once all 8 signature bytes are present and correct,
/// `Ok(false)` if the bytes are a correct but incomplete signature (including
/// no bytes at all).
///
/// ## Failure
/// * [`FailureReason::BadSignature`] as soon as any byte present is wrong.
#[inline]
pub fn check_signature(bytes: &[u8]) -> Result<bool, FailureReason> {
  let n = bytes.len().min(PNG_SIGNATURE.len());
  if bytes[..n] == PNG_SIGNATURE[..n] {
    Ok(n == PNG_SIGNATURE.len())
  } else {
    Err(FailureReason::BadSignature)
  }
}

/// Tries to frame one chunk at the start of `bytes`.
///
/// The length and type are judged as soon as their bytes are present, so a
/// stream with a garbage chunk header is rejected without waiting for the
/// (possibly enormous) declared length to arrive. The CRC isn't checked here.
pub fn frame_chunk(bytes: &[u8]) -> ChunkFraming<'_> {
  let chunk_len = match bytes {
    [l0, l1, l2, l3, ..] => u32::from_be_bytes([*l0, *l1, *l2, *l3]),
    _ => return ChunkFraming::Partial,
  };
  if chunk_len > MAX_CHUNK_LEN {
    return ChunkFraming::Invalid(FailureReason::ChunkTooLong);
  }
  let ty = match bytes {
    [_, _, _, _, t0, t1, t2, t3, ..] => ChunkType([*t0, *t1, *t2, *t3]),
    _ => return ChunkFraming::Partial,
  };
  if !ty.is_valid() {
    return ChunkFraming::Invalid(FailureReason::BadChunkType);
  }
  let data_end = 8 + chunk_len as usize;
  if bytes.len() < data_end + 4 {
    return ChunkFraming::Partial;
  }
  let data = &bytes[8..data_end];
  let crc_bytes = &bytes[data_end..data_end + 4];
  let declared_crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
  ChunkFraming::Complete(RawChunk { ty, data, declared_crc })
}

/// An iterator that produces successive complete chunks from PNG bytes.
///
/// It skips the 8 signature bytes without looking at them, and stops at the
/// first chunk that is incomplete or has a broken header. Nothing is
/// validated beyond framing, so even random bytes are safe to iterate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RawChunkIter<'b>(&'b [u8]);
impl<'b> RawChunkIter<'b> {
  /// Pass the full PNG bytes, the signature is skipped automatically.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self(rest),
      _ => Self(&[]),
    }
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = RawChunk<'b>;
  fn next(&mut self) -> Option<Self::Item> {
    match frame_chunk(self.0) {
      ChunkFraming::Complete(chunk) => {
        self.0 = &self.0[chunk.stream_len()..];
        Some(chunk)
      }
      _ => {
        self.0 = &[];
        None
      }
    }
  }
}
