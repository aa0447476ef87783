use thiserror::Error;

/// Why a codec engine decided that the bytes can never form a valid image.
///
/// Once an engine reports one of these for some prefix of the data, no amount
/// of additional data will change the answer. Running out of data is *not* one
/// of these; an engine reports that by asking for more input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum FailureReason {
  /// The data doesn't start with the expected signature bytes.
  #[error("the data does not start with the PNG signature")]
  BadSignature,

  /// A chunk declared a length above `2^31 - 1`.
  #[error("a chunk declared a length above 2^31 - 1")]
  ChunkTooLong,

  /// A chunk type had a byte that isn't an ASCII letter.
  #[error("a chunk type contained a byte that is not an ASCII letter")]
  BadChunkType,

  /// A chunk's declared CRC doesn't match its contents.
  #[error("a chunk's CRC does not match its contents")]
  ChecksumMismatch,

  /// The first chunk wasn't the image header.
  #[error("the first chunk is not the image header")]
  MissingHeader,

  /// The image header has an illegal field value.
  #[error("the image header has an invalid field")]
  BadHeader,

  /// The declared width or height of the image is 0.
  #[error("the image width or height is 0")]
  ZeroDimensions,

  /// The image is larger than the configured
  /// [`DecodeLimits`](crate::limits::DecodeLimits) allow, or its buffer sizes
  /// don't fit in `usize`.
  #[error("the image dimensions exceed the decode limits")]
  DimensionsTooLarge,

  /// The palette chunk has a bad length.
  #[error("the palette chunk has an invalid length")]
  BadPalette,

  /// An indexed color image had image data before any palette.
  #[error("an indexed image has no palette before its image data")]
  MissingPalette,

  /// A chunk that decoders must understand wasn't recognized.
  #[error("an unknown critical chunk was found")]
  UnknownCriticalChunk,

  /// The data ended (with an end marker) without any image data.
  #[error("the image has no image data")]
  MissingImageData,

  /// The compressed image data couldn't be decompressed.
  #[error("the compressed image data is corrupt")]
  Decompression,

  /// The image data decompressed to fewer bytes than the header requires.
  #[error("the image data is shorter than the header requires")]
  ImageDataTruncated,

  /// A scanline used a filter type outside of `0..=4`.
  #[error("a scanline uses an unknown filter type")]
  BadFilter,

  /// A chunk appeared where PNG doesn't allow it: a second header, a palette
  /// or transparency chunk after the image data, or image data chunks that
  /// aren't consecutive.
  #[error("a chunk appears out of order")]
  ChunkOrder,

  /// The data is corrupt in some engine specific way.
  #[error("the data is corrupt")]
  Corrupt,

  /// The decode buffers for a header that passed the limits couldn't be
  /// allocated.
  ///
  /// This is the one reason that says nothing about the data itself. The same
  /// bytes might decode fine with more memory available, or with a fresh
  /// session later.
  #[error("the decode buffers could not be allocated")]
  OutOfMemory,
}

/// A codec engine could not be brought up at all.
///
/// This is a resource or environment problem, not a statement about the image
/// data. Trying again later (or with less memory pressure) might work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum EngineInitError {
  /// The allocator couldn't give us enough space.
  #[error("the allocator could not provide enough memory")]
  OutOfMemory,

  /// The engine isn't available in this environment.
  #[error("the codec engine is not available")]
  Unavailable,
}
#[cfg(feature = "alloc")]
impl From<alloc::collections::TryReserveError> for EngineInitError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::OutOfMemory
  }
}
