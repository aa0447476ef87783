//! One-shot encode and decode, for when all the bytes are already in hand.
//!
//! These never share state with a [`DecodeSession`](crate::session::DecodeSession):
//! each call brings up its own engine and drops it before returning.
//!
//! ```
//! use pixelfeed::codec::{decode, encode, EncodeOptions};
//!
//! let pixels = [255, 0, 0, 255, 0, 0, 255, 128];
//! let png = encode(&pixels, 2, 1, &EncodeOptions::default()).unwrap();
//! let image = decode(&png).unwrap();
//! assert_eq!((image.width(), image.height()), (2, 1));
//! assert_eq!(image.pixels(), &pixels[..]);
//! ```

use alloc::vec::Vec;

use log::debug;
use thiserror::Error;

use crate::{
  engine::{CodecEngine, EngineReport},
  error::FailureReason,
  limits::DecodeLimits,
  output::{rgba8_byte_len, DecodeOutput},
  png::{encode_rgba8, FilterStrategy, PngEngine},
};

/// Settings for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
  /// Keep every pixel exactly.
  ///
  /// When this is `false`, the color channels lose some low bits (depending on
  /// `quality`) so that they compress better. Alpha is always exact.
  pub lossless: bool,
  /// `0..=100`, only used when `lossless` is `false`. Values above 100 act
  /// like 100.
  pub quality: u8,
  /// `1..=9`, how hard to try at making the output small. Values outside that
  /// range are clamped.
  pub effort: u8,
}
impl EncodeOptions {
  /// Lossless, at the default effort.
  pub const LOSSLESS: Self = Self { lossless: true, quality: 90, effort: 7 };

  /// Lossy at the given quality, at the default effort.
  #[inline]
  #[must_use]
  pub const fn lossy(quality: u8) -> Self {
    Self { lossless: false, quality, effort: 7 }
  }

  /// Sets the effort.
  #[inline]
  #[must_use]
  pub const fn with_effort(self, effort: u8) -> Self {
    Self { effort, ..self }
  }

  /// The quality, clamped to `0..=100`.
  #[inline]
  #[must_use]
  pub const fn clamped_quality(&self) -> u8 {
    if self.quality > 100 {
      100
    } else {
      self.quality
    }
  }

  /// The effort, clamped to `1..=9`.
  #[inline]
  #[must_use]
  pub const fn clamped_effort(&self) -> u8 {
    match self.effort {
      0 => 1,
      e @ 1..=9 => e,
      _ => 9,
    }
  }

  /// Low bits dropped from each color channel.
  #[inline]
  #[must_use]
  pub const fn dropped_bits(&self) -> u32 {
    if self.lossless {
      0
    } else {
      (100 - self.clamped_quality() as u32) / 25
    }
  }
}
impl Default for EncodeOptions {
  #[inline]
  fn default() -> Self {
    Self::LOSSLESS
  }
}

/// An error from [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum EncodeError {
  /// Width or height was 0.
  #[error("the image width or height is 0")]
  ZeroDimensions,
  /// The pixel buffer isn't `width * height * 4` bytes.
  #[error("expected {expected} bytes of pixel data, got {actual}")]
  BufferSizeMismatch {
    /// `width * height * 4`
    expected: usize,
    /// The length given.
    actual: usize,
  },
  /// `width * height * 4` doesn't fit in memory.
  #[error("the image dimensions are too large")]
  DimensionsTooLarge,
}

/// An error from [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecodeError {
  /// The data ends before the image does.
  #[error("the image data is incomplete")]
  Incomplete,
  /// The data can never be decoded.
  #[error(transparent)]
  Malformed(#[from] FailureReason),
}

/// Encodes RGBA8 pixels (row-major, top row first) as PNG.
///
/// ## Failure
/// * [`EncodeError::ZeroDimensions`] if either dimension is 0.
/// * [`EncodeError::DimensionsTooLarge`] if `width * height * 4` overflows.
/// * [`EncodeError::BufferSizeMismatch`] if `pixels` is the wrong length.
pub fn encode(
  pixels: &[u8], width: u32, height: u32, options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
  if width == 0 || height == 0 {
    return Err(EncodeError::ZeroDimensions);
  }
  let expected = rgba8_byte_len(width, height).ok_or(EncodeError::DimensionsTooLarge)?;
  if pixels.len() != expected {
    return Err(EncodeError::BufferSizeMismatch { expected, actual: pixels.len() });
  }
  let level = options.clamped_effort();
  let strategy = if level <= 2 { FilterStrategy::None } else { FilterStrategy::MinSum };
  let dropped = options.dropped_bits();
  debug!("encoding {width}x{height}, level {level}, {strategy:?}, dropping {dropped} bits");
  let png = if dropped == 0 {
    encode_rgba8(pixels, width, height, level, strategy)
  } else {
    let mask = u8::MAX << dropped;
    let quantized: Vec<u8> = pixels
      .chunks_exact(4)
      .flat_map(|p| [p[0] & mask, p[1] & mask, p[2] & mask, p[3]])
      .collect();
    encode_rgba8(&quantized, width, height, level, strategy)
  };
  png.ok_or(EncodeError::DimensionsTooLarge)
}

/// Decodes a complete PNG with the default [`DecodeLimits`].
///
/// ## Failure
/// * [`DecodeError::Incomplete`] if the bytes are a valid but unfinished
///   image, including an empty slice.
/// * [`DecodeError::Malformed`] if they can never be decoded.
#[inline]
pub fn decode(bytes: &[u8]) -> Result<DecodeOutput, DecodeError> {
  decode_with_limits(bytes, DecodeLimits::default())
}

/// Decodes a complete PNG, applying the limits given.
pub fn decode_with_limits(bytes: &[u8], limits: DecodeLimits) -> Result<DecodeOutput, DecodeError> {
  match PngEngine::new(limits).submit(bytes) {
    EngineReport::Ready(output) => Ok(output),
    EngineReport::NeedsMoreInput => Err(DecodeError::Incomplete),
    EngineReport::Malformed(reason) => Err(DecodeError::Malformed(reason)),
  }
}
