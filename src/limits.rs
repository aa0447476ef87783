//! Resource limits applied while decoding.

use crate::error::FailureReason;

/// Limits on the images that a decoder will agree to produce.
///
/// The header of an image declares its dimensions long before the pixel data
/// arrives, so a tiny malicious input can ask for a gigantic output buffer. An
/// engine checks the declared size against these limits as soon as it knows
/// it, and reports [`FailureReason::DimensionsTooLarge`] when they're exceeded.
///
/// The default limits each side to 17,000 pixels, which is large enough for
/// any reasonable sprite sheet or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeLimits {
  /// Maximum width in pixels.
  pub max_width: u32,
  /// Maximum height in pixels.
  pub max_height: u32,
  /// Maximum `width * height`.
  pub max_pixels: u64,
}
impl DecodeLimits {
  /// The default per-side limit.
  pub const DEFAULT_MAX_DIMENSION: u32 = 17_000;

  /// The default limits.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self {
      max_width: Self::DEFAULT_MAX_DIMENSION,
      max_height: Self::DEFAULT_MAX_DIMENSION,
      max_pixels: (Self::DEFAULT_MAX_DIMENSION as u64) * (Self::DEFAULT_MAX_DIMENSION as u64),
    }
  }

  /// No limits at all, other than what fits in memory.
  #[inline]
  #[must_use]
  pub const fn unlimited() -> Self {
    Self { max_width: u32::MAX, max_height: u32::MAX, max_pixels: u64::MAX }
  }

  /// Sets the maximum width.
  #[inline]
  #[must_use]
  pub const fn with_max_width(self, max_width: u32) -> Self {
    Self { max_width, ..self }
  }

  /// Sets the maximum height.
  #[inline]
  #[must_use]
  pub const fn with_max_height(self, max_height: u32) -> Self {
    Self { max_height, ..self }
  }

  /// Sets the maximum total pixel count.
  #[inline]
  #[must_use]
  pub const fn with_max_pixels(self, max_pixels: u64) -> Self {
    Self { max_pixels, ..self }
  }

  /// Checks declared image dimensions against the limits.
  ///
  /// ## Failure
  /// * [`FailureReason::ZeroDimensions`] if either side is 0.
  /// * [`FailureReason::DimensionsTooLarge`] if any limit is exceeded.
  pub const fn check(&self, width: u32, height: u32) -> Result<(), FailureReason> {
    if width == 0 || height == 0 {
      return Err(FailureReason::ZeroDimensions);
    }
    if width > self.max_width
      || height > self.max_height
      || (width as u64) * (height as u64) > self.max_pixels
    {
      return Err(FailureReason::DimensionsTooLarge);
    }
    Ok(())
  }
}
impl Default for DecodeLimits {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}
