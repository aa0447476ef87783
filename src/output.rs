#![forbid(unsafe_code)]

//! The decoded image produced by a successful decode.

use alloc::{boxed::Box, vec::Vec};
use core::fmt::Debug;

use crate::pixel_formats::RGBA8;

/// Bytes used by each pixel of a [`DecodeOutput`].
pub const BYTES_PER_PIXEL: usize = 4;

/// Computes `width * height * 4` with overflow checking.
#[inline]
#[must_use]
pub const fn rgba8_byte_len(width: u32, height: u32) -> Option<usize> {
  match (width as usize).checked_mul(height as usize) {
    Some(count) => count.checked_mul(BYTES_PER_PIXEL),
    None => None,
  }
}

/// A decoded image: RGBA8 pixels in row-major order, top row first.
///
/// The width and height are always at least 1, and the pixel buffer is always
/// exactly `width * height * 4` bytes. The pixels can't be changed once the
/// value exists, but [`into_pixels`](Self::into_pixels) gives you the buffer
/// back if you want to edit it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DecodeOutput {
  pixels: Box<[u8]>,
  width: u32,
  height: u32,
}
impl DecodeOutput {
  /// Wraps a pixel buffer.
  ///
  /// Gives `None` if either dimension is 0 or if the buffer length isn't
  /// exactly `width * height * 4`.
  #[must_use]
  pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Option<Self> {
    if width == 0 || height == 0 {
      return None;
    }
    if rgba8_byte_len(width, height)? != pixels.len() {
      return None;
    }
    Some(Self { pixels: pixels.into_boxed_slice(), width, height })
  }

  /// Width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }

  /// Bytes per row of pixels.
  #[inline]
  #[must_use]
  pub const fn bytes_per_row(&self) -> usize {
    self.width as usize * BYTES_PER_PIXEL
  }

  /// The raw pixel bytes.
  #[inline]
  #[must_use]
  pub fn pixels(&self) -> &[u8] {
    &self.pixels
  }

  /// The pixels as [`RGBA8`] values.
  #[inline]
  #[must_use]
  pub fn rgba8(&self) -> &[RGBA8] {
    bytemuck::cast_slice(&self.pixels)
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<RGBA8> {
    if x < self.width && y < self.height {
      let i = (y as usize) * (self.width as usize) + (x as usize);
      self.rgba8().get(i).copied()
    } else {
      None
    }
  }

  /// Gives up the pixel buffer.
  #[inline]
  #[must_use]
  pub fn into_pixels(self) -> Vec<u8> {
    self.pixels.into_vec()
  }
}
impl Debug for DecodeOutput {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("DecodeOutput")
      .field("width", &self.width)
      .field("height", &self.height)
      .field("pixels", &(&self.pixels[..self.pixels.len().min(12)], self.pixels.len()))
      .finish()
  }
}
