//! Module for pixel formats.
//!
//! Decoded images always come out as [`RGBA8`], one byte per channel, with the
//! channels in `r, g, b, a` order and straight (not premultiplied) alpha. The
//! [`RGB8`] type exists because PNG palettes store their entries that way.
//!
//! ## Format Conversion
//!
//! When a source stores fewer than 8 bits per channel, the value is widened by
//! using the current bit pattern as the top bits and then repeating that
//! pattern downward until the byte is full. A 2-bit `0b01` becomes
//! `0b01_01_01_01`, so the maximum source value always becomes 255.
//!
//! When a source stores 16 bits per channel, only the high byte is kept.

use bytemuck::{Pod, Zeroable};

/// An RGB value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bits per channel RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
impl RGBA8 {
  /// Opaque black, used for pixels that can't be resolved (eg: a palette
  /// index past the end of the palette).
  pub const OPAQUE_BLACK: Self = Self { r: 0, g: 0, b: 0, a: 255 };

  /// Makes a gray pixel with the given alpha.
  #[inline]
  #[must_use]
  pub const fn gray(y: u8, a: u8) -> Self {
    Self { r: y, g: y, b: y, a }
  }

  /// Converts each channel to a normalized float in `0.0 ..= 1.0`.
  #[inline]
  #[must_use]
  pub fn to_unorm_f32(self) -> [f32; 4] {
    [
      f32::from(self.r) / 255.0,
      f32::from(self.g) / 255.0,
      f32::from(self.b) / 255.0,
      f32::from(self.a) / 255.0,
    ]
  }
}
impl From<RGB8> for RGBA8 {
  #[inline]
  #[must_use]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    Self { r, g, b, a: 255 }
  }
}
impl From<[u8; 4]> for RGBA8 {
  #[inline]
  #[must_use]
  fn from([r, g, b, a]: [u8; 4]) -> Self {
    Self { r, g, b, a }
  }
}
impl From<RGBA8> for [u8; 4] {
  #[inline]
  #[must_use]
  fn from(RGBA8 { r, g, b, a }: RGBA8) -> Self {
    [r, g, b, a]
  }
}

#[test]
fn test_pixel_layouts_are_tightly_packed() {
  assert_eq!(core::mem::size_of::<RGB8>(), 3);
  assert_eq!(core::mem::size_of::<RGBA8>(), 4);
  assert_eq!(core::mem::align_of::<RGBA8>(), 1);
  let px: &[RGBA8] = bytemuck::cast_slice(&[1_u8, 2, 3, 4, 5, 6, 7, 8]);
  assert_eq!(px, &[RGBA8 { r: 1, g: 2, b: 3, a: 4 }, RGBA8 { r: 5, g: 6, b: 7, a: 8 }]);
}

#[test]
fn test_rgb8_widens_to_opaque() {
  assert_eq!(RGBA8::from(RGB8 { r: 9, g: 8, b: 7 }), RGBA8 { r: 9, g: 8, b: 7, a: 255 });
  assert_eq!(RGBA8::gray(12, 0), RGBA8 { r: 12, g: 12, b: 12, a: 0 });
  assert_eq!(RGBA8::OPAQUE_BLACK.to_unorm_f32(), [0.0, 0.0, 0.0, 1.0]);
}
