use crate::error::FailureReason;

/// The ways that PNG data can be arranged within each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in each pixel.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }

  /// If this color type can be paired with the bit depth given.
  #[inline]
  #[must_use]
  pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
    match self {
      Self::Y => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
      Self::Index => matches!(bit_depth, 1 | 2 | 4 | 8),
      Self::RGB | Self::YA | Self::RGBA => matches!(bit_depth, 8 | 16),
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = FailureReason;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::Y,
      2 => Self::RGB,
      3 => Self::Index,
      4 => Self::YA,
      6 => Self::RGBA,
      _ => return Err(FailureReason::BadHeader),
    })
  }
}

/// Image Header
///
/// Always the first chunk, it says how the image data is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub struct IHDR {
  /// Width in pixels.
  pub width: u32,
  /// Height in pixels.
  pub height: u32,
  /// Bits per channel.
  pub bit_depth: u8,
  /// How the channels of each pixel are arranged.
  pub color_type: PngColorType,
  /// If the image data is stored as Adam7 reduced images.
  pub is_interlaced: bool,
}
impl IHDR {
  /// The 13 data bytes of this header's chunk.
  #[inline]
  #[must_use]
  pub fn to_bytes(&self) -> [u8; 13] {
    let mut out = [0; 13];
    out[0..4].copy_from_slice(&self.width.to_be_bytes());
    out[4..8].copy_from_slice(&self.height.to_be_bytes());
    out[8] = self.bit_depth;
    out[9] = self.color_type as u8;
    out[12] = u8::from(self.is_interlaced);
    out
  }

  /// Bits used by one pixel of the image data.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    self.bit_depth as usize * self.color_type.channel_count()
  }

  /// The byte distance that filters look "left" by.
  #[inline]
  #[must_use]
  pub const fn filter_chunk_size(&self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// Bytes in one line of `width` pixels, including the filter byte.
  #[inline]
  #[must_use]
  pub const fn bytes_per_filterline(&self, width: u32) -> Option<usize> {
    match (width as usize).checked_mul(self.bits_per_pixel()) {
      Some(bits) => Some(1 + bits / 8 + (bits % 8 != 0) as usize),
      None => None,
    }
  }

  /// The number of bytes that the image data must inflate to.
  ///
  /// This accounts for the filter byte of each line and for interlacing.
  /// Gives `None` on overflow.
  #[must_use]
  pub fn get_zlib_decompression_requirement(&self) -> Option<usize> {
    let mut total = 0_usize;
    for (width, height) in self.passes() {
      if width == 0 || height == 0 {
        continue;
      }
      let line = self.bytes_per_filterline(width)?;
      total = total.checked_add(line.checked_mul(height as usize)?)?;
    }
    Some(total)
  }

  /// The dimensions of each image stored in the image data.
  ///
  /// Just the full image when not interlaced, or the 7 reduced images when
  /// interlaced (some of which can be empty).
  pub(crate) fn passes(&self) -> impl Iterator<Item = (u32, u32)> + Clone {
    let (skip, take) = if self.is_interlaced { (1, 7) } else { (0, 1) };
    reduced_image_dimensions(self.width, self.height).into_iter().skip(skip).take(take)
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = FailureReason;
  fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
    match data {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression, filter, interlace] => {
        let color_type = PngColorType::try_from(*color_type)?;
        if !color_type.allows_bit_depth(*bit_depth) {
          return Err(FailureReason::BadHeader);
        }
        if *compression != 0 || *filter != 0 {
          return Err(FailureReason::BadHeader);
        }
        let is_interlaced = match interlace {
          0 => false,
          1 => true,
          _ => return Err(FailureReason::BadHeader),
        };
        Ok(Self {
          width: u32::from_be_bytes([*w0, *w1, *w2, *w3]),
          height: u32::from_be_bytes([*h0, *h1, *h2, *h3]),
          bit_depth: *bit_depth,
          color_type,
          is_interlaced,
        })
      }
      _ => Err(FailureReason::BadHeader),
    }
  }
}

/// Starting position and step size of each Adam7 pass, `(x0, y0, dx, dy)`.
///
/// Index 0 is the full image.
const ADAM7: [(u32, u32, u32, u32); 8] = [
  (0, 0, 1, 1),
  (0, 0, 8, 8),
  (4, 0, 8, 8),
  (0, 4, 4, 8),
  (2, 0, 4, 4),
  (0, 2, 2, 4),
  (1, 0, 2, 2),
  (0, 1, 1, 2),
];

/// Given the dimensions of the full PNG image, computes the size of each
/// reduced image.
///
/// The output uses index 0 as the base image size, and indexes 1 through 7 for
/// the size of reduced images 1 through 7.
#[must_use]
pub(crate) const fn reduced_image_dimensions(full_width: u32, full_height: u32) -> [(u32, u32); 8] {
  // ```
  // 1 6 4 6 2 6 4 6
  // 7 7 7 7 7 7 7 7
  // 5 6 5 6 5 6 5 6
  // 7 7 7 7 7 7 7 7
  // 3 6 4 6 3 6 4 6
  // 7 7 7 7 7 7 7 7
  // 5 6 5 6 5 6 5 6
  // 7 7 7 7 7 7 7 7
  // ```
  const fn span(full: u32, start: u32, step: u32) -> u32 {
    if full <= start {
      0
    } else {
      (full - start).div_ceil(step)
    }
  }
  let mut out = [(full_width, full_height); 8];
  let mut pass = 1;
  while pass < 8 {
    let (x0, y0, dx, dy) = ADAM7[pass];
    out[pass] = (span(full_width, x0, dx), span(full_height, y0, dy));
    pass += 1;
  }
  out
}

/// Converts a position within a reduced image into the full image position.
///
/// Pass 0 is the full image, so positions are unchanged.
#[inline]
#[must_use]
pub(crate) const fn interlaced_pos_to_full_pos(
  pass: usize, reduced_x: u32, reduced_y: u32,
) -> (u32, u32) {
  let (x0, y0, dx, dy) = ADAM7[pass];
  (reduced_x * dx + x0, reduced_y * dy + y0)
}
