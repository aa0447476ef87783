//! PNG's per-line byte filters, in both directions.
//!
//! Filters work on bytes, not pixels. The byte "to the left" is the one
//! [`filter_chunk_size`](super::IHDR::filter_chunk_size) bytes earlier in the
//! line, and the bytes "above" come from the previous line of the same
//! (reduced) image.

use crate::error::FailureReason;

use super::header::{interlaced_pos_to_full_pos, IHDR};

pub(crate) const FILTER_NONE: u8 = 0;
pub(crate) const FILTER_SUB: u8 = 1;
pub(crate) const FILTER_UP: u8 = 2;
pub(crate) const FILTER_AVERAGE: u8 = 3;
pub(crate) const FILTER_PAETH: u8 = 4;

pub(crate) const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests must not change.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

#[inline]
const fn predict(filter: u8, a: u8, b: u8, c: u8) -> u8 {
  match filter {
    FILTER_SUB => a,
    FILTER_UP => b,
    FILTER_AVERAGE => ((a as u16 + b as u16) / 2) as u8,
    FILTER_PAETH => paeth_predictor(a, b, c),
    _ => 0,
  }
}

/// Undoes one line's filter in place.
///
/// `prev` is the previous line after it was unfiltered (without its filter
/// byte), or `None` for the first line of an image.
pub(crate) fn unfilter_line(
  filter: u8, chunk: usize, prev: Option<&[u8]>, line: &mut [u8],
) -> Result<(), FailureReason> {
  if filter > FILTER_PAETH {
    return Err(FailureReason::BadFilter);
  }
  if filter == FILTER_NONE {
    return Ok(());
  }
  for i in 0..line.len() {
    let a = if i >= chunk { line[i - chunk] } else { 0 };
    let (b, c) = match prev {
      Some(prev) => (prev[i], if i >= chunk { prev[i - chunk] } else { 0 }),
      None => (0, 0),
    };
    line[i] = line[i].wrapping_add(predict(filter, a, b, c));
  }
  Ok(())
}

/// Applies a filter to one line, writing the filtered bytes to `out`.
///
/// `prev` is the previous raw line, or `None` for the first line.
pub(crate) fn filter_line(filter: u8, chunk: usize, prev: Option<&[u8]>, line: &[u8], out: &mut [u8]) {
  for (i, (o, &x)) in out.iter_mut().zip(line).enumerate() {
    let a = if i >= chunk { line[i - chunk] } else { 0 };
    let (b, c) = match prev {
      Some(prev) => (prev[i], if i >= chunk { prev[i - chunk] } else { 0 }),
      None => (0, 0),
    };
    *o = x.wrapping_sub(predict(filter, a, b, c));
  }
}

/// Unfilters all the decompressed image data, in place.
///
/// `op(x, y, data)` gets called once per pixel with the full image position and
/// that pixel's bytes. At bit depths below 8 the `data` is a single byte
/// holding the unpacked value (eg: `0..=3` for 2-bit).
///
/// Each filter byte is set to 0 once its line has been unfiltered.
pub(crate) fn unfilter_image<F: FnMut(u32, u32, &[u8])>(
  header: &IHDR, mut decompressed: &mut [u8], mut op: F,
) -> Result<(), FailureReason> {
  let chunk = header.filter_chunk_size();
  let pass_numbers = if header.is_interlaced { 1..8 } else { 0..1 };
  for (pass, (reduced_width, reduced_height)) in pass_numbers.zip(header.passes()) {
    if reduced_width == 0 || reduced_height == 0 {
      continue;
    }
    let line_len =
      header.bytes_per_filterline(reduced_width).ok_or(FailureReason::DimensionsTooLarge)?;
    let pass_len =
      line_len.checked_mul(reduced_height as usize).ok_or(FailureReason::DimensionsTooLarge)?;
    if decompressed.len() < pass_len {
      return Err(FailureReason::ImageDataTruncated);
    }
    let (pass_data, rest) = core::mem::take(&mut decompressed).split_at_mut(pass_len);
    decompressed = rest;

    for reduced_y in 0..reduced_height {
      let (before, after) = pass_data.split_at_mut(reduced_y as usize * line_len);
      let prev = before.len().checked_sub(line_len - 1).map(|s| &before[s..]);
      let (filter, line) = after
        .get_mut(..line_len)
        .and_then(|l| l.split_first_mut())
        .ok_or(FailureReason::ImageDataTruncated)?;
      unfilter_line(*filter, chunk, prev, line)?;
      *filter = FILTER_NONE;
      send_out_line(header, pass, reduced_y, reduced_width, line, &mut op);
    }
  }
  Ok(())
}

fn send_out_line<F: FnMut(u32, u32, &[u8])>(
  header: &IHDR, pass: usize, reduced_y: u32, reduced_width: u32, line: &[u8], op: &mut F,
) {
  match header.bits_per_pixel() {
    bits @ (1 | 2 | 4) => {
      let per_byte = 8 / bits;
      let mask = (1_u8 << bits) - 1;
      for reduced_x in 0..reduced_width {
        let byte = line[reduced_x as usize / per_byte];
        let slot = reduced_x as usize % per_byte;
        let shift = 8 - bits * (slot + 1);
        let value = (byte >> shift) & mask;
        let (x, y) = interlaced_pos_to_full_pos(pass, reduced_x, reduced_y);
        op(x, y, &[value]);
      }
    }
    _ => {
      let chunk = header.filter_chunk_size();
      for (reduced_x, data) in (0..reduced_width).zip(line.chunks_exact(chunk)) {
        let (x, y) = interlaced_pos_to_full_pos(pass, reduced_x, reduced_y);
        op(x, y, data);
      }
    }
  }
}
