//! The contract between a [`DecodeSession`](crate::session::DecodeSession) and
//! the codec that actually understands the compressed bytes.

use alloc::boxed::Box;

use crate::{error::FailureReason, output::DecodeOutput};

/// What a [`CodecEngine`] thinks of the bytes it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineReport {
  /// The bytes are a valid prefix of an image, but the image isn't complete.
  NeedsMoreInput,
  /// The image is complete and decoded.
  Ready(DecodeOutput),
  /// The bytes can never form a valid image.
  Malformed(FailureReason),
}

/// A pull-based image decoder.
///
/// Every call to [`submit`](CodecEngine::submit) passes *all* of the bytes
/// seen so far, not just the newly arrived ones: the previous call's bytes
/// with zero or more bytes added at the end. Within such a sequence each call
/// must give the same report that a fresh engine would give for the same
/// bytes, so it's always safe to call again.
///
/// An engine may cache work between calls (eg: the position of the last fully
/// parsed chunk). A buffer shorter than the previous one must make it start
/// over. To feed bytes that don't extend the previous ones, call
/// [`reset`](CodecEngine::reset) first. A [`DecodeSession`](crate::session::DecodeSession)
/// only ever grows its buffer.
///
/// Releasing the engine's resources is just dropping it.
pub trait CodecEngine {
  /// Examines the full input so far.
  fn submit(&mut self, bytes: &[u8]) -> EngineReport;

  /// Throws away any partial decode state, as if freshly created.
  fn reset(&mut self) {}
}

impl<E: CodecEngine + ?Sized> CodecEngine for Box<E> {
  #[inline]
  fn submit(&mut self, bytes: &[u8]) -> EngineReport {
    (**self).submit(bytes)
  }
  #[inline]
  fn reset(&mut self) {
    (**self).reset()
  }
}
