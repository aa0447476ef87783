#![forbid(unsafe_code)]

//! Incremental decode sessions.
//!
//! A [`DecodeSession`] collects compressed bytes as they arrive and asks its
//! [`CodecEngine`] whether they form an image yet. It's a small state machine:
//!
//! ```text
//!            append_input / process (needs more)
//!                 ┌──────────────┐
//!                 v              │
//! Created ──> Processing ────────┘
//!                 │
//!                 ├──> Succeeded(output)   (terminal)
//!                 └──> Failed(reason)      (terminal)
//! ```
//!
//! Calling [`process`](DecodeSession::process) after a terminal state just
//! gives the same status again. Appending after a terminal state is an error.
//!
//! ```
//! # #[cfg(feature = "png")]
//! # {
//! use pixelfeed::session::{DecodeSession, ProcessStatus};
//! # let stream: &[u8] = &[];
//! let mut session = DecodeSession::create(&[]).unwrap();
//! for chunk in stream.chunks(4096) {
//!   session.append_input(chunk).unwrap();
//!   if let ProcessStatus::Failure(why) = session.process() {
//!     panic!("corrupt image: {why}");
//!   }
//! }
//! let image = session.into_output();
//! # }
//! ```
//!
//! The engine is owned by the session and is dropped together with it, so it
//! gets released exactly once no matter which state the session was in.

use alloc::vec::Vec;

use log::{debug, trace, warn};
use thiserror::Error;

use crate::{
  engine::{CodecEngine, EngineReport},
  error::{EngineInitError, FailureReason},
  output::DecodeOutput,
};

#[cfg(feature = "png")]
use crate::{limits::DecodeLimits, png::PngEngine};

/// The lifecycle state of a [`DecodeSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionState {
  /// Nothing has been processed yet.
  Created,
  /// At least one `process` call happened and the image isn't done.
  Processing,
  /// The image was decoded. Terminal.
  Succeeded,
  /// The input can't be decoded. Terminal.
  Failed,
}
impl SessionState {
  /// If no further transitions can happen.
  #[inline]
  #[must_use]
  pub const fn is_terminal(self) -> bool {
    matches!(self, Self::Succeeded | Self::Failed)
  }
}

/// An error from using a [`DecodeSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SessionError {
  /// The codec engine couldn't be created.
  #[error("the decode session could not be constructed: {0}")]
  ConstructionFailed(#[from] EngineInitError),

  /// The operation isn't allowed in the session's current state.
  #[error("the operation is not allowed in the {state:?} state")]
  InvalidState {
    /// The state the session was in.
    state: SessionState,
  },

  /// The input buffer couldn't grow.
  #[error("the input buffer could not grow")]
  OutOfMemory,
}

/// The result of a [`DecodeSession::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus<'s> {
  /// Not done yet. Append more bytes and call `process` again.
  Continue,
  /// The image is decoded.
  Success(&'s DecodeOutput),
  /// The input can never be decoded.
  Failure(FailureReason),
}
impl<'s> ProcessStatus<'s> {
  /// If this is `Success` or `Failure`.
  #[inline]
  #[must_use]
  pub const fn is_terminal(&self) -> bool {
    !matches!(self, Self::Continue)
  }

  /// The output, if this is `Success`.
  #[inline]
  #[must_use]
  pub const fn output(&self) -> Option<&'s DecodeOutput> {
    match self {
      Self::Success(output) => Some(*output),
      _ => None,
    }
  }
}

#[derive(Debug, Clone)]
enum Phase {
  Created,
  Processing,
  Succeeded(DecodeOutput),
  Failed(FailureReason),
}

/// Decodes one image from bytes that might arrive a little at a time.
///
/// See the [module docs](crate::session) for the state machine.
///
/// A session decodes exactly one image and is then thrown away. It doesn't do
/// any locking or I/O of its own; if decoding is slow, run the whole session on
/// some other thread.
pub struct DecodeSession<E: CodecEngine> {
  input: Vec<u8>,
  phase: Phase,
  engine: E,
}

#[cfg(feature = "png")]
impl DecodeSession<PngEngine> {
  /// Starts a PNG decode session with the default [`DecodeLimits`].
  ///
  /// `initial` can be empty, part of the data, or all of it.
  ///
  /// ## Failure
  /// * [`SessionError::ConstructionFailed`] if the initial bytes can't be
  ///   copied into the session.
  #[inline]
  pub fn create(initial: &[u8]) -> Result<Self, SessionError> {
    Self::create_with_limits(initial, DecodeLimits::default())
  }

  /// Starts a PNG decode session with the given limits.
  #[inline]
  pub fn create_with_limits(initial: &[u8], limits: DecodeLimits) -> Result<Self, SessionError> {
    Self::with_engine_factory(initial, || Ok(PngEngine::new(limits)))
  }
}

impl<E: CodecEngine> DecodeSession<E> {
  /// Starts a session using an engine from the `factory`.
  ///
  /// ## Failure
  /// * [`SessionError::ConstructionFailed`] if the factory fails or the
  ///   initial bytes can't be copied into the session. In the second case the
  ///   engine is dropped before returning.
  pub fn with_engine_factory<F>(initial: &[u8], factory: F) -> Result<Self, SessionError>
  where
    F: FnOnce() -> Result<E, EngineInitError>,
  {
    let engine = factory().map_err(|e| {
      warn!("codec engine construction failed: {e}");
      SessionError::ConstructionFailed(e)
    })?;
    Self::with_engine(engine, initial)
  }

  /// Starts a session that uses the given engine.
  pub fn with_engine(engine: E, initial: &[u8]) -> Result<Self, SessionError> {
    let mut input: Vec<u8> = Vec::new();
    input.try_reserve(initial.len()).map_err(EngineInitError::from)?;
    input.extend_from_slice(initial);
    debug!("decode session created with {} initial bytes", input.len());
    Ok(Self { input, phase: Phase::Created, engine })
  }

  /// The current lifecycle state.
  #[inline]
  #[must_use]
  pub fn state(&self) -> SessionState {
    match self.phase {
      Phase::Created => SessionState::Created,
      Phase::Processing => SessionState::Processing,
      Phase::Succeeded(_) => SessionState::Succeeded,
      Phase::Failed(_) => SessionState::Failed,
    }
  }

  /// If the session has reached `Succeeded` or `Failed`.
  #[inline]
  #[must_use]
  pub fn is_terminal(&self) -> bool {
    self.state().is_terminal()
  }

  /// How many input bytes the session holds.
  #[inline]
  #[must_use]
  pub fn input_len(&self) -> usize {
    self.input.len()
  }

  /// The decoded image, once the session has succeeded.
  #[inline]
  #[must_use]
  pub fn output(&self) -> Option<&DecodeOutput> {
    match &self.phase {
      Phase::Succeeded(output) => Some(output),
      _ => None,
    }
  }

  /// Why the session failed, once it has failed.
  #[inline]
  #[must_use]
  pub fn failure(&self) -> Option<FailureReason> {
    match self.phase {
      Phase::Failed(reason) => Some(reason),
      _ => None,
    }
  }

  /// Ends the session, giving back the decoded image if there is one.
  ///
  /// The engine is released either way.
  #[inline]
  #[must_use]
  pub fn into_output(self) -> Option<DecodeOutput> {
    match self.phase {
      Phase::Succeeded(output) => Some(output),
      _ => None,
    }
  }

  /// Adds more bytes to the end of the input.
  ///
  /// Empty chunks are fine. Nothing is decoded until the next
  /// [`process`](Self::process) call.
  ///
  /// ## Failure
  /// * [`SessionError::InvalidState`] if the session already succeeded or
  ///   failed. The bytes are not added.
  /// * [`SessionError::OutOfMemory`] if the buffer can't grow. The bytes are
  ///   not added.
  pub fn append_input(&mut self, chunk: &[u8]) -> Result<(), SessionError> {
    let state = self.state();
    if state.is_terminal() {
      warn!("rejected {} bytes appended to a session in the {state:?} state", chunk.len());
      return Err(SessionError::InvalidState { state });
    }
    self.input.try_reserve(chunk.len()).map_err(|_| SessionError::OutOfMemory)?;
    self.input.extend_from_slice(chunk);
    trace!("appended {} bytes, {} total", chunk.len(), self.input.len());
    Ok(())
  }

  /// Gives all of the input so far to the engine and reports the result.
  ///
  /// * `Continue`: the data is fine so far but incomplete. An empty input
  ///   always gives this.
  /// * `Success`: the image is decoded. Every later call also gives `Success`
  ///   with the same output, and the engine isn't consulted again.
  /// * `Failure`: the data is corrupt. Every later call also gives the same
  ///   `Failure`.
  ///
  /// An input that simply never finishes will give `Continue` forever. It's
  /// up to the caller to decide when to give up on it.
  pub fn process(&mut self) -> ProcessStatus<'_> {
    if !self.is_terminal() {
      self.step();
    }
    self.status()
  }

  fn step(&mut self) {
    if self.input.is_empty() {
      trace!("no input yet, nothing to submit");
      self.phase = Phase::Processing;
      return;
    }
    match self.engine.submit(&self.input) {
      EngineReport::NeedsMoreInput => {
        trace!("engine needs more than {} bytes", self.input.len());
        self.phase = Phase::Processing;
      }
      EngineReport::Ready(output) => {
        debug!(
          "decoded a {}x{} image from {} bytes",
          output.width(),
          output.height(),
          self.input.len()
        );
        self.phase = Phase::Succeeded(output);
      }
      EngineReport::Malformed(reason) => {
        warn!("decode failed after {} bytes: {reason}", self.input.len());
        self.engine.reset();
        self.phase = Phase::Failed(reason);
      }
    }
  }

  fn status(&self) -> ProcessStatus<'_> {
    match &self.phase {
      Phase::Created | Phase::Processing => ProcessStatus::Continue,
      Phase::Succeeded(output) => ProcessStatus::Success(output),
      Phase::Failed(reason) => ProcessStatus::Failure(*reason),
    }
  }
}

impl<E: CodecEngine> core::fmt::Debug for DecodeSession<E> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("DecodeSession")
      .field("state", &self.state())
      .field("input_len", &self.input.len())
      .finish_non_exhaustive()
  }
}
