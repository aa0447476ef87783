use std::{cell::Cell, rc::Rc};

use pixelfeed::{
  engine::{CodecEngine, EngineReport},
  limits::DecodeLimits,
  output::DecodeOutput,
  session::{DecodeSession, ProcessStatus, SessionError, SessionState},
  EngineInitError, FailureReason,
};
use proptest::prelude::*;
use walkdir::WalkDir;

use super::{init_logger, rand_bytes, two_by_two_png, TWO_BY_TWO};

/// Counts how many engines were made and how many were dropped.
#[derive(Default)]
struct Tally {
  made: Cell<usize>,
  dropped: Cell<usize>,
}

/// Ready after 4 bytes, malformed if the first byte is 0.
struct Counted(Rc<Tally>);
impl Counted {
  fn new(tally: &Rc<Tally>) -> Self {
    tally.made.set(tally.made.get() + 1);
    Self(tally.clone())
  }
}
impl Drop for Counted {
  fn drop(&mut self) {
    self.0.dropped.set(self.0.dropped.get() + 1);
  }
}
impl CodecEngine for Counted {
  fn submit(&mut self, bytes: &[u8]) -> EngineReport {
    match bytes {
      [0, ..] => EngineReport::Malformed(FailureReason::Corrupt),
      [a, b, c, d, ..] => {
        EngineReport::Ready(DecodeOutput::new(vec![*a, *b, *c, *d], 1, 1).unwrap())
      }
      _ => EngineReport::NeedsMoreInput,
    }
  }
}

fn counted_session(tally: &Rc<Tally>, initial: &[u8]) -> DecodeSession<Counted> {
  DecodeSession::with_engine_factory(initial, || Ok(Counted::new(tally))).unwrap()
}

#[test]
fn test_engine_released_once_from_every_state() {
  let drive: [(&[u8], SessionState); 4] = [
    (&[], SessionState::Created),
    (&[1, 2], SessionState::Processing),
    (&[1, 2, 3, 4], SessionState::Succeeded),
    (&[0, 2, 3, 4], SessionState::Failed),
  ];
  for (input, expected) in drive {
    let tally = Rc::new(Tally::default());
    let mut s = counted_session(&tally, input);
    if expected != SessionState::Created {
      s.process();
    }
    assert_eq!(s.state(), expected);
    assert_eq!(tally.dropped.get(), 0);
    drop(s);
    assert_eq!((tally.made.get(), tally.dropped.get()), (1, 1), "{expected:?}");
  }

  // taking the output out also releases the engine.
  let tally = Rc::new(Tally::default());
  let mut s = counted_session(&tally, &[5, 6, 7, 8]);
  s.process();
  let out = s.into_output().unwrap();
  assert_eq!(out.pixels(), &[5, 6, 7, 8]);
  assert_eq!(tally.dropped.get(), 1);
}

#[test]
fn test_factory_failure_makes_no_session() {
  let r = DecodeSession::<Counted>::with_engine_factory(&[1], || Err(EngineInitError::OutOfMemory));
  assert_eq!(r.unwrap_err(), SessionError::ConstructionFailed(EngineInitError::OutOfMemory));
}

#[test]
fn test_two_by_two_single_chunk() {
  init_logger();
  let mut s = DecodeSession::create(&two_by_two_png()).unwrap();
  let out = match s.process() {
    ProcessStatus::Success(out) => out.clone(),
    other => panic!("{other:?}"),
  };
  assert_eq!((out.width(), out.height()), (2, 2));
  assert_eq!(out.pixels(), &TWO_BY_TWO);
  assert_eq!(s.process(), ProcessStatus::Success(&out));
  assert_eq!(s.into_output(), Some(out));
}

#[test]
fn test_two_by_two_byte_at_a_time() {
  init_logger();
  let png = two_by_two_png();
  let mut s = DecodeSession::create(&[]).unwrap();
  assert_eq!(s.process(), ProcessStatus::Continue);
  for (i, byte) in png.iter().enumerate() {
    s.append_input(&[*byte]).unwrap();
    let status = s.process();
    if i + 1 < png.len() {
      assert_eq!(status, ProcessStatus::Continue, "byte {i}");
    } else {
      assert_eq!(status.output().map(|o| o.pixels()), Some(&TWO_BY_TWO[..]));
    }
  }
  assert_eq!(
    s.append_input(&[0]),
    Err(SessionError::InvalidState { state: SessionState::Succeeded })
  );
}

#[test]
fn test_truncated_stream_continues_forever() {
  let png = two_by_two_png();
  let mut s = DecodeSession::create(&png[..png.len() - 1]).unwrap();
  for _ in 0..100 {
    assert_eq!(s.process(), ProcessStatus::Continue);
  }
  assert_eq!(s.state(), SessionState::Processing);
  assert!(s.output().is_none());
}

#[test]
fn test_corrupt_header_fails() {
  init_logger();
  let mut png = two_by_two_png();
  // bit depth 3 isn't a thing, and fix the CRC so only the header is wrong.
  png[8 + 8 + 8] = 3;
  let crc = pixelfeed::png::chunk_crc(*b"IHDR", &png[16..29]);
  png[29..33].copy_from_slice(&crc.to_be_bytes());
  let mut s = DecodeSession::create(&png).unwrap();
  assert_eq!(s.process(), ProcessStatus::Failure(FailureReason::BadHeader));
  assert_eq!(s.process(), ProcessStatus::Failure(FailureReason::BadHeader));
  assert!(s.output().is_none());
  assert!(s.into_output().is_none());

  // flipping a bit without fixing the CRC is caught by the CRC.
  let mut png = two_by_two_png();
  png[20] ^= 0x40;
  let mut s = DecodeSession::create(&png).unwrap();
  assert_eq!(s.process(), ProcessStatus::Failure(FailureReason::ChecksumMismatch));
}

#[test]
fn test_failure_is_found_before_the_end() {
  // a wrong signature fails on the very first byte.
  let mut s = DecodeSession::create(&[0x89, b'X']).unwrap();
  assert_eq!(s.process(), ProcessStatus::Failure(FailureReason::BadSignature));
  assert_eq!(s.append_input(&[1]), Err(SessionError::InvalidState { state: SessionState::Failed }));
}

#[test]
fn test_limits_apply_to_sessions() {
  let limits = DecodeLimits::default().with_max_pixels(3);
  let mut s = DecodeSession::create_with_limits(&two_by_two_png(), limits).unwrap();
  assert_eq!(s.process(), ProcessStatus::Failure(FailureReason::DimensionsTooLarge));
}

#[test]
fn test_files_in_the_test_folder_never_succeed() {
  // iter ALL files in the test folder, none of them are images.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(_) => continue,
    };
    let mut s = DecodeSession::create(&v).unwrap();
    assert!(s.process().output().is_none(), "{}", entry.path().display());
  }
}

#[test]
fn test_random_bytes_never_panic() {
  for _ in 0..50 {
    let mut v = pixelfeed::png::PNG_SIGNATURE.to_vec();
    v.extend(rand_bytes(512));
    for input in [&v[8..], &v[..]] {
      let mut s = DecodeSession::create(input).unwrap();
      s.process();
      let _ = s.append_input(&rand_bytes(64));
      s.process();
    }
  }
}

/// The status a fresh session gives for some complete input, as a comparable
/// value.
fn one_shot(data: &[u8]) -> Result<Option<Vec<u8>>, FailureReason> {
  let mut s = DecodeSession::create(data).unwrap();
  match s.process() {
    ProcessStatus::Continue => Ok(None),
    ProcessStatus::Success(out) => Ok(Some(out.pixels().to_vec())),
    ProcessStatus::Failure(why) => Err(why),
  }
}

proptest! {
  #[test]
  fn test_chunking_does_not_change_the_result(
    cuts in proptest::collection::vec(1_usize..24, 0..40),
    corrupt_at in proptest::option::of(0_usize..200),
  ) {
    let mut data = two_by_two_png();
    if let Some(i) = corrupt_at {
      let i = i % data.len();
      data[i] ^= 0xA5;
    }
    let expected = one_shot(&data);

    let mut s = DecodeSession::create(&[]).unwrap();
    let mut rest = &data[..];
    let mut last = Ok(None);
    for cut in cuts.iter().copied().chain(std::iter::once(usize::MAX)) {
      let (now, later) = rest.split_at(cut.min(rest.len()));
      rest = later;
      if s.append_input(now).is_err() {
        break;
      }
      last = match s.process() {
        ProcessStatus::Continue => Ok(None),
        ProcessStatus::Success(out) => Ok(Some(out.pixels().to_vec())),
        ProcessStatus::Failure(why) => Err(why),
      };
      // a terminal status must already be the final answer.
      if s.is_terminal() {
        prop_assert_eq!(&last, &expected);
      }
    }
    prop_assert_eq!(last, expected);
  }
}
