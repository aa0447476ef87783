//! Holds all the tools for decoding and encoding PNG data.
//!
//! ## Incremental Decoding
//! The [`PngEngine`] is a [`CodecEngine`](crate::engine::CodecEngine), which
//! is what a [`DecodeSession`](crate::session::DecodeSession) drives as bytes
//! arrive. You usually won't call it directly.
//!
//! The general format of a PNG is that the information is stored in "chunks".
//! There's four "critical" chunk types that the engine cares about:
//! * **Header** - This has all the important information about the image's
//!   dimensions, pixel format, and if the image is interlaced or not. The
//!   engine checks it against the [`DecodeLimits`](crate::limits::DecodeLimits)
//!   as soon as it arrives.
//! * **Palette** - If an image uses indexed color it will have a palette of
//!   what index values map to what `RGB8` values.
//! * **Image Data** - One or more chunks of compressed data. All of the
//!   compressed data forms a single zlib data stream.
//! * **End** - The last chunk, lets you know you had the full PNG and your data
//!   wasn't truncated accidentally.
//!
//! Of the "ancillary" chunks only the transparency chunk changes the decoded
//! pixels. All the others are skipped.
//!
//! Any data that ends in the middle of a chunk (or before the end chunk) is
//! simply incomplete, never an error. Everything that *can* be checked before
//! the end chunk is checked as soon as possible: chunk CRCs, header fields,
//! chunk ordering, and unknown critical chunks.
//!
//! Chunk ordering is strict. There must be exactly one header, the palette and
//! transparency chunks must come before the image data, transparency must come
//! after the palette of an indexed image, and the image data chunks must be
//! consecutive. Anything else is
//! [`FailureReason::ChunkOrder`](crate::error::FailureReason::ChunkOrder).
//!
//! ## Encoding
//! [`encode_rgba8`] writes RGBA8 pixels as a PNG. The one-shot
//! [`encode`](crate::codec::encode) function is the friendlier way to call it.

mod chunk;
mod crc32;
mod encode;
mod engine;
mod filtering;
mod header;

pub use self::{
  chunk::{
    check_signature, frame_chunk, ChunkFraming, ChunkType, RawChunk, RawChunkIter,
    CHUNK_OVERHEAD, MAX_CHUNK_LEN, PNG_SIGNATURE,
  },
  crc32::{chunk_crc, Crc32},
  encode::{encode_rgba8, push_chunk, FilterStrategy, IDAT_CHUNK_SIZE},
  engine::PngEngine,
  header::{PngColorType, IHDR},
};
