#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for decoding images from bytes that arrive a little at a time.
//!
//! The heart of the crate is the [`DecodeSession`](session::DecodeSession): you
//! give it bytes as they show up, call `process`, and eventually it tells you
//! that the image is done (or that it never will be). The session doesn't know
//! any image format itself, it drives a [`CodecEngine`](engine::CodecEngine).
//! Currently the only engine is the PNG one.
//!
//! Also available:
//! * [`codec`] has one-shot `encode` and `decode` for data that's already
//!   complete.
//! * [`shader`] has the vertex and uniform layouts for drawing decoded images
//!   as sprites on the GPU.
//!
//! ## Features
//! * `alloc` - The session, the decode output, and the engine trait.
//! * `png` - The PNG engine and encoder, and the one-shot [`codec`] functions.
//! * `shader` - GPU data layouts.
//!
//! All of them are on by default.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod error;
pub use error::*;

pub mod limits;

#[cfg(feature = "alloc")]
#[cfg_attr(docs_rs, doc(cfg(feature = "alloc")))]
pub mod output;

#[cfg(feature = "alloc")]
#[cfg_attr(docs_rs, doc(cfg(feature = "alloc")))]
pub mod engine;

#[cfg(feature = "alloc")]
#[cfg_attr(docs_rs, doc(cfg(feature = "alloc")))]
pub mod session;

#[cfg(feature = "png")]
#[cfg_attr(docs_rs, doc(cfg(feature = "png")))]
pub mod png;

#[cfg(feature = "png")]
#[cfg_attr(docs_rs, doc(cfg(feature = "png")))]
pub mod codec;

#[cfg(feature = "shader")]
#[cfg_attr(docs_rs, doc(cfg(feature = "shader")))]
pub mod shader;
