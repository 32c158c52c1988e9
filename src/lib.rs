//! Purpose: Typed JSON decoding over HTTP GET.
//! Exports: `Decode`/`FromJson` protocol, field and option combinators, the
//! Exports: staged decode pipeline, the fetch client, and the image cache.
//! Role: Client-side mini-library; domain types implement `Decode` and the
//! Role: pipeline turns raw response bytes into typed values or one `Error`.
//! Invariants: The first failing stage short-circuits the rest; callers
//! Invariants: always receive a single `Result`, never a panic.

pub mod client;
pub mod error;
pub mod image;
pub mod json;
pub mod pipeline;

pub use client::{Client, canonical_url};
#[doc(hidden)]
pub use error::to_error_code;
pub use error::{Error, ErrorKind};
pub use image::{Image, ImageCache, ImageFormat};
pub use json::combinator::{apply, bind, map, pure};
pub use json::decode::{Decode, FromJson, optional, required};
pub use pipeline::{Response, decode_bytes, decode_response};
