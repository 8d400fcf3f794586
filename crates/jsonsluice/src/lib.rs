//! Streaming iteration over the children of one container in a JSON
//! document, selected by an RFC 6901 JSON Pointer.
//!
//! `jsonsluice` reads a document as a sequence of byte chunks — from a file,
//! an open reader, or in-memory bytes — and yields one direct child of the
//! pointer-designated container at a time: `(key, value)` pairs for objects,
//! `(index, value)` pairs for arrays. Peak memory is bounded by the nesting
//! depth plus the largest single child, independent of document size.
//!
//! # Examples
//!
//! ```rust
//! use jsonsluice::{ItemKey, ItemStream};
//!
//! let doc = br#"[{"items": ["a", "b", "c"]}]"#;
//! let mut items = ItemStream::from_slice(doc, "/0/items").unwrap();
//! while let Some(item) = items.advance() {
//!     let (key, value) = item.unwrap();
//!     println!("{key:?} => {value}");
//! }
//! ```

mod decoder;
mod error;
mod items;
mod lexer;
mod literal_buffer;
mod pointer;
mod source;
mod strings;
mod value;

pub use decoder::{DecodeError, JsonDecoder, ValueDecoder};
pub use error::{Error, ErrorKind};
pub use items::{ItemKey, ItemStream};
pub use pointer::JsonPointer;
pub use source::{ByteSource, ReadSource, SliceSource};
pub use value::{Array, Map, Value};

#[cfg(test)]
mod tests;
