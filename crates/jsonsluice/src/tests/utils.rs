use std::io;

use crate::{ByteSource, Error, ItemKey, ItemStream, SliceSource, Value};

/// Byte source yielding a fixed list of chunks, for exercising arbitrary
/// partitions of an input.
pub(crate) struct VecSource {
    chunks: Vec<Vec<u8>>,
    next: usize,
}

impl VecSource {
    pub(crate) fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self { chunks, next: 0 }
    }

    /// Partition `data` into chunks whose sizes are derived from `splits`
    /// (each at least one byte).
    pub(crate) fn partition(data: &[u8], splits: &[usize]) -> Self {
        let mut chunks = Vec::new();
        let mut idx = 0;
        for s in splits {
            let remaining = data.len() - idx;
            if remaining == 0 {
                break;
            }
            let size = 1 + (s % remaining);
            chunks.push(data[idx..idx + size].to_vec());
            idx += size;
        }
        if idx < data.len() {
            chunks.push(data[idx..].to_vec());
        }
        Self::new(chunks)
    }
}

impl ByteSource for VecSource {
    fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        match self.chunks.get(self.next) {
            Some(chunk) => {
                self.next += 1;
                Ok(Some(chunk))
            }
            None => Ok(None),
        }
    }
}

/// Collect every item of a stream over `doc`, panicking on any error.
pub(crate) fn collect_items(doc: &[u8], pointer: &str) -> Vec<(ItemKey, Value)> {
    ItemStream::from_slice(doc, pointer)
        .unwrap()
        .map(Result::unwrap)
        .collect()
}

/// Collect items with the input served in `chunk_size`-byte chunks.
pub(crate) fn collect_items_chunked(
    doc: &[u8],
    pointer: &str,
    chunk_size: usize,
) -> Vec<(ItemKey, Value)> {
    let source = SliceSource::with_chunk_size(doc, chunk_size);
    ItemStream::with_decoder(source, pointer, crate::ValueDecoder)
        .unwrap()
        .map(Result::unwrap)
        .collect()
}

/// Run a stream to its first error, asserting every earlier item decoded.
pub(crate) fn first_error(doc: &[u8], pointer: &str) -> Error {
    let mut stream = ItemStream::from_slice(doc, pointer).unwrap();
    for item in stream.by_ref() {
        if let Err(err) = item {
            return err;
        }
    }
    panic!("stream over {:?} ended without an error", String::from_utf8_lossy(doc));
}

/// The direct children of a container value, as the stream should yield
/// them. `None` if the value is a scalar.
pub(crate) fn direct_children(value: &Value) -> Option<Vec<(ItemKey, Value)>> {
    match value {
        Value::Object(map) => Some(
            map.iter()
                .map(|(k, v)| (ItemKey::Key(k.clone()), v.clone()))
                .collect(),
        ),
        Value::Array(arr) => Some(
            arr.iter()
                .enumerate()
                .map(|(i, v)| (ItemKey::Index(i), v.clone()))
                .collect(),
        ),
        _ => None,
    }
}

/// Convert a `serde_json` tree into this crate's `Value`, for differential
/// checks against a standard full-document decode.
pub(crate) fn from_serde(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().expect("finite number")),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(arr) => Value::Array(arr.iter().map(from_serde).collect()),
        serde_json::Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), from_serde(v)))
                .collect(),
        ),
    }
}
