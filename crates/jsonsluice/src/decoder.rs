//! The leaf decoder seam.
//!
//! The driver isolates the raw source bytes of each direct child of the
//! target container and hands them to a [`JsonDecoder`] to materialize. The
//! default [`ValueDecoder`] produces this crate's [`Value`]; callers with
//! their own value representation can plug in a different decoder.

use std::fmt;

use crate::{
    lexer::{Lexer, ScalarKind, Token, TokenKind},
    source::SliceSource,
    strings::unescape,
    value::{Map, Value},
};

/// Materializes one complete JSON value from its raw source bytes.
pub trait JsonDecoder {
    /// The host representation of a decoded JSON value.
    type Value;
    /// Error type surfaced to the caller as a decode error.
    type Error: fmt::Display;

    /// Decodes `raw`, the exact source bytes of a single well-formed JSON
    /// value (scalar or container, nested arbitrarily).
    fn decode(&mut self, raw: &[u8]) -> Result<Self::Value, Self::Error>;
}

/// Error returned by [`ValueDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(String);

impl DecodeError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for DecodeError {}

/// The default decoder, producing [`Value`].
///
/// The input is expected to be structurally valid (the driver has already
/// validated token order before handing bytes over); this decoder still
/// rejects lexically malformed bytes, invalid UTF-8, unpaired surrogates,
/// and trailing data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueDecoder;

/// A container being assembled.
enum Builder {
    Array(Vec<Value>),
    Object(Map, Option<String>),
}

impl JsonDecoder for ValueDecoder {
    type Value = Value;
    type Error = DecodeError;

    fn decode(&mut self, raw: &[u8]) -> Result<Value, DecodeError> {
        let mut lexer = Lexer::new(SliceSource::new(raw));
        let mut stack: Vec<Builder> = Vec::new();

        loop {
            let token = next(&mut lexer)?.ok_or_else(|| DecodeError::new("unexpected end of value"))?;
            let completed = match token.kind {
                TokenKind::BeginArray => {
                    stack.push(Builder::Array(Vec::new()));
                    continue;
                }
                TokenKind::BeginObject => {
                    stack.push(Builder::Object(Map::new(), None));
                    continue;
                }
                TokenKind::Comma | TokenKind::Colon => continue,
                TokenKind::EndArray => match stack.pop() {
                    Some(Builder::Array(arr)) => Value::Array(arr),
                    _ => return Err(DecodeError::new("mismatched ']'")),
                },
                TokenKind::EndObject => match stack.pop() {
                    Some(Builder::Object(map, None)) => Value::Object(map),
                    _ => return Err(DecodeError::new("mismatched '}'")),
                },
                TokenKind::Scalar { kind, bytes } => {
                    // A string directly under an object with no key pending
                    // is that object's next key.
                    if kind == ScalarKind::String {
                        if let Some(Builder::Object(_, key @ None)) = stack.last_mut() {
                            *key = Some(unescape(&bytes).map_err(DecodeError::new)?);
                            continue;
                        }
                    }
                    decode_scalar(kind, &bytes)?
                }
            };

            match stack.last_mut() {
                None => {
                    if next(&mut lexer)?.is_some() {
                        return Err(DecodeError::new("trailing data after value"));
                    }
                    return Ok(completed);
                }
                Some(Builder::Array(arr)) => arr.push(completed),
                Some(Builder::Object(map, key)) => {
                    let Some(key) = key.take() else {
                        return Err(DecodeError::new("object value without a key"));
                    };
                    map.insert(key, completed);
                }
            }
        }
    }
}

fn next<S: crate::source::ByteSource>(lexer: &mut Lexer<S>) -> Result<Option<Token>, DecodeError> {
    lexer
        .next_token()
        .map_err(|e| DecodeError::new(e.to_string()))
}

fn decode_scalar(kind: ScalarKind, bytes: &[u8]) -> Result<Value, DecodeError> {
    match kind {
        ScalarKind::Null => Ok(Value::Null),
        ScalarKind::True => Ok(Value::Boolean(true)),
        ScalarKind::False => Ok(Value::Boolean(false)),
        ScalarKind::String => Ok(Value::String(unescape(bytes).map_err(DecodeError::new)?)),
        ScalarKind::Number => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| DecodeError::new("number is not valid utf-8"))?;
            let num = text
                .parse::<f64>()
                .map_err(|e| DecodeError::new(format!("invalid number {text:?}: {e}")))?;
            Ok(Value::Number(num))
        }
    }
}
