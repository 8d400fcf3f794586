//! The pointer-directed item stream.
//!
//! [`ItemStream`] drives the lexer with a push-down state machine, tracking
//! the structural path from the document root until it enters the container
//! designated by the pointer. Inside the target it isolates the raw source
//! bytes of each direct child, hands them to the leaf decoder, and yields
//! one `(key-or-index, value)` pair per `advance` call. Everything outside
//! the target is consumed for structural validation only; once the target's
//! closing bracket is seen, the remainder of the stream is not read.
//!
//! # Examples
//!
//! ```
//! use jsonsluice::{ItemKey, ItemStream, Value};
//!
//! let doc = br#"{"fruits":{"apple":"red","pear":"yellow"}}"#;
//! let items = ItemStream::from_slice(doc, "/fruits").unwrap();
//! let pairs: Vec<_> = items.map(Result::unwrap).collect();
//! assert_eq!(
//!     pairs,
//!     vec![
//!         (ItemKey::key("apple"), Value::String("red".into())),
//!         (ItemKey::key("pear"), Value::String("yellow".into())),
//!     ]
//! );
//! ```

use std::{fs::File, io::Read, path::Path};

use crate::{
    decoder::{JsonDecoder, ValueDecoder},
    error::Error,
    lexer::{Lexer, ScalarKind, Token, TokenKind},
    pointer::JsonPointer,
    source::{ByteSource, ReadSource, SliceSource},
    strings::unescape,
};

/// The key of a yielded item: the object key for object targets, the
/// zero-based index for array targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKey {
    Key(String),
    Index(usize),
}

impl ItemKey {
    /// Convenience constructor for an object key.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Returns the object key, if this is one.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }

    /// Returns the array index, if this is one.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Key(_) => None,
            Self::Index(i) => Some(*i),
        }
    }
}

impl From<usize> for ItemKey {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for ItemKey {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    BeforePropertyName { first: bool },
    AfterPropertyName,
    BeforePropertyValue,
    BeforeArrayValue { first: bool },
    AfterPropertyValue,
    AfterArrayValue,
    End,
}

/// One entry per open container.
#[derive(Debug)]
enum Frame {
    Array {
        /// Slot for the next element.
        next_index: usize,
        in_pointer: bool,
    },
    Object {
        /// Key waiting for its value.
        pending_key: Option<String>,
        in_pointer: bool,
    },
}

impl Frame {
    /// Whether this container's own path equals the pointer prefix of the
    /// same length.
    fn in_pointer(&self) -> bool {
        match self {
            Frame::Array { in_pointer, .. } | Frame::Object { in_pointer, .. } => *in_pointer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The target container has not been entered yet.
    Seeking,
    /// The driver is inside the target, yielding its direct children.
    Inside,
    /// The target's closing bracket has been consumed.
    Done,
}

/// Key and start offset of a direct child whose value is still being
/// accumulated.
#[derive(Debug)]
struct PendingItem {
    key: ItemKey,
    start: u64,
}

/// A lazy, single-shot stream of the direct children of the container
/// designated by a JSON Pointer.
///
/// Construct with [`from_slice`](ItemStream::from_slice),
/// [`from_reader`](ItemStream::from_reader), or
/// [`from_path`](ItemStream::from_path), then consume via [`Iterator`] or
/// [`advance`](ItemStream::advance). After any error the stream is fused and
/// yields nothing further.
#[derive(Debug)]
pub struct ItemStream<S: ByteSource, D: JsonDecoder = ValueDecoder> {
    lexer: Lexer<S>,
    decoder: D,
    pointer: JsonPointer,
    frames: Vec<Frame>,
    state: ParseState,
    phase: Phase,
    pending: Option<PendingItem>,
    done: bool,
}

impl<'a> ItemStream<SliceSource<'a>> {
    /// Streams items out of in-memory bytes.
    ///
    /// # Errors
    ///
    /// Fails if `pointer` is not valid RFC 6901.
    pub fn from_slice(bytes: &'a [u8], pointer: &str) -> Result<Self, Error> {
        Self::with_decoder(SliceSource::new(bytes), pointer, ValueDecoder)
    }
}

impl<R: Read> ItemStream<ReadSource<R>> {
    /// Streams items out of an already-open reader.
    ///
    /// # Errors
    ///
    /// Fails if `pointer` is not valid RFC 6901.
    pub fn from_reader(reader: R, pointer: &str) -> Result<Self, Error> {
        Self::with_decoder(ReadSource::new(reader), pointer, ValueDecoder)
    }
}

impl ItemStream<ReadSource<File>> {
    /// Streams items out of a file. The file is closed when the stream is
    /// dropped, however iteration ends.
    ///
    /// # Errors
    ///
    /// Fails if `pointer` is not valid RFC 6901 or the file cannot be
    /// opened.
    pub fn from_path(path: impl AsRef<Path>, pointer: &str) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::io(0, &e))?;
        Self::from_reader(file, pointer)
    }
}

impl<S: ByteSource, D: JsonDecoder> ItemStream<S, D> {
    /// Streams items out of an arbitrary byte source with a caller-supplied
    /// leaf decoder.
    ///
    /// # Errors
    ///
    /// Fails if `pointer` is not valid RFC 6901.
    pub fn with_decoder(source: S, pointer: &str, decoder: D) -> Result<Self, Error> {
        Ok(Self {
            lexer: Lexer::new(source),
            decoder,
            pointer: JsonPointer::parse(pointer)?,
            frames: Vec::with_capacity(16),
            state: ParseState::Start,
            phase: Phase::Seeking,
            pending: None,
            done: false,
        })
    }

    /// The parsed pointer this stream is directed at.
    #[must_use]
    pub fn pointer(&self) -> &JsonPointer {
        &self.pointer
    }

    /// Drive the parser until the next `(key-or-index, value)` pair is
    /// ready, the target is exhausted (`None`), or an error is detected.
    ///
    /// Exactly enough bytes are consumed from the source to produce the
    /// returned outcome; all parser state is retained between calls.
    pub fn advance(&mut self) -> Option<Result<(ItemKey, D::Value), Error>> {
        if self.done {
            return None;
        }
        match self.advance_inner() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    fn advance_inner(&mut self) -> Result<Option<(ItemKey, D::Value)>, Error> {
        loop {
            if self.phase == Phase::Done {
                return Ok(None);
            }
            self.maybe_arm_capture();
            let Some(token) = self.lexer.next_token()? else {
                return self.at_end_of_stream();
            };
            if let Some(item) = self.step(token)? {
                return Ok(Some(item));
            }
        }
    }

    /// Number of frames on the stack when the target container is the
    /// innermost open container.
    fn target_frames(&self) -> usize {
        self.pointer.len() + 1
    }

    /// Arm the raw-byte capture when the next token starts a direct child of
    /// the target. Recording then runs until the child's value is complete.
    fn maybe_arm_capture(&mut self) {
        if self.phase == Phase::Inside
            && self.frames.len() == self.target_frames()
            && matches!(
                self.state,
                ParseState::BeforePropertyValue | ParseState::BeforeArrayValue { .. }
            )
        {
            self.lexer.arm_capture();
        }
    }

    fn at_end_of_stream(&mut self) -> Result<Option<(ItemKey, D::Value)>, Error> {
        let offset = self.lexer.offset();
        match self.state {
            // A whole document was consumed without the pointer matching.
            ParseState::End => Err(Error::pointer_not_found(offset)),
            _ => Err(Error::structural(offset, "unexpected end of input")),
        }
    }

    fn step(&mut self, token: Token) -> Result<Option<(ItemKey, D::Value)>, Error> {
        match self.state {
            ParseState::Start | ParseState::BeforePropertyValue => self.on_value(token),

            ParseState::BeforePropertyName { first } => match token.kind {
                TokenKind::Scalar {
                    kind: ScalarKind::String,
                    bytes,
                } => {
                    let key =
                        unescape(&bytes).map_err(|msg| Error::decode(token.start, msg))?;
                    match self.frames.last_mut() {
                        Some(Frame::Object { pending_key, .. }) => *pending_key = Some(key),
                        _ => {
                            return Err(Error::structural(
                                token.start,
                                "property name outside an object",
                            ));
                        }
                    }
                    self.state = ParseState::AfterPropertyName;
                    Ok(None)
                }
                TokenKind::EndObject if first => self.on_close(token),
                TokenKind::EndObject => Err(Error::structural(
                    token.start,
                    "trailing comma before '}'",
                )),
                _ => Err(Error::structural(
                    token.start,
                    "expected property name or '}'",
                )),
            },

            ParseState::AfterPropertyName => match token.kind {
                TokenKind::Colon => {
                    self.state = ParseState::BeforePropertyValue;
                    Ok(None)
                }
                _ => Err(Error::structural(
                    token.start,
                    "expected ':' after property name",
                )),
            },

            ParseState::BeforeArrayValue { first } => match token.kind {
                TokenKind::EndArray if first => {
                    // The capture armed for a first child saw the target's
                    // own closing bracket instead; an empty child array
                    // deeper down keeps its recording.
                    if self.phase == Phase::Inside && self.frames.len() == self.target_frames() {
                        self.lexer.discard_capture();
                    }
                    self.on_close(token)
                }
                TokenKind::EndArray => Err(Error::structural(
                    token.start,
                    "trailing comma before ']'",
                )),
                _ => self.on_value(token),
            },

            ParseState::AfterPropertyValue => match token.kind {
                TokenKind::Comma => {
                    if let Some(Frame::Object { pending_key, .. }) = self.frames.last_mut() {
                        *pending_key = None;
                    }
                    self.state = ParseState::BeforePropertyName { first: false };
                    Ok(None)
                }
                TokenKind::EndObject => self.on_close(token),
                _ => Err(Error::structural(token.start, "expected ',' or '}'")),
            },

            ParseState::AfterArrayValue => match token.kind {
                TokenKind::Comma => {
                    if let Some(Frame::Array { next_index, .. }) = self.frames.last_mut() {
                        *next_index += 1;
                    }
                    self.state = ParseState::BeforeArrayValue { first: false };
                    Ok(None)
                }
                TokenKind::EndArray => self.on_close(token),
                _ => Err(Error::structural(token.start, "expected ',' or ']'")),
            },

            ParseState::End => Err(Error::structural(
                token.start,
                "unexpected content after the root value",
            )),
        }
    }

    /// Handle a token in a position where a value must start.
    fn on_value(&mut self, token: Token) -> Result<Option<(ItemKey, D::Value)>, Error> {
        // Path length of the value about to start; its slot within the
        // parent is the parent frame's pending key or next index.
        let depth = self.frames.len();
        let in_pointer = match self.frames.last() {
            // The root path is a prefix of every pointer.
            None => true,
            Some(frame) => {
                frame.in_pointer()
                    && depth <= self.pointer.len()
                    && match frame {
                        Frame::Object { pending_key, .. } => pending_key
                            .as_deref()
                            .is_some_and(|k| self.pointer.token(depth - 1).matches_key(k)),
                        Frame::Array { next_index, .. } => {
                            self.pointer.token(depth - 1).matches_index(*next_index)
                        }
                    }
            }
        };
        let at_target_position = in_pointer && depth == self.pointer.len();
        let child_of_target = self.phase == Phase::Inside && depth == self.target_frames();

        match token.kind {
            TokenKind::BeginObject | TokenKind::BeginArray => {
                if child_of_target {
                    self.pending = Some(PendingItem {
                        key: self.child_key(token.start)?,
                        start: token.start,
                    });
                }
                let is_object = token.kind == TokenKind::BeginObject;
                self.frames.push(if is_object {
                    Frame::Object {
                        pending_key: None,
                        in_pointer,
                    }
                } else {
                    Frame::Array {
                        next_index: 0,
                        in_pointer,
                    }
                });
                self.state = if is_object {
                    ParseState::BeforePropertyName { first: true }
                } else {
                    ParseState::BeforeArrayValue { first: true }
                };
                if self.phase == Phase::Seeking && at_target_position {
                    self.phase = Phase::Inside;
                }
                Ok(None)
            }

            TokenKind::Scalar { .. } => {
                if self.phase == Phase::Seeking && at_target_position {
                    return Err(Error::pointer_not_iterable(token.start));
                }
                let item = if child_of_target {
                    let key = self.child_key(token.start)?;
                    let raw = self.lexer.take_capture();
                    Some((key, self.decode_child(&raw, token.start)?))
                } else {
                    None
                };
                self.after_value();
                Ok(item)
            }

            TokenKind::EndObject | TokenKind::EndArray | TokenKind::Comma | TokenKind::Colon => {
                Err(Error::structural(token.start, "expected a value"))
            }
        }
    }

    /// Handle a closing bracket. The parse states only route matching
    /// brackets here, so the frame kind is already known to agree.
    fn on_close(&mut self, token: Token) -> Result<Option<(ItemKey, D::Value)>, Error> {
        if self.frames.pop().is_none() {
            return Err(Error::structural(token.start, "unbalanced closing bracket"));
        }

        if self.phase == Phase::Inside && self.frames.len() == self.pointer.len() {
            // The target itself just closed; the rest of the stream is not
            // this stream's concern.
            self.phase = Phase::Done;
            self.after_value();
            return Ok(None);
        }

        let item = if self.phase == Phase::Inside && self.frames.len() == self.target_frames() {
            // A direct child container just completed.
            let Some(pending) = self.pending.take() else {
                return Err(Error::structural(
                    token.start,
                    "container closed without a pending item",
                ));
            };
            let raw = self.lexer.take_capture();
            Some((pending.key, self.decode_child(&raw, pending.start)?))
        } else {
            None
        };
        self.after_value();
        Ok(item)
    }

    /// Restore the parse state after a completed value, per the parent
    /// frame.
    fn after_value(&mut self) {
        self.state = match self.frames.last() {
            None => ParseState::End,
            Some(Frame::Array { .. }) => ParseState::AfterArrayValue,
            Some(Frame::Object { .. }) => ParseState::AfterPropertyValue,
        };
    }

    /// The key or index of the direct child currently starting, read from
    /// the target frame.
    fn child_key(&self, offset: u64) -> Result<ItemKey, Error> {
        match self.frames.last() {
            Some(Frame::Object { pending_key, .. }) => pending_key
                .clone()
                .map(ItemKey::Key)
                .ok_or_else(|| Error::structural(offset, "object value without a key")),
            Some(Frame::Array { next_index, .. }) => Ok(ItemKey::Index(*next_index)),
            None => Err(Error::structural(offset, "item outside any container")),
        }
    }

    fn decode_child(&mut self, raw: &[u8], start: u64) -> Result<D::Value, Error> {
        self.decoder
            .decode(raw)
            .map_err(|e| Error::decode(start, e.to_string()))
    }
}

impl<S: ByteSource, D: JsonDecoder> Iterator for ItemStream<S, D> {
    type Item = Result<(ItemKey, D::Value), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}
