//! The incremental JSON tokenizer.
//!
//! The lexer pulls bytes from a [`ByteSource`] and produces one token at a
//! time: structural punctuation, or a whole scalar lexeme delivered as the
//! exact source bytes (strings keep their quotes and undecoded escapes).
//! Chunk boundaries may fall anywhere, including inside escapes; the lexer
//! refills its window mid-lexeme and stitches the bytes back together.
//!
//! The driver can *arm a capture* before requesting a token: from the first
//! byte of that token onward, every consumed byte is recorded verbatim
//! (whitespace between nested tokens included) until the capture is taken or
//! discarded. This is how the raw source substring of a child value is
//! isolated without the parser ever seeking.

use std::mem;

use crate::{
    error::Error,
    literal_buffer::{ExpectedLiteral, Step},
    source::ByteSource,
};

/// Which scalar a `Scalar` token carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    String,
    Number,
    True,
    False,
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Comma,
    Colon,
    /// A whole scalar lexeme, exactly as it appeared in the source.
    Scalar { kind: ScalarKind, bytes: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Absolute byte offset of the token's first byte.
    pub start: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Off,
    /// Recording begins at the first byte of the next token.
    Armed,
    Recording,
}

#[derive(Debug)]
pub(crate) struct Lexer<S> {
    source: S,
    /// Current chunk window; refilled from the source when exhausted.
    chunk: Vec<u8>,
    pos: usize,
    /// Absolute offset of the next unconsumed byte.
    offset: u64,
    at_end: bool,
    /// Reused buffer for the scalar lexeme in progress.
    lexeme: Vec<u8>,
    capture_state: CaptureState,
    capture: Vec<u8>,
}

impl<S: ByteSource> Lexer<S> {
    pub(crate) fn new(source: S) -> Self {
        Self {
            source,
            chunk: Vec::new(),
            pos: 0,
            offset: 0,
            at_end: false,
            lexeme: Vec::new(),
            capture_state: CaptureState::Off,
            capture: Vec::new(),
        }
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Begin recording raw bytes at the start of the next token.
    pub(crate) fn arm_capture(&mut self) {
        if self.capture_state == CaptureState::Off {
            self.capture_state = CaptureState::Armed;
        }
    }

    /// Stop recording and return everything captured so far.
    pub(crate) fn take_capture(&mut self) -> Vec<u8> {
        self.capture_state = CaptureState::Off;
        mem::take(&mut self.capture)
    }

    /// Stop recording and drop anything captured.
    pub(crate) fn discard_capture(&mut self) {
        self.capture_state = CaptureState::Off;
        self.capture.clear();
    }

    /// Look at the next byte without consuming it, refilling the chunk
    /// window from the source as needed. `Ok(None)` is end of stream.
    fn peek(&mut self) -> Result<Option<u8>, Error> {
        loop {
            if let Some(&b) = self.chunk.get(self.pos) {
                return Ok(Some(b));
            }
            if self.at_end {
                return Ok(None);
            }
            match self.source.next_chunk() {
                Ok(Some(bytes)) => {
                    self.chunk.clear();
                    self.chunk.extend_from_slice(bytes);
                    self.pos = 0;
                }
                Ok(None) => self.at_end = true,
                Err(e) => return Err(Error::io(self.offset, &e)),
            }
        }
    }

    /// Consume the next byte. Callers must have peeked `Some` first.
    fn bump(&mut self) -> u8 {
        let b = self.chunk[self.pos];
        self.pos += 1;
        self.offset += 1;
        if self.capture_state == CaptureState::Recording {
            self.capture.push(b);
        }
        b
    }

    /// Consume the next byte into the scalar lexeme being built.
    fn bump_into_lexeme(&mut self) {
        let b = self.bump();
        self.lexeme.push(b);
    }

    /// Consume a run of bytes satisfying `pred`, appending them to the
    /// lexeme (and capture) a slice at a time rather than byte by byte.
    fn copy_run(&mut self, pred: fn(u8) -> bool) -> Result<(), Error> {
        loop {
            let Some(b) = self.peek()? else { return Ok(()) };
            if !pred(b) {
                return Ok(());
            }
            let run = self.chunk[self.pos..]
                .iter()
                .take_while(|&&b| pred(b))
                .count();
            let slice = &self.chunk[self.pos..self.pos + run];
            self.lexeme.extend_from_slice(slice);
            if self.capture_state == CaptureState::Recording {
                self.capture.extend_from_slice(slice);
            }
            self.pos += run;
            self.offset += run as u64;
        }
    }

    fn scalar(&mut self, kind: ScalarKind, start: u64) -> Token {
        Token {
            kind: TokenKind::Scalar {
                kind,
                bytes: mem::take(&mut self.lexeme),
            },
            start,
        }
    }

    /// Produce the next token, or `Ok(None)` at a clean end of stream.
    pub(crate) fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let b = loop {
            match self.peek()? {
                None => return Ok(None),
                Some(b' ' | b'\t' | b'\n' | b'\r') => {
                    self.bump();
                }
                Some(b) => break b,
            }
        };

        let start = self.offset;
        if self.capture_state == CaptureState::Armed {
            self.capture_state = CaptureState::Recording;
        }

        let punct = |kind| {
            Some(Token { kind, start })
        };
        match b {
            b'{' => {
                self.bump();
                Ok(punct(TokenKind::BeginObject))
            }
            b'}' => {
                self.bump();
                Ok(punct(TokenKind::EndObject))
            }
            b'[' => {
                self.bump();
                Ok(punct(TokenKind::BeginArray))
            }
            b']' => {
                self.bump();
                Ok(punct(TokenKind::EndArray))
            }
            b',' => {
                self.bump();
                Ok(punct(TokenKind::Comma))
            }
            b':' => {
                self.bump();
                Ok(punct(TokenKind::Colon))
            }
            b'"' => self.lex_string(start),
            b'-' | b'0'..=b'9' => self.lex_number(start),
            b't' | b'f' | b'n' => self.lex_keyword(start),
            other => Err(Error::lexical(
                start,
                format!("unexpected byte '{}'", other.escape_ascii()),
            )),
        }
    }

    fn lex_string(&mut self, start: u64) -> Result<Option<Token>, Error> {
        self.lexeme.clear();
        self.bump_into_lexeme(); // opening quote

        loop {
            let Some(b) = self.peek()? else {
                return Err(Error::lexical(start, "unterminated string"));
            };
            match b {
                b'"' => {
                    self.bump_into_lexeme();
                    return Ok(Some(self.scalar(ScalarKind::String, start)));
                }
                b'\\' => {
                    self.bump_into_lexeme();
                    self.lex_escape(start)?;
                }
                0x00..=0x1F => {
                    return Err(Error::lexical(
                        self.offset,
                        format!("control character '{}' in string", b.escape_ascii()),
                    ));
                }
                _ => {
                    self.copy_run(|b| b != b'"' && b != b'\\' && b >= 0x20)?;
                }
            }
        }
    }

    /// The backslash has been consumed; read the rest of the escape. Escapes
    /// are only validated for shape here, never decoded.
    fn lex_escape(&mut self, start: u64) -> Result<(), Error> {
        let Some(e) = self.peek()? else {
            return Err(Error::lexical(start, "unterminated string"));
        };
        match e {
            b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {
                self.bump_into_lexeme();
                Ok(())
            }
            b'u' => {
                self.bump_into_lexeme();
                for _ in 0..4 {
                    let Some(h) = self.peek()? else {
                        return Err(Error::lexical(start, "unterminated string"));
                    };
                    if !h.is_ascii_hexdigit() {
                        return Err(Error::lexical(
                            self.offset,
                            format!("invalid unicode escape digit '{}'", h.escape_ascii()),
                        ));
                    }
                    self.bump_into_lexeme();
                }
                Ok(())
            }
            other => Err(Error::lexical(
                self.offset,
                format!("invalid escape character '{}'", other.escape_ascii()),
            )),
        }
    }

    fn lex_number(&mut self, start: u64) -> Result<Option<Token>, Error> {
        self.lexeme.clear();
        if self.peek()? == Some(b'-') {
            self.bump_into_lexeme();
        }

        // Integer part: `0`, or a nonzero digit followed by digits.
        match self.peek()? {
            Some(b'0') => {
                self.bump_into_lexeme();
            }
            Some(b'1'..=b'9') => {
                self.bump_into_lexeme();
                self.copy_run(|b| b.is_ascii_digit())?;
            }
            Some(other) => {
                return Err(Error::lexical(
                    self.offset,
                    format!("expected digit, found '{}'", other.escape_ascii()),
                ));
            }
            None => return Err(Error::lexical(start, "unterminated number")),
        }

        if self.peek()? == Some(b'.') {
            self.bump_into_lexeme();
            self.require_digits(start)?;
        }

        if matches!(self.peek()?, Some(b'e' | b'E')) {
            self.bump_into_lexeme();
            if matches!(self.peek()?, Some(b'+' | b'-')) {
                self.bump_into_lexeme();
            }
            self.require_digits(start)?;
        }

        Ok(Some(self.scalar(ScalarKind::Number, start)))
    }

    /// At least one digit, then as many as follow.
    fn require_digits(&mut self, start: u64) -> Result<(), Error> {
        match self.peek()? {
            Some(b) if b.is_ascii_digit() => {
                self.bump_into_lexeme();
                self.copy_run(|b| b.is_ascii_digit())
            }
            Some(other) => Err(Error::lexical(
                self.offset,
                format!("expected digit, found '{}'", other.escape_ascii()),
            )),
            None => Err(Error::lexical(start, "unterminated number")),
        }
    }

    fn lex_keyword(&mut self, start: u64) -> Result<Option<Token>, Error> {
        self.lexeme.clear();
        let first = self.bump();
        self.lexeme.push(first);
        let mut expected = ExpectedLiteral::new(first);

        loop {
            let Some(b) = self.peek()? else {
                return Err(self.bad_keyword(start));
            };
            match expected.step(b) {
                Step::NeedMore => {
                    self.bump_into_lexeme();
                }
                Step::Done(kind) => {
                    self.bump_into_lexeme();
                    return Ok(Some(self.scalar(kind, start)));
                }
                Step::Reject => return Err(self.bad_keyword(start)),
            }
        }
    }

    fn bad_keyword(&self, start: u64) -> Error {
        Error::lexical(
            start,
            format!(
                "invalid literal starting with \"{}\"",
                self.lexeme.escape_ascii()
            ),
        )
    }
}
