//! RFC 6901 JSON Pointers.
//!
//! A pointer is parsed once at construction into a list of reference tokens.
//! The empty string designates the document root. Each non-root pointer must
//! begin with `/`; segments are split on `/` and unescaped by replacing `~1`
//! with `/` and then `~0` with `~`, in that order.

use std::{fmt, str::FromStr};

use crate::error::Error;

/// One decoded reference token of a pointer.
///
/// `as_index` is precomputed at parse time: `Some(i)` iff the token text is
/// the canonical shortest-decimal rendering of `i` (no sign, no leading
/// zeros). A token such as `"0"` therefore matches either the object key
/// `"0"` or array index 0 at its level, while `"01"` can only ever match an
/// object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReferenceToken {
    text: String,
    as_index: Option<usize>,
}

impl ReferenceToken {
    fn new(text: String) -> Self {
        let as_index = canonical_index(&text);
        Self { text, as_index }
    }

    /// Does this token select the object key `key`? Compared as exact
    /// strings; numeric-looking tokens get no special treatment here.
    pub(crate) fn matches_key(&self, key: &str) -> bool {
        self.text == key
    }

    /// Does this token select array index `index`?
    pub(crate) fn matches_index(&self, index: usize) -> bool {
        self.as_index == Some(index)
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }
}

/// `Some(i)` iff `text` is the shortest decimal form of `i`.
fn canonical_index(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if text.len() > 1 && text.starts_with('0') {
        return None;
    }
    text.parse().ok()
}

/// A parsed RFC 6901 JSON Pointer.
///
/// # Examples
///
/// ```
/// use jsonsluice::JsonPointer;
///
/// let root: JsonPointer = "".parse().unwrap();
/// assert!(root.is_empty());
///
/// let ptr: JsonPointer = "/a~1b/~0/0".parse().unwrap();
/// assert_eq!(ptr.len(), 3);
/// assert_eq!(ptr.to_string(), "/a~1b/~0/0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPointer {
    tokens: Vec<ReferenceToken>,
}

impl JsonPointer {
    /// The root pointer (empty token list).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a pointer string.
    ///
    /// # Errors
    ///
    /// Fails with a pointer syntax error if `s` is non-empty and does not
    /// begin with `/`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(Error::pointer_syntax(format!(
                "pointer {s:?} does not start with '/'"
            )));
        };
        let tokens = rest
            .split('/')
            .map(|segment| ReferenceToken::new(segment.replace("~1", "/").replace("~0", "~")))
            .collect();
        Ok(Self { tokens })
    }

    /// Number of reference tokens; the root pointer has zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub(crate) fn token(&self, i: usize) -> &ReferenceToken {
        &self.tokens[i]
    }
}

impl FromStr for JsonPointer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str("/")?;
            f.write_str(&token.text.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{canonical_index, JsonPointer};
    use crate::error::ErrorKind;

    #[test]
    fn empty_pointer_is_root() {
        let ptr = JsonPointer::parse("").unwrap();
        assert!(ptr.is_empty());
        assert_eq!(ptr, JsonPointer::root());
    }

    #[test]
    fn slash_is_single_empty_token() {
        let ptr = JsonPointer::parse("/").unwrap();
        assert_eq!(ptr.len(), 1);
        assert!(ptr.token(0).matches_key(""));
    }

    #[test]
    fn escapes_unescape_in_order() {
        let ptr = JsonPointer::parse("/a~1b/m~0n/~01").unwrap();
        assert_eq!(ptr.token(0).text(), "a/b");
        assert_eq!(ptr.token(1).text(), "m~n");
        // `~01` holds no `~1`; the later `~0` pass turns it into `~1`.
        assert_eq!(ptr.token(2).text(), "~1");
    }

    #[test]
    fn missing_leading_slash_is_syntax_error() {
        let err = JsonPointer::parse("a/b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PointerSyntax);
    }

    #[test]
    fn parsing_is_idempotent() {
        for s in ["", "/", "/a/0/b~0~1", "//x", "/0/00/1e3"] {
            assert_eq!(
                JsonPointer::parse(s).unwrap(),
                JsonPointer::parse(s).unwrap()
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for s in ["", "/", "/a~1b/~0/0", "//"] {
            let ptr = JsonPointer::parse(s).unwrap();
            assert_eq!(ptr.to_string(), s);
            assert_eq!(JsonPointer::parse(&ptr.to_string()).unwrap(), ptr);
        }
    }

    #[test]
    fn canonical_indices() {
        assert_eq!(canonical_index("0"), Some(0));
        assert_eq!(canonical_index("17"), Some(17));
        assert_eq!(canonical_index("01"), None);
        assert_eq!(canonical_index("-1"), None);
        assert_eq!(canonical_index(""), None);
        assert_eq!(canonical_index("1e3"), None);
    }

    #[test]
    fn numeric_tokens_match_both_ways() {
        let ptr = JsonPointer::parse("/0").unwrap();
        assert!(ptr.token(0).matches_key("0"));
        assert!(ptr.token(0).matches_index(0));
        assert!(!ptr.token(0).matches_index(1));
    }
}
