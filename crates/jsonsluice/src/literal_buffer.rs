use crate::lexer::ScalarKind;

/// What happened after feeding one more byte into the literal matcher?
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched *and* we consumed the last byte of the literal.
    Done(ScalarKind),
    /// Byte did **not** match the expected byte.
    Reject,
}

/// Matches the remainder of `true`, `false`, or `null` after the first byte.
///
/// `None` means no literal is in flight; `Some` carries the remaining bytes
/// and the kind of scalar the literal produces on completion.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteral(Option<(&'static [u8], ScalarKind)>);

impl ExpectedLiteral {
    /// Start matching after the *first* byte (`n`, `t`, or `f`).
    pub(crate) fn new(first: u8) -> Self {
        match first {
            b'n' => ExpectedLiteral(Some((b"ull", ScalarKind::Null))),
            b't' => ExpectedLiteral(Some((b"rue", ScalarKind::True))),
            b'f' => ExpectedLiteral(Some((b"alse", ScalarKind::False))),
            _ => ExpectedLiteral(None),
        }
    }

    /// Give the matcher the next input byte and learn what to do next.
    pub(crate) fn step(&mut self, b: u8) -> Step {
        let Some((bytes, kind)) = self.0.take() else {
            return Step::Reject;
        };

        match bytes.split_first() {
            Some((expected, rest)) if *expected == b => {
                if rest.is_empty() {
                    Step::Done(kind)
                } else {
                    self.0 = Some((rest, kind));
                    Step::NeedMore
                }
            }
            _ => {
                self.0 = Some((bytes, kind));
                Step::Reject
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExpectedLiteral, Step};
    use crate::lexer::ScalarKind;

    #[test]
    fn matches_true() {
        let mut lit = ExpectedLiteral::new(b't');
        assert!(matches!(lit.step(b'r'), Step::NeedMore));
        assert!(matches!(lit.step(b'u'), Step::NeedMore));
        assert!(matches!(lit.step(b'e'), Step::Done(ScalarKind::True)));
    }

    #[test]
    fn rejects_deviation() {
        let mut lit = ExpectedLiteral::new(b't');
        assert!(matches!(lit.step(b'r'), Step::NeedMore));
        assert!(matches!(lit.step(b'x'), Step::Reject));
    }

    #[test]
    fn rejects_after_reject() {
        let mut lit = ExpectedLiteral::new(b'n');
        assert!(matches!(lit.step(b'q'), Step::Reject));
        // State is restored, so the expected byte still matches.
        assert!(matches!(lit.step(b'u'), Step::NeedMore));
    }
}
