//! Decoding JSON string lexemes into Rust strings.
//!
//! The lexer hands strings through verbatim, quotes and escapes included;
//! this module performs the actual unescaping when a string is materialized
//! (object keys and the default leaf decoder). `\uXXXX` escapes are decoded
//! with a four-digit accumulation buffer, pairing UTF-16 surrogates into a
//! single scalar value.

use std::str;

/// Buffer accumulating the four hexadecimal digits of a `\uXXXX` escape.
#[derive(Debug)]
pub(crate) struct HexEscapeBuffer {
    buffer: [u8; 4],
    len: u8,
}

impl HexEscapeBuffer {
    pub(crate) fn new() -> Self {
        Self {
            buffer: [0; 4],
            len: 0,
        }
    }

    /// Feeds one ASCII hex digit.
    ///
    /// Returns `Ok(None)` while fewer than four digits have been seen, and
    /// `Ok(Some(unit))` with the decoded UTF-16 code unit once the fourth
    /// digit arrives (resetting the buffer). Non-hex input is an error.
    pub(crate) fn feed(&mut self, b: u8) -> Result<Option<u16>, String> {
        if !b.is_ascii_hexdigit() {
            return Err(format!(
                "invalid unicode escape digit '{}'",
                b.escape_ascii()
            ));
        }
        self.buffer[self.len as usize] = b;
        self.len += 1;

        if self.len < 4 {
            return Ok(None);
        }
        self.len = 0;
        let hex = str::from_utf8(&self.buffer).map_err(|e| e.to_string())?;
        let unit = u16::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
        Ok(Some(unit))
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Reads the four hex digits of a `\uXXXX` escape starting at `bytes[*i]`.
fn read_hex_unit(bytes: &[u8], i: &mut usize) -> Result<u16, String> {
    let mut hex = HexEscapeBuffer::new();
    for _ in 0..4 {
        let b = *bytes
            .get(*i)
            .ok_or_else(|| "truncated unicode escape".to_string())?;
        *i += 1;
        if let Some(unit) = hex.feed(b)? {
            return Ok(unit);
        }
    }
    Err("truncated unicode escape".to_string())
}

/// Decodes a raw string lexeme (surrounding quotes included) into a `String`.
///
/// The input is expected to be a lexically valid JSON string as produced by
/// the lexer; this function still validates UTF-8 and surrogate pairing,
/// which the lexer does not.
pub(crate) fn unescape(raw: &[u8]) -> Result<String, String> {
    if raw.len() < 2 || raw[0] != b'"' || raw[raw.len() - 1] != b'"' {
        return Err("string lexeme is not quoted".to_string());
    }
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut i = 0;

    while i < inner.len() {
        if inner[i] != b'\\' {
            // Copy the plain run up to the next escape in one validation.
            let end = inner[i..]
                .iter()
                .position(|&b| b == b'\\')
                .map_or(inner.len(), |p| i + p);
            let run = str::from_utf8(&inner[i..end])
                .map_err(|_| "invalid utf-8 in string".to_string())?;
            out.push_str(run);
            i = end;
            continue;
        }

        i += 1;
        let esc = *inner
            .get(i)
            .ok_or_else(|| "truncated escape sequence".to_string())?;
        i += 1;
        match esc {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let unit = read_hex_unit(inner, &mut i)?;
                if is_low_surrogate(unit) {
                    return Err(format!("unpaired low surrogate \\u{unit:04X}"));
                }
                if is_high_surrogate(unit) {
                    if inner.get(i) != Some(&b'\\') || inner.get(i + 1) != Some(&b'u') {
                        return Err(format!("unpaired high surrogate \\u{unit:04X}"));
                    }
                    i += 2;
                    let low = read_hex_unit(inner, &mut i)?;
                    if !is_low_surrogate(low) {
                        return Err(format!(
                            "invalid surrogate pair \\u{unit:04X}\\u{low:04X}"
                        ));
                    }
                    let code =
                        0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    let ch = char::from_u32(code)
                        .ok_or_else(|| format!("invalid unicode scalar value {code:#X}"))?;
                    out.push(ch);
                } else {
                    let ch = char::from_u32(u32::from(unit))
                        .ok_or_else(|| format!("invalid unicode scalar value {unit:#X}"))?;
                    out.push(ch);
                }
            }
            other => {
                return Err(format!("invalid escape character '{}'", other.escape_ascii()));
            }
        }
    }

    Ok(out)
}
