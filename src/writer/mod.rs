//! Output side of the interpreter: the sink trait used by WRITE, DPRINT and
//! BREAK, and a stream-backed implementation.

use std::io::{self, Write};

pub trait OutputWriter {
    fn write_int(&mut self, value: i64) -> io::Result<()>;
    fn write_bool(&mut self, value: bool) -> io::Result<()>;
    fn write_string(&mut self, value: &str) -> io::Result<()>;
}

/// Writes the textual rendering of values into any `Write`.
pub struct StreamWriter<W: Write> {
    inner: W,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> OutputWriter for StreamWriter<W> {
    fn write_int(&mut self, value: i64) -> io::Result<()> {
        write!(self.inner, "{value}")?;
        self.inner.flush()
    }

    fn write_bool(&mut self, value: bool) -> io::Result<()> {
        let text = if value { "true" } else { "false" };
        self.inner.write_all(text.as_bytes())?;
        self.inner.flush()
    }

    fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.inner.write_all(value.as_bytes())?;
        self.inner.flush()
    }
}

/// Replaces every `\ddd` (exactly three decimal digits) with the character
/// of that ordinal. Anything else is copied through untouched.
pub fn decode_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let digits: String = chars.clone().take(3).collect();
        let decoded = (digits.len() == 3 && digits.chars().all(|d| d.is_ascii_digit()))
            .then(|| digits.parse::<u32>().ok().and_then(char::from_u32))
            .flatten();

        match decoded {
            Some(ch) => {
                out.push(ch);
                for _ in 0..3 {
                    chars.next();
                }
            }
            None => out.push(c),
        }
    }

    out
}
