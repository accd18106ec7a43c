//! Input side of the interpreter, consumed by READ.

use std::io::BufRead;

/// Each call consumes one unit of input. `None` means the input is
/// exhausted or could not be interpreted as the requested type.
pub trait InputReader {
    fn read_int(&mut self) -> Option<i64>;
    fn read_bool(&mut self) -> Option<bool>;
    fn read_string(&mut self) -> Option<String>;
}

/// Line-oriented reader: one line per request.
pub struct LineReader<R: BufRead> {
    inner: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.inner.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

impl<R: BufRead> InputReader for LineReader<R> {
    fn read_int(&mut self) -> Option<i64> {
        self.next_line()?.trim().parse().ok()
    }

    fn read_bool(&mut self) -> Option<bool> {
        let line = self.next_line()?;
        Some(line.trim().eq_ignore_ascii_case("true"))
    }

    fn read_string(&mut self) -> Option<String> {
        self.next_line()
    }
}
