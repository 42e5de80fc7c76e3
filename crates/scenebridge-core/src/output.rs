//! Line-buffered, prefixed output.
//!
//! Several workers writing to one terminal interleave partial writes. The
//! [`PrefixedLineWriter`] only ever forwards complete lines, each tagged
//! with the worker's prefix.

use std::io::{self, Write};

/// Buffers partial lines and writes each complete one as `"{prefix} {line}\n"`.
pub struct PrefixedLineWriter<W: Write> {
    prefix: String,
    inner: W,
    buffer: String,
}

impl<W: Write> PrefixedLineWriter<W> {
    pub fn new(prefix: impl Into<String>, inner: W) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
            buffer: String::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Text written since the last newline.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Flush any pending partial line and return the inner writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        let PrefixedLineWriter { inner, .. } = self;
        Ok(inner)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.inner, "{} {}", self.prefix, line)
    }
}

impl<W: Write> Write for PrefixedLineWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let mut parts = text.split('\n');

        // `split` always yields at least one part
        if let Some(head) = parts.next() {
            self.buffer.push_str(head);
        }

        let tail: Vec<&str> = parts.collect();
        let Some((last, complete)) = tail.split_last() else {
            return Ok(buf.len());
        };

        let first = std::mem::take(&mut self.buffer);
        self.write_line(&first)?;
        for line in complete {
            self.write_line(line)?;
        }
        self.buffer.push_str(last);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_line(&pending)?;
        }
        self.inner.flush()
    }
}
