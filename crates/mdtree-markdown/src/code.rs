use std::collections::TryReserveError;

use thiserror::Error;

/// Capacity of a code buffer when the block opens.
pub const INITIAL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum CodeBufferError {
    #[error("code block exceeds {limit} bytes (already holding {len})")]
    Overflow { len: usize, limit: usize },
    #[error("code block buffer allocation failed")]
    Alloc(#[from] TryReserveError),
}

/// Growable buffer that gathers the text of one code block.
///
/// Growth doubles the capacity. A failed append leaves the buffer exactly as it was, so
/// the caller can keep the content gathered so far.
#[derive(Debug)]
pub struct CodeBuffer {
    text: String,
    max_len: usize,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::with_max_len(u32::MAX as usize)
    }

    /// A buffer that refuses to grow past `max_len` bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            text: String::with_capacity(INITIAL_CAPACITY.min(max_len)),
            max_len,
        }
    }

    pub fn append(&mut self, chunk: &str) -> Result<(), CodeBufferError> {
        let len = self.text.len();
        let needed = len
            .checked_add(chunk.len())
            .filter(|needed| *needed <= self.max_len)
            .ok_or(CodeBufferError::Overflow {
                len,
                limit: self.max_len,
            })?;

        if needed > self.text.capacity() {
            let mut target = self.text.capacity().max(INITIAL_CAPACITY);
            while target < needed {
                target = target.saturating_mul(2);
            }
            self.text.try_reserve_exact(target - len)?;
        }
        self.text.push_str(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The gathered text with exactly one trailing newline removed.
    pub fn finish(mut self) -> String {
        if self.text.ends_with('\n') {
            self.text.pop();
        }
        self.text
    }
}

impl Default for CodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_strips_a_single_newline() {
        let mut buf = CodeBuffer::new();
        buf.append("let x = 1;\n").unwrap();
        buf.append("\n").unwrap();
        assert_eq!(buf.finish(), "let x = 1;\n");
    }

    #[test]
    fn finish_without_newline_is_verbatim() {
        let mut buf = CodeBuffer::new();
        buf.append("a").unwrap();
        assert_eq!(buf.finish(), "a");
        assert_eq!(CodeBuffer::new().finish(), "");
    }

    #[test]
    fn grows_by_doubling() {
        let mut buf = CodeBuffer::new();
        let chunk = "x".repeat(INITIAL_CAPACITY + 1);
        buf.append(&chunk).unwrap();
        assert!(buf.text.capacity() >= INITIAL_CAPACITY * 2);
        assert_eq!(buf.len(), INITIAL_CAPACITY + 1);
    }

    #[test]
    fn overflow_keeps_existing_content() {
        let mut buf = CodeBuffer::with_max_len(8);
        buf.append("12345").unwrap();
        let err = buf.append("6789").unwrap_err();
        assert!(matches!(err, CodeBufferError::Overflow { len: 5, limit: 8 }));
        assert_eq!(buf.as_str(), "12345");

        buf.append("678").unwrap();
        assert_eq!(buf.finish(), "12345678");
    }

    #[test]
    fn many_small_appends_keep_order() {
        let mut buf = CodeBuffer::new();
        for i in 0..200 {
            buf.append(&format!("{i}\n")).unwrap();
        }
        let text = buf.finish();
        assert!(text.starts_with("0\n1\n2\n"));
        assert!(text.ends_with("198\n199"));
    }
}
