//! Size-bounded output capture.

use std::collections::VecDeque;

/// Byte buffer that keeps only the newest `cap` bytes written to it.
///
/// Noisy processes can write without bound; memory stays at `cap` and the
/// oldest bytes are dropped first.
#[derive(Debug, Clone)]
pub struct BoundedBuffer {
    cap: usize,
    buf: VecDeque<u8>,
    dropped: u64,
}

impl BoundedBuffer {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            buf: VecDeque::with_capacity(cap.min(64 * 1024)),
            dropped: 0,
        }
    }

    /// Append a chunk, evicting from the front once the cap is reached.
    pub fn extend(&mut self, chunk: &[u8]) {
        if self.cap == 0 {
            self.dropped += chunk.len() as u64;
            return;
        }
        // Only the tail of an oversized chunk can survive.
        let keep = if chunk.len() > self.cap {
            self.dropped += (chunk.len() - self.cap) as u64;
            &chunk[chunk.len() - self.cap..]
        } else {
            chunk
        };
        let overflow = (self.buf.len() + keep.len()).saturating_sub(self.cap);
        if overflow > 0 {
            self.buf.drain(..overflow);
            self.dropped += overflow as u64;
        }
        self.buf.extend(keep);
    }

    /// Number of bytes evicted so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into()
    }
}

/// Last `n` lines of `text`, oldest first.
///
/// When `truncated` is set the first line may be a fragment of a longer line
/// whose head was evicted; it is discarded.
#[must_use]
pub fn tail_lines(text: &str, n: usize, truncated: bool) -> Vec<String> {
    let mut lines: Vec<&str> = text.lines().collect();
    if truncated && !lines.is_empty() {
        lines.remove(0);
    }
    let start = lines.len().saturating_sub(n);
    lines[start..].iter().map(|l| (*l).to_string()).collect()
}
