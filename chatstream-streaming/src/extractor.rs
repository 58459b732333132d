//! Event block extraction.
//!
//! Blocks are separated by a blank line (`\n\n`). The extractor keeps the
//! undelimited tail of the stream and remembers how far it has already
//! searched, so each byte is scanned a bounded number of times no matter
//! how rarely delimiters arrive.

/// Blank-line block delimiter.
pub const DELIMITER: &str = "\n\n";

/// Accumulates decoded text and splits off complete blocks.
///
/// ```rust
/// use chatstream_streaming::BlockExtractor;
///
/// let mut extractor = BlockExtractor::new();
/// extractor.push("data: a\n\ndata: b\n");
/// assert_eq!(extractor.next_block().as_deref(), Some("data: a"));
/// assert_eq!(extractor.next_block(), None);
/// extractor.push("\n");
/// assert_eq!(extractor.next_block().as_deref(), Some("data: b"));
/// ```
#[derive(Debug, Default)]
pub struct BlockExtractor {
    buffer: String,
    // Bytes before `start` belong to blocks already handed out.
    start: usize,
    // No delimiter begins before `scan_from`.
    scan_from: usize,
}

impl BlockExtractor {
    /// Create an empty extractor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append decoded text.
    pub fn push(&mut self, text: &str) {
        self.compact();
        self.buffer.push_str(text);
    }

    /// Remove and return the next complete block, without its delimiter.
    ///
    /// Empty blocks (a stray leading blank line) are returned as `""`;
    /// callers drop them.
    pub fn next_block(&mut self) -> Option<String> {
        match self.buffer[self.scan_from..].find(DELIMITER) {
            Some(offset) => {
                let end = self.scan_from + offset;
                let block = self.buffer[self.start..end].to_string();
                self.start = end + DELIMITER.len();
                self.scan_from = self.start;
                Some(block)
            }
            None => {
                // A trailing '\n' may pair with the first byte of the next push.
                let keep = usize::from(self.buffer.ends_with('\n'));
                self.scan_from = (self.buffer.len() - keep).max(self.start);
                None
            }
        }
    }

    /// Take whatever is left as a final, undelimited block.
    ///
    /// Returns `None` if only whitespace remains. The extractor is empty
    /// afterwards.
    pub fn take_remainder(&mut self) -> Option<String> {
        let rest = self.buffer[self.start..].to_string();
        self.clear();
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// Bytes of text not yet handed out as a block.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() - self.start
    }

    /// Whether no unconsumed text is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffered_len() == 0
    }

    /// Drop all buffered text.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.start = 0;
        self.scan_from = 0;
    }

    fn compact(&mut self) {
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.scan_from -= self.start;
            self.start = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drain(extractor: &mut BlockExtractor) -> Vec<String> {
        std::iter::from_fn(|| extractor.next_block()).collect()
    }

    #[test]
    fn test_multiple_blocks_in_one_push() {
        let mut extractor = BlockExtractor::new();
        extractor.push("data: a\n\ndata: b\n\ndata: c");
        assert_eq!(drain(&mut extractor), vec!["data: a", "data: b"]);
        assert_eq!(extractor.take_remainder().as_deref(), Some("data: c"));
        assert!(extractor.is_empty());
    }

    #[test]
    fn test_delimiter_split_across_pushes() {
        let mut extractor = BlockExtractor::new();
        extractor.push("data: x\n");
        assert!(extractor.next_block().is_none());
        extractor.push("\ndata: y");
        assert_eq!(extractor.next_block().as_deref(), Some("data: x"));
        assert!(extractor.next_block().is_none());
        assert_eq!(extractor.buffered_len(), "data: y".len());
    }

    #[test]
    fn test_leading_blank_line_yields_empty_block() {
        let mut extractor = BlockExtractor::new();
        extractor.push("\n\ndata: z\n\n");
        assert_eq!(drain(&mut extractor), vec!["", "data: z"]);
    }

    #[test]
    fn test_whitespace_remainder_is_dropped() {
        let mut extractor = BlockExtractor::new();
        extractor.push("data: a\n\n\n ");
        assert_eq!(drain(&mut extractor), vec!["data: a"]);
        assert!(extractor.take_remainder().is_none());
    }

    #[test]
    fn test_multibyte_tail_does_not_break_resume_offset() {
        let mut extractor = BlockExtractor::new();
        extractor.push("data: 你好");
        assert!(extractor.next_block().is_none());
        extractor.push("\n\n");
        assert_eq!(extractor.next_block().as_deref(), Some("data: 你好"));
    }

    #[test]
    fn test_compaction_keeps_offsets_consistent() {
        let mut extractor = BlockExtractor::new();
        for i in 0..100 {
            extractor.push(&format!("data: {i}\n"));
            extractor.push("\n");
            assert_eq!(extractor.next_block(), Some(format!("data: {i}")));
            assert!(extractor.next_block().is_none());
        }
        assert!(extractor.is_empty());
    }

    #[test]
    fn test_long_undelimited_input_then_delimiter() {
        let mut extractor = BlockExtractor::new();
        let filler = "x".repeat(4096);
        for _ in 0..16 {
            extractor.push(&filler);
            assert!(extractor.next_block().is_none());
        }
        extractor.push("\n\n");
        assert_eq!(extractor.next_block().map(|b| b.len()), Some(4096 * 16));
    }
}
