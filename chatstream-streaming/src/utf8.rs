//! Incremental UTF-8 decoding.
//!
//! Chunk boundaries can fall inside a multi-byte code point. The decoder
//! holds back such a partial sequence until the next chunk completes it,
//! and replaces genuinely malformed bytes with U+FFFD instead of failing.

/// Replacement emitted for malformed or truncated sequences.
pub const REPLACEMENT: char = '\u{FFFD}';

const BOM: char = '\u{FEFF}';

/// Streaming byte-to-text converter.
///
/// Carries at most one incomplete code point (up to three bytes) between
/// calls to [`feed`](Self::feed).
///
/// ```rust
/// use chatstream_streaming::Utf8Decoder;
///
/// let mut decoder = Utf8Decoder::new();
/// let euro = "€".as_bytes();
/// assert_eq!(decoder.feed(&euro[..1]), "");
/// assert_eq!(decoder.feed(&euro[1..]), "€");
/// assert_eq!(decoder.finish(), "");
/// ```
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
    bom_checked: bool,
}

impl Utf8Decoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning every complete character it finishes.
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() + self.pending.len());

        if self.pending.is_empty() {
            self.decode_into(bytes, &mut out);
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(bytes);
            self.decode_into(&joined, &mut out);
        }

        self.strip_bom(&mut out);
        out
    }

    /// Flush a held-back partial sequence at end of input.
    ///
    /// A truncated code point becomes a single replacement character.
    /// Calling this again returns an empty string.
    pub fn finish(&mut self) -> String {
        let mut out = String::new();
        if !self.pending.is_empty() {
            self.pending.clear();
            out.push(REPLACEMENT);
        }
        self.strip_bom(&mut out);
        out
    }

    /// Whether bytes of an incomplete code point are being held.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn decode_into(&mut self, mut input: &[u8], out: &mut String) {
        loop {
            match std::str::from_utf8(input) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(error) => {
                    let valid = error.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&input[..valid]) {
                        out.push_str(text);
                    }
                    match error.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            input = &input[valid + len..];
                        }
                        None => {
                            // Valid prefix of a code point cut off by the chunk edge.
                            self.pending.extend_from_slice(&input[valid..]);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn strip_bom(&mut self, out: &mut String) {
        if self.bom_checked || out.is_empty() {
            return;
        }
        self.bom_checked = true;
        if out.starts_with(BOM) {
            out.drain(..BOM.len_utf8());
        }
    }
}
