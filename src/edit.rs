use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Import additions and struct field appends both compile down to this
/// primitive. Intelligence lives in span acquisition, not application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until spliced into a source"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to put at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("before-text verification failed at byte {byte_start}: found {found:?}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range: [{byte_start}, {byte_end}) in source of length {source_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        source_len: usize,
    },

    #[error("byte range [{byte_start}, {byte_end}) does not fall on UTF-8 character boundaries")]
    NotCharBoundary { byte_start: usize, byte_end: usize },

    #[error("overlapping edits at byte {byte_start}")]
    Overlap { byte_start: usize },
}

impl Edit {
    /// Create a replacement edit, verifying `expected_before` at apply time.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl AsRef<str>,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before.as_ref()),
        }
    }

    /// Create a pure insertion at `at`.
    pub fn insert(at: usize, new_text: impl Into<String>) -> Self {
        Self::new(at, at, new_text, "")
    }

    /// Create a replacement of `source[byte_start..byte_end]`, taking the
    /// verification text from the source itself.
    pub fn replace(
        source: &str,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
    ) -> Self {
        let before = source.get(byte_start..byte_end).unwrap_or_default();
        Self::new(byte_start, byte_end, new_text, before)
    }

    /// Validate the edit against the current source.
    ///
    /// Returns the current text at [byte_start, byte_end) if validation succeeds.
    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                source_len: content.len(),
            });
        }

        let current = content
            .get(self.byte_start..self.byte_end)
            .ok_or(EditError::NotCharBoundary {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
            })?;

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }

        Ok(current)
    }
}

/// Splice a batch of edits into `content`, returning the new text.
///
/// Every edit is validated against the original content first. Edits are
/// then applied bottom-to-top so earlier offsets stay valid. Two insertions
/// at the same offset keep their batch order in the output.
pub fn splice(content: &str, mut edits: Vec<Edit>) -> Result<String, EditError> {
    for edit in &edits {
        edit.validate(content)?;
    }

    // Stable sort keeps batch order for equal starts; reversing below
    // would flip it, so index ties explicitly.
    let mut indexed: Vec<(usize, Edit)> = edits.drain(..).enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.byte_start.cmp(&a.byte_start).then(ib.cmp(ia)));

    for window in indexed.windows(2) {
        let (later, earlier) = (&window[0].1, &window[1].1);
        if earlier.byte_end > later.byte_start {
            return Err(EditError::Overlap {
                byte_start: later.byte_start,
            });
        }
    }

    let mut out = content.to_string();
    for (_, edit) in indexed {
        out.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
    }
    Ok(out)
}
