use chrono::NaiveDate;

/// One extracted source document
#[derive(Debug, Clone)]
pub struct HearingDocument {
    /// File name of the source, used as the ledger key
    pub file_id: String,
    pub date: NaiveDate,
    pub title: String,
    /// All `Text` element content joined by single spaces
    pub text: String,
    pub word_count: usize,
}

/// A contiguous span of the document attributed to one speaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerSegment {
    pub date: NaiveDate,
    pub file_id: String,
    pub title: String,
    /// Display name resolved through the document's identity map
    pub speaker: String,
    pub text: String,
}

impl SpeakerSegment {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
