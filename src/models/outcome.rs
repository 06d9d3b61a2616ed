use serde::Serialize;

use super::{Role, SpeakerSegment};

/// Reason recorded when a document cannot be read
pub const REASON_PARSE_ERROR: &str = "XML parse error";

/// Reason recorded when attribution exceeds the per-file bound
pub const REASON_TIMEOUT: &str = "Timeout";

/// Reason recorded when attribution finishes without any kept speaker
pub const REASON_NO_SEGMENTS: &str = "No speaker segments";

/// Per-document counts from intro resolution and the cue scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntroDiagnostics {
    /// Roster-name and state-fallback hits in the intro window
    pub intro_hits: usize,
    /// Every cue the detector found in the body
    pub cues_found: usize,
    /// Size of the keep-set, placeholder included
    pub keep_size: usize,
    /// Cues that started an attributed span
    pub kept_cues: usize,
    pub role_bindings: Vec<(Role, String)>,
    /// Inline mentions that look like participants but were not kept
    pub drop_candidates: Vec<String>,
}

/// What processing one document produced. A single document yields either
/// `Clean` or `Discarded`, and may additionally yield `NoIntro`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Clean(Vec<SpeakerSegment>),
    Discarded(String),
    NoIntro(IntroDiagnostics),
}

impl ParseOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, ParseOutcome::Clean(_))
    }
}
