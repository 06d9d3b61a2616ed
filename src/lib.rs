pub mod error;
pub mod heuristics;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use error::{AttributionError, DocumentError};
pub use heuristics::{CueDetection, FuzzyCueDetector, PatternLibrary};
pub use io::{extract_document, list_documents, load_roster, ExtractConfig, OutputPartitions};
pub use models::{
    Cue, HearingDocument, IdentityMap, LegislatorRecord, ParseOutcome, Role, RosterIndex,
    SpeakerSegment,
};
pub use pipeline::{
    attribute_document, Attribution, BatchConfig, BatchOrchestrator, Deadline, RunSummary,
};
pub use stages::{render_clean_rows, IntroConfig};
