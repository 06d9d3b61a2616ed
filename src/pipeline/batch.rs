use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::error::AttributionError;
use crate::heuristics::PatternLibrary;
use crate::io::{
    extract_document, file_id, BatchRows, DiscardRow, ExtractConfig, NoIntroRow,
    OutputPartitions, UNKNOWN,
};
use crate::models::{
    HearingDocument, ParseOutcome, RosterIndex, REASON_PARSE_ERROR, REASON_TIMEOUT,
};
use crate::stages::{render_clean_rows, IntroConfig};

use super::{attribute_document, Attribution, Deadline};

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Files per persisted batch
    pub batch_size: usize,
    /// Per-file bound on intro resolution and segmentation
    pub timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Everything one input file produced
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file_id: String,
    /// `YYYY-MM-DD`, or "unknown" when the document could not be read
    pub date: String,
    pub title: String,
    pub outcomes: Vec<ParseOutcome>,
}

/// Counts for a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub inputs: usize,
    /// Inputs already present in the ledger
    pub skipped: usize,
    pub processed: usize,
    pub clean: usize,
    pub discarded: usize,
    pub no_intro: usize,
    pub batches: usize,
    /// Whether an interrupted batch was rolled back at startup
    pub recovered: bool,
}

/// Drives extraction and attribution over a corpus, one document at a time,
/// persisting each batch to the output partitions
pub struct BatchOrchestrator {
    roster: Arc<RosterIndex>,
    patterns: Arc<PatternLibrary>,
    outputs: OutputPartitions,
    extract: ExtractConfig,
    intro: IntroConfig,
    batch: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(
        roster: Arc<RosterIndex>,
        patterns: Arc<PatternLibrary>,
        outputs: OutputPartitions,
    ) -> Self {
        Self {
            roster,
            patterns,
            outputs,
            extract: ExtractConfig::default(),
            intro: IntroConfig::default(),
            batch: BatchConfig::default(),
        }
    }

    pub fn with_extract_config(mut self, config: ExtractConfig) -> Self {
        self.extract = config;
        self
    }

    pub fn with_intro_config(mut self, config: IntroConfig) -> Self {
        self.intro = config;
        self
    }

    pub fn with_batch_config(mut self, config: BatchConfig) -> Self {
        self.batch = config;
        self
    }

    /// Process every input not already in the ledger.
    ///
    /// Per-document failures become discarded rows; only roster, ledger and
    /// output I/O errors end the run.
    pub async fn run(&self, inputs: &[PathBuf]) -> Result<RunSummary> {
        let mut summary = RunSummary {
            inputs: inputs.len(),
            recovered: self.outputs.recover()?,
            ..Default::default()
        };

        let ledger = self.outputs.ledger()?;
        let mut remaining: Vec<&PathBuf> = inputs
            .iter()
            .filter(|path| !ledger.contains(&file_id(path)))
            .collect();
        remaining.sort();
        remaining.dedup();
        summary.skipped = inputs.len() - remaining.len();

        info!(
            "{} input files, {} already processed, {} remaining",
            inputs.len(),
            summary.skipped,
            remaining.len()
        );

        for (index, batch) in remaining.chunks(self.batch.batch_size.max(1)).enumerate() {
            info!("Batch {} ({} files)", index + 1, batch.len());

            let mut segments = Vec::new();
            let mut rows = BatchRows::default();

            for path in batch {
                let report = self.process_file(path).await;
                for outcome in report.outcomes {
                    match outcome {
                        ParseOutcome::Clean(doc_segments) => {
                            summary.clean += 1;
                            segments.extend(doc_segments);
                        }
                        ParseOutcome::Discarded(reason) => {
                            summary.discarded += 1;
                            rows.discarded.push(DiscardRow {
                                file: report.file_id.clone(),
                                date: report.date.clone(),
                                title: report.title.clone(),
                                reason,
                            });
                        }
                        ParseOutcome::NoIntro(diagnostics) => {
                            summary.no_intro += 1;
                            rows.no_intro.push(NoIntroRow {
                                file: report.file_id.clone(),
                                date: report.date.clone(),
                                title: report.title.clone(),
                                intro_hits: diagnostics.intro_hits,
                                cues_found: diagnostics.cues_found,
                            });
                        }
                    }
                }
                summary.processed += 1;
            }

            rows.clean = render_clean_rows(&segments, &self.roster);
            self.outputs.append_batch(&rows)?;
            summary.batches += 1;
        }

        info!(
            "Finished: {} processed, {} clean, {} discarded, {} without intro",
            summary.processed, summary.clean, summary.discarded, summary.no_intro
        );
        Ok(summary)
    }

    /// Extract and attribute one file. Never fails: every problem becomes a
    /// `Discarded` outcome.
    pub async fn process_file(&self, path: &Path) -> FileReport {
        let id = file_id(path);

        let doc = match extract_document(path, &self.extract) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("[BAD XML] {}: {} - skipped", id, e);
                let reason = if e.is_structural() {
                    REASON_PARSE_ERROR.to_string()
                } else {
                    e.to_string()
                };
                return FileReport {
                    file_id: id,
                    date: UNKNOWN.to_string(),
                    title: UNKNOWN.to_string(),
                    outcomes: vec![ParseOutcome::Discarded(reason)],
                };
            }
        };

        if doc.word_count < self.extract.min_words {
            debug!(
                "{}: {} words, below the {} word threshold",
                id, doc.word_count, self.extract.min_words
            );
        }

        let date = doc.date.format("%Y-%m-%d").to_string();
        let title = doc.title.clone();

        let outcomes = match self.attribute(doc).await {
            Ok(attribution) => attribution.into_outcomes(),
            Err(reason) => {
                warn!("[{}] {} - skipped", reason, id);
                vec![ParseOutcome::Discarded(reason)]
            }
        };

        FileReport {
            file_id: id,
            date,
            title,
            outcomes,
        }
    }

    /// Run attribution on a blocking worker under the per-file deadline. On
    /// expiry the worker's result is abandoned; the shared deadline makes it
    /// stop at its next check.
    async fn attribute(&self, doc: HearingDocument) -> Result<Attribution, String> {
        let roster = Arc::clone(&self.roster);
        let patterns = Arc::clone(&self.patterns);
        let intro = self.intro.clone();
        let deadline = Deadline::after(self.batch.timeout);

        let task = tokio::task::spawn_blocking(move || {
            attribute_document(&doc, &roster, &patterns, &intro, &deadline)
        });

        match tokio::time::timeout(self.batch.timeout, task).await {
            Err(_) => Err(REASON_TIMEOUT.to_string()),
            Ok(Err(join_error)) => Err(join_error_message(join_error)),
            Ok(Ok(Err(AttributionError::Timeout))) => Err(REASON_TIMEOUT.to_string()),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Ok(Ok(attribution))) => Ok(attribution),
        }
    }
}

fn join_error_message(error: JoinError) -> String {
    if error.is_panic() {
        panic_message(error.into_panic())
    } else {
        error.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
