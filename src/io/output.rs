use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CLEAN_FILE: &str = "hearings_clean.csv";
pub const DISCARDED_FILE: &str = "hearings_discarded.csv";
pub const NO_INTRO_FILE: &str = "hearings_no_intro.csv";
pub const JOURNAL_FILE: &str = ".batch_journal.json";

/// Date/title value written when a document could not be read
pub const UNKNOWN: &str = "unknown";

/// One merged (document, speaker) row of the clean partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "HearingTitle")]
    pub title: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "BioguideId")]
    pub bioguide: String,
    #[serde(rename = "TermStart")]
    pub term_start: String,
    #[serde(rename = "TermEnd")]
    pub term_end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscardRow {
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "HearingTitle")]
    pub title: String,
    #[serde(rename = "Reason")]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoIntroRow {
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "HearingTitle")]
    pub title: String,
    pub intro_hits: usize,
    pub cues_found: usize,
}

/// Rows produced by one batch, written together
#[derive(Debug, Clone, Default)]
pub struct BatchRows {
    pub clean: Vec<CleanRow>,
    pub discarded: Vec<DiscardRow>,
    pub no_intro: Vec<NoIntroRow>,
}

impl BatchRows {
    pub fn is_empty(&self) -> bool {
        self.clean.is_empty() && self.discarded.is_empty() && self.no_intro.is_empty()
    }
}

/// Partition byte lengths recorded before a batch is appended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJournal {
    pub clean: u64,
    pub discarded: u64,
    pub no_intro: u64,
}

/// The three append-only CSV partitions under one output directory
#[derive(Debug, Clone)]
pub struct OutputPartitions {
    dir: PathBuf,
}

impl OutputPartitions {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn clean_path(&self) -> PathBuf {
        self.dir.join(CLEAN_FILE)
    }

    pub fn discarded_path(&self) -> PathBuf {
        self.dir.join(DISCARDED_FILE)
    }

    pub fn no_intro_path(&self) -> PathBuf {
        self.dir.join(NO_INTRO_FILE)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.dir.join(JOURNAL_FILE)
    }

    /// Roll back a batch that was interrupted mid-append. Returns whether a
    /// journal was found.
    pub fn recover(&self) -> Result<bool> {
        let journal_path = self.journal_path();
        if !journal_path.exists() {
            return Ok(false);
        }

        let content = fs::read_to_string(&journal_path)
            .with_context(|| format!("Failed to read journal: {:?}", journal_path))?;
        match serde_json::from_str::<BatchJournal>(&content) {
            Ok(journal) => {
                warn!("Found interrupted batch journal, truncating partitions");
                truncate_to(&self.clean_path(), journal.clean)?;
                truncate_to(&self.discarded_path(), journal.discarded)?;
                truncate_to(&self.no_intro_path(), journal.no_intro)?;
            }
            // A torn journal means the crash came before any partition was appended
            Err(e) => warn!("Discarding unreadable batch journal: {}", e),
        }

        fs::remove_file(&journal_path)
            .with_context(|| format!("Failed to remove journal: {:?}", journal_path))?;
        Ok(true)
    }

    /// File ids already present in any output partition
    pub fn ledger(&self) -> Result<HashSet<String>> {
        let mut done = read_file_column(&self.clean_path())?;
        done.extend(read_file_column(&self.discarded_path())?);
        done.extend(read_file_column(&self.no_intro_path())?);
        Ok(done)
    }

    /// Record current partition lengths in the journal
    pub fn write_journal(&self) -> Result<BatchJournal> {
        let journal = BatchJournal {
            clean: file_len(&self.clean_path())?,
            discarded: file_len(&self.discarded_path())?,
            no_intro: file_len(&self.no_intro_path())?,
        };
        let path = self.journal_path();
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec(&journal)?)
            .with_context(|| format!("Failed to write journal: {:?}", staging))?;
        fs::rename(&staging, &path)
            .with_context(|| format!("Failed to move journal into place: {:?}", path))?;
        Ok(journal)
    }

    /// Append a batch under the journal: no-intro, discarded, then clean
    pub fn append_batch(&self, rows: &BatchRows) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        self.write_journal()?;
        append_rows(&self.no_intro_path(), &rows.no_intro)?;
        append_rows(&self.discarded_path(), &rows.discarded)?;
        append_rows(&self.clean_path(), &rows.clean)?;

        let journal_path = self.journal_path();
        fs::remove_file(&journal_path)
            .with_context(|| format!("Failed to remove journal: {:?}", journal_path))?;

        info!(
            "Wrote {} clean, {} discarded, {} no-intro rows",
            rows.clean.len(),
            rows.discarded.len(),
            rows.no_intro.len()
        );
        Ok(())
    }
}

fn file_len(path: &Path) -> Result<u64> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e).with_context(|| format!("Failed to stat {:?}", path)),
    }
}

fn truncate_to(path: &Path, len: u64) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .with_context(|| format!("Failed to open {:?} for truncation", path))?;
    file.set_len(len)
        .with_context(|| format!("Failed to truncate {:?}", path))?;
    Ok(())
}

fn read_file_column(path: &Path) -> Result<HashSet<String>> {
    let mut files = HashSet::new();
    if !path.exists() {
        return Ok(files);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;
    let headers = reader.headers()?.clone();
    let Some(index) = headers.iter().position(|h| h == "File") else {
        return Ok(files);
    };

    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read {:?}", path))?;
        if let Some(file) = record.get(index) {
            files.insert(file.to_string());
        }
    }

    Ok(files)
}

/// Append rows, writing the header only when the file is absent or empty
fn append_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let needs_header = file_len(path)? == 0;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {:?} for append", path))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {:?}", path))?;
    }
    writer.flush()?;
    Ok(())
}
