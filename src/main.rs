use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rostrum::{
    attribute_document, extract_document, list_documents, load_roster, BatchConfig,
    BatchOrchestrator, Deadline, ExtractConfig, IntroConfig, OutputPartitions, PatternLibrary,
};

#[derive(Parser)]
#[command(name = "rostrum")]
#[command(author, version, about = "Speaker attribution for OCR'd legislative hearing transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attribute speakers across a directory of hearing XML files
    Run {
        /// Directory containing hearing XML documents
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Roster registry JSON file (repeat for each registry, in merge order)
        #[arg(short, long = "roster", required = true)]
        rosters: Vec<PathBuf>,

        /// Directory for the clean, discarded and no-intro CSV partitions
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Files per persisted batch
        #[arg(long, default_value = "25")]
        batch_size: usize,

        /// Per-file attribution timeout in seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,

        /// Number of leading words treated as the intro
        #[arg(long, default_value = "2000")]
        intro_words: usize,

        /// Word count below which a document is flagged in the logs
        #[arg(long, default_value = "500")]
        min_words: usize,

        /// Documents dated before this are discarded
        #[arg(long, default_value = "1873-01-01")]
        earliest_date: NaiveDate,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Attribute a single document and print per-speaker statistics
    Analyze {
        /// Hearing XML document
        #[arg(short, long)]
        input: PathBuf,

        /// Roster registry JSON file (repeat for each registry, in merge order)
        #[arg(short, long = "roster", required = true)]
        rosters: Vec<PathBuf>,

        /// Number of leading words treated as the intro
        #[arg(long, default_value = "2000")]
        intro_words: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input_dir,
            rosters,
            output_dir,
            batch_size,
            timeout_secs,
            intro_words,
            min_words,
            earliest_date,
            verbose,
        } => {
            setup_logging(verbose);
            run_corpus(
                input_dir,
                rosters,
                output_dir,
                BatchConfig {
                    batch_size,
                    timeout: Duration::from_secs(timeout_secs),
                },
                IntroConfig {
                    window_words: intro_words,
                },
                ExtractConfig {
                    earliest_date,
                    min_words,
                },
            )
            .await
        }
        Commands::Analyze {
            input,
            rosters,
            intro_words,
            verbose,
        } => {
            setup_logging(verbose);
            analyze_document(
                input,
                rosters,
                IntroConfig {
                    window_words: intro_words,
                },
            )
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run_corpus(
    input_dir: PathBuf,
    rosters: Vec<PathBuf>,
    output_dir: PathBuf,
    batch: BatchConfig,
    intro: IntroConfig,
    extract: ExtractConfig,
) -> Result<()> {
    info!("Loading roster from {} registries", rosters.len());
    let roster = Arc::new(load_roster(&rosters)?);
    let patterns = Arc::new(PatternLibrary::new().context("Failed to compile pattern library")?);

    let inputs = list_documents(&input_dir)?;
    info!("Found {} XML files in {:?}", inputs.len(), input_dir);

    let outputs = OutputPartitions::new(&output_dir)?;
    let orchestrator = BatchOrchestrator::new(roster, patterns, outputs)
        .with_batch_config(batch)
        .with_intro_config(intro)
        .with_extract_config(extract);

    let summary = orchestrator.run(&inputs).await?;
    if summary.recovered {
        info!("Rolled back an interrupted batch before resuming");
    }
    info!(
        "Complete: {} processed ({} skipped), {} clean, {} discarded, {} without intro",
        summary.processed, summary.skipped, summary.clean, summary.discarded, summary.no_intro
    );
    info!("Outputs written to {:?}", output_dir);

    Ok(())
}

fn analyze_document(input: PathBuf, rosters: Vec<PathBuf>, intro: IntroConfig) -> Result<()> {
    info!("Analyzing hearing {:?}", input);
    let roster = load_roster(&rosters)?;
    let patterns = PatternLibrary::new().context("Failed to compile pattern library")?;

    let doc = extract_document(&input, &ExtractConfig::default())
        .with_context(|| format!("Failed to extract {:?}", input))?;
    let attribution = attribute_document(&doc, &roster, &patterns, &intro, &Deadline::none())
        .context("Attribution failed")?;
    let diagnostics = &attribution.diagnostics;

    println!("Hearing Analysis");
    println!("================");
    println!("File: {}", doc.file_id);
    println!("Date: {}", doc.date);
    println!("Title: {}", doc.title);
    println!("Words: {}", doc.word_count);
    println!();

    println!("Intro Resolution");
    println!("----------------");
    println!("Intro hits: {}", diagnostics.intro_hits);
    println!("Kept surnames: {}", diagnostics.keep_size);
    for (role, surname) in &diagnostics.role_bindings {
        println!("Role {}: {}", role.label(), surname);
    }
    if !diagnostics.drop_candidates.is_empty() {
        println!("Drop candidates: {}", diagnostics.drop_candidates.join(", "));
    }
    println!();

    println!("Cues");
    println!("----");
    println!("Cues found: {}", diagnostics.cues_found);
    println!("Cues kept: {}", diagnostics.kept_cues);
    println!("Segments: {}", attribution.segments.len());
    println!();

    let mut speakers: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for segment in &attribution.segments {
        let entry = speakers.entry(segment.speaker.as_str()).or_default();
        entry.0 += 1;
        entry.1 += segment.word_count();
    }
    let mut speakers: Vec<(&str, (usize, usize))> = speakers.into_iter().collect();
    speakers.sort_by(|a, b| b.1.1.cmp(&a.1.1).then(a.0.cmp(b.0)));

    println!("Speaker Statistics");
    println!("------------------");
    for (speaker, (segments, words)) in speakers {
        println!("{}: {} segments, {} words", speaker, segments, words);
    }

    Ok(())
}
