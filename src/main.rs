use anyhow::{bail, Context, Result};
use clap::Parser;
use lectern::answer::composer::format_timestamp;
use lectern::answer::generator::ExtractiveGenerator;
use lectern::cli::{Cli, Commands};
use lectern::config::Config;
use lectern::engine::LectureEngine;
use lectern::index::chunker::partition;
use lectern::index::embedder::HashEmbedder;
use lectern::media::command::SystemCommandExecutor;
use lectern::media::extractor::{AudioExtractor, FfmpegExtractor, PassthroughExtractor};
use lectern::store::RecordingState;
use lectern::stt::fixture::{FixtureTranscriber, TranscriptFile};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ask {
            media,
            question,
            transcript,
            top_k,
            step_timeout,
        } => {
            let mut config = config;
            if let Some(k) = top_k {
                config.retrieval.top_k = k;
            }
            if let Some(secs) = step_timeout {
                config.pipeline.step_timeout_secs = secs;
            }

            let engine = build_engine(config, &media, &transcript)?;
            let id = process_recording(&engine, &media, cli.quiet).await?;

            let answer = engine.ask(id, &question).await?;
            println!("{}", answer.text);
            println!();
            println!("Confidence: {:.2}", answer.confidence);
            for citation in &answer.citations {
                println!(
                    "  [{} - {}]  relevance {:.2}",
                    format_timestamp(citation.start),
                    format_timestamp(citation.end),
                    citation.relevance
                );
            }
        }

        Commands::Summarize { media, transcript } => {
            let engine = build_engine(config, &media, &transcript)?;
            let id = process_recording(&engine, &media, cli.quiet).await?;

            let summary = engine.summarize(id).await?;
            println!("{}", summary.text);
            println!();
            println!("Key moments:");
            for point in &summary.key_points {
                println!("  [{}] {}", point.formatted_time, point.text);
            }
            println!();
            println!("Duration: {}", format_timestamp(summary.duration));
        }

        Commands::Inspect { transcript } => {
            let contents = std::fs::read_to_string(&transcript)
                .with_context(|| format!("cannot read {}", transcript.display()))?;
            let file: TranscriptFile = serde_json::from_str(&contents)
                .with_context(|| format!("cannot parse {}", transcript.display()))?;

            let drafts = partition(
                &file.segments,
                config.index.max_chunk_seconds,
                config.index.max_chunk_chars,
            );

            println!(
                "{} segments -> {} chunks (limits: {}s / {} chars)",
                file.segments.len(),
                drafts.len(),
                config.index.max_chunk_seconds,
                config.index.max_chunk_chars
            );
            for (i, draft) in drafts.iter().enumerate() {
                let preview: String = draft.text.chars().take(60).collect();
                println!(
                    "  chunk {:>3}  [{} - {}]  {} segs  {}",
                    i,
                    format_timestamp(draft.start),
                    format_timestamp(draft.end),
                    draft.segments.len(),
                    preview
                );
            }
        }
    }

    Ok(())
}

/// Pick a log level from -v flags, honoring RUST_LOG when set.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config.with_env_overrides())
}

/// Wire the engine for an offline run: fixture transcript, hashing
/// embedder, extractive answers. ffmpeg is only involved for video
/// containers; bare audio passes straight through.
fn build_engine(config: Config, media: &Path, transcript: &Path) -> Result<LectureEngine> {
    let extractor: Arc<dyn AudioExtractor> = match media
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("wav") | Some("mp3") => Arc::new(PassthroughExtractor::new()),
        _ => Arc::new(FfmpegExtractor::new(SystemCommandExecutor::new())),
    };

    let engine = LectureEngine::new(
        config,
        extractor,
        Arc::new(FixtureTranscriber::new(transcript)),
        Arc::new(HashEmbedder::default()),
        Arc::new(ExtractiveGenerator::new()),
    )?;
    Ok(engine)
}

/// Submit the media and poll the pipeline to a terminal state, echoing
/// state changes unless quiet.
async fn process_recording(
    engine: &LectureEngine,
    media: &Path,
    quiet: bool,
) -> Result<lectern::store::RecordingId> {
    let id = engine.submit(&media.to_string_lossy())?;

    let mut last_state = None;
    loop {
        let status = engine.advance(id).await?;
        if !quiet && last_state != Some(status.state) {
            eprintln!("[{}] {}", status.state, status.message);
            last_state = Some(status.state);
        }
        if status.state.is_terminal() {
            if status.state == RecordingState::Failed {
                bail!(
                    "processing failed: {}",
                    status
                        .failure_reason
                        .unwrap_or_else(|| "unknown reason".to_string())
                );
            }
            return Ok(id);
        }
    }
}
