//! Process command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use indicatif::ProgressBar;

use crate::cli::{Output, ProcessArgs};
use crate::config::Settings;
use crate::control::{ProcessedVideo, RunControl};
use crate::persist::CsvOptions;
use crate::pipeline::{Pipeline, ProgressObserver, RunOptions, RunReport};
use crate::snippet::SnippetMarkers;
use crate::summary::Summarizer;
use crate::youtube::{CaptionClient, PlaylistClient, VideoRecord};

/// Build run options by layering CLI flags over the configuration file.
pub fn build_run_options(args: &ProcessArgs, settings: &Settings) -> RunOptions {
    let generate_summaries = args.summaries || settings.summaries.enabled;
    let fetch_transcripts = args.transcripts || settings.transcripts.enabled || generate_summaries;

    let snippet_markers = (args.snippet || settings.snippet.enabled).then(|| {
        SnippetMarkers::new(
            args.snippet_start
                .clone()
                .unwrap_or_else(|| settings.snippet.start_marker.clone()),
            args.snippet_end
                .clone()
                .unwrap_or_else(|| settings.snippet.end_marker.clone()),
        )
    });

    let output_path = args
        .output
        .as_ref()
        .map(|p| Settings::expand_path(p))
        .unwrap_or_else(default_output_path);

    RunOptions {
        fetch_transcripts,
        transcript_dir: args
            .transcript_dir
            .as_ref()
            .map(|p| Settings::expand_path(p))
            .unwrap_or_else(|| settings.transcript_dir()),
        language: args
            .language
            .clone()
            .unwrap_or_else(|| settings.youtube.language.clone()),
        generate_summaries,
        summary_dir: args
            .summary_dir
            .as_ref()
            .map(|p| Settings::expand_path(p))
            .unwrap_or_else(|| settings.summary_dir()),
        snippet_markers,
        output_path,
        csv: CsvOptions {
            include_transcripts: args.csv_transcripts || settings.transcripts.include_in_csv,
            include_summaries: args.csv_summaries || settings.summaries.include_in_csv,
            sort_ascending: args.ascending || settings.export.sort_ascending,
        },
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "playlist_videos_{}.csv",
        chrono::Local::now().format("%Y%m%d")
    ))
}

/// Observer printing per-item progress to the terminal.
struct CliObserver {
    /// Spins while the video list is being fetched, cleared on `on_total`.
    spinner: ProgressBar,
}

impl CliObserver {
    fn new() -> Self {
        Self {
            spinner: Output::spinner("Fetching videos..."),
        }
    }
}

impl ProgressObserver for CliObserver {
    fn on_total(&self, total: usize) {
        self.spinner.finish_and_clear();
        Output::info(&format!("Found {} videos to process", total));
        println!();
    }

    fn on_item_start(&self, index: usize, total: usize, record: &VideoRecord) {
        Output::video_line(index, total, &record.title);
    }

    fn on_video(&self, video: &ProcessedVideo) {
        if video.transcript.is_some() {
            println!("   transcript saved");
        }
        if video.summary.is_some() {
            println!("   summary saved");
        }
    }

    fn on_skipped(&self, video_id: &str, reason: &str) {
        Output::warning(&format!("  Skipped {}: {}", video_id, reason));
    }
}

fn report_results(report: &RunReport) {
    println!();
    if report.stopped {
        Output::warning("Run stopped early");
    }
    Output::info(&format!(
        "{} transcripts found, {} summaries generated out of {} videos",
        report.transcripts_found,
        report.summaries_generated,
        report.videos.len()
    ));
    match &report.csv_path {
        Some(path) => Output::success(&format!("Data saved to {}", path.display())),
        None => Output::warning("No videos processed, CSV not written"),
    }
}

/// Run the process command.
pub async fn run_process(input: &str, args: &ProcessArgs, settings: Settings) -> Result<()> {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| settings.youtube.api_key.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "YouTube API key required (use --api-key, YOUTUBE_API_KEY, or the config file)"
            )
        })?;

    let options = build_run_options(args, &settings);

    let summarizer = options.generate_summaries.then(|| {
        let model = args
            .model
            .clone()
            .unwrap_or_else(|| settings.summaries.model.clone());
        let language = args
            .summary_language
            .clone()
            .or_else(|| settings.summaries.language.clone());
        Arc::new(Summarizer::new(
            &model,
            language.as_deref(),
            args.openai_key.as_deref(),
        )) as Arc<dyn crate::summary::SummaryProvider>
    });

    let pipeline = Pipeline::new(
        Arc::new(PlaylistClient::new(&api_key)),
        Arc::new(CaptionClient::new()),
        summarizer,
    );

    Output::info(&format!("Processing: {}", input));
    let control = RunControl::new();
    let observer = CliObserver::new();

    match pipeline.run(input, &options, &control, &observer).await {
        Ok(report) => {
            report_results(&report);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to process: {}", e));
            Err(e.into())
        }
    }
}
