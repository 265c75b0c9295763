//! Processing pipeline for Spilliste.
//!
//! Coordinates the run from playlist fetch through transcript, summary, and
//! file persistence. Videos are processed strictly sequentially; pause and
//! stop are observed only between items.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::control::{ProcessedVideo, RunControl};
use crate::error::{Result, SpillisteError};
use crate::persist::{self, CsvOptions};
use crate::snippet::SnippetMarkers;
use crate::summary::SummaryProvider;
use crate::youtube::{
    fetch_playlist_videos, fetch_with_fallback, resolve_input, CaptionSource, PlaylistSource,
    RunTarget, VideoRecord,
};

/// How often the worker re-checks the pause flag.
const DEFAULT_PAUSE_POLL: Duration = Duration::from_secs(1);

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Fetch captions for each video.
    pub fetch_transcripts: bool,
    /// Directory for per-video transcript files.
    pub transcript_dir: PathBuf,
    /// Preferred caption language code.
    pub language: String,
    /// Generate summaries for videos with a transcript.
    pub generate_summaries: bool,
    /// Directory for per-video summary files.
    pub summary_dir: PathBuf,
    /// When set, replace the CSV description column with the extracted
    /// snippet.
    pub snippet_markers: Option<SnippetMarkers>,
    /// CSV output path.
    pub output_path: PathBuf,
    /// CSV column and ordering options.
    pub csv: CsvOptions,
}

impl Default for RunOptions {
    /// Metadata-only run: no transcripts, no summaries, CSV in the working
    /// directory.
    fn default() -> Self {
        Self {
            fetch_transcripts: false,
            transcript_dir: PathBuf::from("transcripts"),
            language: "ko".to_string(),
            generate_summaries: false,
            summary_dir: PathBuf::from("summaries"),
            snippet_markers: None,
            output_path: PathBuf::from("playlist_videos.csv"),
            csv: CsvOptions::default(),
        }
    }
}

/// Observer for per-item progress. The pipeline stays UI-agnostic; the CLI
/// prints, the serve surface feeds its process manager.
pub trait ProgressObserver: Send + Sync {
    fn on_total(&self, _total: usize) {}
    fn on_item_start(&self, _index: usize, _total: usize, _record: &VideoRecord) {}
    fn on_video(&self, _video: &ProcessedVideo) {}
    fn on_skipped(&self, _video_id: &str, _reason: &str) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

/// Outcome of a pipeline run.
#[derive(Debug)]
pub struct RunReport {
    /// Successfully processed videos, in processing order.
    pub videos: Vec<ProcessedVideo>,
    /// Number of videos the source listed.
    pub total: usize,
    pub transcripts_found: usize,
    pub summaries_generated: usize,
    /// Whether the run ended early on a stop request.
    pub stopped: bool,
    /// Where the CSV landed, when any video was processed.
    pub csv_path: Option<PathBuf>,
}

/// The processing pipeline. Components are injected so runs can be driven
/// against fakes.
pub struct Pipeline {
    playlist: Arc<dyn PlaylistSource>,
    captions: Arc<dyn CaptionSource>,
    summarizer: Option<Arc<dyn SummaryProvider>>,
    pause_poll: Duration,
}

impl Pipeline {
    pub fn new(
        playlist: Arc<dyn PlaylistSource>,
        captions: Arc<dyn CaptionSource>,
        summarizer: Option<Arc<dyn SummaryProvider>>,
    ) -> Self {
        Self {
            playlist,
            captions,
            summarizer,
            pause_poll: DEFAULT_PAUSE_POLL,
        }
    }

    /// Override the pause polling interval (for testing).
    pub fn with_pause_poll(mut self, interval: Duration) -> Self {
        self.pause_poll = interval;
        self
    }

    /// Resolve the input and list the videos to process.
    async fn list_videos(&self, input: &str) -> Result<Vec<VideoRecord>> {
        match resolve_input(input)? {
            RunTarget::Playlist(playlist_id) => {
                info!("Fetching playlist {}", playlist_id);
                fetch_playlist_videos(self.playlist.as_ref(), &playlist_id).await
            }
            RunTarget::Video(video_id) => {
                info!("Fetching video {}", video_id);
                match self.playlist.fetch_video(&video_id).await? {
                    Some(record) => Ok(vec![record]),
                    None => Err(SpillisteError::Upstream(format!(
                        "Video not found: {}",
                        video_id
                    ))),
                }
            }
        }
    }

    /// Run the pipeline over a playlist or single-video input.
    ///
    /// Duplicate video IDs in the source playlist are processed again; the
    /// list is iterated as returned, without deduplication.
    #[instrument(skip(self, options, control, observer), fields(input = %input))]
    pub async fn run(
        &self,
        input: &str,
        options: &RunOptions,
        control: &RunControl,
        observer: &dyn ProgressObserver,
    ) -> Result<RunReport> {
        if options.generate_summaries && self.summarizer.is_none() {
            return Err(SpillisteError::Config(
                "Summary generation requested but no summarizer is configured".to_string(),
            ));
        }

        let videos = self.list_videos(input).await?;
        let total = videos.len();
        observer.on_total(total);
        info!("Processing {} videos", total);

        let mut processed: Vec<ProcessedVideo> = Vec::new();
        let mut stopped = false;

        for (index, record) in videos.into_iter().enumerate() {
            // Pause and stop are cooperative: checked here, between items.
            while control.is_paused() && !control.is_stopped() {
                tokio::time::sleep(self.pause_poll).await;
            }
            if control.is_stopped() {
                stopped = true;
                break;
            }

            observer.on_item_start(index, total, &record);

            let snippet = options
                .snippet_markers
                .as_ref()
                .map(|markers| markers.extract(&record.description));

            let mut transcript = None;
            if options.fetch_transcripts {
                transcript =
                    fetch_with_fallback(self.captions.as_ref(), &record.video_id, &options.language)
                        .await;

                if let Some(text) = &transcript {
                    if let Err(e) = persist::save_transcript(
                        &options.transcript_dir,
                        &record.video_id,
                        &record.title,
                        text,
                    ) {
                        warn!("Skipping {}: transcript write failed: {}", record.video_id, e);
                        observer.on_skipped(&record.video_id, "transcript write failed");
                        continue;
                    }
                }
            }

            let mut summary = None;
            if options.generate_summaries {
                if let (Some(text), Some(summarizer)) = (&transcript, &self.summarizer) {
                    match summarizer.summarize(text).await {
                        Ok(generated) => {
                            if let Err(e) = persist::save_summary(
                                &options.summary_dir,
                                &record.video_id,
                                &record.title,
                                &generated,
                            ) {
                                warn!(
                                    "Skipping {}: summary write failed: {}",
                                    record.video_id, e
                                );
                                observer.on_skipped(&record.video_id, "summary write failed");
                                continue;
                            }
                            summary = Some(generated);
                        }
                        Err(e) => {
                            // Non-fatal: record the video without a summary.
                            warn!("Summary generation failed for {}: {}", record.video_id, e);
                        }
                    }
                }
            }

            let item = ProcessedVideo {
                record,
                snippet,
                transcript,
                summary,
            };
            observer.on_video(&item);
            processed.push(item);
        }

        let csv_path = if processed.is_empty() {
            None
        } else {
            persist::export_csv(&processed, &options.output_path, &options.csv)?;
            Some(options.output_path.clone())
        };

        let transcripts_found = processed.iter().filter(|v| v.transcript.is_some()).count();
        let summaries_generated = processed.iter().filter(|v| v.summary.is_some()).count();
        info!(
            "Run finished: {} transcripts, {} summaries out of {} videos{}",
            transcripts_found,
            summaries_generated,
            processed.len(),
            if stopped { " (stopped early)" } else { "" }
        );

        Ok(RunReport {
            videos: processed,
            total,
            transcripts_found,
            summaries_generated,
            stopped,
            csv_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::PlaylistPage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakePlaylist {
        videos: Vec<VideoRecord>,
    }

    impl FakePlaylist {
        fn with_count(count: usize) -> Self {
            let videos = (0..count)
                .map(|n| VideoRecord {
                    title: format!("Video {}", n),
                    video_id: format!("vid{:08}", n),
                    description: format!("desc START part {} END", n),
                    published_at: None,
                })
                .collect();
            Self { videos }
        }
    }

    #[async_trait]
    impl PlaylistSource for FakePlaylist {
        async fn fetch_page(
            &self,
            _playlist_id: &str,
            _page_token: Option<&str>,
        ) -> Result<PlaylistPage> {
            Ok(PlaylistPage {
                videos: self.videos.clone(),
                next_page_token: None,
            })
        }

        async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoRecord>> {
            Ok(self.videos.iter().find(|v| v.video_id == video_id).cloned())
        }
    }

    /// Captions for every even-numbered video, counting fetches.
    struct FakeCaptions {
        fetches: AtomicUsize,
    }

    impl FakeCaptions {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CaptionSource for FakeCaptions {
        async fn fetch_captions(
            &self,
            video_id: &str,
            _language: &str,
        ) -> Result<Option<String>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let n: usize = video_id.trim_start_matches("vid").parse().unwrap();
            Ok((n % 2 == 0).then(|| format!("transcript for {}", video_id)))
        }
    }

    struct FakeSummarizer {
        fail: bool,
    }

    #[async_trait]
    impl SummaryProvider for FakeSummarizer {
        async fn summarize(&self, transcript: &str) -> Result<String> {
            if self.fail {
                return Err(SpillisteError::OpenAI("quota exceeded".to_string()));
            }
            Ok(format!("summary of: {}", transcript))
        }
    }

    /// Observer collecting processed videos, optionally pausing after the
    /// first item.
    struct RecordingObserver {
        seen: Mutex<Vec<String>>,
        pause_after_first: Option<Arc<RunControl>>,
    }

    impl RecordingObserver {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                pause_after_first: None,
            }
        }

        fn pausing(control: Arc<RunControl>) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                pause_after_first: Some(control),
            }
        }

        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl ProgressObserver for RecordingObserver {
        fn on_video(&self, video: &ProcessedVideo) {
            let mut seen = self.seen.lock().unwrap();
            seen.push(video.record.video_id.clone());
            if seen.len() == 1 {
                if let Some(control) = &self.pause_after_first {
                    control.pause();
                }
            }
        }
    }

    fn test_options(dir: &std::path::Path) -> RunOptions {
        RunOptions {
            fetch_transcripts: true,
            transcript_dir: dir.join("transcripts"),
            language: "ko".to_string(),
            generate_summaries: true,
            summary_dir: dir.join("summaries"),
            snippet_markers: Some(SnippetMarkers::new("START", "END")),
            output_path: dir.join("out.csv"),
            csv: CsvOptions {
                include_transcripts: true,
                include_summaries: true,
                sort_ascending: false,
            },
        }
    }

    fn test_pipeline(count: usize, fail_summaries: bool) -> (Pipeline, Arc<FakeCaptions>) {
        let captions = Arc::new(FakeCaptions::new());
        let pipeline = Pipeline::new(
            Arc::new(FakePlaylist::with_count(count)),
            captions.clone(),
            Some(Arc::new(FakeSummarizer {
                fail: fail_summaries,
            })),
        )
        .with_pause_poll(Duration::from_millis(10));
        (pipeline, captions)
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let (pipeline, _) = test_pipeline(3, false);
        let control = RunControl::new();

        let report = pipeline
            .run("PLtest0123456", &options, &control, &NullObserver)
            .await
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.videos.len(), 3);
        // Videos 0 and 2 have captions.
        assert_eq!(report.transcripts_found, 2);
        assert_eq!(report.summaries_generated, 2);
        assert!(!report.stopped);

        // Snippet extraction ran for every record.
        assert_eq!(report.videos[1].snippet.as_deref(), Some("part 1"));

        // Files landed on disk.
        assert!(dir
            .path()
            .join("transcripts/Video 0_vid00000000.txt")
            .exists());
        assert!(dir
            .path()
            .join("summaries/Video 2_vid00000002_summary.txt")
            .exists());
        assert!(report.csv_path.unwrap().exists());
    }

    #[tokio::test]
    async fn test_summary_failure_is_non_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let (pipeline, _) = test_pipeline(2, true);
        let control = RunControl::new();

        let report = pipeline
            .run("PLtest0123456", &options, &control, &NullObserver)
            .await
            .unwrap();

        assert_eq!(report.videos.len(), 2);
        assert_eq!(report.transcripts_found, 1);
        assert_eq!(report.summaries_generated, 0);
    }

    #[tokio::test]
    async fn test_invalid_input_processes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let (pipeline, captions) = test_pipeline(2, false);
        let control = RunControl::new();

        let result = pipeline
            .run("not a url", &options, &control, &NullObserver)
            .await;

        assert!(matches!(result, Err(SpillisteError::InvalidInput(_))));
        assert_eq!(captions.fetches.load(Ordering::SeqCst), 0);
        assert!(!options.output_path.exists());
    }

    #[tokio::test]
    async fn test_stop_before_first_item() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let (pipeline, captions) = test_pipeline(3, false);
        let control = RunControl::new();
        control.stop();

        let report = pipeline
            .run("PLtest0123456", &options, &control, &NullObserver)
            .await
            .unwrap();

        assert!(report.stopped);
        assert!(report.videos.is_empty());
        assert_eq!(captions.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pause_halts_before_next_item_and_resume_continues() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let (pipeline, captions) = test_pipeline(3, false);
        let pipeline = Arc::new(pipeline);
        let control = RunControl::new();

        let observer = Arc::new(RecordingObserver::pausing(control.clone()));

        let handle = {
            let pipeline = pipeline.clone();
            let options = options.clone();
            let control = control.clone();
            let observer = observer.clone();
            tokio::spawn(async move {
                pipeline
                    .run("PLtest0123456", &options, &control, observer.as_ref())
                    .await
            })
        };

        // The observer pauses after the first item; give the worker time to
        // hit the polling point and verify nothing further is processed.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(observer.count(), 1);
        let fetches_while_paused = captions.fetches.load(Ordering::SeqCst);

        control.resume();
        let report = handle.await.unwrap().unwrap();

        // Resumed from the same position: every video exactly once. The
        // captionless video 1 accounts for two calls (preferred + fallback).
        assert_eq!(report.videos.len(), 3);
        assert_eq!(observer.count(), 3);
        assert_eq!(fetches_while_paused, 1);
        assert_eq!(captions.fetches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_stop_while_paused_exits() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let (pipeline, _) = test_pipeline(3, false);
        let pipeline = Arc::new(pipeline);
        let control = RunControl::new();

        let observer = Arc::new(RecordingObserver::pausing(control.clone()));

        let handle = {
            let pipeline = pipeline.clone();
            let options = options.clone();
            let control = control.clone();
            let observer = observer.clone();
            tokio::spawn(async move {
                pipeline
                    .run("PLtest0123456", &options, &control, observer.as_ref())
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        control.stop();
        control.resume();
        let report = handle.await.unwrap().unwrap();

        assert!(report.stopped);
        assert_eq!(report.videos.len(), 1);
    }

    #[tokio::test]
    async fn test_single_video_input() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let (pipeline, _) = test_pipeline(3, false);
        let control = RunControl::new();

        let report = pipeline
            .run("vid00000002", &options, &control, &NullObserver)
            .await
            .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(report.videos[0].record.video_id, "vid00000002");
        assert_eq!(report.transcripts_found, 1);
    }
}
