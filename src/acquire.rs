//! HTTP client for the extraction backend.
//!
//! The backend answers `POST /process` with a `text/event-stream` of
//! `data: <json>` frames: progress updates, then either one `final_data`
//! frame or one `error` frame. The stream is pumped on a worker thread into a
//! futures channel whose receiver the app consumes as an `iced` stream. The
//! remaining endpoints (saved-file list, saved-file load, extracted audio)
//! are single blocking requests.

use crate::transcript::{Lesson, clean_sentences, normalize_lesson};
use anyhow::{Context, Result, anyhow};
use iced::futures::channel::{mpsc, oneshot};
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Events surfaced to the UI while the backend processes a video URL.
#[derive(Debug, Clone)]
pub enum AcquireEvent {
    Progress { percent: f32, message: String },
    Finished(Box<Lesson>),
    Failed(String),
}

/// One decoded `data:` frame. The producer may combine fields (the final
/// frame also carries `progress: 100`), so precedence is fixed here:
/// error, then progress, then final data.
#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    final_data: Option<Lesson>,
}

/// Run a blocking backend call on its own thread and await the result.
///
/// The app's background tasks execute on the GUI runtime's async workers,
/// where reqwest's blocking client refuses to run (it tears down its internal
/// runtime, which panics inside an async context). Every blocking call below
/// must go through here when invoked from a task.
pub async fn run_blocking<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        let _ = tx.send(job());
    });
    rx.await
        .map_err(|_| anyhow!("Backend worker thread dropped its result"))?
}

/// Kick off processing of `video_url` and stream acquisition events back.
/// The request deliberately has no timeout: audio and subtitle extraction
/// take minutes on the backend.
pub fn process_video(server_url: &str, video_url: &str) -> mpsc::UnboundedReceiver<AcquireEvent> {
    let (tx, rx) = mpsc::unbounded();
    let endpoint = format!("{server_url}/process");
    let body = serde_json::json!({ "video_url": video_url }).to_string();

    thread::spawn(move || {
        info!(%endpoint, "Starting video processing request");
        let response = reqwest::blocking::Client::builder()
            .timeout(Option::<Duration>::None)
            .build()
            .context("Building HTTP client")
            .and_then(|client| {
                client
                    .post(&endpoint)
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body)
                    .send()
                    .context("Sending process request")
            });

        match response {
            Ok(response) => pump_frames(BufReader::new(response), &tx),
            Err(err) => {
                warn!("Process request failed: {err:#}");
                let _ = tx.unbounded_send(AcquireEvent::Failed(format!("{err:#}")));
            }
        }
    });

    rx
}

/// Read `data:` frames off an event stream until a terminal frame arrives.
/// Factored over `BufRead` so tests can pump in-memory streams.
fn pump_frames<R: BufRead>(reader: R, tx: &mpsc::UnboundedSender<AcquireEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("Event stream read failed: {err}");
                let _ = tx.unbounded_send(AcquireEvent::Failed(err.to_string()));
                return;
            }
        };

        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() {
            continue;
        }

        let frame: Frame = match serde_json::from_str(payload) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("Skipping malformed frame: {err}");
                continue;
            }
        };

        if let Some(error) = frame.error {
            warn!(%error, "Backend reported processing error");
            let _ = tx.unbounded_send(AcquireEvent::Failed(error));
            return;
        }
        if let Some(progress) = frame.progress {
            debug!(progress, "Processing progress");
            let _ = tx.unbounded_send(AcquireEvent::Progress {
                percent: progress.clamp(0.0, 100.0) as f32,
                message: frame.message.unwrap_or_default(),
            });
        }
        if let Some(lesson) = frame.final_data {
            info!(
                video_id = %lesson.video_id,
                sentences = lesson.sentences.len(),
                "Processing finished"
            );
            let _ = tx.unbounded_send(AcquireEvent::Finished(Box::new(clean_sentences(lesson))));
            return;
        }
    }

    let _ = tx.unbounded_send(AcquireEvent::Failed(
        "Stream ended without providing final data.".to_string(),
    ));
}

/// List the saved `.json` transcript files on the backend.
pub fn fetch_output_files(server_url: &str) -> Result<Vec<String>> {
    let url = format!("{server_url}/api/output-files");
    let text = reqwest::blocking::get(&url)
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("Fetching {url}"))?
        .text()?;
    let files: Vec<String> = serde_json::from_str(&text).context("Parsing file list")?;
    debug!(count = files.len(), "Fetched output file list");
    Ok(files)
}

/// Load one saved transcript file and normalize it to a [`Lesson`].
pub fn load_output_file(server_url: &str, filename: &str) -> Result<Lesson> {
    let url = format!("{server_url}/output/{filename}");
    let text = reqwest::blocking::get(&url)
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("Fetching {url}"))?
        .text()?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Parsing saved file {filename}"))?;
    normalize_lesson(filename, raw)
}

/// Fetch the extracted audio track for the most recently processed video.
pub fn fetch_audio(server_url: &str) -> Result<Vec<u8>> {
    let url = format!("{server_url}/audio.mp3");
    let response = reqwest::blocking::get(&url)
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("Fetching {url}"))?;
    let bytes = response.bytes()?.to_vec();
    if bytes.is_empty() {
        return Err(anyhow!("Audio track is empty"));
    }
    info!(len = bytes.len(), "Fetched lesson audio");
    Ok(bytes)
}
