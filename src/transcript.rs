//! Lesson payloads produced by the extraction backend, plus normalization of
//! the legacy saved-file shape (a bare array of sentences) into the canonical
//! payload object.

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// One timestamped transcript unit. Index position within the owning lesson
/// is the sentence's identity for selection purposes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Sentence {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Canonical lesson payload: one processed video and its sentence transcript.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub video_id: String,
    pub sentences: Vec<Sentence>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Saved files ended in `_<video id>.json` once titles started being encoded
/// into filenames; older files used arbitrary names.
static VIDEO_ID_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_([a-zA-Z0-9-]{11})\.json$").expect("static regex"));

/// Normalize a raw saved-file value into a [`Lesson`].
///
/// Two shapes are accepted: a bare JSON array of sentences (legacy; the video
/// id is recovered from the filename suffix and the title is the filename with
/// that suffix stripped), or the canonical payload object carrying `videoId`
/// and `sentences`. Anything else is rejected.
pub fn normalize_lesson(filename: &str, raw: serde_json::Value) -> Result<Lesson> {
    let lesson = if looks_like_sentence_array(&raw) {
        let sentences: Vec<Sentence> = serde_json::from_value(raw)?;
        let video_id = VIDEO_ID_SUFFIX
            .captures(filename)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let title = VIDEO_ID_SUFFIX.replace(filename, "").into_owned();
        debug!(filename, %video_id, "Normalized legacy sentence-array file");
        Lesson {
            video_id,
            sentences,
            title: Some(title),
            original_url: None,
            filename: Some(filename.to_string()),
        }
    } else if raw.get("videoId").is_some() && raw.get("sentences").is_some() {
        serde_json::from_value(raw)?
    } else {
        bail!("Unsupported file format: {filename}");
    };

    Ok(clean_sentences(lesson))
}

fn looks_like_sentence_array(raw: &serde_json::Value) -> bool {
    match raw.as_array() {
        Some(items) => items.iter().all(|item| {
            item.get("text").is_some() && item.get("start").is_some() && item.get("end").is_some()
        }),
        None => false,
    }
}

/// Auto-subtitle extraction emits decomposed unicode sequences; render-facing
/// text is NFC-normalized once on load.
pub fn clean_sentences(mut lesson: Lesson) -> Lesson {
    for sentence in &mut lesson.sentences {
        sentence.text = sentence.text.nfc().collect::<String>().trim().to_string();
    }
    lesson
}
