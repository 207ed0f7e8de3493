use crate::acquire::AcquireEvent;
use crate::transcript::Lesson;
use iced::keyboard::Modifiers;
use std::time::Instant;

/// Messages emitted by the UI and by background tasks.
#[derive(Debug, Clone)]
pub enum Message {
    UrlInputChanged(String),
    SubmitUrl,
    Acquire(AcquireEvent),
    RefreshFiles,
    OutputFilesLoaded {
        files: Vec<String>,
        error: Option<String>,
    },
    LoadFile(String),
    FileLoaded {
        filename: String,
        lesson: Option<Box<Lesson>>,
        error: Option<String>,
    },
    AudioReady {
        session_id: u64,
        bytes: Vec<u8>,
    },
    AudioFailed {
        session_id: u64,
        error: String,
    },
    SentenceClicked(usize),
    PlaySelection,
    StopLoop,
    TogglePlayPause,
    BackToBrowse,
    ModifiersChanged(Modifiers),
    Tick(Instant),
}
