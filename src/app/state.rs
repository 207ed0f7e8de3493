use crate::cache::load_recent_file;
use crate::config::AppConfig;
use crate::controls::LoopControls;
use crate::player::{AudioPlayer, PlayerState};
use crate::transcript::Lesson;
use iced::Task;
use iced::widget::scrollable::Id as ScrollId;
use once_cell::sync::Lazy;

use super::messages::Message;

/// Loop driver interval bounds; anything above ~250ms makes the re-seek
/// audible at the loop boundary.
pub(crate) const MIN_LOOP_TICK_MS: u64 = 50;
pub(crate) const MAX_LOOP_TICK_MS: u64 = 250;
pub(crate) static SENTENCE_SCROLL_ID: Lazy<ScrollId> =
    Lazy::new(|| ScrollId::new("sentence-scroll"));

/// Core application state. The practice screen is shown while `lesson` is
/// set; the browse screen otherwise.
pub struct App {
    pub(super) config: AppConfig,
    pub(super) url_input: String,
    pub(super) acquiring: bool,
    pub(super) acquire_progress: f32,
    pub(super) acquire_message: String,
    pub(super) error: Option<String>,
    pub(super) output_files: Vec<String>,
    pub(super) recent_file: Option<String>,
    pub(super) lesson: Option<Lesson>,
    pub(super) controls: LoopControls,
    pub(super) player: Option<AudioPlayer>,
    pub(super) last_player_state: PlayerState,
    pub(super) shift_held: bool,
    /// Bumped on every lesson change; stale audio fetches are dropped.
    pub(super) session_id: u64,
}

impl App {
    pub(super) fn bootstrap(config: AppConfig) -> (App, Task<Message>) {
        let mut config = config;
        config.loop_tick_ms = config.loop_tick_ms.clamp(MIN_LOOP_TICK_MS, MAX_LOOP_TICK_MS);

        let recent_file = load_recent_file(&config.server_url);
        if let Some(file) = &recent_file {
            tracing::info!(file, "Found last opened transcript in cache");
        }

        tracing::info!(
            server = %config.server_url,
            loop_tick_ms = config.loop_tick_ms,
            "Initialized app state"
        );

        let files_task = Self::refresh_files_task(config.server_url.clone());
        let app = App {
            config,
            url_input: String::new(),
            acquiring: false,
            acquire_progress: 0.0,
            acquire_message: String::new(),
            error: None,
            output_files: Vec::new(),
            recent_file,
            lesson: None,
            controls: LoopControls::new(),
            player: None,
            last_player_state: PlayerState::Paused,
            shift_held: false,
            session_id: 0,
        };

        (app, files_task)
    }

    pub fn theme_mode(&self) -> crate::config::ThemeMode {
        self.config.theme
    }

    /// Drop the current lesson, its player, and any armed loop.
    pub(super) fn teardown_session(&mut self) {
        self.controls.clear();
        self.player = None;
        self.lesson = None;
        self.last_player_state = PlayerState::Paused;
        self.session_id = self.session_id.wrapping_add(1);
    }
}
