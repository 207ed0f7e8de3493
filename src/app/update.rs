use super::messages::Message;
use super::state::App;
use crate::acquire::{self, AcquireEvent};
use crate::cache::save_recent_file;
use crate::player::{AudioPlayer, PlayerPort, PlayerState};
use crate::transcript::Lesson;
use iced::{Event, Subscription, Task, keyboard, time};
use std::time::Duration;
use tracing::{debug, info, warn};

impl App {
    pub fn subscription(app: &App) -> Subscription<Message> {
        let modifiers = iced::event::listen_with(|event, _status, _window| match event {
            Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                Some(Message::ModifiersChanged(modifiers))
            }
            _ => None,
        });

        if app.controls.loop_active() {
            let tick = time::every(Duration::from_millis(app.config.loop_tick_ms))
                .map(Message::Tick);
            Subscription::batch([modifiers, tick])
        } else {
            modifiers
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::UrlInputChanged(url) => {
                self.url_input = url;
                Task::none()
            }
            Message::SubmitUrl => {
                let url = self.url_input.trim().to_string();
                if url.is_empty() || self.acquiring {
                    return Task::none();
                }
                info!(%url, "Submitting video for processing");
                self.acquiring = true;
                self.acquire_progress = 0.0;
                self.acquire_message.clear();
                self.error = None;
                Task::run(
                    acquire::process_video(&self.config.server_url, &url),
                    Message::Acquire,
                )
            }
            Message::Acquire(event) => self.handle_acquire_event(event),
            Message::RefreshFiles => Self::refresh_files_task(self.config.server_url.clone()),
            Message::OutputFilesLoaded { files, error } => {
                if let Some(error) = error {
                    warn!(%error, "Failed to list output files");
                    self.error = Some(error);
                } else {
                    debug!(count = files.len(), "Output file list updated");
                    self.output_files = files;
                }
                Task::none()
            }
            Message::LoadFile(filename) => {
                if self.acquiring {
                    return Task::none();
                }
                info!(%filename, "Loading saved transcript");
                self.error = None;
                let server = self.config.server_url.clone();
                Task::perform(
                    async move {
                        let loaded = {
                            let filename = filename.clone();
                            acquire::run_blocking(move || {
                                acquire::load_output_file(&server, &filename)
                            })
                            .await
                        };
                        match loaded {
                            Ok(lesson) => Message::FileLoaded {
                                filename,
                                lesson: Some(Box::new(lesson)),
                                error: None,
                            },
                            Err(err) => Message::FileLoaded {
                                filename,
                                lesson: None,
                                error: Some(format!("{err:#}")),
                            },
                        }
                    },
                    |msg| msg,
                )
            }
            Message::FileLoaded {
                filename,
                lesson,
                error,
            } => match (lesson, error) {
                (Some(lesson), _) => {
                    save_recent_file(&self.config.server_url, &filename);
                    self.recent_file = Some(filename);
                    self.install_lesson(*lesson)
                }
                (None, error) => {
                    let error =
                        error.unwrap_or_else(|| format!("Failed to load {filename}"));
                    warn!(%filename, %error, "Saved transcript rejected");
                    self.error = Some(error);
                    Task::none()
                }
            },
            Message::AudioReady { session_id, bytes } => {
                if session_id != self.session_id {
                    debug!(session_id, current = self.session_id, "Ignoring stale audio");
                    return Task::none();
                }
                match AudioPlayer::from_bytes(bytes) {
                    Ok(player) => {
                        self.last_player_state = player.state();
                        self.player = Some(player);
                    }
                    Err(err) => {
                        warn!("Failed to open audio player: {err:#}");
                        self.error = Some(format!("{err:#}"));
                    }
                }
                Task::none()
            }
            Message::AudioFailed { session_id, error } => {
                if session_id != self.session_id {
                    debug!(session_id, "Ignoring stale audio failure");
                    return Task::none();
                }
                warn!(%error, "Audio fetch failed");
                self.error = Some(error);
                Task::none()
            }
            Message::SentenceClicked(index) => {
                self.controls
                    .on_sentence_click(index, self.shift_held, self.player.as_ref());
                Task::none()
            }
            Message::PlaySelection => {
                self.controls.play_selection(self.player.as_ref());
                Task::none()
            }
            Message::StopLoop => {
                self.controls.stop_loop();
                Task::none()
            }
            Message::TogglePlayPause => {
                if let Some(player) = &self.player {
                    match player.state() {
                        PlayerState::Playing => {
                            player.pause();
                            self.controls.on_player_state(PlayerState::Paused);
                            self.last_player_state = PlayerState::Paused;
                        }
                        PlayerState::Paused | PlayerState::Ended => {
                            crate::player::resume_playback(player);
                            self.last_player_state = PlayerState::Playing;
                        }
                    }
                }
                Task::none()
            }
            Message::BackToBrowse => {
                info!("Returning to browse screen");
                self.teardown_session();
                self.error = None;
                Self::refresh_files_task(self.config.server_url.clone())
            }
            Message::ModifiersChanged(modifiers) => {
                self.shift_held = modifiers.shift();
                Task::none()
            }
            Message::Tick(_now) => {
                if let Some(player) = &self.player {
                    // Deliver state transitions before the boundary check so a
                    // pause cancels the loop instead of being seeked over.
                    let state = player.state();
                    if state != self.last_player_state {
                        debug!(?state, "Player state changed");
                        self.controls.on_player_state(state);
                        self.last_player_state = state;
                    }
                }
                self.controls.tick(self.player.as_ref());
                Task::none()
            }
        }
    }

    fn handle_acquire_event(&mut self, event: AcquireEvent) -> Task<Message> {
        match event {
            AcquireEvent::Progress { percent, message } => {
                self.acquire_progress = percent;
                self.acquire_message = message;
                Task::none()
            }
            AcquireEvent::Finished(lesson) => {
                self.acquiring = false;
                // Processing saved a new file on the backend; refresh the list
                // so it shows up once the user returns to browse.
                let refresh = Self::refresh_files_task(self.config.server_url.clone());
                let install = self.install_lesson(*lesson);
                Task::batch([install, refresh])
            }
            AcquireEvent::Failed(error) => {
                warn!(%error, "Acquisition failed");
                self.acquiring = false;
                self.error = Some(error);
                Task::none()
            }
        }
    }

    /// Swap in a freshly loaded lesson and fetch its audio track. The player
    /// stays unbound until the audio arrives; clicks no-op in the meantime.
    fn install_lesson(&mut self, lesson: Lesson) -> Task<Message> {
        info!(
            video_id = %lesson.video_id,
            title = lesson.title.as_deref().unwrap_or(""),
            sentences = lesson.sentences.len(),
            "Installing lesson"
        );
        self.teardown_session();
        self.controls.set_sentences(lesson.sentences.clone());
        self.lesson = Some(lesson);

        let session_id = self.session_id;
        let server = self.config.server_url.clone();
        Task::perform(
            async move {
                match acquire::run_blocking(move || acquire::fetch_audio(&server)).await {
                    Ok(bytes) => Message::AudioReady { session_id, bytes },
                    Err(err) => Message::AudioFailed {
                        session_id,
                        error: format!("{err:#}"),
                    },
                }
            },
            |msg| msg,
        )
    }

    pub(super) fn refresh_files_task(server: String) -> Task<Message> {
        Task::perform(
            async move {
                match acquire::run_blocking(move || acquire::fetch_output_files(&server)).await {
                    Ok(files) => Message::OutputFilesLoaded { files, error: None },
                    Err(err) => Message::OutputFilesLoaded {
                        files: Vec::new(),
                        error: Some(format!("{err:#}")),
                    },
                }
            },
            |msg| msg,
        )
    }
}
