//! The player capability consumed by the loop controller, and its
//! rodio-backed implementation over the backend's extracted audio track.

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Discrete states the player reports. The controller only reacts to
/// `Paused` and `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
    Ended,
}

/// What the loop controller needs from a player: issue seeks and plays, and
/// read back time and state. Implemented by [`AudioPlayer`] in the app and by
/// a scripted fake in the controller tests.
pub trait PlayerPort {
    /// Seek to an absolute position in seconds. `exact` mirrors the consumed
    /// capability's signature; implementations that only do exact seeks may
    /// ignore it.
    fn seek_to(&self, seconds: f64, exact: bool);
    fn play(&self);
    fn pause(&self);
    /// Current playback position in seconds, monotonic while playing.
    fn current_time(&self) -> f64;
    fn state(&self) -> PlayerState;
}

/// Resume playback, restarting from the top if the source already ran out.
/// An ended player has nothing queued, so a bare `play()` would flip state
/// without producing audio; seeking first re-queues the source.
pub fn resume_playback<P: PlayerPort>(player: &P) {
    if matches!(player.state(), PlayerState::Ended) {
        player.seek_to(0.0, true);
    }
    player.play();
}

/// Plays the extracted audio track of the current lesson through a rodio
/// sink. The decoded source lives in memory; it is re-appended if a seek
/// arrives after the sink ran dry, so clicking a sentence after the audio
/// ended restarts playback.
pub struct AudioPlayer {
    _stream: OutputStream,
    sink: Sink,
    bytes: Vec<u8>,
}

impl AudioPlayer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (_stream, handle) = OutputStream::try_default().context("Opening audio output")?;
        let sink = Sink::try_new(&handle).context("Creating sink")?;
        let source = Decoder::new(Cursor::new(bytes.clone())).context("Decoding lesson audio")?;
        sink.append(source);
        sink.pause();
        info!(len = bytes.len(), "Audio player ready");
        Ok(Self {
            _stream,
            sink,
            bytes,
        })
    }
}

impl PlayerPort for AudioPlayer {
    fn seek_to(&self, seconds: f64, _exact: bool) {
        if self.sink.empty() {
            match Decoder::new(Cursor::new(self.bytes.clone())) {
                Ok(source) => self.sink.append(source),
                Err(err) => {
                    warn!("Failed to re-decode audio after end: {err}");
                    return;
                }
            }
        }
        let target = Duration::from_secs_f64(seconds.max(0.0));
        if let Err(err) = self.sink.try_seek(target) {
            // The next loop tick retries; a missed seek is not fatal.
            warn!(seconds, "Seek failed: {err:?}");
        }
    }

    fn play(&self) {
        debug!("Resuming audio");
        self.sink.play();
    }

    fn pause(&self) {
        debug!("Pausing audio");
        self.sink.pause();
    }

    fn current_time(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    fn state(&self) -> PlayerState {
        if self.sink.empty() {
            PlayerState::Ended
        } else if self.sink.is_paused() {
            PlayerState::Paused
        } else {
            PlayerState::Playing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct ScriptedPlayer {
        state: Cell<PlayerState>,
        seeks: RefCell<Vec<f64>>,
        plays: Cell<usize>,
    }

    impl ScriptedPlayer {
        fn with_state(state: PlayerState) -> Self {
            Self {
                state: Cell::new(state),
                seeks: RefCell::new(Vec::new()),
                plays: Cell::new(0),
            }
        }
    }

    impl PlayerPort for ScriptedPlayer {
        fn seek_to(&self, seconds: f64, _exact: bool) {
            self.seeks.borrow_mut().push(seconds);
            // Seeking an ended player re-queues its source.
            self.state.set(PlayerState::Paused);
        }

        fn play(&self) {
            self.plays.set(self.plays.get() + 1);
            self.state.set(PlayerState::Playing);
        }

        fn pause(&self) {
            self.state.set(PlayerState::Paused);
        }

        fn current_time(&self) -> f64 {
            0.0
        }

        fn state(&self) -> PlayerState {
            self.state.get()
        }
    }

    #[test]
    fn resume_after_end_rewinds_before_playing() {
        let player = ScriptedPlayer::with_state(PlayerState::Ended);
        resume_playback(&player);
        assert_eq!(*player.seeks.borrow(), vec![0.0]);
        assert_eq!(player.plays.get(), 1);
        assert_eq!(player.state(), PlayerState::Playing);
    }

    #[test]
    fn resume_from_pause_does_not_seek() {
        let player = ScriptedPlayer::with_state(PlayerState::Paused);
        resume_playback(&player);
        assert!(player.seeks.borrow().is_empty());
        assert_eq!(player.plays.get(), 1);
    }
}
