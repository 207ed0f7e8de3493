//! Sentence-loop playback controller.
//!
//! Owns the active selection and at most one armed loop over the current
//! lesson's sentences, and turns click / shift-click / play-selection / stop
//! gestures into seek and play commands against a [`PlayerPort`]. The loop
//! itself is driven externally: the app ticks [`LoopControls::tick`] on a
//! short fixed interval while a loop is armed, and the controller re-seeks to
//! the window start whenever the readback time crosses the window end.

use crate::player::{PlayerPort, PlayerState};
use crate::transcript::Sentence;
use tracing::{debug, info};

/// The user's current focus. Exactly one variant holds at a time; every
/// mutation goes through [`LoopControls`] so the two-nullable-fields failure
/// mode (single and range both set) cannot occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    None,
    Single(usize),
    /// Inclusive contiguous index range, `start <= end`.
    Range { start: usize, end: usize },
}

/// Time boundaries of an armed loop, fixed at arm time. The tick driver is a
/// function of these captured bounds only, never of the live selection, so
/// rapid consecutive clicks cannot race a stale window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopWindow {
    pub start: f64,
    pub end: f64,
}

/// Controller state: the lesson's sentences, the selection, and the single
/// optional armed loop. Player access is passed into each operation as
/// `Option<&P>`; while unbound (the audio is still being fetched) every
/// command is a silent no-op.
pub struct LoopControls {
    sentences: Vec<Sentence>,
    selection: Selection,
    active_loop: Option<LoopWindow>,
}

impl LoopControls {
    pub fn new() -> Self {
        Self {
            sentences: Vec::new(),
            selection: Selection::None,
            active_loop: None,
        }
    }

    /// Replace the transcript. Selection indices are only meaningful within
    /// one transcript instance, so this resets the selection and disarms any
    /// loop.
    pub fn set_sentences(&mut self, sentences: Vec<Sentence>) {
        info!(count = sentences.len(), "Loaded transcript into controls");
        self.sentences = sentences;
        self.selection = Selection::None;
        self.active_loop = None;
    }

    pub fn clear(&mut self) {
        self.set_sentences(Vec::new());
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn loop_active(&self) -> bool {
        self.active_loop.is_some()
    }

    /// Whether `index` is the single active sentence.
    pub fn is_active(&self, index: usize) -> bool {
        matches!(self.selection, Selection::Single(i) if i == index)
    }

    /// Whether `index` falls inside the selected range.
    pub fn is_in_range(&self, index: usize) -> bool {
        matches!(self.selection, Selection::Range { start, end } if start <= index && index <= end)
    }

    pub fn has_range(&self) -> bool {
        matches!(self.selection, Selection::Range { .. })
    }

    /// Handle a click on sentence `index`. A plain click makes it the single
    /// active sentence and loops it immediately; shift-click with a prior
    /// single selection marks the inclusive range between the two without
    /// touching playback (the range is looped later, on demand).
    pub fn on_sentence_click<P: PlayerPort>(
        &mut self,
        index: usize,
        shift_held: bool,
        player: Option<&P>,
    ) {
        let Some(player) = player else {
            debug!(index, "Ignoring click; player not bound yet");
            return;
        };
        self.stop_loop();

        if shift_held {
            if let Selection::Single(prev) = self.selection {
                let (start, end) = (prev.min(index), prev.max(index));
                info!(start, end, "Marked sentence range");
                self.selection = Selection::Range { start, end };
                return;
            }
        }

        let Some(sentence) = self.sentences.get(index) else {
            debug!(index, "Click outside transcript; ignoring");
            return;
        };
        let window = LoopWindow {
            start: sentence.start,
            end: sentence.end,
        };
        info!(index, start = window.start, end = window.end, "Looping sentence");
        self.selection = Selection::Single(index);
        player.seek_to(window.start, true);
        player.play();
        self.active_loop = Some(window);
    }

    /// Loop the currently selected range. No-op without a bound player or a
    /// range selection.
    pub fn play_selection<P: PlayerPort>(&mut self, player: Option<&P>) {
        let Some(player) = player else {
            debug!("Ignoring play-selection; player not bound yet");
            return;
        };
        let Selection::Range { start, end } = self.selection else {
            debug!("Ignoring play-selection; no range selected");
            return;
        };
        let (Some(first), Some(last)) = (self.sentences.get(start), self.sentences.get(end)) else {
            debug!(start, end, "Range outside transcript; ignoring");
            return;
        };
        let window = LoopWindow {
            start: first.start,
            end: last.end,
        };
        self.stop_loop();
        info!(start = window.start, end = window.end, "Looping selected range");
        player.seek_to(window.start, true);
        player.play();
        self.active_loop = Some(window);
    }

    /// Disarm the loop if one is armed. Idempotent; leaves the selection
    /// untouched.
    pub fn stop_loop(&mut self) {
        if self.active_loop.take().is_some() {
            debug!("Loop disarmed");
        }
    }

    /// One driver tick: if a loop is armed and the player has crossed the
    /// window end, seek back to the window start. Playback continues without
    /// an explicit play call since the player is already playing.
    pub fn tick<P: PlayerPort>(&mut self, player: Option<&P>) {
        let (Some(window), Some(player)) = (self.active_loop, player) else {
            return;
        };
        let now = player.current_time();
        if now >= window.end {
            debug!(now, start = window.start, "Loop boundary crossed; re-seeking");
            player.seek_to(window.start, true);
        }
    }

    /// Player state notification. Pausing or ending playback disarms the
    /// loop; otherwise an orphaned tick would keep seeking a paused player
    /// back to the window start.
    pub fn on_player_state(&mut self, state: PlayerState) {
        if matches!(state, PlayerState::Paused | PlayerState::Ended) && self.loop_active() {
            info!(?state, "Player stopped; disarming loop");
            self.stop_loop();
        }
    }

    /// Progress through the transcript as a percentage of the furthest
    /// selected sentence. Derived only; 0 for an empty transcript or no
    /// selection.
    pub fn progress_percent(&self) -> f32 {
        if self.sentences.is_empty() {
            return 0.0;
        }
        let furthest = match self.selection {
            Selection::Range { end, .. } => end,
            Selection::Single(index) => index,
            Selection::None => return 0.0,
        };
        (furthest as f32 + 1.0) / self.sentences.len() as f32 * 100.0
    }
}

impl Default for LoopControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scripted player: time and state are set by the test, commands are
    /// recorded. Seeks also move the scripted clock, like a real player.
    struct FakePlayer {
        time: Cell<f64>,
        state: Cell<PlayerState>,
        seeks: RefCell<Vec<f64>>,
        plays: Cell<usize>,
    }

    impl FakePlayer {
        fn new() -> Self {
            Self {
                time: Cell::new(0.0),
                state: Cell::new(PlayerState::Paused),
                seeks: RefCell::new(Vec::new()),
                plays: Cell::new(0),
            }
        }

        fn seek_count(&self) -> usize {
            self.seeks.borrow().len()
        }
    }

    impl PlayerPort for FakePlayer {
        fn seek_to(&self, seconds: f64, _exact: bool) {
            self.seeks.borrow_mut().push(seconds);
            self.time.set(seconds);
        }

        fn play(&self) {
            self.plays.set(self.plays.get() + 1);
            self.state.set(PlayerState::Playing);
        }

        fn pause(&self) {
            self.state.set(PlayerState::Paused);
        }

        fn current_time(&self) -> f64 {
            self.time.get()
        }

        fn state(&self) -> PlayerState {
            self.state.get()
        }
    }

    fn sentences(n: usize) -> Vec<Sentence> {
        (0..n)
            .map(|i| Sentence {
                text: format!("Sentence {i}."),
                start: i as f64 * 5.0,
                end: i as f64 * 5.0 + 5.0,
            })
            .collect()
    }

    fn controls_with(n: usize) -> LoopControls {
        let mut controls = LoopControls::new();
        controls.set_sentences(sentences(n));
        controls
    }

    #[test]
    fn plain_click_selects_seeks_plays_and_arms_loop() {
        let mut controls = controls_with(4);
        let player = FakePlayer::new();

        controls.on_sentence_click(2, false, Some(&player));

        assert_eq!(controls.selection(), Selection::Single(2));
        assert_eq!(*player.seeks.borrow(), vec![10.0]);
        assert_eq!(player.plays.get(), 1);
        assert!(controls.loop_active());
    }

    #[test]
    fn unbound_player_makes_every_command_a_no_op() {
        let mut controls = controls_with(4);

        controls.on_sentence_click(1, false, None::<&FakePlayer>);
        controls.play_selection(None::<&FakePlayer>);
        controls.tick(None::<&FakePlayer>);

        assert_eq!(controls.selection(), Selection::None);
        assert!(!controls.loop_active());
    }

    #[test]
    fn shift_click_after_single_builds_range_in_either_order() {
        let mut controls = controls_with(10);
        let player = FakePlayer::new();

        // shift-click with no prior single acts like a plain click.
        controls.on_sentence_click(3, true, Some(&player));
        assert_eq!(controls.selection(), Selection::Single(3));

        controls.on_sentence_click(7, false, Some(&player));
        assert_eq!(controls.selection(), Selection::Single(7));

        controls.on_sentence_click(3, true, Some(&player));
        assert_eq!(controls.selection(), Selection::Range { start: 3, end: 7 });
    }

    #[test]
    fn range_selection_is_inert() {
        let mut controls = controls_with(10);
        let player = FakePlayer::new();

        controls.on_sentence_click(1, false, Some(&player));
        let seeks_before = player.seek_count();
        let plays_before = player.plays.get();

        controls.on_sentence_click(5, true, Some(&player));

        // Marking the range issues no playback commands and disarms the loop.
        assert_eq!(player.seek_count(), seeks_before);
        assert_eq!(player.plays.get(), plays_before);
        assert!(!controls.loop_active());
    }

    #[test]
    fn at_most_one_loop_across_rapid_clicks() {
        let mut controls = controls_with(4);
        let player = FakePlayer::new();

        controls.on_sentence_click(0, false, Some(&player));
        controls.on_sentence_click(3, false, Some(&player));

        // Only the second window drives ticks: boundary of sentence 3 is
        // [15, 20]; sentence 0's end (5.0) must not trigger anything.
        player.time.set(5.0);
        controls.tick(Some(&player));
        assert_eq!(*player.seeks.borrow(), vec![0.0, 15.0]);

        player.time.set(20.0);
        controls.tick(Some(&player));
        assert_eq!(player.seeks.borrow().last().copied(), Some(15.0));
    }

    #[test]
    fn tick_seeks_exactly_once_per_boundary_crossing() {
        let mut controls = controls_with(4);
        let player = FakePlayer::new();
        // Sentence 2 spans [10, 15].
        controls.on_sentence_click(2, false, Some(&player));
        assert_eq!(player.seek_count(), 1);

        player.time.set(12.0);
        controls.tick(Some(&player));
        assert_eq!(player.seek_count(), 1);

        player.time.set(15.3);
        controls.tick(Some(&player));
        assert_eq!(player.seek_count(), 2);
        assert_eq!(player.seeks.borrow().last().copied(), Some(10.0));

        // The seek moved the clock back below the boundary; no re-seek until
        // it is crossed again.
        controls.tick(Some(&player));
        controls.tick(Some(&player));
        assert_eq!(player.seek_count(), 2);
    }

    #[test]
    fn play_selection_loops_over_range_bounds() {
        let mut controls = controls_with(10);
        let player = FakePlayer::new();

        controls.on_sentence_click(2, false, Some(&player));
        controls.on_sentence_click(5, true, Some(&player));
        controls.play_selection(Some(&player));

        // Range [2, 5] spans time [10, 30].
        assert!(controls.loop_active());
        assert_eq!(player.seeks.borrow().last().copied(), Some(10.0));

        player.time.set(30.0);
        controls.tick(Some(&player));
        assert_eq!(player.seeks.borrow().last().copied(), Some(10.0));
        assert_eq!(player.seek_count(), 3);
    }

    #[test]
    fn play_selection_without_range_is_a_no_op() {
        let mut controls = controls_with(4);
        let player = FakePlayer::new();

        controls.play_selection(Some(&player));
        assert_eq!(player.seek_count(), 0);
        assert!(!controls.loop_active());

        controls.on_sentence_click(1, false, Some(&player));
        let seeks = player.seek_count();
        controls.play_selection(Some(&player));
        assert_eq!(player.seek_count(), seeks);
    }

    #[test]
    fn pause_and_ended_disarm_the_loop() {
        for state in [PlayerState::Paused, PlayerState::Ended] {
            let mut controls = controls_with(4);
            let player = FakePlayer::new();
            controls.on_sentence_click(1, false, Some(&player));
            assert!(controls.loop_active());

            controls.on_player_state(state);
            assert!(!controls.loop_active());

            // Subsequent ticks past the boundary must not seek.
            let seeks = player.seek_count();
            player.time.set(100.0);
            controls.tick(Some(&player));
            controls.tick(Some(&player));
            assert_eq!(player.seek_count(), seeks);
        }
    }

    #[test]
    fn stop_loop_is_idempotent_and_keeps_selection() {
        let mut controls = controls_with(4);
        let player = FakePlayer::new();
        controls.on_sentence_click(1, false, Some(&player));

        controls.stop_loop();
        controls.stop_loop();
        assert!(!controls.loop_active());
        assert_eq!(controls.selection(), Selection::Single(1));
    }

    #[test]
    fn progress_tracks_furthest_selected_index() {
        let mut controls = controls_with(8);
        let player = FakePlayer::new();

        assert_eq!(controls.progress_percent(), 0.0);

        controls.on_sentence_click(3, false, Some(&player));
        assert_eq!(controls.progress_percent(), 50.0);

        // Range progress depends only on the range end, not its start.
        controls.on_sentence_click(5, true, Some(&player));
        assert_eq!(controls.progress_percent(), 75.0);
        assert_eq!(controls.selection(), Selection::Range { start: 3, end: 5 });
    }

    #[test]
    fn empty_transcript_always_reports_zero_progress() {
        let mut controls = LoopControls::new();
        assert_eq!(controls.progress_percent(), 0.0);

        // Clicks against an empty transcript do nothing.
        let player = FakePlayer::new();
        controls.on_sentence_click(0, false, Some(&player));
        assert_eq!(controls.progress_percent(), 0.0);
        assert_eq!(player.seek_count(), 0);
    }

    #[test]
    fn replacing_transcript_resets_selection_and_loop() {
        let mut controls = controls_with(6);
        let player = FakePlayer::new();
        controls.on_sentence_click(4, false, Some(&player));
        assert!(controls.loop_active());

        controls.set_sentences(sentences(3));
        assert_eq!(controls.selection(), Selection::None);
        assert!(!controls.loop_active());
        assert_eq!(controls.progress_percent(), 0.0);

        // Teardown: after clearing, fake-clock advancement produces no calls.
        controls.clear();
        let seeks = player.seek_count();
        player.time.set(1_000.0);
        controls.tick(Some(&player));
        assert_eq!(player.seek_count(), seeks);
    }
}
