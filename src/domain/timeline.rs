// Timeline - linear undo/redo over immutable scoring snapshots
use serde::{Deserialize, Serialize};

use super::history::HistoryEntry;
use super::scoring::ScoreState;

/// Immutable capture of everything undo/redo restores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player1: i32,
    pub player2: i32,
    pub p1_set_wins: Vec<bool>,
    pub p2_set_wins: Vec<bool>,
    pub p1_show_warning: bool,
    pub p2_show_warning: bool,
    pub match_history: Vec<HistoryEntry>,
    pub current_game_number: u32,
}

impl Snapshot {
    pub fn initial() -> Self {
        Self {
            current_game_number: 1,
            ..Self::default()
        }
    }

    pub fn capture(state: &ScoreState) -> Self {
        Self {
            player1: state.p1.score,
            player2: state.p2.score,
            p1_set_wins: state.p1.set_wins.clone(),
            p2_set_wins: state.p2.set_wins.clone(),
            p1_show_warning: state.p1.show_warning,
            p2_show_warning: state.p2.show_warning,
            match_history: state.match_history.clone(),
            current_game_number: state.current_game_number,
        }
    }

    pub fn restore_into(&self, state: &mut ScoreState) {
        state.p1.score = self.player1;
        state.p2.score = self.player2;
        state.p1.set_wins = self.p1_set_wins.clone();
        state.p2.set_wins = self.p2_set_wins.clone();
        state.p1.show_warning = self.p1_show_warning;
        state.p2.show_warning = self.p2_show_warning;
        state.match_history = self.match_history.clone();
        state.current_game_number = self.current_game_number.max(1);
        state.winning_chip = None;
    }

    fn same_scores(&self, other: &Snapshot) -> bool {
        self.player1 == other.player1 && self.player2 == other.player2
    }

    fn same_set_lengths(&self, other: &Snapshot) -> bool {
        self.p1_set_wins.len() == other.p1_set_wins.len()
            && self.p2_set_wins.len() == other.p2_set_wins.len()
    }
}

/// What a snapshot looks like next to its predecessor. Undo steps over the
/// bookkeeping shapes so one undo reverts one user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotShape {
    /// Scores zeroed with sets already played: the start of a next game.
    ResetState,
    /// Scores unchanged but a set was recorded.
    MatchConclusion,
    /// Scores and set counts unchanged.
    DuplicateGameEnd,
    Plain,
}

impl SnapshotShape {
    pub fn classify(current: &Snapshot, previous: &Snapshot) -> Self {
        let sets_played = !current.p1_set_wins.is_empty() || !current.p2_set_wins.is_empty();
        if current.player1 == 0 && current.player2 == 0 && sets_played {
            SnapshotShape::ResetState
        } else if current.same_scores(previous) && !current.same_set_lengths(previous) {
            SnapshotShape::MatchConclusion
        } else if current.same_scores(previous) {
            SnapshotShape::DuplicateGameEnd
        } else {
            SnapshotShape::Plain
        }
    }

    fn skips_predecessor(&self) -> bool {
        !matches!(self, SnapshotShape::Plain)
    }
}

/// Cancellation token for the deferred next-game transition.
///
/// Each arm bumps an epoch; the transition only runs if its epoch is still
/// the armed one when it fires.
#[derive(Debug, Default)]
pub struct PendingReset {
    epoch: u64,
    armed: Option<u64>,
}

impl PendingReset {
    pub fn arm(&mut self) -> u64 {
        self.epoch += 1;
        self.armed = Some(self.epoch);
        self.epoch
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_epoch(&self) -> Option<u64> {
        self.armed
    }

    /// Returns true if a transition was pending.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    /// Consumes the token from the firing timer. False if it was cancelled or superseded.
    pub fn fire(&mut self, epoch: u64) -> bool {
        if self.armed != Some(epoch) {
            return false;
        }
        self.armed = None;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    snapshots: Vec<Snapshot>,
    index: usize,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            snapshots: vec![Snapshot::initial()],
            index: 0,
        }
    }
}

impl Timeline {
    /// Rebuilds a timeline from stored parts. An empty list starts over and an
    /// out-of-range cursor is clamped to the last snapshot.
    pub fn from_parts(snapshots: Vec<Snapshot>, index: usize) -> Self {
        if snapshots.is_empty() {
            return Self::default();
        }
        let index = index.min(snapshots.len() - 1);
        Self { snapshots, index }
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.index]
    }

    pub fn undo_disabled(&self) -> bool {
        self.index == 0
    }

    pub fn redo_disabled(&self) -> bool {
        self.index + 1 >= self.snapshots.len()
    }

    /// Drops any redo branch and appends `snapshot` as the new end.
    pub fn save(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        self.index = self.snapshots.len() - 1;
    }

    /// Steps back, skipping bookkeeping snapshots, and cancels any pending
    /// next-game transition. Returns the snapshot to restore.
    pub fn undo(&mut self, pending: &mut PendingReset) -> Option<&Snapshot> {
        if self.index == 0 {
            return None;
        }

        pending.cancel();

        let shape = SnapshotShape::classify(
            &self.snapshots[self.index],
            &self.snapshots[self.index - 1],
        );
        if shape.skips_predecessor() && self.index > 1 {
            self.index -= 2;
        } else {
            self.index -= 1;
        }

        tracing::debug!(?shape, index = self.index, "undo");
        self.snapshots.get(self.index)
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.redo_disabled() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
