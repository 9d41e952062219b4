//! Game state machine
//!
//! Sequences spawn, player control, lock, resolution and game over. The engine
//! is not time-aware beyond [`Engine::step`]; the caller owns the clock.

use crate::chain::{ChainReport, resolve_in_place};
use crate::color::{Cell, Color};
use crate::config::EngineConfig;
use crate::gravity::settle;
use crate::grid::{Grid, Pos};
use crate::pair::{Pair, RotationDirection};
use crate::placement::{can_place, drop_distance, try_move, try_rotate};
use crate::score::Score;
use crate::source::{ColorSource, PairQueue, RandomColors};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Row the axis spawns on; the satellite starts one row above it
pub const SPAWN_ROW: i32 = 1;

/// Engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Spawning,
    Controlling,
    Locking,
    Resolving,
    GameOver,
}

impl Phase {
    /// Whether the state machine may move from `self` to `next`.
    /// Restart is a reset and is not a transition.
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Spawning, Phase::Controlling)
                | (Phase::Spawning, Phase::GameOver)
                | (Phase::Controlling, Phase::Locking)
                | (Phase::Locking, Phase::Resolving)
                | (Phase::Resolving, Phase::Spawning)
        )
    }
}

/// Input intents the engine can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    /// Move one row down now
    SoftDrop,
    /// Drop to the landing row and lock immediately
    HardDrop,
    RotateCw,
    RotateCcw,
    /// Toggle pause
    Pause,
    Restart,
}

impl Action {
    /// Parse from a camelCase name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Action::MoveLeft),
            "moveright" => Some(Action::MoveRight),
            "softdrop" => Some(Action::SoftDrop),
            "harddrop" => Some(Action::HardDrop),
            "rotatecw" => Some(Action::RotateCw),
            "rotateccw" => Some(Action::RotateCcw),
            "pause" => Some(Action::Pause),
            "restart" => Some(Action::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveLeft => "moveLeft",
            Action::MoveRight => "moveRight",
            Action::SoftDrop => "softDrop",
            Action::HardDrop => "hardDrop",
            Action::RotateCw => "rotateCw",
            Action::RotateCcw => "rotateCcw",
            Action::Pause => "pause",
            Action::Restart => "restart",
        }
    }
}

/// The puzzle engine
#[derive(Debug, Clone)]
pub struct Engine<S = RandomColors> {
    config: EngineConfig,
    /// The playfield
    grid: Grid,
    /// Pair under player control
    falling: Option<Pair>,
    /// Upcoming pair colors
    queue: PairQueue<S>,
    /// Session totals
    score: Score,
    phase: Phase,
    paused: bool,
    /// Soft drop intent currently held
    soft_drop: bool,
    /// Milliseconds accumulated towards the next automatic fall
    fall_timer_ms: u32,
    /// Result of the most recent resolution
    last_report: Option<ChainReport>,
}

impl Engine<RandomColors> {
    /// Create an engine dealing colors from a seeded RNG
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        Self::with_source(config, RandomColors::seeded(seed))
    }
}

impl<S: ColorSource> Engine<S> {
    /// Create an engine with an explicit color source and spawn the first pair
    pub fn with_source(config: EngineConfig, source: S) -> Self {
        let config = config.validated();
        let grid = Grid::new(config.width, config.height);
        Self::with_grid(config, grid, source)
    }

    /// Create an engine over a pre-filled grid, for puzzles and tests.
    ///
    /// The grid is used as-is (no resolution runs) and its dimensions override
    /// the configured ones, so grids outside the usual size range are kept.
    /// If the spawn cells are occupied or off the grid the engine starts in
    /// `GameOver`.
    pub fn with_grid_and_source(config: EngineConfig, grid: Grid, source: S) -> Self {
        let config = EngineConfig {
            width: grid.width(),
            height: grid.height(),
            ..config.validated()
        };
        Self::with_grid(config, grid, source)
    }

    fn with_grid(config: EngineConfig, grid: Grid, source: S) -> Self {
        let queue = PairQueue::new(source, config.palette(), config.preview_len);
        let mut engine = Self {
            config,
            grid,
            falling: None,
            queue,
            score: Score::new(),
            phase: Phase::Spawning,
            paused: false,
            soft_drop: false,
            fall_timer_ms: 0,
            last_report: None,
        };
        engine.spawn();
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The pair under control, if any
    pub fn falling_pair(&self) -> Option<&Pair> {
        self.falling.as_ref()
    }

    /// Where the falling pair would land
    pub fn ghost_pair(&self) -> Option<Pair> {
        self.falling
            .map(|pair| pair.translated(0, drop_distance(&self.grid, &pair)))
    }

    /// Upcoming pairs as `(axis, satellite)` colors
    pub fn preview(&self) -> Vec<(Color, Color)> {
        self.queue.preview().collect()
    }

    pub fn score(&self) -> u64 {
        self.score.points
    }

    /// Chain count of the most recent resolution
    pub fn chain_count(&self) -> u32 {
        self.score.last_chain
    }

    /// Session statistics
    pub fn stats(&self) -> &Score {
        &self.score
    }

    pub fn last_report(&self) -> Option<&ChainReport> {
        self.last_report.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Hold or release the soft drop intent
    pub fn set_soft_drop(&mut self, held: bool) {
        self.soft_drop = held;
    }

    fn transition(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase transition {:?} -> {next:?}",
            self.phase
        );
        trace!(from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
    }

    fn accepts_intents(&self) -> bool {
        self.phase == Phase::Controlling && !self.paused
    }

    /// Deal a new pair at the spawn point.
    ///
    /// Only acts in `Spawning`; otherwise returns the current pair unchanged.
    /// If the spawn cells are taken the game ends and `None` is returned.
    pub fn spawn(&mut self) -> Option<Pair> {
        if self.phase != Phase::Spawning {
            return self.falling;
        }

        let (axis, satellite) = self.queue.next();
        let pair = Pair::new(
            axis,
            satellite,
            Pos::new(self.config.spawn_column(), SPAWN_ROW),
        );
        self.fall_timer_ms = 0;

        if !can_place(&self.grid, &pair) {
            self.falling = None;
            self.transition(Phase::GameOver);
            debug!(
                score = self.score.points,
                max_chain = self.score.max_chain,
                pairs = self.score.pairs_placed,
                "game over"
            );
            return None;
        }

        trace!(?axis, ?satellite, "spawned pair");
        self.falling = Some(pair);
        self.transition(Phase::Controlling);
        Some(pair)
    }

    /// Move the falling pair one column sideways or one row down. Returns
    /// whether it moved; upward moves are always rejected.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if !self.accepts_intents() {
            return false;
        }
        if dy < 0 || dx.abs() + dy.abs() != 1 {
            trace!(dx, dy, "move rejected");
            return false;
        }
        let Some(pair) = self.falling else {
            return false;
        };
        match try_move(&self.grid, &pair, dx, dy) {
            Some(moved) => {
                self.falling = Some(moved);
                true
            }
            None => {
                trace!(dx, dy, "move rejected");
                false
            }
        }
    }

    /// Rotate the falling pair, with wall kicks. Returns whether it rotated.
    pub fn try_rotate(&mut self, direction: RotationDirection) -> bool {
        if !self.accepts_intents() {
            return false;
        }
        let Some(pair) = self.falling else {
            return false;
        };
        match try_rotate(&self.grid, &pair, direction) {
            Some(rotated) => {
                self.falling = Some(rotated);
                true
            }
            None => {
                trace!(?direction, "rotation rejected");
                false
            }
        }
    }

    /// Drop the pair to its landing row and lock it now
    pub fn hard_drop(&mut self) -> bool {
        if !self.accepts_intents() {
            return false;
        }
        let Some(pair) = self.falling else {
            return false;
        };
        let distance = drop_distance(&self.grid, &pair);
        self.falling = Some(pair.translated(0, distance));
        self.lock();
        true
    }

    /// Advance the automatic fall by `delta_ms`.
    ///
    /// Each elapsed fall interval moves the pair down a row; when it cannot
    /// move the pair locks, the grid resolves and the next pair spawns.
    pub fn step(&mut self, delta_ms: u32) {
        if !self.accepts_intents() {
            return;
        }

        self.fall_timer_ms = self.fall_timer_ms.saturating_add(delta_ms);
        loop {
            let interval = self.config.fall_interval_ms(self.soft_drop);
            if self.fall_timer_ms < interval {
                break;
            }
            self.fall_timer_ms -= interval;

            let Some(pair) = self.falling else {
                break;
            };
            match try_move(&self.grid, &pair, 0, 1) {
                Some(moved) => self.falling = Some(moved),
                None => {
                    // The next pair starts with a fresh timer
                    self.lock();
                    break;
                }
            }
        }
    }

    /// Merge the falling pair into the grid, resolve, then spawn the next pair.
    ///
    /// A puyo still above the top row (a satellite pointing up from row 0
    /// after a floor kick) is discarded.
    fn lock(&mut self) {
        let Some(pair) = self.falling.take() else {
            return;
        };
        self.transition(Phase::Locking);

        for (pos, color) in pair.cells() {
            if pos.y >= 0 {
                self.grid.set(pos, Cell::Filled(color));
            }
        }
        self.score.add_placed_pair();
        // A pair landing half over a gap splits
        settle(&mut self.grid);

        self.transition(Phase::Resolving);
        let report = resolve_in_place(&mut self.grid, self.config.all_clear_bonus);
        self.score.add_resolution(&report);
        if !report.is_empty() {
            debug!(
                chain = report.chain_count(),
                erased = report.total_erased(),
                gained = report.score,
                all_clear = report.all_clear,
                total = self.score.points,
                "resolved"
            );
        }
        self.last_report = Some(report);

        self.transition(Phase::Spawning);
        self.spawn();
    }

    /// Toggle pause. Returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        if self.phase == Phase::GameOver {
            return false;
        }
        self.paused = !self.paused;
        self.paused
    }

    /// Empty the grid, zero the score and start over with a new pair
    pub fn restart(&mut self) {
        debug!(final_score = self.score.points, "restart");
        self.grid.clear();
        self.falling = None;
        self.queue.reset();
        self.score = Score::new();
        self.paused = false;
        self.soft_drop = false;
        self.fall_timer_ms = 0;
        self.last_report = None;
        self.phase = Phase::Spawning;
        self.spawn();
    }

    /// Process an action. Returns whether it changed state.
    pub fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.try_move(-1, 0),
            Action::MoveRight => self.try_move(1, 0),
            Action::SoftDrop => {
                let moved = self.try_move(0, 1);
                if moved {
                    self.fall_timer_ms = 0;
                }
                moved
            }
            Action::HardDrop => self.hard_drop(),
            Action::RotateCw => self.try_rotate(RotationDirection::Clockwise),
            Action::RotateCcw => self.try_rotate(RotationDirection::CounterClockwise),
            Action::Pause => {
                let was = self.paused;
                self.toggle_pause() != was
            }
            Action::Restart => {
                self.restart();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::Rotation;
    use crate::source::ScriptedColors;

    fn scripted(colors: &[Color]) -> Engine<ScriptedColors> {
        Engine::with_source(EngineConfig::default(), ScriptedColors::new(colors.to_vec()))
    }

    #[test]
    fn test_new_engine_is_controlling_a_pair() {
        let engine = Engine::new(EngineConfig::default(), 1);
        assert_eq!(engine.phase(), Phase::Controlling);
        let pair = engine.falling_pair().unwrap();
        assert_eq!(pair.pos, Pos::new(2, SPAWN_ROW));
        assert_eq!(pair.rotation, Rotation::Up);
        assert_eq!(pair.satellite_pos(), Pos::new(2, 0));
        assert_eq!(engine.preview().len(), 2);
        assert_eq!(engine.score(), 0);
        assert!(!engine.is_game_over());
    }

    #[test]
    fn test_same_seed_same_pairs() {
        let a = Engine::new(EngineConfig::default(), 99);
        let b = Engine::new(EngineConfig::default(), 99);
        assert_eq!(a.falling_pair(), b.falling_pair());
        assert_eq!(a.preview(), b.preview());
    }

    #[test]
    fn test_phase_legality() {
        assert!(Phase::Spawning.can_transition_to(Phase::Controlling));
        assert!(Phase::Spawning.can_transition_to(Phase::GameOver));
        assert!(Phase::Controlling.can_transition_to(Phase::Locking));
        assert!(Phase::Locking.can_transition_to(Phase::Resolving));
        assert!(Phase::Resolving.can_transition_to(Phase::Spawning));
        assert!(!Phase::Controlling.can_transition_to(Phase::GameOver));
        assert!(!Phase::Resolving.can_transition_to(Phase::Controlling));
        assert!(!Phase::GameOver.can_transition_to(Phase::Spawning));
    }

    #[test]
    fn test_moves_stop_at_walls() {
        let mut engine = Engine::new(EngineConfig::default(), 5);
        assert!(engine.try_move(-1, 0));
        assert!(engine.try_move(-1, 0));
        assert!(!engine.try_move(-1, 0));
        assert_eq!(engine.falling_pair().unwrap().pos.x, 0);
    }

    #[test]
    fn test_step_falls_one_row_per_interval() {
        let mut engine = Engine::new(EngineConfig::default(), 5);
        engine.step(999);
        assert_eq!(engine.falling_pair().unwrap().pos.y, SPAWN_ROW);
        engine.step(1);
        assert_eq!(engine.falling_pair().unwrap().pos.y, SPAWN_ROW + 1);
        engine.step(3000);
        assert_eq!(engine.falling_pair().unwrap().pos.y, SPAWN_ROW + 4);
    }

    #[test]
    fn test_soft_drop_is_ten_times_faster() {
        let mut engine = Engine::new(EngineConfig::default(), 5);
        engine.set_soft_drop(true);
        engine.step(300);
        assert_eq!(engine.falling_pair().unwrap().pos.y, SPAWN_ROW + 3);
    }

    #[test]
    fn test_pair_locks_when_it_cannot_fall() {
        let mut engine = scripted(&[Color::Red, Color::Blue]);
        // Ten rows to the floor, then one more interval to lock
        engine.step(10_000);
        assert_eq!(engine.grid().filled_count(), 0);
        engine.step(1000);
        assert_eq!(engine.grid().get(Pos::new(2, 11)), Some(Cell::Filled(Color::Red)));
        assert_eq!(engine.grid().get(Pos::new(2, 10)), Some(Cell::Filled(Color::Blue)));
        assert_eq!(engine.stats().pairs_placed, 1);
        assert_eq!(engine.phase(), Phase::Controlling);
        assert_eq!(engine.falling_pair().unwrap().pos, Pos::new(2, SPAWN_ROW));
    }

    #[test]
    fn test_hard_drop_locks_immediately() {
        let mut engine = scripted(&[Color::Green, Color::Yellow]);
        assert!(engine.apply_action(Action::RotateCw));
        assert!(engine.apply_action(Action::HardDrop));
        assert_eq!(engine.grid().get(Pos::new(2, 11)), Some(Cell::Filled(Color::Green)));
        assert_eq!(engine.grid().get(Pos::new(3, 11)), Some(Cell::Filled(Color::Yellow)));
        assert_eq!(engine.last_report().map(ChainReport::chain_count), Some(0));
    }

    #[test]
    fn test_horizontal_pair_splits_over_a_gap() {
        let mut grid = Grid::new(6, 12);
        grid.set(Pos::new(3, 11), Cell::Filled(Color::Blue));
        let mut engine = Engine::with_grid_and_source(
            EngineConfig::default(),
            grid,
            ScriptedColors::new(vec![Color::Green, Color::Yellow]),
        );
        assert!(engine.apply_action(Action::RotateCw));
        assert!(engine.apply_action(Action::HardDrop));
        assert_eq!(engine.grid().get(Pos::new(3, 10)), Some(Cell::Filled(Color::Yellow)));
        assert_eq!(engine.grid().get(Pos::new(2, 11)), Some(Cell::Filled(Color::Green)));
        assert_eq!(engine.grid().get(Pos::new(2, 10)), Some(Cell::Empty));
    }

    #[test]
    fn test_upward_moves_are_rejected() {
        let mut engine = Engine::new(EngineConfig::default(), 5);
        let start = *engine.falling_pair().unwrap();
        assert!(!engine.try_move(0, -1));
        assert!(!engine.try_move(1, 1));
        assert!(!engine.try_move(0, 0));
        assert_eq!(*engine.falling_pair().unwrap(), start);
        assert!(engine.try_move(0, 1));
    }

    #[test]
    fn test_explicit_grid_keeps_its_size() {
        let grid = Grid::from_rows(&["..", "..", "..", "R."]).unwrap();
        let engine = Engine::with_grid_and_source(
            EngineConfig::default(),
            grid,
            ScriptedColors::new(vec![Color::Blue]),
        );
        assert_eq!((engine.grid().width(), engine.grid().height()), (2, 4));
        assert_eq!(engine.config().width, 2);
        assert_eq!(engine.grid().get(Pos::new(0, 3)), Some(Cell::Filled(Color::Red)));
        assert_eq!(engine.falling_pair().unwrap().pos, Pos::new(0, SPAWN_ROW));
    }

    #[test]
    fn test_satellite_above_the_top_is_discarded() {
        // Checkerboard below row 1 never pops; only the spawn column stays open
        let mut grid = Grid::new(6, 12);
        for pos in grid.positions() {
            if pos.y >= 2 || (pos.y == 1 && (pos.x == 1 || pos.x == 3)) {
                let color = if (pos.x + pos.y) % 2 == 0 { Color::Red } else { Color::Blue };
                grid.set(pos, Cell::Filled(color));
            }
        }
        let filled = grid.filled_count();
        let mut engine = Engine::with_grid_and_source(
            EngineConfig::default(),
            grid,
            ScriptedColors::new(vec![Color::Green, Color::Yellow]),
        );

        // Boxed in at row 1, the rotation kicks the pair up onto row 0
        assert!(engine.apply_action(Action::RotateCw));
        let pair = *engine.falling_pair().unwrap();
        assert_eq!((pair.pos, pair.rotation), (Pos::new(2, 0), Rotation::Right));

        assert!(engine.apply_action(Action::MoveLeft));
        assert!(engine.apply_action(Action::RotateCcw));
        assert_eq!(engine.falling_pair().unwrap().satellite_pos(), Pos::new(1, -1));

        assert!(engine.apply_action(Action::HardDrop));
        assert_eq!(engine.grid().get(Pos::new(1, 0)), Some(Cell::Filled(Color::Green)));
        assert_eq!(engine.grid().filled_count(), filled + 1);
        assert_eq!(engine.stats().pairs_placed, 1);
        assert_eq!(engine.phase(), Phase::Controlling);
    }

    #[test]
    fn test_four_vertical_reds_pop() {
        let mut engine = scripted(&[Color::Red]);
        assert!(engine.hard_drop());
        assert!(engine.hard_drop());
        assert!(engine.grid().is_empty());
        assert_eq!(engine.chain_count(), 1);
        assert_eq!(engine.score(), 40 + 3600);
        assert_eq!(engine.stats().all_clears, 1);
    }

    #[test]
    fn test_intents_rejected_while_paused() {
        let mut engine = Engine::new(EngineConfig::default(), 5);
        assert!(engine.apply_action(Action::Pause));
        assert!(engine.is_paused());
        assert!(!engine.try_move(1, 0));
        assert!(!engine.try_rotate(RotationDirection::Clockwise));
        assert!(!engine.hard_drop());
        engine.step(5000);
        assert_eq!(engine.falling_pair().unwrap().pos.y, SPAWN_ROW);
        assert!(engine.apply_action(Action::Pause));
        assert!(engine.try_move(1, 0));
    }

    #[test]
    fn test_stacking_to_the_top_ends_the_game() {
        // Alternating colors never pop
        let mut engine = scripted(&[Color::Red, Color::Blue, Color::Green, Color::Yellow]);
        let mut drops = 0;
        while !engine.is_game_over() {
            assert!(engine.hard_drop());
            drops += 1;
            assert!(drops <= 6, "spawn column should fill within six pairs");
        }
        assert_eq!(engine.phase(), Phase::GameOver);
        assert!(engine.falling_pair().is_none());
        assert!(!engine.try_move(1, 0));
        assert!(!engine.apply_action(Action::Pause));
        engine.step(1000);
        assert!(engine.is_game_over());
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut engine = scripted(&[Color::Red]);
        engine.hard_drop();
        engine.hard_drop();
        assert!(engine.score() > 0);
        engine.restart();
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.chain_count(), 0);
        assert!(engine.grid().is_empty());
        assert!(engine.last_report().is_none());
        assert_eq!(engine.phase(), Phase::Controlling);
    }

    #[test]
    fn test_action_names() {
        for action in [
            Action::MoveLeft,
            Action::MoveRight,
            Action::SoftDrop,
            Action::HardDrop,
            Action::RotateCw,
            Action::RotateCcw,
            Action::Pause,
            Action::Restart,
        ] {
            assert_eq!(Action::from_str(action.as_str()), Some(action));
        }
        assert_eq!(Action::from_str("HARDDROP"), Some(Action::HardDrop));
        assert_eq!(Action::from_str("hold"), None);
    }
}
