//! Serializable read-only view of an engine

use crate::color::Color;
use crate::game::{Engine, Phase};
use crate::grid::Pos;
use crate::pair::{Pair, Rotation};
use crate::source::ColorSource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSnapshot {
    pub axis: Pos,
    pub axis_color: Color,
    pub satellite: Pos,
    pub satellite_color: Color,
    pub rotation: Rotation,
}

impl From<Pair> for PairSnapshot {
    fn from(pair: Pair) -> Self {
        Self {
            axis: pair.pos,
            axis_color: pair.axis_color,
            satellite: pair.satellite_pos(),
            satellite_color: pair.satellite_color,
            rotation: pair.rotation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub width: usize,
    pub height: usize,
    /// Grid rows top to bottom, `.` for empty and a color letter otherwise
    pub rows: Vec<String>,
    pub falling: Option<PairSnapshot>,
    pub preview: Vec<(Color, Color)>,
    pub phase: Phase,
    pub paused: bool,
    pub score: u64,
    pub chain: u32,
    pub max_chain: u32,
    pub total_erased: u64,
    pub pairs_placed: u32,
    pub all_clears: u32,
}

impl GameSnapshot {
    pub fn capture<S: ColorSource>(engine: &Engine<S>) -> Self {
        let grid = engine.grid();
        let stats = engine.stats();
        Self {
            width: grid.width(),
            height: grid.height(),
            rows: grid.to_string().lines().map(str::to_owned).collect(),
            falling: engine.falling_pair().copied().map(PairSnapshot::from),
            preview: engine.preview(),
            phase: engine.phase(),
            paused: engine.is_paused(),
            score: stats.points,
            chain: stats.last_chain,
            max_chain: stats.max_chain,
            total_erased: stats.total_erased,
            pairs_placed: stats.pairs_placed,
            all_clears: stats.all_clears,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// True if the engine still accepts intents
    pub fn playable(&self) -> bool {
        self.phase != Phase::GameOver && !self.paused
    }
}

impl<S: ColorSource> From<&Engine<S>> for GameSnapshot {
    fn from(engine: &Engine<S>) -> Self {
        Self::capture(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_capture_fresh_engine() {
        let engine = Engine::new(EngineConfig::default(), 8);
        let snapshot = GameSnapshot::from(&engine);
        assert_eq!(snapshot.rows.len(), 12);
        assert!(snapshot.rows.iter().all(|row| row == "......"));
        let falling = snapshot.falling.unwrap();
        assert_eq!(falling.axis, Pos::new(2, 1));
        assert_eq!(falling.satellite, Pos::new(2, 0));
        assert_eq!(snapshot.phase, Phase::Controlling);
        assert!(snapshot.playable());
    }

    #[test]
    fn test_json_uses_readable_names() {
        let engine = Engine::new(EngineConfig::default(), 8);
        let json = GameSnapshot::capture(&engine).to_json().unwrap();
        assert!(json.contains("\"phase\":\"controlling\""));
        assert!(json.contains("\"rotation\":\"up\""));
        let back = GameSnapshot::from_json(&json).unwrap();
        assert_eq!(back, GameSnapshot::capture(&engine));
    }
}
