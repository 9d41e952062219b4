//! PUYORS - falling pairs, popping groups, chaining cascades.
//!
//! The library is the board resolution engine: pure, synchronous and
//! deterministic for a given color source. Rendering, input and timing live
//! in the binary and drive the engine through [`Engine`].
//!
//! ```
//! use puyors::{Action, Engine, EngineConfig};
//!
//! let mut engine = Engine::new(EngineConfig::default(), 7);
//! engine.apply_action(Action::MoveLeft);
//! engine.apply_action(Action::HardDrop);
//! engine.step(16);
//!
//! assert!(!engine.is_game_over());
//! assert_eq!(engine.stats().pairs_placed, 1);
//! ```

pub mod chain;
pub mod color;
pub mod config;
pub mod connectivity;
pub mod game;
pub mod gravity;
pub mod grid;
pub mod pair;
pub mod placement;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod source;

pub use chain::{ChainReport, ChainStep, resolve, resolve_in_place};
pub use color::{Cell, Color};
pub use config::EngineConfig;
pub use connectivity::{ERASE_THRESHOLD, EraseGroup, find_groups};
pub use game::{Action, Engine, Phase};
pub use gravity::apply_gravity;
pub use grid::{Grid, Pos};
pub use pair::{Pair, Rotation, RotationDirection};
pub use placement::{can_place, try_move, try_rotate};
pub use score::{Score, chain_multiplier};
pub use settings::{Settings, SettingsError};
pub use snapshot::GameSnapshot;
pub use source::{ColorSource, PairQueue, RandomColors, ScriptedColors};
