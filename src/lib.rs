pub mod autopilot;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod reducer;
pub mod rng;
pub mod runtime;
pub mod shop;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod systems;
pub mod timers;

pub use catalog::{Catalog, TreeKind, UpgradeId, UpgradeKind};
pub use config::{ConfigLoader, GameConfig, Timings};
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use event::{Event, Outcome, Rejection};
pub use snapshot::GameSnapshot;
pub use state::{required_tilling, GameState, TreeId};
