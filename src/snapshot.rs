//! Read-only views of the game for presentation and the command line.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::TreeKind;
use crate::engine::Engine;
use crate::state::{GameState, Millis, Position, TreeId};

#[derive(Debug, Clone, Serialize)]
pub struct TreeView {
    pub id: TreeId,
    pub kind: TreeKind,
    pub title: String,
    pub position: Position,
    pub growth: f64,
    pub mature: bool,
    pub recently_matured: bool,
}

/// The state plus everything presentation derives from it, captured at one
/// instant of the logical clock.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub game: String,
    pub now_ms: Millis,
    pub taken_at: DateTime<Utc>,
    pub display_multiplier: f64,
    pub auto_generation: f64,
    pub has_tilled_plots: bool,
    pub trees: Vec<TreeView>,
    pub state: GameState,
}

impl GameSnapshot {
    pub fn capture(engine: &Engine, taken_at: DateTime<Utc>) -> Self {
        let state = engine.state();
        let catalog = engine.catalog();
        let now = engine.now();

        let trees = state
            .planted_trees
            .iter()
            .map(|tree| TreeView {
                id: tree.id.clone(),
                kind: tree.kind,
                title: catalog
                    .tree(tree.kind)
                    .map(|spec| spec.title.clone())
                    .unwrap_or_else(|| tree.kind.to_string()),
                position: tree.position,
                growth: state.growth_progress(tree, catalog, now),
                mature: tree.is_mature(),
                recently_matured: state.recently_matured_trees.contains_key(&tree.id),
            })
            .collect();

        Self {
            game: engine.name().to_string(),
            now_ms: now,
            taken_at,
            display_multiplier: state.display_multiplier(catalog),
            auto_generation: state.auto_generation(catalog),
            has_tilled_plots: state.has_tilled_plots(),
            trees,
            state: GameState::clone(&state),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
