use anyhow::Result;

use crate::{
    catalog::TreeKind,
    config::Timings,
    engine::{System, SystemContext},
    event::{Event, InternalKind, Outcome, Rejection},
    reducer::{ApplyContext, Scheduled},
    rng::SystemRng,
    state::{required_tilling, GameState, Millis, PlantedTree, Position, TreeId},
};

/// Matures trees that finished growing and collects oxygen from mature ones.
pub struct ProductionSystem;

impl ProductionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProductionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProductionSystem {
    fn name(&self) -> &str {
        "production"
    }

    fn interval_ms(&self, timings: &Timings) -> Millis {
        timings.production_interval_ms
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        state: &GameState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<Vec<Event>> {
        if state.planted_trees.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![InternalKind::ProductionTick.into()])
    }
}

pub(crate) fn plant_tree(
    state: &mut GameState,
    kind: TreeKind,
    position: Position,
    ctx: &ApplyContext<'_>,
) -> Outcome {
    if ctx.catalog.tree(kind).is_none() {
        return Outcome::Rejected(Rejection::UnknownTree { kind });
    }
    if state.tree_at(position).is_some() {
        return Outcome::Rejected(Rejection::PlotOccupied { position });
    }
    let required = required_tilling(position);
    let progress = state.progress(position);
    if progress < required {
        return Outcome::Rejected(Rejection::PlotNotReady {
            position,
            progress,
            required,
        });
    }

    state.trees_planted += 1;
    state.planted_trees.push(PlantedTree {
        id: TreeId::from_seq(state.trees_planted),
        kind,
        planted_at: ctx.now,
        matured_at: None,
        position,
    });
    state.tilled_boxes.insert(position, 0);
    Outcome::Applied
}

pub(crate) fn remove_tree(state: &mut GameState, id: &TreeId) -> Outcome {
    state.planted_trees.retain(|tree| &tree.id != id);
    Outcome::Applied
}

pub(crate) fn mature_all(
    state: &mut GameState,
    now: Millis,
    matured: &mut Vec<TreeId>,
) -> Outcome {
    for tree in state.planted_trees.iter_mut().filter(|t| !t.is_mature()) {
        tree.matured_at = Some(now);
        matured.push(tree.id.clone());
    }
    Outcome::Applied
}

/// One production tick. A tree that matures during the tick starts
/// producing on the next one.
pub(crate) fn production_tick(
    state: &mut GameState,
    ctx: &ApplyContext<'_>,
    scheduled: &mut Vec<Scheduled>,
    matured: &mut Vec<TreeId>,
) -> Outcome {
    let now = ctx.now;
    let mut gained = 0.0;
    let first_new = matured.len();

    for tree in state.planted_trees.iter_mut() {
        let Some(spec) = ctx.catalog.tree(tree.kind) else {
            continue;
        };
        match tree.matured_at {
            Some(_) => gained += spec.base_production,
            None if now.saturating_sub(tree.planted_at) >= spec.growth_time_ms => {
                tree.matured_at = Some(now);
                matured.push(tree.id.clone());
            }
            None => {}
        }
    }

    for id in &matured[first_new..] {
        state.recently_matured_trees.insert(id.clone(), now);
        scheduled.push(Scheduled {
            delay: ctx.timings.matured_mark_ms,
            event: InternalKind::MaturedMarkExpired { id: id.clone() }.into(),
        });
    }
    state.credit_oxygen(gained);
    Outcome::Applied
}

pub(crate) fn clear_matured_mark(state: &mut GameState, id: &TreeId) -> Outcome {
    state.recently_matured_trees.remove(id);
    Outcome::Applied
}
