use anyhow::Result;

use crate::{
    config::Timings,
    engine::{System, SystemContext},
    event::{Event, InternalKind, Outcome, Rejection},
    rng::SystemRng,
    state::{required_tilling, GameState, Millis, Position},
};

/// Advances every plot that has an automation upgrade bound to it.
pub struct AutoTillerSystem;

impl AutoTillerSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AutoTillerSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for AutoTillerSystem {
    fn name(&self) -> &str {
        "auto_tiller"
    }

    fn interval_ms(&self, timings: &Timings) -> Millis {
        timings.auto_till_interval_ms
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        state: &GameState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<Vec<Event>> {
        if state.auto_tillers.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![InternalKind::AutoTillTick.into()])
    }
}

pub(crate) fn till_box(state: &mut GameState, position: Position) -> Outcome {
    if state.tree_at(position).is_some() {
        return Outcome::Rejected(Rejection::PlotOccupied { position });
    }
    if state.progress(position) >= required_tilling(position) {
        return Outcome::Rejected(Rejection::PlotComplete { position });
    }
    let power = state.tilling_power;
    if advance_plot(state, position, power) {
        Outcome::Applied
    } else {
        Outcome::Rejected(Rejection::NoProgress { position })
    }
}

/// Auto-tillers keep working under a tree; planting already reset the plot
/// and the progress is clamped like manual tilling.
pub(crate) fn auto_till(state: &mut GameState) -> Outcome {
    let bound: Vec<(Position, f64)> = state
        .auto_tillers
        .iter()
        .filter_map(|(position, id)| state.upgrades.get(id).map(|u| (*position, u.power)))
        .collect();
    for (position, power) in bound {
        advance_plot(state, position, power);
    }
    Outcome::Applied
}

fn advance_plot(state: &mut GameState, position: Position, power: f64) -> bool {
    let required = required_tilling(position);
    let current = state.progress(position);
    if current >= required {
        return false;
    }
    let next = ((current as f64 + power).floor() as u64).min(required);
    if next <= current {
        return false;
    }
    state.tilled_boxes.insert(position, next);
    true
}
