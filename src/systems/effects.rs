use anyhow::Result;
use rand::seq::SliceRandom;

use crate::{
    config::Timings,
    engine::{System, SystemContext},
    event::{Event, InternalKind, Outcome, Rejection},
    reducer::{ApplyContext, Scheduled},
    rng::{RngExt, SystemRng},
    state::{GameState, Millis},
};

/// Rolls for a special event on every run while none is active.
pub struct SpecialEventSystem;

impl SpecialEventSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpecialEventSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for SpecialEventSystem {
    fn name(&self) -> &str {
        "special_event"
    }

    fn interval_ms(&self, timings: &Timings) -> Millis {
        timings.special_event_interval_ms
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &GameState,
        rng: &mut SystemRng<'_>,
    ) -> Result<Vec<Event>> {
        if state.special_event_active || !rng.roll(ctx.timings.special_event_chance) {
            return Ok(Vec::new());
        }
        Ok(ctx
            .timings
            .special_event_multipliers
            .choose(rng)
            .map(|multiplier| {
                InternalKind::SpecialEventStarted {
                    multiplier: *multiplier,
                }
                .into()
            })
            .into_iter()
            .collect())
    }
}

pub(crate) fn boost_click_power(
    state: &mut GameState,
    multiplier: f64,
    ctx: &ApplyContext<'_>,
    scheduled: &mut Vec<Scheduled>,
) -> Outcome {
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return Outcome::Rejected(Rejection::InvalidMultiplier);
    }
    state.click_boosts.push(multiplier);
    refresh_click_power(state);
    scheduled.push(Scheduled {
        delay: ctx.timings.click_boost_duration_ms,
        event: InternalKind::ClickPowerBoostExpired { multiplier }.into(),
    });
    Outcome::Applied
}

/// Drops one active factor equal to `multiplier`. Click power is rebuilt from
/// the factors left, so it is exactly 1 once none remain.
pub(crate) fn expire_click_boost(state: &mut GameState, multiplier: f64) -> Outcome {
    if let Some(index) = state.click_boosts.iter().position(|f| *f == multiplier) {
        state.click_boosts.remove(index);
    }
    refresh_click_power(state);
    Outcome::Applied
}

fn refresh_click_power(state: &mut GameState) {
    state.click_power = state.click_boosts.iter().product();
}

pub(crate) fn start_special_event(
    state: &mut GameState,
    multiplier: u32,
    ctx: &ApplyContext<'_>,
    scheduled: &mut Vec<Scheduled>,
) -> Outcome {
    if state.special_event_active {
        return Outcome::Rejected(Rejection::EventAlreadyActive);
    }
    if multiplier == 0 {
        return Outcome::Rejected(Rejection::InvalidMultiplier);
    }
    state.special_event_active = true;
    state.special_event_multiplier = multiplier;
    scheduled.push(Scheduled {
        delay: ctx.timings.special_event_duration_ms,
        event: InternalKind::SpecialEventEnded.into(),
    });
    Outcome::Applied
}

pub(crate) fn end_special_event(state: &mut GameState) -> Outcome {
    state.special_event_active = false;
    state.special_event_multiplier = 1;
    Outcome::Applied
}
