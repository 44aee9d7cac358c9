//! The single pure transition function of the game.

use crate::catalog::Catalog;
use crate::config::Timings;
use crate::event::{Event, InternalKind, Outcome, Rejection};
use crate::state::{GameState, Millis, TreeId};
use crate::systems::{achievements, effects, growth, tilling, upgrades};

pub struct ApplyContext<'a> {
    pub now: Millis,
    pub catalog: &'a Catalog,
    pub timings: &'a Timings,
}

/// A follow-up event the engine must fire `delay` ms after the transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub delay: Millis,
    pub event: Event,
}

#[derive(Debug)]
pub struct Effects {
    pub outcome: Outcome,
    pub scheduled: Vec<Scheduled>,
    /// Ids of achievements unlocked by this transition.
    pub unlocked: Vec<String>,
    /// Trees that became mature in this transition.
    pub matured: Vec<TreeId>,
}

pub struct Transition {
    pub state: GameState,
    pub effects: Effects,
}

/// Computes the state that follows `event`. The input is never modified and
/// a rejected event yields an identical state with nothing scheduled.
pub fn apply(state: &GameState, event: &Event, ctx: &ApplyContext<'_>) -> Transition {
    let mut next = state.clone();
    let mut scheduled = Vec::new();
    let mut matured = Vec::new();

    let outcome = match event {
        Event::TillBox { position } => tilling::till_box(&mut next, *position),
        Event::PlantTree { kind, position } => growth::plant_tree(&mut next, *kind, *position, ctx),
        Event::RemoveTree { id } => growth::remove_tree(&mut next, id),
        Event::MatureAllTrees => growth::mature_all(&mut next, ctx.now, &mut matured),
        Event::IncrementClicks => {
            next.total_clicks += 1;
            Outcome::Applied
        }
        Event::AddOxygen { amount } => add_oxygen(&mut next, *amount),
        Event::SpendOxygen { amount } => spend_oxygen(&mut next, *amount),
        Event::PurchaseUpgrade { id, position } => upgrades::purchase(&mut next, id, *position),
        Event::AddClickPowerBoost { multiplier } => {
            effects::boost_click_power(&mut next, *multiplier, ctx, &mut scheduled)
        }
        Event::Internal(internal) => match &internal.0 {
            InternalKind::AutoTillTick => tilling::auto_till(&mut next),
            InternalKind::ProductionTick => {
                growth::production_tick(&mut next, ctx, &mut scheduled, &mut matured)
            }
            InternalKind::MaturedMarkExpired { id } => growth::clear_matured_mark(&mut next, id),
            InternalKind::ClickPowerBoostExpired { multiplier } => {
                effects::expire_click_boost(&mut next, *multiplier)
            }
            InternalKind::SpecialEventStarted { multiplier } => {
                effects::start_special_event(&mut next, *multiplier, ctx, &mut scheduled)
            }
            InternalKind::SpecialEventEnded => effects::end_special_event(&mut next),
        },
    };

    if !outcome.is_applied() {
        return Transition {
            state: state.clone(),
            effects: Effects {
                outcome,
                scheduled: Vec::new(),
                unlocked: Vec::new(),
                matured: Vec::new(),
            },
        };
    }

    let unlocked = if achievements::triggered(state, &next) {
        achievements::settle(&mut next)
    } else {
        Vec::new()
    };

    Transition {
        state: next,
        effects: Effects {
            outcome,
            scheduled,
            unlocked,
            matured,
        },
    }
}

fn add_oxygen(state: &mut GameState, amount: f64) -> Outcome {
    if !(amount.is_finite() && amount > 0.0) {
        return Outcome::Rejected(Rejection::InvalidAmount);
    }
    state.credit_oxygen(amount);
    Outcome::Applied
}

fn spend_oxygen(state: &mut GameState, amount: u64) -> Outcome {
    let available = state.oxygen;
    if state.debit_oxygen(amount) {
        Outcome::Applied
    } else {
        Outcome::Rejected(Rejection::InsufficientOxygen {
            needed: amount,
            available,
        })
    }
}
