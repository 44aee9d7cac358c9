//! Everything that can change a [`GameState`](crate::state::GameState).
//!
//! Player operations, periodic ticks and delayed reversions all travel through
//! the same [`Event`] type so that one reducer owns every transition.

use crate::catalog::{TreeKind, UpgradeId};
use crate::state::{Position, TreeId};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TillBox {
        position: Position,
    },
    PlantTree {
        kind: TreeKind,
        position: Position,
    },
    RemoveTree {
        id: TreeId,
    },
    IncrementClicks,
    MatureAllTrees,
    AddOxygen {
        amount: f64,
    },
    SpendOxygen {
        amount: u64,
    },
    AddClickPowerBoost {
        multiplier: f64,
    },
    PurchaseUpgrade {
        id: UpgradeId,
        position: Option<Position>,
    },
    Internal(Internal),
}

/// A tick or reversion the engine raises for itself. Only this crate can
/// build one, and [`Engine::dispatch`](crate::engine::Engine::dispatch)
/// refuses any that reach it from a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Internal(pub(crate) InternalKind);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InternalKind {
    AutoTillTick,
    ProductionTick,
    SpecialEventStarted { multiplier: u32 },
    SpecialEventEnded,
    ClickPowerBoostExpired { multiplier: f64 },
    MaturedMarkExpired { id: TreeId },
}

impl Internal {
    pub fn name(&self) -> &'static str {
        match &self.0 {
            InternalKind::AutoTillTick => "auto_till_tick",
            InternalKind::ProductionTick => "production_tick",
            InternalKind::SpecialEventStarted { .. } => "special_event_started",
            InternalKind::SpecialEventEnded => "special_event_ended",
            InternalKind::ClickPowerBoostExpired { .. } => "click_power_boost_expired",
            InternalKind::MaturedMarkExpired { .. } => "matured_mark_expired",
        }
    }
}

impl From<InternalKind> for Event {
    fn from(kind: InternalKind) -> Self {
        Event::Internal(Internal(kind))
    }
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::TillBox { .. } => "till_box",
            Event::PlantTree { .. } => "plant_tree",
            Event::RemoveTree { .. } => "remove_tree",
            Event::IncrementClicks => "increment_clicks",
            Event::MatureAllTrees => "mature_all_trees",
            Event::AddOxygen { .. } => "add_oxygen",
            Event::SpendOxygen { .. } => "spend_oxygen",
            Event::AddClickPowerBoost { .. } => "add_click_power_boost",
            Event::PurchaseUpgrade { .. } => "purchase_upgrade",
            Event::Internal(internal) => internal.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Applied => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}

/// Why an operation left the state untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("a tree already grows on plot {position}")]
    PlotOccupied { position: Position },

    #[error("plot {position} is already fully tilled")]
    PlotComplete { position: Position },

    #[error("tilling plot {position} made no progress")]
    NoProgress { position: Position },

    #[error("plot {position} is not ready ({progress}/{required})")]
    PlotNotReady {
        position: Position,
        progress: u64,
        required: u64,
    },

    #[error("no catalog entry for tree `{kind}`")]
    UnknownTree { kind: TreeKind },

    #[error("no upgrade `{id}`")]
    UnknownUpgrade { id: UpgradeId },

    #[error("needs {needed} oxygen, only {available} available")]
    InsufficientOxygen { needed: u64, available: u64 },

    #[error("amount must be positive and finite")]
    InvalidAmount,

    #[error("multiplier must be positive and finite")]
    InvalidMultiplier,

    #[error("a special event is already running")]
    EventAlreadyActive,

    #[error("`{event}` is raised by the engine only")]
    EngineOnly { event: &'static str },
}
