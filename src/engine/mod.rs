use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    catalog::{Catalog, TreeKind, UpgradeId},
    config::{GameConfig, Timings},
    event::{Event, InternalKind, Outcome, Rejection},
    reducer::ApplyContext,
    rng::{RngManager, SystemRng},
    state::{GameState, Millis, Position, TreeId},
    store::StateStore,
    systems::{self, AutoTillerSystem, ProductionSystem, SpecialEventSystem},
    timers::TimerQueue,
};

pub struct EngineSettings {
    pub name: String,
    pub seed: u64,
    pub timings: Timings,
}

impl EngineSettings {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            name: config.name.clone(),
            seed: config.seed,
            timings: config.timings.clone(),
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    catalog: Catalog,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings, catalog: Catalog) -> Self {
        Self {
            settings,
            catalog,
            systems: Vec::new(),
        }
    }

    /// Builder for `config` with the three standard periodic systems.
    pub fn from_config(config: GameConfig) -> Self {
        let settings = EngineSettings::from_config(&config);
        Self::new(settings, config.catalog).with_default_systems()
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn with_default_systems(self) -> Self {
        self.with_system(AutoTillerSystem::new())
            .with_system(ProductionSystem::new())
            .with_system(SpecialEventSystem::new())
    }

    pub fn build(self) -> Engine {
        let mut initial = GameState::new(&self.catalog);
        let unlocked = systems::achievements::settle(&mut initial);
        for id in &unlocked {
            info!(achievement = %id, "achievement unlocked");
        }

        let timings = &self.settings.timings;
        let systems = self
            .systems
            .into_iter()
            .map(|system| {
                // a zero interval would spin forever
                let interval = system.interval_ms(timings).max(1);
                ScheduledSystem {
                    system,
                    interval,
                    next_due: interval,
                }
            })
            .collect();

        Engine {
            store: StateStore::new(initial),
            catalog: Arc::new(self.catalog),
            rng: RngManager::new(self.settings.seed),
            systems,
            timers: TimerQueue::default(),
            now: 0,
            settings: self.settings,
        }
    }
}

struct ScheduledSystem {
    system: Box<dyn System>,
    interval: Millis,
    next_due: Millis,
}

/// The simulation: state store, logical clock, periodic systems and pending
/// one-shot timers.
pub struct Engine {
    store: StateStore,
    catalog: Arc<Catalog>,
    rng: RngManager,
    systems: Vec<ScheduledSystem>,
    timers: TimerQueue,
    now: Millis,
    settings: EngineSettings,
}

impl Engine {
    /// Applies a caller's event. Engine-only ticks and reversions are refused
    /// without touching the state.
    pub fn dispatch(&mut self, event: Event) -> Outcome {
        if let Event::Internal(internal) = &event {
            let reason = Rejection::EngineOnly {
                event: internal.name(),
            };
            debug!(event = internal.name(), %reason, "event rejected");
            return Outcome::Rejected(reason);
        }
        self.apply(event)
    }

    fn apply(&mut self, event: Event) -> Outcome {
        let ctx = ApplyContext {
            now: self.now,
            catalog: &self.catalog,
            timings: &self.settings.timings,
        };
        let effects = self.store.apply(&event, &ctx);

        match &effects.outcome {
            Outcome::Applied => log_applied(&event),
            Outcome::Rejected(reason) => {
                debug!(event = event.name(), %reason, "event rejected");
            }
        }
        for id in &effects.unlocked {
            info!(achievement = %id, "achievement unlocked");
        }
        for id in &effects.matured {
            info!(tree = %id, at = self.now, "tree matured");
        }
        for task in effects.scheduled {
            self.timers.schedule(self.now + task.delay, task.event);
        }
        effects.outcome
    }

    /// Runs every timer and periodic system due up to `target`, in time order.
    pub fn advance_to(&mut self, target: Millis) -> Result<()> {
        while let Some(due) = self.next_due() {
            if due > target {
                break;
            }
            self.now = due;

            while let Some(event) = self.timers.pop_due(due) {
                self.apply(event);
            }

            for index in 0..self.systems.len() {
                if self.systems[index].next_due != due {
                    continue;
                }
                let state = self.store.snapshot();
                let entry = &mut self.systems[index];
                entry.next_due += entry.interval;
                let ctx = SystemContext {
                    now: due,
                    timings: &self.settings.timings,
                    catalog: &self.catalog,
                };
                let mut rng = self.rng.stream(entry.system.name());
                let events = entry
                    .system
                    .run(&ctx, &state, &mut rng)
                    .with_context(|| format!("system '{}' failed", entry.system.name()))?;
                for event in events {
                    self.apply(event);
                }
            }
        }
        self.now = self.now.max(target);
        Ok(())
    }

    pub fn advance(&mut self, by: Millis) -> Result<()> {
        self.advance_to(self.now.saturating_add(by))
    }

    fn next_due(&self) -> Option<Millis> {
        let systems = self.systems.iter().map(|entry| entry.next_due).min();
        match (self.timers.next_due(), systems) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn till_box(&mut self, position: Position) -> bool {
        self.dispatch(Event::TillBox { position }).is_applied()
    }

    pub fn plant_tree(&mut self, kind: TreeKind, position: Position) -> bool {
        self.dispatch(Event::PlantTree { kind, position })
            .is_applied()
    }

    pub fn remove_tree(&mut self, id: &TreeId) {
        self.dispatch(Event::RemoveTree { id: id.clone() });
    }

    pub fn increment_clicks(&mut self) {
        self.dispatch(Event::IncrementClicks);
    }

    pub fn mature_all_trees(&mut self) {
        self.dispatch(Event::MatureAllTrees);
    }

    pub fn add_oxygen(&mut self, amount: f64) {
        self.dispatch(Event::AddOxygen { amount });
    }

    /// Returns false, changing nothing, when the balance is too small.
    pub fn spend_oxygen(&mut self, amount: u64) -> bool {
        self.dispatch(Event::SpendOxygen { amount }).is_applied()
    }

    pub fn add_click_power_boost(&mut self, multiplier: f64) {
        self.dispatch(Event::AddClickPowerBoost { multiplier });
    }

    pub fn purchase_upgrade(&mut self, id: &UpgradeId, position: Option<Position>) -> bool {
        self.dispatch(Event::PurchaseUpgrade {
            id: id.clone(),
            position,
        })
        .is_applied()
    }

    pub fn has_tilled_plots(&self) -> bool {
        self.store.snapshot().has_tilled_plots()
    }

    pub fn display_multiplier(&self) -> f64 {
        self.store.snapshot().display_multiplier(&self.catalog)
    }

    pub fn auto_generation(&self) -> f64 {
        self.store.snapshot().auto_generation(&self.catalog)
    }

    pub fn state(&self) -> Arc<GameState> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> {
        self.store.subscribe()
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn timings(&self) -> &Timings {
        &self.settings.timings
    }
}

fn log_applied(event: &Event) {
    match event {
        Event::Internal(internal) => match &internal.0 {
            InternalKind::SpecialEventStarted { multiplier } => {
                info!(multiplier, "special event started");
            }
            InternalKind::SpecialEventEnded => info!("special event ended"),
            InternalKind::ClickPowerBoostExpired { multiplier } => {
                debug!(multiplier, "click power boost expired");
            }
            _ => {}
        },
        Event::PurchaseUpgrade { id, position } => {
            debug!(upgrade = %id, ?position, "upgrade purchased");
        }
        _ => {}
    }
}

pub struct SystemContext<'a> {
    pub now: Millis,
    pub timings: &'a Timings,
    pub catalog: &'a Catalog,
}

/// A periodic task. Systems read the current snapshot and answer with the
/// events to apply; they never mutate state themselves.
pub trait System: Send {
    fn name(&self) -> &str;
    fn interval_ms(&self, timings: &Timings) -> Millis;
    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &GameState,
        rng: &mut SystemRng<'_>,
    ) -> Result<Vec<Event>>;
}
