use std::sync::Arc;

use tokio::sync::watch;

use crate::event::Event;
use crate::reducer::{self, ApplyContext, Effects};
use crate::state::GameState;

/// Owner of the canonical snapshot.
///
/// Every event produces a whole new [`GameState`] that replaces the previous
/// one atomically; readers holding an older `Arc` keep a consistent view.
pub struct StateStore {
    current: Arc<GameState>,
    publisher: watch::Sender<Arc<GameState>>,
    revision: u64,
}

impl StateStore {
    pub fn new(initial: GameState) -> Self {
        let current = Arc::new(initial);
        let (publisher, _) = watch::channel(Arc::clone(&current));
        Self {
            current,
            publisher,
            revision: 0,
        }
    }

    pub fn snapshot(&self) -> Arc<GameState> {
        Arc::clone(&self.current)
    }

    /// Number of snapshots published since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> {
        self.publisher.subscribe()
    }

    pub fn apply(&mut self, event: &Event, ctx: &ApplyContext<'_>) -> Effects {
        let transition = reducer::apply(&self.current, event, ctx);
        if transition.state != *self.current {
            self.current = Arc::new(transition.state);
            self.revision += 1;
            self.publisher.send_replace(Arc::clone(&self.current));
        }
        transition.effects
    }
}
