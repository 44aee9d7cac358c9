//! Real-time driver. The engine lives inside one tokio task; everything else
//! talks to it through a [`GameHandle`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

use crate::catalog::{TreeKind, UpgradeId};
use crate::engine::Engine;
use crate::error::RuntimeError;
use crate::event::{Event, Outcome};
use crate::snapshot::GameSnapshot;
use crate::state::{GameState, Position};

const REQUEST_QUEUE: usize = 64;

type Job = Box<dyn FnOnce(&mut Engine) + Send>;

enum Request {
    Call(Job),
    Shutdown,
}

/// Starts the engine on the current tokio runtime. The logical clock follows
/// wall-clock time, checked every `resolution`.
///
/// The task ends when [`GameHandle::shutdown`] is called or every handle is
/// dropped, and hands the engine back.
pub fn spawn(engine: Engine, resolution: Duration) -> (GameHandle, JoinHandle<Result<Engine>>) {
    let (requests, inbox) = mpsc::channel(REQUEST_QUEUE);
    let handle = GameHandle {
        requests,
        updates: engine.subscribe(),
    };
    let task = tokio::spawn(drive(engine, inbox, resolution));
    (handle, task)
}

async fn drive(
    mut engine: Engine,
    mut inbox: mpsc::Receiver<Request>,
    resolution: Duration,
) -> Result<Engine> {
    let started = Instant::now();
    let origin = engine.now();
    let mut ticker = time::interval(resolution.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(game = engine.name(), "runtime started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                engine.advance_to(origin.saturating_add(elapsed))?;
            }
            request = inbox.recv() => match request {
                Some(Request::Call(job)) => job(&mut engine),
                Some(Request::Shutdown) | None => break,
            },
        }
    }

    info!(game = engine.name(), now = engine.now(), "runtime stopped");
    Ok(engine)
}

#[derive(Clone)]
pub struct GameHandle {
    requests: mpsc::Sender<Request>,
    updates: watch::Receiver<Arc<GameState>>,
}

impl GameHandle {
    /// Runs `f` against the engine between two clock advances.
    pub async fn call<T, F>(&self, f: F) -> Result<T, RuntimeError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Engine) -> T + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let job: Job = Box::new(move |engine| {
            if reply.send(f(engine)).is_err() {
                debug!("caller went away before the reply");
            }
        });
        self.requests
            .send(Request::Call(job))
            .await
            .map_err(|_| RuntimeError::Closed)?;
        response.await.map_err(|_| RuntimeError::Closed)
    }

    pub async fn dispatch(&self, event: Event) -> Result<Outcome, RuntimeError> {
        self.call(move |engine| engine.dispatch(event)).await
    }

    pub async fn till_box(&self, position: Position) -> Result<bool, RuntimeError> {
        self.call(move |engine| {
            let tilled = engine.till_box(position);
            if tilled {
                engine.increment_clicks();
            }
            tilled
        })
        .await
    }

    pub async fn plant_tree(&self, kind: TreeKind, position: Position) -> Result<bool, RuntimeError> {
        self.call(move |engine| engine.plant_tree(kind, position)).await
    }

    pub async fn purchase_upgrade(
        &self,
        id: UpgradeId,
        position: Option<Position>,
    ) -> Result<bool, RuntimeError> {
        self.call(move |engine| engine.purchase_upgrade(&id, position))
            .await
    }

    pub async fn add_click_power_boost(&self, multiplier: f64) -> Result<(), RuntimeError> {
        self.call(move |engine| engine.add_click_power_boost(multiplier))
            .await
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, RuntimeError> {
        self.call(|engine| GameSnapshot::capture(engine, Utc::now()))
            .await
    }

    /// The most recently published state, without a round trip.
    pub fn latest(&self) -> Arc<GameState> {
        Arc::clone(&self.updates.borrow())
    }

    /// Every published state, starting with the current one. Slow readers
    /// only see the latest.
    pub fn snapshots(&self) -> WatchStream<Arc<GameState>> {
        WatchStream::new(self.updates.clone())
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.requests
            .send(Request::Shutdown)
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}
