//! Async front end for the state machine.
//!
//! A single tokio task owns the `SapController`. Callers talk to it through
//! a `SapHandle`; CAC timer expiries arrive on a second channel drained by
//! the same task, so every mutation of the shared regulatory state happens
//! in one place.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::channel::OperatingChannel;
use crate::config::SapConfig;
use crate::error::{Result, SapError};
use crate::event::SapEvent;
use crate::fsm::SapController;
use crate::regulatory::RegulatoryDomain;
use crate::session::{SapState, SessionConfig, SessionId};
use crate::sink::{CacTimer, EventSink, LowerLayer};

/// Point-in-time view of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub state: SapState,
    pub operating: Option<OperatingChannel>,
}

enum Request {
    Open {
        config: SessionConfig,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    Close {
        id: SessionId,
        reply: oneshot::Sender<Result<()>>,
    },
    Event {
        session: SessionId,
        event: SapEvent,
        reply: Option<oneshot::Sender<Result<()>>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<SessionSnapshot>>,
    },
    Shutdown,
}

/// CAC timer backed by a `tokio::time::sleep` task.
///
/// Each arm bumps a generation number; expiries carrying an older
/// generation were raced by a disarm and are dropped.
pub struct QueuedCacTimer {
    tx: mpsc::UnboundedSender<u64>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl QueuedCacTimer {
    fn new(tx: mpsc::UnboundedSender<u64>) -> Self {
        Self {
            tx,
            task: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }
}

impl CacTimer for QueuedCacTimer {
    fn arm(&mut self, duration: Duration) {
        self.disarm();
        let generation = self.generation;
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(generation);
        }));
        debug!(target: "dfs", generation, ms = duration.as_millis() as u64, "CAC timer armed");
    }

    fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Cloneable handle to a running `SapRuntime`
#[derive(Clone)]
pub struct SapHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl SapHandle {
    pub async fn open_session(&self, config: SessionConfig) -> Result<SessionId> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Open { config, reply })?;
        rx.await.map_err(|_| SapError::RuntimeStopped)?
    }

    pub async fn close_session(&self, id: SessionId) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Close { id, reply })?;
        rx.await.map_err(|_| SapError::RuntimeStopped)?
    }

    /// Queue an event without waiting for it to be processed
    pub fn send(&self, session: SessionId, event: SapEvent) -> Result<()> {
        self.request(Request::Event {
            session,
            event,
            reply: None,
        })
    }

    /// Queue an event and wait until the controller has run it
    pub async fn dispatch(&self, session: SessionId, event: SapEvent) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Event {
            session,
            event,
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| SapError::RuntimeStopped)?
    }

    pub async fn snapshot(&self) -> Result<Vec<SessionSnapshot>> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Snapshot { reply })?;
        rx.await.map_err(|_| SapError::RuntimeStopped)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.request(Request::Shutdown)
    }

    fn request(&self, request: Request) -> Result<()> {
        self.tx.send(request).map_err(|_| SapError::RuntimeStopped)
    }
}

/// Actor owning one `SapController`
pub struct SapRuntime<S, L> {
    controller: SapController<S, L, QueuedCacTimer>,
    requests: mpsc::UnboundedReceiver<Request>,
    cac_expiries: mpsc::UnboundedReceiver<u64>,
}

impl<S, L> SapRuntime<S, L>
where
    S: EventSink + 'static,
    L: LowerLayer + 'static,
{
    pub fn new(
        config: SapConfig,
        domain: RegulatoryDomain,
        sink: S,
        lower: L,
    ) -> Result<(Self, SapHandle)> {
        let (cac_tx, cac_expiries) = mpsc::unbounded_channel();
        let controller =
            SapController::with_domain(config, domain, sink, lower, QueuedCacTimer::new(cac_tx))?;
        let (tx, requests) = mpsc::unbounded_channel();
        Ok((
            Self {
                controller,
                requests,
                cac_expiries,
            },
            SapHandle { tx },
        ))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.controller = self.controller.with_seed(seed);
        self
    }

    /// Run the actor on the current tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        info!(target: "sap", "SAP runtime started");
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(Request::Shutdown) | None => break,
                    Some(request) => self.handle(request),
                },
                Some(generation) = self.cac_expiries.recv() => self.on_cac_expiry(generation),
            }
        }
        self.controller.timer_mut().disarm();
        info!(target: "sap", "SAP runtime stopped");
    }

    fn handle(&mut self, request: Request) {
        let now = tokio::time::Instant::now().into_std();
        match request {
            Request::Open { config, reply } => {
                let _ = reply.send(self.controller.open_session(config));
            }
            Request::Close { id, reply } => {
                let _ = reply.send(self.controller.close_session(id));
            }
            Request::Event {
                session,
                event,
                reply,
            } => {
                let result = self.controller.dispatch_at(session, event, now);
                match reply {
                    Some(reply) => {
                        let _ = reply.send(result);
                    }
                    None => {
                        if let Err(err) = result {
                            warn!(target: "sap", session, error = %err, "queued event rejected");
                        }
                    }
                }
            }
            Request::Snapshot { reply } => {
                let snapshot = self
                    .controller
                    .sessions()
                    .map(|ctx| SessionSnapshot {
                        id: ctx.id(),
                        state: ctx.state(),
                        operating: ctx.operating(),
                    })
                    .collect();
                let _ = reply.send(snapshot);
            }
            Request::Shutdown => {}
        }
    }

    fn on_cac_expiry(&mut self, generation: u64) {
        let timer = self.controller.timer_mut();
        if generation != timer.generation() || !timer.is_armed() {
            debug!(target: "dfs", generation, "stale CAC expiry dropped");
            return;
        }
        timer.task = None;
        let now = tokio::time::Instant::now().into_std();
        self.controller.cac_timer_expired(now);
    }
}
