//! Background user loading with request sequencing.
//!
//! Every [`Loader::start`] gets a fresh generation number. Only the answer
//! for the newest generation is delivered; answers to superseded requests
//! are dropped when they arrive.
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::error::DynError;
use crate::events::EventEmitter;
use crate::sys::{UserRecord, UserSource};

/// Result of the newest load request.
#[derive(Clone, Debug)]
pub enum LoadOutcome {
    Loaded { generation: u64, users: Vec<UserRecord> },
    Failed { generation: u64, error: String },
}

type Completion = (u64, std::result::Result<Vec<UserRecord>, DynError>);

pub struct Loader {
    source: Arc<dyn UserSource>,
    generation: u64,
    busy: bool,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    completed: EventEmitter<LoadOutcome>,
}

impl Loader {
    pub fn new(source: Arc<dyn UserSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            generation: 0,
            busy: false,
            tx,
            rx,
            completed: EventEmitter::new(),
        }
    }

    pub fn source(&self) -> &Arc<dyn UserSource> {
        &self.source
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Generation of the newest request (0 before the first one).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn completed(&self) -> &EventEmitter<LoadOutcome> {
        &self.completed
    }

    /// Kick off a fetch on a worker thread and mark the loader busy.
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.busy = true;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tracing::info!(generation, source = %source.describe(), "loading users");
        let spawned = std::thread::Builder::new()
            .name(format!("userpager-load-{generation}"))
            .spawn(move || {
                let res = source.fetch_all();
                // the receiver is gone once the app has shut down
                let _ = tx.send((generation, res));
            });
        if let Err(e) = spawned {
            let _ = self.tx.send((generation, Err(Box::new(e) as DynError)));
        }
        generation
    }

    /// Deliver any finished fetches. Returns whether the newest one landed.
    pub fn poll(&mut self) -> bool {
        let mut delivered = false;
        while let Ok(done) = self.rx.try_recv() {
            delivered |= self.finish(done);
        }
        delivered
    }

    /// Block until the newest request finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let until = Instant::now() + timeout;
        while self.busy {
            let left = until.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(done) => {
                    self.finish(done);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        !self.busy
    }

    fn finish(&mut self, (generation, res): Completion) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, latest = self.generation, "dropping stale load result");
            return false;
        }
        self.busy = false;
        let outcome = match res {
            Ok(users) => {
                tracing::info!(generation, count = users.len(), "users loaded");
                LoadOutcome::Loaded { generation, users }
            }
            Err(error) => {
                tracing::error!(generation, %error, "failed to load users");
                LoadOutcome::Failed { generation, error: error.to_string() }
            }
        };
        self.completed.emit(&outcome);
        true
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("source", &self.source.describe())
            .field("generation", &self.generation)
            .field("busy", &self.busy)
            .finish()
    }
}
