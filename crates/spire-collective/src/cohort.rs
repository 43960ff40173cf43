//! Spawning and joining a fixed-size worker cohort.
//!
//! The cohort size is chosen once at startup and never changes. Each worker
//! runs the same closure on its own OS thread with its own [`Communicator`];
//! results come back in rank order. A worker that returns an error or
//! panics aborts the whole cohort so that no peer is left blocked on a
//! collective with a missing participant.

use std::fmt;
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::comm::{Communicator, Rank, Shared};
use crate::error::{Error, Result};

/// Aborts the cohort if the worker unwinds before disarming.
struct AbortOnPanic {
    shared: Arc<Shared>,
    rank: Rank,
    armed: bool,
}

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if self.armed {
            self.shared.abort(self.rank, "worker panicked".to_string());
        }
    }
}

/// Run `worker` on `size` symmetric threads and collect the per-rank
/// results in rank order.
///
/// The closure receives the rank's [`Communicator`]; everything else it
/// needs must be captured or rebuilt per worker. If any worker fails, the
/// cohort is aborted and the error of the original failure is returned.
pub fn run_cohort<T, E, F>(size: usize, worker: F) -> Result<Vec<T>>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
    F: Fn(Communicator) -> std::result::Result<T, E> + Send + Sync + 'static,
{
    if size == 0 {
        return Err(Error::EmptyCohort);
    }

    debug!(size, "spawning worker cohort");
    let shared = Arc::new(Shared::new(size));
    let worker = Arc::new(worker);

    let mut handles = Vec::with_capacity(size);
    for r in 0..size {
        let worker_shared = Arc::clone(&shared);
        let worker = Arc::clone(&worker);
        let handle = thread::Builder::new()
            .name(format!("spire-worker-{r}"))
            .spawn(move || {
                let rank = Rank(r);
                let comm = Communicator::new(rank, size, Arc::clone(&worker_shared));
                let mut guard =
                    AbortOnPanic { shared: Arc::clone(&worker_shared), rank, armed: true };
                let out = worker(comm);
                guard.armed = false;
                if let Err(e) = &out {
                    worker_shared.abort(rank, e.to_string());
                }
                out
            });
        match handle {
            Ok(h) => handles.push(h),
            Err(e) => {
                // Already-spawned workers must not hang on a rendezvous
                // their missing peers will never reach.
                shared.abort(Rank(r), "worker thread could not be spawned".to_string());
                for h in handles {
                    let _ = h.join();
                }
                return Err(Error::Spawn(e));
            }
        }
    }

    let joined: Vec<_> = handles.into_iter().map(thread::JoinHandle::join).collect();

    if let Some(abort) = shared.abort_state() {
        return Err(Error::WorkerFailed { rank: abort.rank, reason: abort.reason });
    }

    let mut outputs = Vec::with_capacity(size);
    for (r, result) in joined.into_iter().enumerate() {
        match result {
            Ok(Ok(value)) => outputs.push(value),
            Ok(Err(e)) => return Err(Error::WorkerFailed { rank: Rank(r), reason: e.to_string() }),
            Err(_) => {
                return Err(Error::WorkerFailed {
                    rank: Rank(r),
                    reason: "worker panicked".to_string(),
                })
            }
        }
    }
    Ok(outputs)
}
