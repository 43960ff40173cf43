//! The communicator: blocking collectives over a shared rendezvous cell.
//!
//! All workers of a cohort hold a [`Communicator`] onto the same cell. A
//! collective call deposits the caller's contribution, blocks until every
//! rank has deposited, and returns once the combined result has been
//! published. The last rank to arrive performs the combination, always
//! iterating contributions in rank order so that floating-point rounding is
//! identical from run to run for a fixed cohort size. A new collective
//! cannot start until every rank has taken the previous result, which keeps
//! the cohort in lockstep without any per-worker sequence numbers.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{Error, Result};

/// Identity of a worker within its cohort, in `0..size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub usize);

impl Rank {
    /// The designated reporting worker.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which collective the current round is running. Every rank must call the
/// same operation; a mismatch is a programming error in the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    SumReduce,
    Gather { root: Rank },
    Barrier,
}

#[derive(Debug, Clone)]
pub(crate) struct AbortState {
    pub(crate) rank: Rank,
    pub(crate) reason: String,
}

struct State {
    aborted: Option<AbortState>,
    kind: Option<OpKind>,
    inbox: Vec<Option<Vec<f64>>>,
    arrived: usize,
    result: Option<Arc<Vec<f64>>>,
    taken: usize,
}

/// The rendezvous cell shared by all communicators of one cohort.
pub(crate) struct Shared {
    state: Mutex<State>,
    cv: Condvar,
}

impl Shared {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            state: Mutex::new(State {
                aborted: None,
                kind: None,
                inbox: vec![None; size],
                arrived: 0,
                result: None,
                taken: 0,
            }),
            cv: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, State>) -> MutexGuard<'a, State> {
        self.cv.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the cohort aborted. First writer wins, so the recorded rank and
    /// reason identify the original failure, not a knock-on one.
    pub(crate) fn abort(&self, rank: Rank, reason: String) {
        let mut s = self.lock();
        if s.aborted.is_none() {
            debug!(rank = %rank, reason = %reason, "aborting cohort");
            s.aborted = Some(AbortState { rank, reason });
        }
        self.cv.notify_all();
    }

    pub(crate) fn abort_state(&self) -> Option<AbortState> {
        self.lock().aborted.clone()
    }
}

fn combine(kind: OpKind, payloads: &[Vec<f64>]) -> Vec<f64> {
    match kind {
        OpKind::SumReduce => {
            let len = payloads[0].len();
            let mut acc = vec![0.0; len];
            for payload in payloads {
                assert_eq!(payload.len(), len, "mismatched reduction operand lengths");
                for (a, v) in acc.iter_mut().zip(payload) {
                    *a += v;
                }
            }
            acc
        }
        OpKind::Gather { .. } => payloads.concat(),
        OpKind::Barrier => Vec::new(),
    }
}

/// One worker's handle onto its cohort.
pub struct Communicator {
    rank: Rank,
    size: usize,
    shared: Arc<Shared>,
}

impl Communicator {
    pub(crate) fn new(rank: Rank, size: usize, shared: Arc<Shared>) -> Self {
        Self { rank, size, shared }
    }

    /// This worker's rank, in `0..size`.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of workers in the cohort.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Element-wise sum across all ranks. Every rank passes a slice of the
    /// same length and every rank receives its own copy of the same sums,
    /// bit-for-bit identical across the cohort.
    pub fn sum_reduce(&self, local: &[f64]) -> Result<Vec<f64>> {
        let out = self.exchange(OpKind::SumReduce, local.to_vec())?;
        Ok(out.as_ref().clone())
    }

    /// Sum of one scalar per rank.
    pub fn sum_reduce_scalar(&self, value: f64) -> Result<f64> {
        let out = self.exchange(OpKind::SumReduce, vec![value])?;
        Ok(out[0])
    }

    /// Concatenate each rank's chunk in rank order at `root`. Every rank
    /// participates in the rendezvous; only `root` receives `Some`.
    pub fn gather(&self, local: &[f64], root: Rank) -> Result<Option<Vec<f64>>> {
        assert!(root.0 < self.size, "gather root {root} outside cohort of {}", self.size);
        let out = self.exchange(OpKind::Gather { root }, local.to_vec())?;
        Ok((self.rank == root).then(|| out.as_ref().clone()))
    }

    /// Block until every rank has reached the barrier.
    pub fn barrier(&self) -> Result<()> {
        self.exchange(OpKind::Barrier, Vec::new()).map(|_| ())
    }

    /// Abort the whole cohort. Peers blocked in or entering a collective
    /// receive [`Error::Aborted`] instead of waiting forever.
    pub fn abort(&self, reason: &str) {
        self.shared.abort(self.rank, reason.to_string());
    }

    fn exchange(&self, kind: OpKind, payload: Vec<f64>) -> Result<Arc<Vec<f64>>> {
        let me = self.rank.0;
        let mut s = self.shared.lock();

        // Wait for the previous round to fully drain before depositing.
        loop {
            if let Some(a) = &s.aborted {
                return Err(Error::Aborted { rank: a.rank, reason: a.reason.clone() });
            }
            if s.result.is_none() && s.inbox[me].is_none() {
                break;
            }
            s = self.shared.wait(s);
        }

        match s.kind {
            None => s.kind = Some(kind),
            Some(current) => {
                assert_eq!(current, kind, "mismatched collective operations across ranks");
            }
        }
        s.inbox[me] = Some(payload);
        s.arrived += 1;

        if s.arrived == self.size {
            let payloads: Vec<Vec<f64>> = s
                .inbox
                .iter_mut()
                .map(|slot| slot.take().expect("all ranks have deposited"))
                .collect();
            s.arrived = 0;
            s.taken = 0;
            s.result = Some(Arc::new(combine(kind, &payloads)));
            self.shared.cv.notify_all();
        }

        let out = loop {
            if let Some(result) = &s.result {
                break Arc::clone(result);
            }
            if let Some(a) = &s.aborted {
                return Err(Error::Aborted { rank: a.rank, reason: a.reason.clone() });
            }
            s = self.shared.wait(s);
        };

        s.taken += 1;
        if s.taken == self.size {
            s.result = None;
            s.kind = None;
            self.shared.cv.notify_all();
        }
        Ok(out)
    }
}
