//! The power-iteration driver.

use tracing::{debug, warn};

use spire_collective::Communicator;

use crate::dot::dot;
use crate::error::{Error, Result};
use crate::matrix::ColumnBlock;
use crate::matvec::matvec;
use crate::vector::DistVector;

/// Stopping parameters for the power iteration.
#[derive(Debug, Clone, Copy)]
pub struct PowerConfig {
    /// Convergence tolerance on the relative change of the eigenvalue
    /// estimate between successive iterations.
    pub tolerance: f64,
    /// Iteration budget. Exhausting it is a warning, not an error; the best
    /// available estimate is still returned.
    pub max_iterations: usize,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-10,
            max_iterations: 1000,
        }
    }
}

impl PowerConfig {
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// How the iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The relative change in the eigenvalue estimate dropped to or below
    /// the tolerance.
    Converged,
    /// The iteration budget ran out first; the returned estimate is the
    /// best available, not a converged one.
    Exhausted,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// The output of a power-iteration run.
#[derive(Debug, Clone)]
pub struct PowerSolution {
    /// Final eigenvalue estimate λ.
    pub eigenvalue: f64,
    /// Iterations actually performed, in `1..=max_iterations`.
    pub iterations: usize,
    /// Whether the run converged or exhausted its budget.
    pub termination: Termination,
    /// The final normalized eigenvector estimate x.
    pub eigenvector: DistVector,
    /// The final product `A · x`, kept for residual evaluation.
    pub image: DistVector,
}

/// Run the power iteration from `initial` until the eigenvalue estimate
/// stabilizes.
///
/// Each pass normalizes the running result by its Euclidean norm, applies
/// the distributed matrix-vector product, and re-estimates the eigenvalue
/// as `λ = x' · (A · x)` (a Rayleigh-quotient estimate, since x has unit
/// norm). The stopping criterion is the relative change `|λ − λ_old| / λ`,
/// not a residual norm; it can stop early when λ varies slowly even though
/// the eigenvector estimate is still poor. That limitation is inherent to
/// the method as specified here and is deliberately not strengthened.
///
/// The norm and λ are computed via the distributed dot product, so each
/// pass has three cohort rendezvous: the norm reduction, the matvec
/// reduction, and the λ reduction. All workers therefore observe identical
/// iteration counts and error values at every pass.
///
/// Returns [`Error::ZeroNorm`] if the running result has exactly zero norm;
/// the estimate cannot be normalized and continuing would propagate
/// non-finite values. All workers detect this on the same iteration because
/// the norm is a replicated scalar.
pub fn power_iterate(
    comm: &Communicator,
    block: &ColumnBlock,
    initial: DistVector,
    config: &PowerConfig,
) -> Result<PowerSolution> {
    assert!(config.tolerance > 0.0, "tolerance must be positive");
    assert!(config.max_iterations >= 1, "iteration budget must be positive");
    assert_eq!(initial.local.len(), block.local_cols(), "initial shard length mismatch");
    assert_eq!(initial.full.len(), block.rows(), "initial full length mismatch");

    let mut x = initial;
    let mut y = matvec(comm, block, &x.local)?;

    let mut lambda = 0.0;
    let mut err = config.tolerance + 1.0;
    let mut it = 0;
    while err > config.tolerance && it < config.max_iterations {
        it += 1;
        let lambda_old = lambda;

        let norm_y = dot(comm, &y.local, &y.local)?.sqrt();
        if norm_y == 0.0 {
            return Err(Error::ZeroNorm { iteration: it });
        }
        for (x_l, y_l) in x.local.iter_mut().zip(&y.local) {
            *x_l = y_l / norm_y;
        }
        for (x_f, y_f) in x.full.iter_mut().zip(&y.full) {
            *x_f = y_f / norm_y;
        }

        y = matvec(comm, block, &x.local)?;
        lambda = dot(comm, &x.local, &y.local)?;

        err = ((lambda - lambda_old) / lambda).abs();
        debug!(iteration = it, lambda, error = err, "power iteration step");
    }

    let termination = if err <= config.tolerance {
        Termination::Converged
    } else {
        warn!(iterations = it, "maximum number of iterations reached");
        Termination::Exhausted
    };

    Ok(PowerSolution {
        eigenvalue: lambda,
        iterations: it,
        termination,
        eigenvector: x,
        image: y,
    })
}
