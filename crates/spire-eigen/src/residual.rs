//! Residual norms of a computed eigenpair. Reporting only; convergence
//! decisions have already been made by the driver.

use spire_collective::Communicator;

use crate::dot::dot;
use crate::error::Result;
use crate::power::PowerSolution;

/// Quality of a computed eigenpair.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResidualNorms {
    /// `‖A·x − λ·x‖`
    pub absolute: f64,
    /// `‖A·x − λ·x‖ / |λ|`
    pub relative: f64,
}

/// Evaluate `‖A·x − λ·x‖` for a finished solve, reusing the driver's final
/// `A·x` so no extra matrix-vector product is needed. The residual shard is
/// formed locally; one distributed dot product of the shard with itself
/// yields the global norm.
pub fn residual_norms(comm: &Communicator, solution: &PowerSolution) -> Result<ResidualNorms> {
    let lambda = solution.eigenvalue;
    let shard: Vec<f64> = solution
        .image
        .local
        .iter()
        .zip(&solution.eigenvector.local)
        .map(|(y, x)| y - lambda * x)
        .collect();

    let absolute = dot(comm, &shard, &shard)?.sqrt();
    Ok(ResidualNorms { absolute, relative: absolute / lambda.abs() })
}
