use serde::Serialize;

use crate::utilities::error::{KmeansError, Result};

pub type Point = Vec<f64>;

// Non-empty, rectangular, at least one column, all values finite.
#[derive(Clone, Copy, Debug)]
pub struct Dataset<'a> {
    points: &'a [Point],
    dim: usize,
}

impl<'a> Dataset<'a> {
    pub fn new(points: &'a [Point]) -> Result<Self> {
        let Some(first) = points.first() else {
            return Err(KmeansError::InvalidInput("dataset is empty".into()));
        };
        let dim = first.len();
        if dim == 0 {
            return Err(KmeansError::InvalidInput(
                "points must have at least one coordinate".into(),
            ));
        }
        for (i, p) in points.iter().enumerate() {
            if p.len() != dim {
                return Err(KmeansError::InvalidInput(format!(
                    "row {i} has {} values, expected {dim}",
                    p.len()
                )));
            }
            if let Some(j) = p.iter().position(|v| !v.is_finite()) {
                return Err(KmeansError::InvalidInput(format!(
                    "row {i} column {j} is not finite"
                )));
            }
        }
        Ok(Self { points, dim })
    }

    pub fn require_at_least(&self, k: usize) -> Result<()> {
        if self.points.len() < k {
            return Err(KmeansError::InsufficientData {
                k,
                n_points: self.points.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn points(&self) -> &'a [Point] {
        self.points
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FittedState {
    pub centroids: Vec<Point>,
    pub labels: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
    pub seed: u64,
}

impl FittedState {
    pub fn dim(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    pub fn summary(&self) -> FitSummary {
        FitSummary {
            k: self.centroids.len(),
            dim: self.dim(),
            n_points: self.labels.len(),
            iterations: self.iterations,
            converged: self.converged,
            inertia: self.inertia,
            seed: self.seed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitSummary {
    pub k: usize,
    pub dim: usize,
    pub n_points: usize,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
    /// Seed the initializer ran with; pass it back as `randomSeed` to replay.
    pub seed: u64,
}
