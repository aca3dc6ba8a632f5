//! Lloyd's algorithm. An empty cluster keeps its previous centroid.

use tracing::{debug, warn};

use crate::utilities::{
    error::{KmeansError, Result},
    structs::{Dataset, Point},
    utilities::{check_labels, inertia, nearest_centroid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stop {
    Converged,
    IterationCapped,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Refinement {
    pub centroids: Vec<Point>,
    pub labels: Vec<usize>,
    pub iterations: usize,
    pub stop: Stop,
    /// Assign-time inertia of every iteration, in order. Non-increasing.
    pub inertia_history: Vec<f64>,
}

impl Refinement {
    #[inline]
    pub fn converged(&self) -> bool {
        self.stop == Stop::Converged
    }
}

/// Writes the nearest centroid of every point into `labels` and returns the
/// resulting sum of squared distances.
pub fn assign(points: &[Point], centroids: &[Point], labels: &mut [usize]) -> Result<f64> {
    let dim = check_shapes(centroids)?;
    if labels.len() != points.len() {
        return Err(KmeansError::InvalidInput(format!(
            "{} label slots for {} points",
            labels.len(),
            points.len()
        )));
    }
    let mut total = 0.0;
    for (i, (p, label)) in points.iter().zip(labels.iter_mut()).enumerate() {
        if p.len() != dim {
            return Err(KmeansError::DimensionMismatch {
                expected: dim,
                found: p.len(),
            });
        }
        let (idx, d) = nearest_centroid(p, centroids);
        if !d.is_finite() {
            return Err(KmeansError::Numeric(format!(
                "distance from point {i} to centroid {idx} is {d}"
            )));
        }
        *label = idx;
        total += d;
    }
    if !total.is_finite() {
        return Err(KmeansError::Numeric(format!("inertia is {total}")));
    }
    Ok(total)
}

pub fn update(points: &[Point], labels: &[usize], centroids: &mut [Point]) -> Result<()> {
    let d = check_shapes(centroids)?;
    let k = centroids.len();
    check_labels(points, labels, k)?;
    if let Some(p) = points.iter().find(|p| p.len() != d) {
        return Err(KmeansError::DimensionMismatch {
            expected: d,
            found: p.len(),
        });
    }
    let mut sums = vec![vec![0.0; d]; k];
    let mut counts = vec![0usize; k];

    for (p, &l) in points.iter().zip(labels) {
        counts[l] += 1;
        for (s, v) in sums[l].iter_mut().zip(p) {
            *s += v;
        }
    }

    for (ci, (centroid, (sum, &n))) in centroids
        .iter_mut()
        .zip(sums.iter().zip(&counts))
        .enumerate()
    {
        if n == 0 {
            continue;
        }
        let nf = n as f64;
        for (x, s) in centroid.iter_mut().zip(sum) {
            *x = s / nf;
        }
        if centroid.iter().any(|v| !v.is_finite()) {
            return Err(KmeansError::Numeric(format!(
                "centroid {ci} is not finite after update"
            )));
        }
    }
    Ok(())
}

// Centroids must exist and share one width. Returns that width.
fn check_shapes(centroids: &[Point]) -> Result<usize> {
    let Some(first) = centroids.first() else {
        return Err(KmeansError::InvalidInput("no centroids".into()));
    };
    let d = first.len();
    if let Some(c) = centroids.iter().find(|c| c.len() != d) {
        return Err(KmeansError::DimensionMismatch {
            expected: d,
            found: c.len(),
        });
    }
    Ok(d)
}

/// A single assign + update pass. Returns the assign-time inertia.
pub fn step(points: &[Point], centroids: &mut [Point], labels: &mut [usize]) -> Result<f64> {
    let wcss = assign(points, centroids, labels)?;
    update(points, labels, centroids)?;
    Ok(wcss)
}

/// Refines `centroids` against `points` for at most `max_iter` iterations.
///
/// Inputs are validated first: `points` must form a valid dataset and
/// `centroids` must be non-empty, finite, and of the same width.
pub fn refine(points: &[Point], centroids: Vec<Point>, max_iter: usize) -> Result<Refinement> {
    let data = Dataset::new(points)?;
    if max_iter == 0 {
        return Err(KmeansError::config(
            "maxIter",
            "must be a positive integer, got 0",
        ));
    }
    if centroids.is_empty() {
        return Err(KmeansError::InvalidInput("no starting centroids".into()));
    }
    for c in &centroids {
        if c.len() != data.dim() {
            return Err(KmeansError::DimensionMismatch {
                expected: data.dim(),
                found: c.len(),
            });
        }
        if c.iter().any(|v| !v.is_finite()) {
            return Err(KmeansError::InvalidInput(
                "starting centroid is not finite".into(),
            ));
        }
    }
    run(&data, centroids, max_iter)
}

pub(crate) fn run(
    data: &Dataset<'_>,
    mut centroids: Vec<Point>,
    max_iter: usize,
) -> Result<Refinement> {
    let points = data.points();
    let n = data.len();
    let mut labels = vec![0usize; n];
    // usize::MAX never matches a real label, so the first iteration can't
    // report convergence.
    let mut prev = vec![usize::MAX; n];
    let mut inertia_history = Vec::new();
    let mut iterations = 0usize;

    let stop = loop {
        let wcss = step(points, &mut centroids, &mut labels)?;
        inertia_history.push(wcss);
        iterations += 1;
        debug!(iteration = iterations, inertia = wcss, "lloyd iteration");

        if labels == prev {
            break Stop::Converged;
        }
        if iterations >= max_iter {
            warn!(max_iter, "iteration cap reached before labels settled");
            break Stop::IterationCapped;
        }
        std::mem::swap(&mut prev, &mut labels);
    };

    Ok(Refinement {
        centroids,
        labels,
        iterations,
        stop,
        inertia_history,
    })
}

/// Inertia of a finished run, measured against its final centroids.
pub fn final_inertia(points: &[Point], r: &Refinement) -> Result<f64> {
    inertia(points, &r.centroids, &r.labels)
}
