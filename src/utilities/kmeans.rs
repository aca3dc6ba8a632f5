use std::fmt;

use tracing::debug;

use crate::utilities::{
    config::{KmeansConfig, KmeansOptions},
    error::{KmeansError, Result},
    init::init_centroids,
    lloyd,
    rng::{entropy_seed, seeded},
    structs::{Dataset, FitSummary, FittedState, Point},
    utilities::nearest_centroid,
};

// Not internally synchronized; share across threads behind a lock.
#[derive(Clone, Debug)]
pub struct Kmeans {
    config: KmeansConfig,
    fitted: Option<FittedState>,
}

impl Kmeans {
    pub fn new(config: KmeansConfig) -> Result<Self> {
        Ok(Self {
            config: config.validate()?,
            fitted: None,
        })
    }

    pub fn from_options(opts: KmeansOptions) -> Result<Self> {
        Self::new(KmeansConfig::try_from(opts)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Self::from_options(KmeansOptions::from_json(bytes)?)
    }

    #[inline]
    pub fn config(&self) -> &KmeansConfig {
        &self.config
    }

    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.config.k()
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn fitted(&self) -> Result<&FittedState> {
        self.fitted.as_ref().ok_or(KmeansError::NotFitted)
    }

    // The previous fit survives an error.
    pub fn fit(&mut self, points: &[Point]) -> Result<FitSummary> {
        let state = self.train(points)?;
        let summary = state.summary();
        self.fitted = Some(state);
        Ok(summary)
    }

    pub fn fit_predict(&mut self, points: &[Point]) -> Result<Vec<usize>> {
        self.fit(points)?;
        Ok(self.fitted()?.labels.clone())
    }

    pub fn predict(&self, points: &[Point]) -> Result<Vec<usize>> {
        let state = self.fitted()?;
        let dim = state.dim();
        let mut out = Vec::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            if p.len() != dim {
                return Err(KmeansError::DimensionMismatch {
                    expected: dim,
                    found: p.len(),
                });
            }
            if p.iter().any(|v| !v.is_finite()) {
                return Err(KmeansError::InvalidInput(format!(
                    "query point {i} is not finite"
                )));
            }
            out.push(nearest_centroid(p, &state.centroids).0);
        }
        Ok(out)
    }

    pub fn centroids(&self) -> Result<&[Point]> {
        Ok(&self.fitted()?.centroids)
    }

    pub fn labels(&self) -> Result<&[usize]> {
        Ok(&self.fitted()?.labels)
    }

    /// Member point indices of each cluster, in ascending order. A cluster
    /// that ended up empty yields an empty list.
    pub fn clusters(&self) -> Result<Vec<Vec<usize>>> {
        let state = self.fitted()?;
        let mut groups = vec![Vec::new(); state.centroids.len()];
        for (i, &label) in state.labels.iter().enumerate() {
            if let Some(g) = groups.get_mut(label) {
                g.push(i);
            }
        }
        Ok(groups)
    }

    fn train(&self, points: &[Point]) -> Result<FittedState> {
        let data = Dataset::new(points)?;
        let k = self.config.k();
        data.require_at_least(k)?;

        let seed = self.config.random_seed().unwrap_or_else(entropy_seed);
        debug!(k, n = data.len(), dim = data.dim(), seed, "fit start");

        let mut rng = seeded(seed);
        let centroids = init_centroids(&data, k, self.config.init(), &mut rng)?;
        let run = lloyd::run(&data, centroids, self.config.max_iter())?;
        let inertia = lloyd::final_inertia(data.points(), &run)?;

        debug!(
            iterations = run.iterations,
            converged = run.converged(),
            inertia,
            "fit done"
        );

        let converged = run.converged();
        Ok(FittedState {
            centroids: run.centroids,
            labels: run.labels,
            iterations: run.iterations,
            converged,
            inertia,
            seed,
        })
    }
}

impl fmt::Display for Kmeans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.config, f)
    }
}
