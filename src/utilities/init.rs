use tracing::debug;

use crate::utilities::{
    config::InitMethod,
    error::{KmeansError, Result},
    rng::RandomSource,
    structs::{Dataset, Point},
    utilities::squared_distance,
};

pub fn init_centroids<R: RandomSource + ?Sized>(
    data: &Dataset<'_>,
    k: usize,
    method: InitMethod,
    rng: &mut R,
) -> Result<Vec<Point>> {
    data.require_at_least(k)?;
    let centroids = match method {
        InitMethod::Random => random_init(data.points(), k, rng),
        InitMethod::KmeansPlusPlus => kmeans_plus_plus_init(data.points(), k, rng)?,
    };
    debug!(k, n = data.len(), method = %method, "initialized centroids");
    Ok(centroids)
}

/// k rows drawn without replacement via a partial Fisher-Yates shuffle of
/// the row indices.
pub fn random_init<R: RandomSource + ?Sized>(
    points: &[Point],
    k: usize,
    rng: &mut R,
) -> Vec<Point> {
    let n = points.len();
    let mut idx: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = i + rng.next_index(n - i);
        idx.swap(i, j);
    }
    idx[..k].iter().map(|&i| points[i].clone()).collect()
}

/// k-means++ seeding (Arthur & Vassilvitskii, 2007).
///
/// The first centroid is uniform; each later one is drawn with probability
/// proportional to D(x)², the squared distance from x to its nearest chosen
/// centroid. When every weight is zero the next centroid is drawn uniformly
/// from the rows not picked yet.
pub fn kmeans_plus_plus_init<R: RandomSource + ?Sized>(
    points: &[Point],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Point>> {
    let n = points.len();
    let mut centroids: Vec<Point> = Vec::with_capacity(k);
    let mut chosen = vec![false; n];

    let first = rng.next_index(n);
    chosen[first] = true;
    centroids.push(points[first].clone());

    let mut weights: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = weights.iter().sum();
        if !total.is_finite() {
            return Err(KmeansError::Numeric(format!(
                "k-means++ weight total is {total}"
            )));
        }

        let next = if total > 0.0 {
            weighted_pick(&weights, total, rng)
        } else {
            let remaining: Vec<usize> = (0..n).filter(|&i| !chosen[i]).collect();
            remaining[rng.next_index(remaining.len())]
        };
        chosen[next] = true;

        let c = points[next].clone();
        for (w, p) in weights.iter_mut().zip(points) {
            let d = squared_distance(p, &c);
            if d < *w {
                *w = d;
            }
        }
        centroids.push(c);
    }

    Ok(centroids)
}

// Zero-weight rows are never returned. `total` must be the positive sum of
// `weights`; the last positive row absorbs rounding at the top end.
fn weighted_pick<R: RandomSource + ?Sized>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let threshold = rng.next_unit() * total;
    let mut cum = 0.0;
    let mut last = 0usize;
    for (j, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        last = j;
        cum += w;
        if cum > threshold {
            return j;
        }
    }
    last
}
