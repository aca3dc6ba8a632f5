use crate::utilities::{
    error::{KmeansError, Result},
    structs::Point,
};

#[inline]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    let mut s = 0.0;
    for (x, y) in a.iter().zip(b) {
        let d = x - y;
        s += d * d;
    }
    s
}

/// Index and squared distance of the closest centroid. Ties go to the lowest
/// index. With no centroids, or none at a finite distance, the distance is
/// infinite.
#[inline]
pub fn nearest_centroid(p: &[f64], centroids: &[Point]) -> (usize, f64) {
    let mut idx = 0usize;
    let mut best = f64::INFINITY;
    for (j, c) in centroids.iter().enumerate() {
        let d = squared_distance(p, c);
        if d < best {
            best = d;
            idx = j;
        }
    }
    (idx, best)
}

/// Within-cluster sum of squares for a given assignment.
pub fn inertia(points: &[Point], centroids: &[Point], labels: &[usize]) -> Result<f64> {
    check_labels(points, labels, centroids.len())?;
    Ok(points
        .iter()
        .zip(labels)
        .map(|(p, &l)| squared_distance(p, &centroids[l]))
        .sum())
}

pub(crate) fn check_labels(points: &[Point], labels: &[usize], k: usize) -> Result<()> {
    if labels.len() != points.len() {
        return Err(KmeansError::InvalidInput(format!(
            "{} labels for {} points",
            labels.len(),
            points.len()
        )));
    }
    if let Some(&l) = labels.iter().find(|&&l| l >= k) {
        return Err(KmeansError::InvalidInput(format!(
            "label {l} out of range for {k} centroids"
        )));
    }
    Ok(())
}
