// tests/helpers.rs
use kmeans_engine::Point;

/// The four-point, two-pair fixture: two points near the origin, two near (10, 10).
#[allow(dead_code)]
pub fn two_pairs() -> Vec<Point> {
    vec![
        vec![0.0, 0.0],
        vec![0.1, 0.1],
        vec![10.0, 10.0],
        vec![10.1, 10.1],
    ]
}

/// Small deterministic wiggle in [-0.5, 0.5] you can use as repeatable “noise”.
pub fn jitter(i: u32) -> f64 {
    let mut x = i.wrapping_mul(1664525).wrapping_add(1013904223);
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    (x as f64 / (u32::MAX as f64)) - 0.5
}

/// `per_blob` points scattered around each center, `spread` wide on every axis.
/// Rows come out grouped by blob, in center order.
pub fn blobs(centers: &[Point], per_blob: usize, spread: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(centers.len() * per_blob);
    let mut i = 0u32;
    for c in centers {
        for _ in 0..per_blob {
            let p = c
                .iter()
                .map(|&v| {
                    i = i.wrapping_add(1);
                    v + spread * jitter(i)
                })
                .collect();
            out.push(p);
        }
    }
    out
}

// Deterministic uniform rows in [lo, hi]^dim
#[allow(dead_code)]
pub fn uniform_rows(n: usize, dim: usize, lo: f64, hi: f64, seed: u64) -> Vec<Point> {
    assert!(hi > lo);
    let mut s = seed | 1; // odd
    (0..n)
        .map(|_| {
            (0..dim)
                .map(|_| {
                    s = s
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    let u = ((s >> 11) as f64) * (1.0 / (1u64 << 53) as f64);
                    lo + (hi - lo) * u
                })
                .collect()
        })
        .collect()
}

/// Check two numbers are close within a simple absolute tolerance.
#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Bit patterns of every centroid coordinate, for exact comparisons.
#[allow(dead_code)]
pub fn bits(rows: &[Point]) -> Vec<Vec<u64>> {
    rows.iter()
        .map(|r| r.iter().map(|v| v.to_bits()).collect())
        .collect()
}

/// True when every row of one blob shares a label and no two blobs share one.
#[allow(dead_code)]
pub fn blob_partition_recovered(labels: &[usize], n_blobs: usize, per_blob: usize) -> bool {
    let firsts: Vec<usize> = (0..n_blobs).map(|b| labels[b * per_blob]).collect();
    for b in 0..n_blobs {
        if labels[b * per_blob..(b + 1) * per_blob]
            .iter()
            .any(|&l| l != firsts[b])
        {
            return false;
        }
    }
    let mut uniq = firsts.clone();
    uniq.sort_unstable();
    uniq.dedup();
    uniq.len() == n_blobs
}
