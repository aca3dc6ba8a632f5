use kmeans_engine::utilities::init::{kmeans_plus_plus_init, random_init};
use kmeans_engine::utilities::lloyd::{assign, final_inertia, refine, step, update};
use kmeans_engine::utilities::rng::seeded;
use kmeans_engine::{KmeansError, Stop};

mod helpers;
use helpers::{approx_eq, blobs, uniform_rows};

// --- Empty-cluster policy ---

#[test]
fn empty_cluster_keeps_its_centroid() {
    let points = vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]];
    let start = vec![vec![0.5], vec![10.5], vec![100.0]];
    let r = refine(&points, start, 50).unwrap();

    assert_eq!(r.stop, Stop::Converged);
    assert_eq!(r.iterations, 2);
    assert_eq!(r.labels, vec![0, 0, 1, 1]);
    assert_eq!(r.centroids[2], vec![100.0]);
    assert_eq!(r.centroids[0], vec![0.5]);
    assert_eq!(r.centroids[1], vec![10.5]);
}

#[test]
fn update_skips_clusters_without_members() {
    let points = vec![vec![2.0, 2.0], vec![4.0, 4.0]];
    let mut centroids = vec![vec![0.0, 0.0], vec![-7.0, 3.0]];
    update(&points, &[0, 0], &mut centroids).unwrap();
    assert_eq!(centroids, vec![vec![3.0, 3.0], vec![-7.0, 3.0]]);
}

// --- Single steps ---

#[test]
fn assign_breaks_ties_toward_lower_index() {
    let points = vec![vec![1.0]];
    let centroids = vec![vec![0.0], vec![2.0]];
    let mut labels = vec![9];
    let wcss = assign(&points, &centroids, &mut labels).unwrap();
    assert_eq!(labels, vec![0]);
    assert_eq!(wcss, 1.0);
}

#[test]
fn step_moves_centroids_to_member_means() {
    let points = vec![vec![0.0], vec![2.0], vec![10.0], vec![14.0]];
    let mut centroids = vec![vec![1.0], vec![9.0]];
    let mut labels = vec![0; 4];
    let wcss = step(&points, &mut centroids, &mut labels).unwrap();
    assert_eq!(labels, vec![0, 0, 1, 1]);
    assert_eq!(centroids, vec![vec![1.0], vec![12.0]]);
    assert_eq!(wcss, 1.0 + 1.0 + 1.0 + 25.0);
}

// --- Convergence behavior ---

#[test]
fn inertia_never_increases_between_iterations() {
    let data = uniform_rows(200, 2, -50.0, 50.0, 314);
    for seed in 0..5u64 {
        let mut rng = seeded(seed);
        let start = random_init(&data, 8, &mut rng);
        let r = refine(&data, start, 100).unwrap();
        for w in r.inertia_history.windows(2) {
            assert!(
                w[1] <= w[0] + 1e-9 * w[0].max(1.0),
                "inertia rose: {} -> {}",
                w[0],
                w[1]
            );
        }
    }
}

#[test]
fn last_assign_inertia_matches_final_inertia() {
    let data = blobs(&[vec![0.0, 0.0], vec![20.0, 20.0]], 15, 1.0);
    let mut rng = seeded(2);
    let start = kmeans_plus_plus_init(&data, 2, &mut rng).unwrap();
    let r = refine(&data, start, 100).unwrap();
    assert!(r.converged());
    assert_eq!(r.inertia_history.len(), r.iterations);
    // The final assign step already saw the final centroids.
    let last = *r.inertia_history.last().unwrap();
    assert!(approx_eq(last, final_inertia(&data, &r).unwrap(), 1e-9));
}

#[test]
fn cap_stops_refinement() {
    // Labels still move on the second pass, so two iterations can't settle.
    let points: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
    let r = refine(&points, vec![vec![0.0], vec![1.0]], 2).unwrap();
    assert_eq!(r.stop, Stop::IterationCapped);
    assert!(!r.converged());
    assert_eq!(r.iterations, 2);
    assert_eq!(r.inertia_history.len(), 2);
    assert_eq!(r.labels, vec![0, 0, 0, 1, 1, 1, 1, 1, 1, 1]);
    assert_eq!(r.centroids, vec![vec![1.0], vec![6.0]]);

    let r = refine(&points, vec![vec![0.0], vec![1.0]], 100).unwrap();
    assert_eq!(r.stop, Stop::Converged);
    assert_eq!(r.iterations, 5);
    assert_eq!(r.labels, vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
}

// --- Validation ---

#[test]
fn refine_validates_its_inputs() {
    let points = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
    assert_eq!(
        refine(&points, vec![vec![0.0]], 10).unwrap_err(),
        KmeansError::DimensionMismatch {
            expected: 2,
            found: 1
        }
    );
    assert_eq!(
        refine(&points, vec![], 10).unwrap_err().kind(),
        "InvalidInput"
    );
    assert_eq!(
        refine(&points, vec![vec![0.0, 0.0]], 0).unwrap_err().kind(),
        "InvalidConfig"
    );
    assert_eq!(
        refine(&[], vec![vec![0.0, 0.0]], 10).unwrap_err().kind(),
        "InvalidInput"
    );
}

#[test]
fn overflowing_distance_is_a_numeric_error() {
    let points = vec![vec![1e300], vec![-1e300]];
    let err = refine(&points, vec![vec![1e300]], 10).unwrap_err();
    assert_eq!(err.kind(), "NumericError");
}

#[test]
fn primitives_reject_malformed_arguments() {
    let points = vec![vec![0.0, 0.0], vec![1.0, 1.0]];

    let mut labels = vec![0; 2];
    let err = assign(&points, &[], &mut labels).unwrap_err();
    assert_eq!(err.kind(), "InvalidInput");
    let err = step(&points, &mut [], &mut labels).unwrap_err();
    assert_eq!(err.kind(), "InvalidInput");

    let centroids = vec![vec![0.0, 0.0]];
    let mut short = vec![0; 1];
    let err = assign(&points, &centroids, &mut short).unwrap_err();
    assert_eq!(err.kind(), "InvalidInput");

    let mut centroids = vec![vec![0.0, 0.0], vec![5.0, 5.0]];
    assert_eq!(
        update(&points, &[0], &mut centroids).unwrap_err().kind(),
        "InvalidInput"
    );
    assert_eq!(
        update(&points, &[0, 2], &mut centroids).unwrap_err().kind(),
        "InvalidInput"
    );
    assert_eq!(centroids, vec![vec![0.0, 0.0], vec![5.0, 5.0]]);

    let ragged = vec![vec![0.0, 0.0], vec![1.0]];
    assert_eq!(
        assign(&points, &ragged, &mut labels).unwrap_err(),
        KmeansError::DimensionMismatch {
            expected: 2,
            found: 1
        }
    );
    let narrow = vec![vec![0.0]];
    assert_eq!(
        assign(&points, &narrow, &mut labels).unwrap_err(),
        KmeansError::DimensionMismatch {
            expected: 1,
            found: 2
        }
    );
}
