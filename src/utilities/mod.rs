pub mod config;
pub use config::{DEFAULT_MAX_ITER, InitMethod, KmeansConfig, KmeansOptions};

pub mod error;
pub use error::{KmeansError, Result};

pub mod init;
pub use init::init_centroids;

pub mod kmeans;
pub use kmeans::Kmeans;

pub mod lloyd;
pub use lloyd::{Refinement, Stop, refine};

pub mod rng;
pub use rng::RandomSource;

pub mod structs;
pub use structs::{Dataset, FitSummary, FittedState, Point};

pub mod utilities;
pub use utilities::{inertia, nearest_centroid, squared_distance};
