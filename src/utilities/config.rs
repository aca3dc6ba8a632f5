use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::utilities::error::{KmeansError, Result};

pub const DEFAULT_MAX_ITER: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitMethod {
    #[default]
    Random,
    KmeansPlusPlus,
}

impl InitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            InitMethod::Random => "random",
            InitMethod::KmeansPlusPlus => "kmeans++",
        }
    }
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitMethod {
    type Err = KmeansError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(InitMethod::Random),
            "kmeans++" => Ok(InitMethod::KmeansPlusPlus),
            other => Err(KmeansError::config(
                "centroidsInitMethod",
                format!("expected \"random\" or \"kmeans++\", got {other:?}"),
            )),
        }
    }
}

// Signed and wide so out-of-range values reach validation.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KmeansOptions {
    pub k: i64,
    #[serde(default)]
    pub max_iter: Option<i64>,
    #[serde(default)]
    pub random_seed: Option<i128>,
    #[serde(default)]
    pub centroids_init_method: Option<String>,
}

impl KmeansOptions {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| KmeansError::config("options", e.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KmeansConfig {
    k: usize,
    max_iter: usize,
    random_seed: Option<u64>,
    init: InitMethod,
}

impl KmeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: DEFAULT_MAX_ITER,
            random_seed: None,
            init: InitMethod::Random,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fix the seed; without one each fit draws fresh entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_init(mut self, init: InitMethod) -> Self {
        self.init = init;
        self
    }

    pub fn validate(self) -> Result<Self> {
        if self.k == 0 {
            return Err(KmeansError::config("k", "must be a positive integer, got 0"));
        }
        if self.max_iter == 0 {
            return Err(KmeansError::config(
                "maxIter",
                "must be a positive integer, got 0",
            ));
        }
        Ok(self)
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    #[inline]
    pub fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    #[inline]
    pub fn init(&self) -> InitMethod {
        self.init
    }
}

impl TryFrom<KmeansOptions> for KmeansConfig {
    type Error = KmeansError;

    fn try_from(o: KmeansOptions) -> Result<Self> {
        let k = positive("k", o.k)?;
        let max_iter = match o.max_iter {
            Some(v) => positive("maxIter", v)?,
            None => DEFAULT_MAX_ITER,
        };
        let init = match o.centroids_init_method.as_deref() {
            Some(s) => s.parse()?,
            None => InitMethod::default(),
        };
        let mut cfg = KmeansConfig::new(k).with_max_iter(max_iter).with_init(init);
        if let Some(seed) = o.random_seed {
            cfg = cfg.with_seed(seed_bits(seed)?);
        }
        cfg.validate()
    }
}

impl fmt::Display for KmeansConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kmeans(k={}, max_iter={}, centroids_init_method={})",
            self.k, self.max_iter, self.init
        )
    }
}

fn positive(field: &'static str, v: i64) -> Result<usize> {
    if v <= 0 {
        return Err(KmeansError::config(
            field,
            format!("must be a positive integer, got {v}"),
        ));
    }
    usize::try_from(v).map_err(|_| KmeansError::config(field, format!("{v} is too large")))
}

// Negative seeds keep their two's-complement bits so every i64 and u64 maps
// to a distinct stream.
fn seed_bits(seed: i128) -> Result<u64> {
    if let Ok(v) = u64::try_from(seed) {
        return Ok(v);
    }
    i64::try_from(seed)
        .map(|v| v as u64)
        .map_err(|_| KmeansError::config("randomSeed", format!("{seed} does not fit in 64 bits")))
}
