//! Solver configuration, loadable from TOML.
//!
//! ```
//! use rush_hour_solver::SolverConfig;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     algorithm = "a_star"
//!     heuristic = "two_blocking_vehicles"
//!     random_seed = 7
//!     time_limit_secs = 60
//!
//!     [refiner]
//!     bin_size = 12
//! "#).unwrap();
//!
//! assert_eq!(config.build().name(), "a_star");
//! assert_eq!(config.refiner.unwrap().min_bin_size, 5);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::refiner::{StepRefiner, DEFAULT_BIN_SIZE};
use crate::search::{
    AStar, BreadthFirst, DepthFirst, Heuristic, MovePolicy, RandomPolicy, RandomWalk, Search,
    SearchConfig,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    DepthFirst,
    BranchAndBound,
    #[default]
    BreadthFirst,
    AStar,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    pub algorithm: Algorithm,
    pub move_policy: MovePolicy,
    /// End the search once Carter has a clear run to the exit.
    pub free_carter: bool,
    /// Used by `a_star` only.
    pub heuristic: Heuristic,
    /// Used by `random` only.
    pub random_policy: RandomPolicy,
    pub random_seed: Option<u64>,
    pub time_limit_secs: Option<u64>,
    pub checkpoint_interval: Option<usize>,
    /// File that breadth-first checkpoints are written to.
    pub checkpoint_path: Option<PathBuf>,
    /// Shorten the solution afterwards when present.
    pub refiner: Option<RefinerConfig>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            algorithm: Algorithm::default(),
            move_policy: MovePolicy::default(),
            free_carter: true,
            heuristic: Heuristic::default(),
            random_policy: RandomPolicy::default(),
            random_seed: None,
            time_limit_secs: None,
            checkpoint_interval: None,
            checkpoint_path: None,
            refiner: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RefinerConfig {
    pub bin_size: usize,
    /// Smallest bin size tried when passes stop improving.
    pub min_bin_size: usize,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        RefinerConfig {
            bin_size: DEFAULT_BIN_SIZE,
            min_bin_size: 5,
        }
    }
}

impl RefinerConfig {
    pub fn build(&self) -> StepRefiner {
        StepRefiner::new(self.bin_size)
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checkpoint_interval == Some(0) {
            let message = "checkpoint_interval must be at least 1".to_string();
            return Err(ConfigError::Invalid(message));
        }

        if let Some(refiner) = &self.refiner {
            if refiner.min_bin_size == 0 || refiner.min_bin_size > refiner.bin_size {
                return Err(ConfigError::Invalid(format!(
                    "refiner needs 1 <= min_bin_size <= bin_size, got {} and {}",
                    refiner.min_bin_size, refiner.bin_size
                )));
            }
        }

        Ok(())
    }

    /// Settings that are valid but have no effect together.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        match (&self.checkpoint_path, self.checkpoint_interval) {
            (Some(_), None) => warnings.push(
                "checkpoint_path has no effect without checkpoint_interval".to_string(),
            ),
            (None, Some(_)) => warnings.push(
                "checkpoint_interval has no effect without checkpoint_path".to_string(),
            ),
            _ => {}
        }

        if self.checkpoint_path.is_some() && self.algorithm != Algorithm::BreadthFirst {
            warnings.push(format!(
                "checkpoints are only written by breadth_first, not {:?}",
                self.algorithm
            ));
        }

        warnings
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }

    /// The knobs every engine shares.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            move_policy: self.move_policy,
            free_carter: self.free_carter,
            time_limit: self.time_limit(),
            checkpoint_interval: self.checkpoint_interval,
            random_seed: self.random_seed,
        }
    }

    pub fn build(&self) -> Box<dyn Search> {
        let config = self.search_config();
        match self.algorithm {
            Algorithm::DepthFirst => Box::new(DepthFirst::new(config)),
            Algorithm::BranchAndBound => Box::new(DepthFirst::new(config).branch_and_bound(true)),
            Algorithm::BreadthFirst => Box::new(BreadthFirst::new(config)),
            Algorithm::AStar => Box::new(AStar::new(config, self.heuristic)),
            Algorithm::Random => Box::new(RandomWalk::new(self.random_policy, config)),
        }
    }
}
