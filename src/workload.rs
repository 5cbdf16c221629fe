//! Benchmark workloads: a bulk sequence of keys to insert, and keys sampled from it to search for
//! and to delete.

use log::{debug, info, LevelFilter};
use rand::{rngs::OsRng, Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::{ConfigError, InstrumentedTree, WorkloadError};

/// Parameters of a benchmark run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Number of keys in the bulk insert sequence.
    pub count: usize,
    /// Keys are drawn uniformly from `1..=max_key`, so duplicates are possible.
    pub max_key: i32,
    /// Number of keys sampled for searching.
    pub searches: usize,
    /// Number of keys sampled for deleting.
    pub deletes: usize,
    /// Seed for the generator. A random seed is used if unset.
    pub seed: Option<u64>,
    pub log_level: LevelFilter,
    /// Print the final tree as a Graphviz digraph.
    pub dot: bool,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            count: 10_000,
            max_key: 10_000,
            searches: 100,
            deletes: 1_000,
            seed: None,
            log_level: LevelFilter::Warn,
            dot: false,
        }
    }
}

impl WorkloadConfig {
    /// Parses command-line arguments, not including the program name.
    ///
    /// Recognized: `--count N`, `--max-key N`, `--searches N`, `--deletes N`, `--seed N`,
    /// `--dot`, and `-v`, `-vv`, `-vvv` to raise the log level.
    pub fn from_args<I>(args: I) -> Result<WorkloadConfig, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        fn value<T: std::str::FromStr>(
            flag: &'static str,
            args: &mut impl Iterator<Item = String>,
        ) -> Result<T, ConfigError> {
            let value = args.next().ok_or(ConfigError::MissingValue(flag))?;
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { flag, value })
        }

        let mut config = WorkloadConfig::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--count" => config.count = value("--count", &mut args)?,
                "--max-key" => config.max_key = value("--max-key", &mut args)?,
                "--searches" => config.searches = value("--searches", &mut args)?,
                "--deletes" => config.deletes = value("--deletes", &mut args)?,
                "--seed" => config.seed = Some(value("--seed", &mut args)?),
                "--dot" => config.dot = true,
                "-v" => config.log_level = LevelFilter::Info,
                "-vv" => config.log_level = LevelFilter::Debug,
                "-vvv" => config.log_level = LevelFilter::Trace,
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        if config.max_key < 1 {
            return Err(ConfigError::EmptyKeyRange(config.max_key));
        }

        Ok(config)
    }
}

/// The key sequences of one benchmark run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workload {
    pub seed: u64,
    pub keys: Vec<i32>,
    pub searches: Vec<i32>,
    pub deletes: Vec<i32>,
}

/// The state left behind by [`Workload::run`].
#[derive(Debug)]
pub struct RunOutcome {
    pub tree: InstrumentedTree,
    /// Keys of the insert sequence that were already present.
    pub duplicates: usize,
    /// Search keys that were found.
    pub found: usize,
    /// Delete keys that were present when deleted.
    pub deleted: usize,
}

impl Workload {
    pub fn generate(config: &WorkloadConfig) -> Result<Workload, WorkloadError> {
        if config.max_key < 1 {
            return Err(WorkloadError::EmptyKeyRange(config.max_key));
        }

        let seed = config.seed.unwrap_or_else(|| OsRng.next_u64());
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);

        debug!(
            "generating {} keys in 1..={} with seed {seed}",
            config.count, config.max_key
        );

        let keys: Vec<i32> = (0..config.count)
            .map(|_| rng.gen_range(1..=config.max_key))
            .collect();

        let searches = sample(&mut rng, &keys, config.searches)?;
        let deletes = sample(&mut rng, &keys, config.deletes)?;

        Ok(Workload {
            seed,
            keys,
            searches,
            deletes,
        })
    }

    /// Inserts every key, then searches for and deletes the sampled keys, recording each call.
    pub fn run(&self) -> RunOutcome {
        let mut tree = InstrumentedTree::new();

        info!("inserting {} keys", self.keys.len());
        let duplicates = self
            .keys
            .iter()
            .filter(|&&key| tree.insert(key).is_err())
            .count();

        info!("searching {} keys", self.searches.len());
        let found = self
            .searches
            .iter()
            .filter(|&&key| tree.find(key).is_some())
            .count();

        info!("deleting {} keys", self.deletes.len());
        let deleted = self
            .deletes
            .iter()
            .filter(|&&key| tree.delete(key))
            .count();

        RunOutcome {
            tree,
            duplicates,
            found,
            deleted,
        }
    }
}

// Picks `n` elements of `from` uniformly, with replacement.
fn sample<R: Rng>(rng: &mut R, from: &[i32], n: usize) -> Result<Vec<i32>, WorkloadError> {
    if n == 0 {
        return Ok(Vec::new());
    }

    if from.is_empty() {
        return Err(WorkloadError::EmptySample { requested: n });
    }

    Ok((0..n).map(|_| from[rng.gen_range(0..from.len())]).collect())
}
