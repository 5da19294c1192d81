//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds the run parameters of the evolutionary
//! search: how many generations to run, how large the population is, how often
//! the variation operators fire, the tournament size, the seed and the logging
//! level.
//!
//! ## Example
//!
//! ```rust
//! use examga::evolution::options::{EvolutionOptions, LogLevel};
//!
//! let options = EvolutionOptions::builder()
//!     .num_generations(500)
//!     .population_size(100)
//!     .mutation_rate(0.3)
//!     .seed(42)
//!     .log_level(LogLevel::Minimal)
//!     .build();
//!
//! assert!(options.validate().is_ok());
//! assert_eq!(options.get_seed(), Some(42));
//! ```
//!
//! ### `LogLevel`
//!
//! - `Verbose`: a summary per generation plus every individual's score.
//! - `Minimal`: a summary per generation.
//! - `None`: no per-generation logging.

use crate::error::{Result, TimetableError};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Verbose,
    Minimal,
    None,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOptions {
    num_generations: usize,
    log_level: LogLevel,
    population_size: usize,
    /// Probability that a consecutive pair of survivors is recombined.
    crossover_rate: f64,
    /// Probability that a survivor is mutated at all.
    mutation_rate: f64,
    /// Probability that a position of a mutated survivor is swapped.
    mutation_indpb: f64,
    tournament_size: usize,
    seed: Option<u64>,
    /// Minimum number of pending evaluations to go parallel
    parallel_threshold: usize,
}

impl EvolutionOptions {
    pub fn new(num_generations: usize, log_level: LogLevel, population_size: usize) -> Self {
        Self {
            num_generations,
            log_level,
            population_size,
            ..Self::default()
        }
    }

    pub fn get_num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn get_log_level(&self) -> &LogLevel {
        &self.log_level
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn get_mutation_indpb(&self) -> f64 {
        self.mutation_indpb
    }

    pub fn get_tournament_size(&self) -> usize {
        self.tournament_size
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the minimum number of pending evaluations to go parallel.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn set_num_generations(&mut self, num_generations: usize) {
        self.num_generations = num_generations;
    }

    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    pub fn set_crossover_rate(&mut self, rate: f64) {
        self.crossover_rate = rate;
    }

    pub fn set_mutation_rate(&mut self, rate: f64) {
        self.mutation_rate = rate;
    }

    pub fn set_mutation_indpb(&mut self, indpb: f64) {
        self.mutation_indpb = indpb;
    }

    pub fn set_tournament_size(&mut self, size: usize) {
        self.tournament_size = size;
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Rejects parameters the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(TimetableError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(TimetableError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("crossover rate", self.crossover_rate),
            ("mutation rate", self.mutation_rate),
            ("per-position mutation probability", self.mutation_indpb),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TimetableError::Configuration(format!(
                    "The {} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            num_generations: 200,
            log_level: LogLevel::None,
            population_size: 100,
            crossover_rate: 0.0,
            mutation_rate: 0.5,
            mutation_indpb: 0.1,
            tournament_size: 5,
            seed: None,
            parallel_threshold: 16,
        }
    }
}

/// Builder for `EvolutionOptions`.
///
/// Provides a fluent interface for constructing `EvolutionOptions` instances.
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    num_generations: Option<usize>,
    log_level: Option<LogLevel>,
    population_size: Option<usize>,
    crossover_rate: Option<f64>,
    mutation_rate: Option<f64>,
    mutation_indpb: Option<f64>,
    tournament_size: Option<usize>,
    seed: Option<u64>,
    parallel_threshold: Option<usize>,
}

impl EvolutionOptionsBuilder {
    pub fn num_generations(mut self, value: usize) -> Self {
        self.num_generations = Some(value);
        self
    }

    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn crossover_rate(mut self, value: f64) -> Self {
        self.crossover_rate = Some(value);
        self
    }

    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    pub fn mutation_indpb(mut self, value: f64) -> Self {
        self.mutation_indpb = Some(value);
        self
    }

    pub fn tournament_size(mut self, value: usize) -> Self {
        self.tournament_size = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    pub fn build(self) -> EvolutionOptions {
        let default = EvolutionOptions::default();
        EvolutionOptions {
            num_generations: self.num_generations.unwrap_or(default.num_generations),
            log_level: self.log_level.unwrap_or(default.log_level),
            population_size: self.population_size.unwrap_or(default.population_size),
            crossover_rate: self.crossover_rate.unwrap_or(default.crossover_rate),
            mutation_rate: self.mutation_rate.unwrap_or(default.mutation_rate),
            mutation_indpb: self.mutation_indpb.unwrap_or(default.mutation_indpb),
            tournament_size: self.tournament_size.unwrap_or(default.tournament_size),
            seed: self.seed.or(default.seed),
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(default.parallel_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EvolutionOptions::default();
        assert_eq!(options.get_population_size(), 100);
        assert_eq!(options.get_num_generations(), 200);
        assert_eq!(options.get_tournament_size(), 5);
        assert_eq!(options.get_mutation_indpb(), 0.1);
        assert!(options.validate().is_ok());
        assert_eq!(EvolutionOptions::builder().build(), options);
    }

    #[test]
    fn test_new_keeps_remaining_defaults() {
        let options = EvolutionOptions::new(10, LogLevel::Minimal, 4);
        assert_eq!(options.get_num_generations(), 10);
        assert_eq!(options.get_population_size(), 4);
        assert_eq!(options.get_log_level(), &LogLevel::Minimal);
        assert_eq!(options.get_mutation_rate(), 0.5);
    }

    #[test]
    fn test_validate_rejects_zero_population() {
        let options = EvolutionOptions::builder().population_size(0).build();
        match options.validate() {
            Err(TimetableError::Configuration(msg)) => {
                assert!(msg.contains("Population size cannot be zero"))
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_probabilities_outside_unit_interval() {
        let mut options = EvolutionOptions::default();
        options.set_crossover_rate(1.5);
        assert!(options.validate().is_err());

        options.set_crossover_rate(1.0);
        options.set_mutation_indpb(-0.1);
        assert!(options.validate().is_err());

        options.set_mutation_indpb(0.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_tournament() {
        let options = EvolutionOptions::builder().tournament_size(0).build();
        assert!(options.validate().is_err());
    }
}
