//! # Phenotype Trait
//!
//! The `Phenotype` trait defines the variation operators the search engine applies
//! to a candidate, and [`Individual`] pairs a candidate with its cached fitness.
//!
//! ## Example
//!
//! ```rust
//! use examga::phenotype::{Individual, Phenotype};
//! use examga::rng::RandomNumberGenerator;
//!
//! #[derive(Clone, Debug)]
//! struct Pair {
//!     values: [u8; 2],
//! }
//!
//! impl Phenotype for Pair {
//!     fn crossover(&mut self, other: &mut Self, _rng: &mut RandomNumberGenerator) {
//!         std::mem::swap(&mut self.values[0], &mut other.values[0]);
//!     }
//!
//!     fn mutate(&mut self, _indpb: f64, _rng: &mut RandomNumberGenerator) -> bool {
//!         self.values.swap(0, 1);
//!         true
//!     }
//! }
//!
//! let individual = Individual::new(Pair { values: [1, 2] });
//! assert!(individual.fitness.is_none());
//! ```

use std::fmt::Debug;

use crate::rng::RandomNumberGenerator;

/// Trait for candidates the evolutionary search can vary.
///
/// Types implementing this trait must also implement `Clone`, `Debug`, `Send`,
/// and `Sync` so a population can be evaluated on a thread pool.
pub trait Phenotype: Clone + Debug + Send + Sync {
    /// Recombines `self` and `other` in place, turning both parents into children.
    fn crossover(&mut self, other: &mut Self, rng: &mut RandomNumberGenerator);

    /// Mutates the candidate. Each position is touched independently with
    /// probability `indpb`. Returns `true` if anything changed.
    fn mutate(&mut self, indpb: f64, rng: &mut RandomNumberGenerator) -> bool;
}

/// A candidate together with its fitness, `None` until evaluated.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Individual<P> {
    pub pheno: P,
    pub fitness: Option<f64>,
}

impl<P> Individual<P> {
    pub fn new(pheno: P) -> Self {
        Self {
            pheno,
            fitness: None,
        }
    }

    /// Drops the cached fitness after the candidate changed.
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }
}
