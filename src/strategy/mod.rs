//! # BreedStrategy
//!
//! The `BreedStrategy` trait defines the interface for strategies responsible for turning
//! the survivors of selection into the next generation's offspring.
pub mod variation;

use std::fmt::Debug;

use crate::{
    error::Result, evolution::options::EvolutionOptions, phenotype::Individual,
    phenotype::Phenotype, rng::RandomNumberGenerator,
};

/// # BreedStrategy
///
/// The `BreedStrategy` trait defines the interface for strategies responsible for breeding
/// new individuals from the survivors of selection.
pub trait BreedStrategy<Pheno: Phenotype>
where
    Self: Debug + Clone + Send + Sync,
{
    /// Breeds offspring from `survivors`, consuming them.
    ///
    /// ## Parameters
    ///
    /// - `survivors`: The selected individuals, in selection order.
    /// - `evol_options`: The run parameters, including the variation probabilities.
    /// - `rng`: The random number generator driving every random decision.
    ///
    /// ## Returns
    ///
    /// The offspring, one per survivor. Any offspring whose genes changed has its
    /// fitness cleared; the rest keep their parent's fitness.
    ///
    /// ## Errors
    ///
    /// Returns an error if `survivors` is empty.
    fn breed(
        &self,
        survivors: Vec<Individual<Pheno>>,
        evol_options: &EvolutionOptions,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Individual<Pheno>>>;
}

pub use variation::VariationStrategy;
