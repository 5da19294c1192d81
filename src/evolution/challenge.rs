use crate::phenotype::Phenotype;

/// Scores a candidate. Higher is better.
///
/// Implementations must be pure: the engine evaluates candidates on a thread
/// pool and caches the result with the individual.
pub trait Challenge<Pheno: Phenotype> {
    fn score(&self, phenotype: &Pheno) -> f64;
}
