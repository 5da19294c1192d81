use std::fmt::Debug;

use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// Trait for selection strategies.
///
/// A strategy picks survivors by looking at fitness alone and returns their
/// indices into the population, so the caller decides whether to clone or move
/// the chosen individuals. Higher fitness is better.
///
/// # Examples
///
/// ```
/// use examga::selection::{SelectionStrategy, TournamentSelection};
/// use examga::rng::RandomNumberGenerator;
/// use examga::error::Result;
///
/// fn main() -> Result<()> {
///     let fitness = vec![0.5, 0.8, 0.3];
///     let mut rng = RandomNumberGenerator::from_seed(7);
///
///     let selection = TournamentSelection::new(3)?;
///     let selected = selection.select(&fitness, 4, &mut rng)?;
///
///     assert_eq!(selected.len(), 4);
///     assert!(selected.iter().all(|&i| i < fitness.len()));
///
///     Ok(())
/// }
/// ```
pub trait SelectionStrategy: Debug + Send + Sync {
    /// Selects `num_to_select` indices into `fitness`. The same index may be
    /// returned more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if `fitness` is empty.
    fn select(
        &self,
        fitness: &[f64],
        num_to_select: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<usize>>;
}
