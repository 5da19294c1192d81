use crate::error::{Result, TimetableError};
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::SelectionStrategy;

/// A selection strategy that selects individuals through tournament selection.
///
/// Each selection draws `tournament_size` aspirants uniformly at random, with
/// replacement, and keeps the fittest of them. On equal fitness the aspirant
/// drawn first wins. The process is repeated until the desired number of
/// individuals is selected, so strong individuals are usually picked several
/// times.
///
/// - Smaller tournament sizes lead to more exploration
/// - Larger tournament sizes lead to more exploitation
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentSelection {
    tournament_size: usize,
}

impl TournamentSelection {
    /// Creates a new TournamentSelection strategy with the specified tournament size.
    ///
    /// # Errors
    ///
    /// Returns an error if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(TimetableError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        Ok(Self { tournament_size })
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs a single tournament and returns the index of the winner.
    fn run_tournament(&self, fitness: &[f64], rng: &mut RandomNumberGenerator) -> usize {
        let mut best_idx = rng.gen_index(fitness.len());
        for _ in 1..self.tournament_size {
            let idx = rng.gen_index(fitness.len());
            if fitness[idx] > fitness[best_idx] {
                best_idx = idx;
            }
        }
        best_idx
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self { tournament_size: 5 }
    }
}

impl SelectionStrategy for TournamentSelection {
    fn select(
        &self,
        fitness: &[f64],
        num_to_select: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<usize>> {
        if fitness.is_empty() {
            return Err(TimetableError::EmptyPopulation);
        }

        Ok((0..num_to_select)
            .map(|_| self.run_tournament(fitness, rng))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tournament_selection() {
        let fitness = vec![0.5, 0.8, 0.3, 0.9, 0.1];
        let mut rng = RandomNumberGenerator::from_seed(42);

        let selection = TournamentSelection::default();
        let selected = selection.select(&fitness, 3, &mut rng).unwrap();

        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|&i| i < fitness.len()));
    }

    #[test]
    fn test_selects_with_replacement() {
        let fitness = vec![0.5, 0.8, 0.3];
        let mut rng = RandomNumberGenerator::from_seed(1);

        let selection = TournamentSelection::new(2).unwrap();
        let selected = selection.select(&fitness, 10, &mut rng).unwrap();
        assert_eq!(selected.len(), 10);
    }

    #[test]
    fn test_single_individual_always_wins() {
        let fitness = vec![-3.0];
        let mut rng = RandomNumberGenerator::from_seed(3);
        let selection = TournamentSelection::new(4).unwrap();
        assert_eq!(selection.select(&fitness, 3, &mut rng).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_large_tournaments_favour_the_best() {
        let fitness = vec![0.5, 0.8, 0.3, 0.9, 0.1];
        let mut rng = RandomNumberGenerator::from_seed(11);

        let selection = TournamentSelection::new(50).unwrap();
        let selected = selection.select(&fitness, 20, &mut rng).unwrap();
        let best = selected.iter().filter(|&&i| i == 3).count();
        assert!(best >= 18, "best individual selected only {} times", best);
    }

    #[test]
    fn test_ties_go_to_the_first_aspirant() {
        let fitness = vec![1.0, 1.0];
        let selection = TournamentSelection::new(3).unwrap();

        let mut rng = RandomNumberGenerator::from_seed(5);
        let mut replay = rng.clone();
        let winner = selection.run_tournament(&fitness, &mut rng);
        let first_drawn = replay.gen_index(fitness.len());
        assert_eq!(winner, first_drawn);
    }

    #[test]
    fn test_same_seed_same_selection() {
        let fitness = vec![0.5, 0.8, 0.3, 0.9, 0.1];
        let selection = TournamentSelection::new(2).unwrap();

        let mut a = RandomNumberGenerator::from_seed(99);
        let mut b = RandomNumberGenerator::from_seed(99);
        assert_eq!(
            selection.select(&fitness, 8, &mut a).unwrap(),
            selection.select(&fitness, 8, &mut b).unwrap()
        );
    }

    #[test]
    fn test_tournament_selection_empty_population() {
        let fitness: Vec<f64> = Vec::new();
        let mut rng = RandomNumberGenerator::from_seed(0);
        let result = TournamentSelection::default().select(&fitness, 3, &mut rng);
        assert!(matches!(result, Err(TimetableError::EmptyPopulation)));
    }

    #[test]
    fn test_tournament_selection_invalid_size() {
        assert!(TournamentSelection::new(0).is_err());
    }
}
