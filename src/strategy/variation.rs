use super::BreedStrategy;
use crate::error::{Result, TimetableError};
use crate::evolution::options::EvolutionOptions;
use crate::phenotype::{Individual, Phenotype};
use crate::rng::RandomNumberGenerator;

/// # VariationStrategy
///
/// Applies crossover and mutation independently of each other:
///
/// 1. Survivors are paired as (0, 1), (2, 3), ... and each pair is recombined
///    with probability `crossover_rate`. An odd last survivor is left alone.
/// 2. Every offspring is then mutated with probability `mutation_rate`, each
///    position being swapped with probability `mutation_indpb`.
///
/// An offspring can therefore be recombined and mutated, only one of the two,
/// or copied unchanged. Unchanged offspring keep their fitness so they are not
/// evaluated again.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariationStrategy;

impl<Pheno> BreedStrategy<Pheno> for VariationStrategy
where
    Pheno: Phenotype,
{
    fn breed(
        &self,
        survivors: Vec<Individual<Pheno>>,
        evol_options: &EvolutionOptions,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Individual<Pheno>>> {
        if survivors.is_empty() {
            return Err(TimetableError::EmptyPopulation);
        }

        let mut offspring = survivors;

        for pair in offspring.chunks_exact_mut(2) {
            if rng.gen_probability() < evol_options.get_crossover_rate() {
                let (left, right) = pair.split_at_mut(1);
                left[0].pheno.crossover(&mut right[0].pheno, rng);
                left[0].invalidate();
                right[0].invalidate();
            }
        }

        for child in offspring.iter_mut() {
            if rng.gen_probability() < evol_options.get_mutation_rate()
                && child.pheno.mutate(evol_options.get_mutation_indpb(), rng)
            {
                child.invalidate();
            }
        }

        Ok(offspring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        crossed: u32,
        mutated: u32,
    }

    impl Phenotype for Counter {
        fn crossover(&mut self, other: &mut Self, _rng: &mut RandomNumberGenerator) {
            self.crossed += 1;
            other.crossed += 1;
        }

        fn mutate(&mut self, _indpb: f64, _rng: &mut RandomNumberGenerator) -> bool {
            self.mutated += 1;
            true
        }
    }

    fn survivors(n: usize) -> Vec<Individual<Counter>> {
        (0..n)
            .map(|i| Individual {
                pheno: Counter {
                    crossed: 0,
                    mutated: 0,
                },
                fitness: Some(i as f64),
            })
            .collect()
    }

    fn options(crossover: f64, mutation: f64) -> EvolutionOptions {
        EvolutionOptions::builder()
            .crossover_rate(crossover)
            .mutation_rate(mutation)
            .build()
    }

    #[test]
    fn test_no_variation_keeps_fitness() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let offspring = VariationStrategy
            .breed(survivors(4), &options(0.0, 0.0), &mut rng)
            .unwrap();

        assert_eq!(offspring, survivors(4));
    }

    #[test]
    fn test_crossover_pairs_neighbours_and_skips_odd_tail() {
        let mut rng = RandomNumberGenerator::from_seed(2);
        let offspring = VariationStrategy
            .breed(survivors(5), &options(1.0, 0.0), &mut rng)
            .unwrap();

        let crossed: Vec<u32> = offspring.iter().map(|o| o.pheno.crossed).collect();
        assert_eq!(crossed, vec![1, 1, 1, 1, 0]);
        assert!(offspring[..4].iter().all(|o| o.fitness.is_none()));
        assert_eq!(offspring[4].fitness, Some(4.0));
    }

    #[test]
    fn test_mutation_invalidates_every_child() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let offspring = VariationStrategy
            .breed(survivors(3), &options(0.0, 1.0), &mut rng)
            .unwrap();

        assert!(offspring.iter().all(|o| o.pheno.mutated == 1));
        assert!(offspring.iter().all(|o| !o.is_evaluated()));
    }

    #[test]
    fn test_empty_survivors() {
        let mut rng = RandomNumberGenerator::from_seed(4);
        let result = VariationStrategy.breed(
            Vec::<Individual<Counter>>::new(),
            &options(0.5, 0.5),
            &mut rng,
        );
        assert!(matches!(result, Err(TimetableError::EmptyPopulation)));
    }
}
