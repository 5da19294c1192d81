use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use super::{
    challenge::Challenge,
    options::{EvolutionOptions, LogLevel},
};
use crate::{
    error::{OptionExt, Result, TimetableError},
    phenotype::{Individual, Phenotype},
    rng::RandomNumberGenerator,
    selection::SelectionStrategy,
    strategy::BreedStrategy,
};

/// Fitness statistics of one generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// 0 is the initial population.
    pub generation: usize,
    pub best: f64,
    pub worst: f64,
    pub mean: f64,
    /// Best fitness seen in any generation so far.
    pub elite: f64,
    /// Number of individuals scored in this generation.
    pub evaluations: usize,
}

/// Represents the result of an evolution: the best phenotype ever seen and its score.
#[derive(Debug, Clone)]
pub struct EvolutionResult<Pheno: Phenotype> {
    /// The evolved phenotype.
    pub pheno: Pheno,
    /// The fitness score of the phenotype.
    pub score: f64,
    /// One entry per generation, starting with the initial population.
    pub history: Vec<GenerationStats>,
    /// The final population.
    pub population: Vec<Individual<Pheno>>,
    /// Whether the run was stopped through the abort signal.
    pub aborted: bool,
}

impl<Pheno: Phenotype> EvolutionResult<Pheno> {
    /// Best fitness per generation.
    pub fn best_fitness_curve(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.best).collect()
    }

    /// Best-so-far fitness per generation. Never decreases.
    pub fn elite_curve(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.elite).collect()
    }
}

/// Manages the evolution process using a selection strategy, a breeding strategy
/// and a challenge.
///
/// Each generation selects survivors by fitness, breeds them into offspring,
/// scores the offspring whose genes changed and keeps track of the best
/// individual ever seen. All randomness comes from the single generator passed
/// to [`evolve`](Self::evolve); scoring may run on the rayon thread pool but
/// never draws random numbers, so a seeded run is reproducible.
#[derive(Debug, Clone)]
pub struct EvolutionLauncher<Pheno, Strategy, Selection, Chall>
where
    Pheno: Phenotype,
    Chall: Challenge<Pheno>,
    Strategy: BreedStrategy<Pheno>,
    Selection: SelectionStrategy,
{
    strategy: Strategy,
    selection: Selection,
    challenge: Chall,
    abort: Option<Arc<AtomicBool>>,
    _marker: PhantomData<Pheno>,
}

impl<Pheno, Strategy, Selection, Chall> EvolutionLauncher<Pheno, Strategy, Selection, Chall>
where
    Pheno: Phenotype,
    Chall: Challenge<Pheno> + Send + Sync,
    Strategy: BreedStrategy<Pheno>,
    Selection: SelectionStrategy,
{
    /// Creates a new `EvolutionLauncher` instance.
    ///
    /// # Arguments
    ///
    /// * `strategy` - The breeding strategy used for generating offspring during evolution.
    /// * `selection` - The strategy choosing which individuals breed.
    /// * `challenge` - The challenge used to evaluate the fitness of phenotypes.
    pub fn new(strategy: Strategy, selection: Selection, challenge: Chall) -> Self {
        Self {
            strategy,
            selection,
            challenge,
            abort: None,
            _marker: PhantomData,
        }
    }

    /// Stops the run before the next generation once `signal` is set. The best
    /// individual found so far is still returned.
    pub fn with_abort_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.abort = Some(signal);
        self
    }

    pub fn challenge(&self) -> &Chall {
        &self.challenge
    }

    /// Evolves `initial` for `options.get_num_generations()` generations.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    /// - The options do not validate
    /// - `initial` is empty or its size differs from the configured population size
    /// - The challenge returns NaN or infinity for any candidate
    /// - Selection or breeding fails
    pub fn evolve(
        &self,
        options: &EvolutionOptions,
        initial: Vec<Pheno>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<EvolutionResult<Pheno>> {
        options.validate()?;

        if initial.is_empty() {
            return Err(TimetableError::EmptyPopulation);
        }
        if initial.len() != options.get_population_size() {
            return Err(TimetableError::Configuration(format!(
                "Initial population has {} individuals but the population size is {}",
                initial.len(),
                options.get_population_size()
            )));
        }

        let mut population: Vec<Individual<Pheno>> =
            initial.into_iter().map(Individual::new).collect();
        let mut history = Vec::with_capacity(options.get_num_generations() + 1);

        let evaluations = self.evaluate(&mut population, options)?;
        let mut elite = update_elite(None, &population);
        history.push(self.record(0, &population, &elite, evaluations, options));

        let mut aborted = false;
        for generation in 1..=options.get_num_generations() {
            if self.abort_requested() {
                info!(generation, "evolution aborted");
                aborted = true;
                break;
            }

            let fitness: Vec<f64> = population
                .iter()
                .map(|individual| individual.fitness.unwrap_or(f64::NEG_INFINITY))
                .collect();
            let selected = self.selection.select(&fitness, population.len(), rng)?;
            if selected.len() != population.len() {
                return Err(TimetableError::Selection(format!(
                    "selection returned {} survivors for a population of {}",
                    selected.len(),
                    population.len()
                )));
            }
            if let Some(&index) = selected.iter().find(|&&i| i >= population.len()) {
                return Err(TimetableError::Selection(format!(
                    "selection returned index {} outside a population of {}",
                    index,
                    population.len()
                )));
            }
            let survivors = selected
                .into_iter()
                .map(|i| population[i].clone())
                .collect();

            let mut offspring = self.strategy.breed(survivors, options, rng)?;
            let evaluations = self.evaluate(&mut offspring, options)?;
            population = offspring;

            elite = update_elite(elite, &population);
            history.push(self.record(generation, &population, &elite, evaluations, options));
        }

        let best = elite.ok_or_else_config(|| TimetableError::EmptyPopulation)?;
        let score = best.fitness.unwrap_or(f64::NEG_INFINITY);

        Ok(EvolutionResult {
            pheno: best.pheno,
            score,
            history,
            population,
            aborted,
        })
    }

    fn abort_requested(&self) -> bool {
        self.abort
            .as_ref()
            .map_or(false, |signal| signal.load(Ordering::Relaxed))
    }

    /// Scores every individual without a fitness and returns how many were
    /// scored. Large batches are scored on the rayon thread pool.
    fn evaluate(
        &self,
        population: &mut [Individual<Pheno>],
        options: &EvolutionOptions,
    ) -> Result<usize> {
        let pending = population.iter().filter(|i| !i.is_evaluated()).count();

        let score = |individual: &mut Individual<Pheno>| -> Result<()> {
            let score = self.challenge.score(&individual.pheno);
            if !score.is_finite() {
                return Err(TimetableError::FitnessCalculation(format!(
                    "Non-finite fitness score encountered: {}",
                    score
                )));
            }
            individual.fitness = Some(score);
            Ok(())
        };

        if pending >= options.get_parallel_threshold() {
            population
                .par_iter_mut()
                .filter(|i| !i.is_evaluated())
                .try_for_each(score)?;
        } else {
            population
                .iter_mut()
                .filter(|i| !i.is_evaluated())
                .try_for_each(score)?;
        }

        Ok(pending)
    }

    fn record(
        &self,
        generation: usize,
        population: &[Individual<Pheno>],
        elite: &Option<Individual<Pheno>>,
        evaluations: usize,
        options: &EvolutionOptions,
    ) -> GenerationStats {
        let scores = population.iter().filter_map(|i| i.fitness);
        let (best, worst, sum) = scores.fold(
            (f64::NEG_INFINITY, f64::INFINITY, 0.0),
            |(best, worst, sum), s| (best.max(s), worst.min(s), sum + s),
        );
        let stats = GenerationStats {
            generation,
            best,
            worst,
            mean: sum / population.len() as f64,
            elite: elite
                .as_ref()
                .and_then(|e| e.fitness)
                .unwrap_or(f64::NEG_INFINITY),
            evaluations,
        };

        match options.get_log_level() {
            LogLevel::Minimal => info!(
                generation,
                best = stats.best,
                mean = stats.mean,
                elite = stats.elite,
                "generation finished"
            ),
            LogLevel::Verbose => {
                info!(
                    generation,
                    best = stats.best,
                    worst = stats.worst,
                    mean = stats.mean,
                    elite = stats.elite,
                    evaluations,
                    "generation finished"
                );
                population.iter().enumerate().for_each(|(index, individual)| {
                    debug!(generation, index, fitness = ?individual.fitness, "individual");
                });
            }
            LogLevel::None => {}
        }

        stats
    }
}

/// Keeps the incumbent unless the population holds a strictly better individual.
/// Among equally good candidates the first one wins.
fn update_elite<Pheno: Phenotype>(
    elite: Option<Individual<Pheno>>,
    population: &[Individual<Pheno>],
) -> Option<Individual<Pheno>> {
    let mut best = elite;
    for individual in population {
        let Some(score) = individual.fitness else {
            continue;
        };
        let better = match best.as_ref().and_then(|b| b.fitness) {
            Some(current) => score > current,
            None => true,
        };
        if better {
            best = Some(individual.clone());
        }
    }
    best
}
