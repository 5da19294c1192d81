//! # Timetabler
//!
//! Runs the whole pipeline for one instance: binding compression, encoding,
//! evolutionary search, expansion of the best chromosome and the feasibility
//! check of the result.
//!
//! ## Example
//!
//! ```rust
//! use examga::evolution::EvolutionOptions;
//! use examga::kpi::{Kpi, KpiWeights};
//! use examga::model::{Problem, Slot};
//! use examga::timetabler::Timetabler;
//!
//! let problem = Problem::builder()
//!     .items(["A", "B", "C"])
//!     .registration("s1", ["A", "B"])
//!     .registration("s2", ["B", "C"])
//!     .slots((1..=4).map(|day| Slot::on_day(day).in_room("hall", 10)))
//!     .build()
//!     .unwrap();
//!
//! let schedule = Timetabler::builder()
//!     .problem(problem)
//!     .weights(KpiWeights::zero().with(Kpi::TwoConsecutive, -1.0))
//!     .options(
//!         EvolutionOptions::builder()
//!             .population_size(10)
//!             .num_generations(20)
//!             .seed(3)
//!             .build(),
//!     )
//!     .build()
//!     .unwrap()
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(schedule.table.len(), 3);
//! assert!(schedule.feasibility.feasible);
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::binding::Bindings;
use crate::constraints::ConstraintManager;
use crate::encoding::{Assignment, Chromosome, Encoding};
use crate::error::{Result, TimetableError};
use crate::evolution::{
    EvolutionLauncher, EvolutionOptions, FitnessEvaluator, GenerationStats,
};
use crate::feasibility::FeasibilityReport;
use crate::kpi::{self, KpiValues, KpiWeights};
use crate::model::{Problem, Slot};
use crate::report::{self, KpiSummary, ParticipantReport};
use crate::rng::RandomNumberGenerator;
use crate::selection::TournamentSelection;
use crate::strategy::VariationStrategy;

/// A configured timetabling run.
#[derive(Debug, Clone)]
pub struct Timetabler {
    problem: Arc<Problem>,
    weights: KpiWeights,
    options: EvolutionOptions,
    binding: bool,
    penalty: Option<f64>,
    abort: Option<Arc<AtomicBool>>,
}

/// The outcome of [`Timetabler::run`].
#[derive(Debug, Clone)]
pub struct Schedule {
    problem: Arc<Problem>,
    /// The best timetable, by item index.
    pub assignment: Assignment,
    /// The best timetable, by item identifier.
    pub table: BTreeMap<String, Slot>,
    /// The chromosome the timetable was expanded from.
    pub chromosome: Chromosome,
    pub score: f64,
    pub kpis: KpiValues,
    pub feasibility: FeasibilityReport,
    pub history: Vec<GenerationStats>,
    /// Follower identifier → leader identifier.
    pub bindings: BTreeMap<String, String>,
    pub aborted: bool,
}

/// Score, KPIs and feasibility of a timetable that was not produced by a run.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub score: f64,
    pub summary: KpiSummary,
    pub feasibility: FeasibilityReport,
}

impl Timetabler {
    pub fn builder() -> TimetablerBuilder {
        TimetablerBuilder::default()
    }

    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    pub fn weights(&self) -> &KpiWeights {
        &self.weights
    }

    /// Runs the search and returns the best timetable found.
    ///
    /// # Errors
    ///
    /// Fails before the first generation when the free items outnumber the
    /// available slots, and during the run when a fitness score is not finite.
    pub fn run(&self) -> Result<Schedule> {
        let problem = &self.problem;
        let bindings = if self.binding {
            Bindings::compress(problem)
        } else {
            Bindings::none()
        };
        let encoding = Encoding::new(Arc::clone(problem), bindings)?;
        info!(
            items = problem.items().len(),
            participants = problem.participants().len(),
            slots = encoding.slot_count(),
            free_items = encoding.free_items().len(),
            bindings = encoding.bindings().len(),
            "starting timetabling run"
        );

        let mut evaluator = FitnessEvaluator::new(encoding.clone(), self.weights);
        if let Some(penalty) = self.penalty {
            evaluator = evaluator.with_penalty(penalty);
        }
        debug!(penalty = evaluator.penalty(), "hard constraint penalty");

        let selection = TournamentSelection::new(self.options.get_tournament_size())?;
        let mut launcher = EvolutionLauncher::new(VariationStrategy, selection, evaluator);
        if let Some(signal) = &self.abort {
            launcher = launcher.with_abort_signal(Arc::clone(signal));
        }

        let mut rng = RandomNumberGenerator::from_optional_seed(self.options.get_seed());
        let initial: Vec<Chromosome> = (0..self.options.get_population_size())
            .map(|_| encoding.random_chromosome(&mut rng))
            .collect();

        let result = launcher.evolve(&self.options, initial, &mut rng)?;
        let assignment = encoding.expand(&result.pheno)?;
        let kpis = kpi::evaluate(problem, &assignment);
        let feasibility = FeasibilityReport::check(problem, &assignment);

        if !feasibility.feasible {
            warn!(
                capacity_violations = feasibility.capacity_violations().count(),
                time_violations = feasibility.conflict_violations().count(),
                "best timetable is infeasible"
            );
        }
        info!(
            score = result.score,
            feasible = feasibility.feasible,
            generations = result.history.len().saturating_sub(1),
            aborted = result.aborted,
            "timetabling run finished"
        );

        Ok(Schedule {
            problem: Arc::clone(problem),
            table: assignment.to_table(problem),
            assignment,
            chromosome: result.pheno,
            score: result.score,
            kpis,
            feasibility,
            history: result.history,
            bindings: encoding.bindings().to_named(problem),
            aborted: result.aborted,
        })
    }

    /// Scores an existing timetable with this run's weights and penalty.
    pub fn assess(&self, assignment: &Assignment) -> Assessment {
        let problem = &self.problem;
        let penalty = self
            .penalty
            .unwrap_or_else(|| FitnessEvaluator::dominating_penalty(problem, &self.weights));
        let summary = KpiSummary::summarize(problem, assignment);
        let violations = ConstraintManager::timetabling().count_all(problem, assignment);

        Assessment {
            score: summary.totals.weighted(&self.weights) - penalty * violations as f64,
            summary,
            feasibility: FeasibilityReport::check(problem, assignment),
        }
    }
}

impl Schedule {
    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    pub fn participant_reports(&self) -> Vec<ParticipantReport> {
        report::participant_reports(&self.problem, &self.assignment)
    }

    pub fn summary(&self) -> KpiSummary {
        KpiSummary::summarize(&self.problem, &self.assignment)
    }

    /// Best fitness of every generation, starting with the initial population.
    pub fn best_fitness_curve(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.best).collect()
    }
}

/// Builder for [`Timetabler`].
#[derive(Debug, Clone)]
pub struct TimetablerBuilder {
    problem: Option<Arc<Problem>>,
    weights: Option<KpiWeights>,
    options: EvolutionOptions,
    binding: bool,
    penalty: Option<f64>,
    abort: Option<Arc<AtomicBool>>,
}

impl Default for TimetablerBuilder {
    fn default() -> Self {
        Self {
            problem: None,
            weights: None,
            options: EvolutionOptions::default(),
            binding: true,
            penalty: None,
            abort: None,
        }
    }
}

impl TimetablerBuilder {
    pub fn problem<P: Into<Arc<Problem>>>(mut self, problem: P) -> Self {
        self.problem = Some(problem.into());
        self
    }

    pub fn weights(mut self, weights: KpiWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn options(mut self, options: EvolutionOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables binding compression. Enabled by default.
    pub fn binding(mut self, enabled: bool) -> Self {
        self.binding = enabled;
        self
    }

    /// Overrides the penalty per hard constraint violation.
    pub fn penalty(mut self, penalty: f64) -> Self {
        self.penalty = Some(penalty);
        self
    }

    pub fn abort_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.abort = Some(signal);
        self
    }

    pub fn build(self) -> Result<Timetabler> {
        let problem = self.problem.ok_or_else(|| {
            TimetableError::Configuration("Timetabler needs a problem".to_string())
        })?;
        let weights = self.weights.ok_or_else(|| {
            TimetableError::Configuration("Timetabler needs KPI weights".to_string())
        })?;
        self.options.validate()?;
        if let Some(penalty) = self.penalty {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err(TimetableError::Configuration(format!(
                    "Penalty must be a finite non-negative number, got {}",
                    penalty
                )));
            }
        }

        Ok(Timetabler {
            problem,
            weights,
            options: self.options,
            binding: self.binding,
            penalty: self.penalty,
            abort: self.abort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::Kpi;

    fn problem() -> Problem {
        Problem::builder()
            .items(["A", "B", "C", "D"])
            .registration("s1", ["A", "B"])
            .registration("s2", ["B", "C"])
            .registration("s3", ["C", "D"])
            .slots((1..=6).map(|day| Slot::on_day(day).in_room("hall", 5)))
            .build()
            .unwrap()
    }

    fn options(seed: u64) -> EvolutionOptions {
        EvolutionOptions::builder()
            .population_size(12)
            .num_generations(15)
            .crossover_rate(0.5)
            .seed(seed)
            .build()
    }

    fn weights() -> KpiWeights {
        KpiWeights::zero()
            .with(Kpi::TwoConsecutive, -1.0)
            .with(Kpi::SameDay, -2.0)
    }

    #[test]
    fn test_builder_requires_problem_and_weights() {
        assert!(Timetabler::builder().weights(weights()).build().is_err());
        assert!(Timetabler::builder().problem(problem()).build().is_err());
        assert!(Timetabler::builder()
            .problem(problem())
            .weights(weights())
            .penalty(f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn test_run_covers_every_item() {
        let schedule = Timetabler::builder()
            .problem(problem())
            .weights(weights())
            .options(options(1))
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(schedule.table.len(), 4);
        assert_eq!(schedule.history.len(), 16);
        assert_eq!(schedule.best_fitness_curve().len(), 16);
        assert!(!schedule.aborted);
        assert_eq!(schedule.participant_reports().len(), 3);
    }

    #[test]
    fn test_bindings_are_reported_by_name() {
        let with = Timetabler::builder()
            .problem(problem())
            .weights(weights())
            .options(options(2))
            .build()
            .unwrap()
            .run()
            .unwrap();
        assert!(!with.bindings.is_empty());
        for (follower, leader) in &with.bindings {
            assert_eq!(with.table[follower], with.table[leader]);
        }

        let without = Timetabler::builder()
            .problem(problem())
            .weights(weights())
            .options(options(2))
            .binding(false)
            .build()
            .unwrap()
            .run()
            .unwrap();
        assert!(without.bindings.is_empty());
    }

    #[test]
    fn test_assess_matches_run_score() {
        let timetabler = Timetabler::builder()
            .problem(problem())
            .weights(weights())
            .options(options(4))
            .build()
            .unwrap();
        let schedule = timetabler.run().unwrap();
        let assessment = timetabler.assess(&schedule.assignment);

        assert_eq!(assessment.score, schedule.score);
        assert_eq!(assessment.summary.totals, schedule.kpis);
        assert_eq!(assessment.feasibility, schedule.feasibility);
    }
}
