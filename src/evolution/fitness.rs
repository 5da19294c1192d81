//! # Fitness Evaluator
//!
//! Scores a timetable as the weighted sum of its soft KPIs minus a large
//! penalty per broken hard constraint. The penalty is chosen so that a single
//! violation outweighs any difference the soft part can make, so the search
//! always prefers a feasible timetable over an infeasible one.

use std::sync::Arc;

use tracing::{error, warn};

use super::Challenge;
use crate::constraints::ConstraintManager;
use crate::encoding::{Assignment, Chromosome, Encoding};
use crate::error::Result;
use crate::kpi::{self, KpiWeights};
use crate::model::Problem;

/// Penalty per violation when the instance does not demand a larger one.
pub const DEFAULT_PENALTY: f64 = 1e7;

/// Scores chromosomes and full assignments of one problem instance.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    encoding: Encoding,
    weights: KpiWeights,
    constraints: ConstraintManager,
    penalty: f64,
}

impl FitnessEvaluator {
    /// Creates an evaluator whose penalty dominates the soft score of the
    /// encoding's problem.
    pub fn new(encoding: Encoding, weights: KpiWeights) -> Self {
        let penalty = Self::dominating_penalty(encoding.problem(), &weights);
        Self {
            encoding,
            weights,
            constraints: ConstraintManager::timetabling(),
            penalty,
        }
    }

    /// `max(DEFAULT_PENALTY, 2 * soft bound + 1)`.
    pub fn dominating_penalty(problem: &Problem, weights: &KpiWeights) -> f64 {
        DEFAULT_PENALTY.max(2.0 * weights.soft_bound(problem) + 1.0)
    }

    /// Overrides the penalty per violation.
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        let bound = self.weights.soft_bound(self.encoding.problem());
        if penalty <= 2.0 * bound {
            warn!(
                penalty,
                soft_bound = bound,
                "penalty does not dominate the soft score; infeasible timetables may win"
            );
        }
        self.penalty = penalty;
        self
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    pub fn weights(&self) -> &KpiWeights {
        &self.weights
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn problem(&self) -> &Arc<Problem> {
        self.encoding.problem()
    }

    /// Scores a full assignment.
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        let problem = self.encoding.problem();
        let soft = kpi::evaluate(problem, assignment).weighted(&self.weights);
        let violations = self.constraints.count_all(problem, assignment);
        soft - self.penalty * violations as f64
    }

    /// Expands and scores a chromosome.
    pub fn try_score(&self, chromosome: &Chromosome) -> Result<f64> {
        let assignment = self.encoding.expand(chromosome)?;
        Ok(self.evaluate(&assignment))
    }
}

impl Challenge<Chromosome> for FitnessEvaluator {
    /// A chromosome that cannot be expanded scores NaN, which the launcher
    /// turns into a fitness calculation error.
    fn score(&self, chromosome: &Chromosome) -> f64 {
        match self.try_score(chromosome) {
            Ok(score) => score,
            Err(e) => {
                error!(error = %e, "failed to expand chromosome");
                f64::NAN
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Bindings;
    use crate::kpi::Kpi;
    use crate::model::Slot;

    fn encoding() -> Encoding {
        let problem = Problem::builder()
            .items(["A", "B", "C"])
            .registration("s1", ["A", "B"])
            .registration("s2", ["B", "C"])
            .registration("s3", ["C"])
            .slot(Slot::on_day(1).in_room("R1", 1))
            .slot(Slot::on_day(2).in_room("R1", 5))
            .slot(Slot::on_day(3).in_room("R1", 5))
            .slot(Slot::on_day(3).in_room("R2", 5))
            .build()
            .unwrap();
        Encoding::new(Arc::new(problem), Bindings::none()).unwrap()
    }

    fn weights() -> KpiWeights {
        KpiWeights::zero()
            .with(Kpi::TwoConsecutive, -1.0)
            .with(Kpi::Duration, -10.0)
    }

    #[test]
    fn test_feasible_assignment_scores_soft_part_only() {
        let evaluator = FitnessEvaluator::new(encoding(), weights());
        // A -> day 3 R2, B -> day 2, C -> day 3 R1: both s1 and s2 sit two consecutive days.
        let chromosome = Chromosome::from_genes(vec![3, 1, 2, 0], 3).unwrap();
        let assignment = evaluator.encoding().expand(&chromosome).unwrap();
        assert_eq!(evaluator.evaluate(&assignment), -2.0 - 30.0);
    }

    #[test]
    fn test_capacity_violation_is_penalised() {
        let evaluator = FitnessEvaluator::new(encoding(), weights());
        // B (2 participants) in the one-seat room.
        let chromosome = Chromosome::from_genes(vec![1, 0, 2, 3], 3).unwrap();
        let score = evaluator.try_score(&chromosome).unwrap();
        assert!(score <= -DEFAULT_PENALTY);
    }

    #[test]
    fn test_conflict_violation_is_penalised() {
        let evaluator = FitnessEvaluator::new(encoding(), weights());
        // B and C both on day 3.
        let chromosome = Chromosome::from_genes(vec![3, 0, 1, 2], 3).unwrap();
        let score = evaluator.try_score(&chromosome).unwrap();
        assert!(score <= -DEFAULT_PENALTY);
    }

    #[test]
    fn test_scores_are_reproducible() {
        let evaluator = FitnessEvaluator::new(encoding(), weights());
        let chromosome = Chromosome::from_genes(vec![2, 0, 3, 1], 3).unwrap();
        let first = evaluator.score(&chromosome);
        let second = evaluator.score(&chromosome);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_penalty_grows_with_weights() {
        let encoding = encoding();
        let heavy = KpiWeights::zero().with(Kpi::Duration, -1e9);
        let evaluator = FitnessEvaluator::new(encoding, heavy);
        assert!(evaluator.penalty() > 2.0 * 1e9 * 3.0);
    }

    #[test]
    fn test_mismatched_chromosome_scores_nan() {
        let evaluator = FitnessEvaluator::new(encoding(), weights());
        let chromosome = Chromosome::identity(2, 1);
        assert!(evaluator.score(&chromosome).is_nan());
    }
}
