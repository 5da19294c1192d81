//! # Constraints Module
//!
//! Hard feasibility rules a timetable must satisfy. Breaking one never stops a
//! run: the fitness evaluator subtracts a dominating penalty per violation and
//! the feasibility report lists them after the search.
//!
//! ## Key Components
//!
//! - `Constraint` trait: checks an [`Assignment`] and reports [`Violation`]s
//! - `ConstraintManager`: evaluates a set of constraints together
//! - [`CapacityConstraint`] and [`ConflictConstraint`]: the two rules of the
//!   timetabling problem
//!
//! ## Basic Usage
//!
//! ```rust
//! use examga::constraints::ConstraintManager;
//! use examga::encoding::Assignment;
//! use examga::model::{Problem, Slot};
//!
//! let problem = Problem::builder()
//!     .items(["A", "B"])
//!     .registration("s1", ["A", "B"])
//!     .slot(Slot::on_day(1).in_room("R1", 10))
//!     .slot(Slot::on_day(2).in_room("R1", 10))
//!     .build()
//!     .unwrap();
//!
//! let clash = Assignment::from_named(
//!     &problem,
//!     [("A", Slot::on_day(1).in_room("R1", 10)), ("B", Slot::on_day(1).in_room("R1", 10))],
//! )
//! .unwrap();
//!
//! let manager = ConstraintManager::timetabling();
//! assert_eq!(manager.count_all(&problem, &clash), 1);
//! assert!(!manager.is_valid(&problem, &clash));
//! ```

mod timetable;

pub use timetable::{CapacityConstraint, ConflictConstraint};

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use crate::encoding::Assignment;
use crate::model::{Problem, Slot};

/// A single broken hard constraint.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A non-fixed item was placed in a room too small for it.
    Capacity {
        item: String,
        slot: Slot,
        participants: usize,
        capacity: usize,
    },
    /// Two items sharing a participant were placed at the same day and sub-period.
    Conflict {
        first: String,
        second: String,
        first_slot: Slot,
        second_slot: Slot,
    },
}

impl Violation {
    pub fn is_capacity(&self) -> bool {
        matches!(self, Violation::Capacity { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Violation::Conflict { .. })
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Capacity {
                item,
                slot,
                participants,
                capacity,
            } => write!(
                f,
                "item {} is arranged to {} but capacity is not enough: {} participants, capacity {}",
                item, slot, participants, capacity
            ),
            Violation::Conflict {
                first,
                second,
                first_slot,
                second_slot,
            } => write!(
                f,
                "{} ({}) and {} ({}) share participants but are arranged at the same time",
                first, first_slot, second, second_slot
            ),
        }
    }
}

/// Trait for hard rules evaluated against a full assignment.
pub trait Constraint: Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Lists every violation of this constraint.
    fn check(&self, problem: &Problem, assignment: &Assignment) -> Vec<Violation>;

    /// Number of violations. Implementations override this with an
    /// allocation-free count since it runs once per fitness evaluation.
    fn count(&self, problem: &Problem, assignment: &Assignment) -> usize {
        self.check(problem, assignment).len()
    }
}

/// Manages multiple constraints and evaluates them against assignments.
#[derive(Debug, Clone, Default)]
pub struct ConstraintManager {
    constraints: Vec<Arc<dyn Constraint>>,
}

impl ConstraintManager {
    /// Creates a new empty constraint manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity and conflict constraints.
    pub fn timetabling() -> Self {
        let mut manager = Self::new();
        manager
            .add_constraint(CapacityConstraint)
            .add_constraint(ConflictConstraint);
        manager
    }

    /// Adds a constraint to the manager.
    pub fn add_constraint<C>(&mut self, constraint: C) -> &mut Self
    where
        C: Constraint + 'static,
    {
        self.constraints.push(Arc::new(constraint));
        self
    }

    /// Every violation of every constraint, in constraint order.
    pub fn check_all(&self, problem: &Problem, assignment: &Assignment) -> Vec<Violation> {
        self.constraints
            .iter()
            .flat_map(|c| c.check(problem, assignment))
            .collect()
    }

    /// Total number of violations.
    pub fn count_all(&self, problem: &Problem, assignment: &Assignment) -> usize {
        self.constraints
            .iter()
            .map(|c| c.count(problem, assignment))
            .sum()
    }

    /// Checks if the assignment satisfies all constraints.
    pub fn is_valid(&self, problem: &Problem, assignment: &Assignment) -> bool {
        self.count_all(problem, assignment) == 0
    }

    /// Returns the number of constraints in the manager.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` if the manager has no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
