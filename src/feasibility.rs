//! # Feasibility Report
//!
//! Re-checks a finished timetable against the hard constraints. The search only
//! penalises violations, so a run on an over-constrained instance can end with
//! an infeasible best timetable; this report says which rules it breaks.
//!
//! ```rust
//! use examga::encoding::Assignment;
//! use examga::feasibility::FeasibilityReport;
//! use examga::model::{Problem, Slot};
//!
//! let problem = Problem::builder()
//!     .items(["A"])
//!     .registration("s1", ["A"])
//!     .registration("s2", ["A"])
//!     .slot(Slot::on_day(1).in_room("R1", 1))
//!     .build()
//!     .unwrap();
//! let assignment =
//!     Assignment::from_named(&problem, [("A", Slot::on_day(1).in_room("R1", 1))]).unwrap();
//!
//! let report = FeasibilityReport::check(&problem, &assignment);
//! assert!(!report.feasible);
//! assert!(!report.capacity_feasible);
//! assert!(report.time_feasible);
//! ```

use std::fmt;

use crate::constraints::{CapacityConstraint, Constraint, ConflictConstraint, Violation};
use crate::encoding::Assignment;
use crate::model::Problem;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeasibilityReport {
    pub feasible: bool,
    /// No non-fixed item exceeds the capacity of its room.
    pub capacity_feasible: bool,
    /// No two conflicting items share a day and sub-period.
    pub time_feasible: bool,
    /// Capacity violations first, then conflicts.
    pub violations: Vec<Violation>,
}

impl FeasibilityReport {
    pub fn check(problem: &Problem, assignment: &Assignment) -> Self {
        let mut violations = CapacityConstraint.check(problem, assignment);
        let capacity_feasible = violations.is_empty();

        let conflicts = ConflictConstraint.check(problem, assignment);
        let time_feasible = conflicts.is_empty();
        violations.extend(conflicts);

        Self {
            feasible: capacity_feasible && time_feasible,
            capacity_feasible,
            time_feasible,
            violations,
        }
    }

    pub fn capacity_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_capacity())
    }

    pub fn conflict_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_conflict())
    }
}

impl fmt::Display for FeasibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.feasible {
            return write!(f, "timetable is feasible");
        }
        writeln!(
            f,
            "timetable is infeasible ({} capacity, {} time violations)",
            self.capacity_violations().count(),
            self.conflict_violations().count()
        )?;
        for violation in &self.violations {
            writeln!(f, "  {}", violation)?;
        }
        Ok(())
    }
}
