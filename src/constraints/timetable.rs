use super::{Constraint, Violation};
use crate::encoding::Assignment;
use crate::model::Problem;

/// A non-fixed item must fit into the room of its slot.
///
/// Fixed items are exempt: their rooms were chosen outside the optimizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityConstraint;

impl CapacityConstraint {
    fn overflows<'a>(
        problem: &'a Problem,
        assignment: &'a Assignment,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        assignment.iter().filter(move |&(item, slot)| {
            !problem.is_fixed(item) && !problem.slot(slot).fits(problem.item(item).size())
        })
    }
}

impl Constraint for CapacityConstraint {
    fn name(&self) -> &'static str {
        "capacity"
    }

    fn check(&self, problem: &Problem, assignment: &Assignment) -> Vec<Violation> {
        Self::overflows(problem, assignment)
            .map(|(item, slot)| {
                let slot = problem.slot(slot);
                Violation::Capacity {
                    item: problem.item(item).id.clone(),
                    slot: slot.clone(),
                    participants: problem.item(item).size(),
                    capacity: slot.capacity.unwrap_or(usize::MAX),
                }
            })
            .collect()
    }

    fn count(&self, problem: &Problem, assignment: &Assignment) -> usize {
        Self::overflows(problem, assignment).count()
    }
}

/// Items sharing a participant must not share a day and sub-period.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictConstraint;

impl ConflictConstraint {
    fn clashes<'a>(
        problem: &'a Problem,
        assignment: &'a Assignment,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        problem.conflicts().iter().copied().filter(move |&(a, b)| {
            problem.time_key(assignment.slot_of(a)) == problem.time_key(assignment.slot_of(b))
        })
    }
}

impl Constraint for ConflictConstraint {
    fn name(&self) -> &'static str {
        "conflict"
    }

    fn check(&self, problem: &Problem, assignment: &Assignment) -> Vec<Violation> {
        Self::clashes(problem, assignment)
            .map(|(a, b)| Violation::Conflict {
                first: problem.item(a).id.clone(),
                second: problem.item(b).id.clone(),
                first_slot: problem.slot(assignment.slot_of(a)).clone(),
                second_slot: problem.slot(assignment.slot_of(b)).clone(),
            })
            .collect()
    }

    fn count(&self, problem: &Problem, assignment: &Assignment) -> usize {
        Self::clashes(problem, assignment).count()
    }
}
