//! # Encoding
//!
//! Translates between the search engine's view of a timetable, a
//! [`Chromosome`], and the complete [`Assignment`] the evaluator and the
//! reports work on.
//!
//! Items fall into three groups. Fixed items keep the slot they were pinned
//! to, followers take their leader's slot, and the remaining free items are
//! placed by the chromosome: position `i` of the chromosome is available slot
//! `i`. Placeholders fill the positions left over when there are more slots
//! than free items.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use examga::binding::Bindings;
//! use examga::encoding::{Chromosome, Encoding};
//! use examga::model::{Problem, Slot};
//!
//! let problem = Arc::new(
//!     Problem::builder()
//!         .items(["A", "B"])
//!         .registration("s1", ["A", "B"])
//!         .slots((1..=3).map(Slot::on_day))
//!         .build()
//!         .unwrap(),
//! );
//! let encoding = Encoding::new(problem.clone(), Bindings::none()).unwrap();
//! assert_eq!(encoding.placeholders(), 1);
//!
//! let chromosome = Chromosome::from_genes(vec![2, 1, 0], 2).unwrap();
//! let assignment = encoding.expand(&chromosome).unwrap();
//! assert_eq!(problem.slot(assignment.slot_of(0)).day, 3);
//! assert_eq!(problem.slot(assignment.slot_of(1)).day, 2);
//! ```

mod assignment;
mod chromosome;

pub use assignment::Assignment;
pub use chromosome::Chromosome;

use std::sync::Arc;

use crate::binding::Bindings;
use crate::error::{Result, TimetableError};
use crate::model::Problem;
use crate::rng::RandomNumberGenerator;

/// The mapping between chromosomes and full assignments for one instance.
#[derive(Debug, Clone)]
pub struct Encoding {
    problem: Arc<Problem>,
    bindings: Bindings,
    free_items: Vec<usize>,
}

impl Encoding {
    /// Creates the encoding, failing when the free items cannot all get a slot
    /// or when `bindings` is malformed.
    pub fn new(problem: Arc<Problem>, bindings: Bindings) -> Result<Self> {
        for (follower, leader) in bindings.iter() {
            if problem.is_fixed(follower) {
                return Err(TimetableError::Configuration(format!(
                    "fixed item '{}' cannot follow another item",
                    problem.item(follower).id
                )));
            }
            if bindings.is_follower(leader) {
                return Err(TimetableError::UnresolvedLeader {
                    follower: problem.item(follower).id.clone(),
                    leader: problem.item(leader).id.clone(),
                });
            }
        }

        let free_items: Vec<usize> = (0..problem.items().len())
            .filter(|&item| !problem.is_fixed(item) && !bindings.is_follower(item))
            .collect();

        let slots = problem.available_slots().len();
        if free_items.len() > slots {
            return Err(TimetableError::Configuration(format!(
                "the number of free items ({}) exceeds the number of available slots ({})",
                free_items.len(),
                slots
            )));
        }

        Ok(Self {
            problem,
            bindings,
            free_items,
        })
    }

    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Item indices placed by the chromosome, ascending.
    pub fn free_items(&self) -> &[usize] {
        &self.free_items
    }

    /// Chromosome length, the number of available slots.
    pub fn slot_count(&self) -> usize {
        self.problem.available_slots().len()
    }

    /// Number of slots left intentionally empty.
    pub fn placeholders(&self) -> usize {
        self.slot_count() - self.free_items.len()
    }

    /// A uniformly random chromosome.
    pub fn random_chromosome(&self, rng: &mut RandomNumberGenerator) -> Chromosome {
        let mut chromosome = Chromosome::identity(self.slot_count(), self.free_items.len());
        chromosome.shuffle(rng);
        chromosome
    }

    /// Expands `chromosome` into a full assignment: chromosome positions
    /// first, then fixed items, then followers.
    pub fn expand(&self, chromosome: &Chromosome) -> Result<Assignment> {
        if chromosome.len() != self.slot_count()
            || chromosome.free_items() != self.free_items.len()
        {
            return Err(TimetableError::Configuration(format!(
                "chromosome of {} genes / {} items does not match encoding of {} slots / {} items",
                chromosome.len(),
                chromosome.free_items(),
                self.slot_count(),
                self.free_items.len()
            )));
        }

        let mut slots: Vec<Option<usize>> = vec![None; self.problem.items().len()];
        for position in 0..chromosome.len() {
            if let Some(free) = chromosome.item_at(position) {
                slots[self.free_items[free]] = Some(position);
            }
        }
        for (item, slot) in self.problem.fixed_assignments() {
            slots[item] = Some(slot);
        }
        for (follower, leader) in self.bindings.iter() {
            let slot = slots[leader].ok_or_else(|| TimetableError::UnresolvedLeader {
                follower: self.problem.item(follower).id.clone(),
                leader: self.problem.item(leader).id.clone(),
            })?;
            slots[follower] = Some(slot);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(item, slot)| {
                slot.ok_or_else(|| {
                    TimetableError::Configuration(format!(
                        "item '{}' has no slot after expansion",
                        self.problem.item(item).id
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Assignment::from_slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Slot;

    fn problem(slots: u32) -> Arc<Problem> {
        Arc::new(
            Problem::builder()
                .items(["A", "B", "C", "D"])
                .registration("s1", ["A", "B"])
                .registration("s2", ["B", "C"])
                .registration("s3", ["D"])
                .slots((1..=slots).map(Slot::on_day))
                .fixed("D", Slot::on_day(20))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_free_items_exclude_fixed_and_followers() {
        let problem = problem(4);
        let bindings = Bindings::compress(&problem);
        let encoding = Encoding::new(problem.clone(), bindings).unwrap();

        // A-C bound first (A follows C), then B-D: D is fixed so B follows D.
        let ids: Vec<&str> = encoding
            .free_items()
            .iter()
            .map(|&i| problem.item(i).id.as_str())
            .collect();
        assert_eq!(ids, vec!["C"]);
        assert_eq!(encoding.placeholders(), 3);
    }

    #[test]
    fn test_expand_overlays_fixed_and_bound_items() {
        let problem = problem(4);
        let bindings = Bindings::compress(&problem);
        let encoding = Encoding::new(problem.clone(), bindings).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(9);

        for _ in 0..20 {
            let chromosome = encoding.random_chromosome(&mut rng);
            let assignment = encoding.expand(&chromosome).unwrap();
            assert_eq!(assignment.len(), 4);

            let a = problem.item_index("A").unwrap();
            let b = problem.item_index("B").unwrap();
            let c = problem.item_index("C").unwrap();
            let d = problem.item_index("D").unwrap();
            assert_eq!(assignment.slot_of(a), assignment.slot_of(c));
            assert_eq!(assignment.slot_of(b), assignment.slot_of(d));
            assert_eq!(problem.slot(assignment.slot_of(d)).day, 20);
        }
    }

    #[test]
    fn test_too_many_free_items() {
        let problem = problem(2);
        let result = Encoding::new(problem, Bindings::none());
        match result {
            Err(TimetableError::Configuration(msg)) => {
                assert!(msg.contains("exceeds the number of available slots"))
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_chromosome() {
        let encoding = Encoding::new(problem(4), Bindings::none()).unwrap();
        let chromosome = Chromosome::identity(5, 3);
        assert!(matches!(
            encoding.expand(&chromosome),
            Err(TimetableError::Configuration(_))
        ));
    }
}
