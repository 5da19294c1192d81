//! # Binding Compressor
//!
//! Shrinks the search space before the first generation by pairing items that
//! share no participant: the follower of a pair always sits in the same slot as
//! its leader, so only the leader remains for the search engine to place.
//!
//! The pass is greedy and deterministic. Conflict-free pairs are visited in the
//! lexicographic order of item identifiers and a pair is bound only when both
//! of its items are still unpaired. When one item of the pair is fixed it
//! becomes the leader; pairs of two fixed items are left alone.
//!
//! ```rust
//! use examga::binding::Bindings;
//! use examga::model::{Problem, Slot};
//!
//! let problem = Problem::builder()
//!     .items(["A", "B", "C"])
//!     .registration("s1", ["A", "B"])
//!     .registration("s2", ["B", "C"])
//!     .slots((1..=3).map(Slot::on_day))
//!     .build()
//!     .unwrap();
//!
//! let bindings = Bindings::compress(&problem);
//! let a = problem.item_index("A").unwrap();
//! let c = problem.item_index("C").unwrap();
//!
//! assert_eq!(bindings.leader_of(a), Some(c));
//! assert_eq!(bindings.len(), 1);
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::Problem;

/// Follower → leader pairs over item indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    leaders: BTreeMap<usize, usize>,
}

impl Bindings {
    /// No bindings at all: every non-fixed item is placed by the search.
    pub fn none() -> Self {
        Self::default()
    }

    /// Runs the greedy compression over `problem`.
    pub fn compress(problem: &Problem) -> Self {
        let mut paired = vec![false; problem.items().len()];
        let mut leaders = BTreeMap::new();

        for &(a, b) in problem.conflict_free_pairs() {
            if paired[a] || paired[b] {
                continue;
            }
            let (follower, leader) = match (problem.is_fixed(a), problem.is_fixed(b)) {
                (true, true) => continue,
                (true, false) => (b, a),
                _ => (a, b),
            };
            leaders.insert(follower, leader);
            paired[a] = true;
            paired[b] = true;
        }

        debug!(bindings = leaders.len(), "binding compression finished");
        Self { leaders }
    }

    /// The leader `item` follows, if it is a follower.
    pub fn leader_of(&self, item: usize) -> Option<usize> {
        self.leaders.get(&item).copied()
    }

    pub fn is_follower(&self, item: usize) -> bool {
        self.leaders.contains_key(&item)
    }

    /// Iterates over `(follower, leader)` pairs in follower order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.leaders.iter().map(|(&follower, &leader)| (follower, leader))
    }

    pub fn len(&self) -> usize {
        self.leaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty()
    }

    /// Resolves the pairs to item identifiers, `follower → leader`.
    pub fn to_named(&self, problem: &Problem) -> BTreeMap<String, String> {
        self.iter()
            .map(|(follower, leader)| {
                (
                    problem.item(follower).id.clone(),
                    problem.item(leader).id.clone(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Slot;

    fn index(problem: &Problem, id: &str) -> usize {
        problem.item_index(id).unwrap()
    }

    #[test]
    fn test_greedy_order_consumes_items_once() {
        // A-B, A-C, B-C are all conflict free: only A-B is bound, C stays free.
        let problem = Problem::builder()
            .items(["A", "B", "C"])
            .registration("s1", ["A"])
            .registration("s2", ["B"])
            .registration("s3", ["C"])
            .build()
            .unwrap();

        let bindings = Bindings::compress(&problem);
        assert_eq!(bindings.len(), 1);
        assert_eq!(
            bindings.leader_of(index(&problem, "A")),
            Some(index(&problem, "B"))
        );
        assert!(!bindings.is_follower(index(&problem, "C")));
    }

    #[test]
    fn test_fixed_item_leads() {
        let problem = Problem::builder()
            .items(["A", "B"])
            .registration("s1", ["A"])
            .registration("s2", ["B"])
            .fixed("A", Slot::on_day(3))
            .build()
            .unwrap();

        let bindings = Bindings::compress(&problem);
        assert_eq!(
            bindings.leader_of(index(&problem, "B")),
            Some(index(&problem, "A"))
        );
        assert!(!bindings.is_follower(index(&problem, "A")));
    }

    #[test]
    fn test_second_member_fixed_leads() {
        let problem = Problem::builder()
            .items(["A", "B"])
            .registration("s1", ["A"])
            .registration("s2", ["B"])
            .fixed("B", Slot::on_day(3))
            .build()
            .unwrap();

        let bindings = Bindings::compress(&problem);
        assert_eq!(
            bindings.leader_of(index(&problem, "A")),
            Some(index(&problem, "B"))
        );
    }

    #[test]
    fn test_two_fixed_items_are_not_bound() {
        let problem = Problem::builder()
            .items(["A", "B"])
            .registration("s1", ["A"])
            .registration("s2", ["B"])
            .fixed("A", Slot::on_day(3))
            .fixed("B", Slot::on_day(4))
            .build()
            .unwrap();

        assert!(Bindings::compress(&problem).is_empty());
    }

    #[test]
    fn test_no_chains_and_no_conflicting_pairs() {
        let problem = Problem::builder()
            .items(["A", "B", "C", "D", "E", "F"])
            .registration("s1", ["A", "B"])
            .registration("s2", ["C", "D"])
            .registration("s3", ["E", "A"])
            .registration("s4", ["F"])
            .build()
            .unwrap();

        let bindings = Bindings::compress(&problem);
        for (follower, leader) in bindings.iter() {
            assert!(!bindings.is_follower(leader));
            let pair = (follower.min(leader), follower.max(leader));
            assert!(!problem.conflicts().contains(&pair));
        }
    }

    #[test]
    fn test_compression_is_deterministic() {
        let problem = Problem::builder()
            .items(["A", "B", "C", "D", "E", "F", "G"])
            .registration("s1", ["A", "B"])
            .registration("s2", ["C", "D"])
            .registration("s3", ["E", "A"])
            .registration("s4", ["F", "G"])
            .fixed("G", Slot::on_day(2))
            .build()
            .unwrap();

        let first = Bindings::compress(&problem);
        let second = Bindings::compress(&problem);
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(first.to_named(&problem), second.to_named(&problem));
    }

    #[test]
    fn test_to_named() {
        let problem = Problem::builder()
            .items(["X", "Y"])
            .registration("s1", ["X"])
            .registration("s2", ["Y"])
            .build()
            .unwrap();
        let named = Bindings::compress(&problem).to_named(&problem);
        assert_eq!(named.get("X").map(String::as_str), Some("Y"));
    }
}
