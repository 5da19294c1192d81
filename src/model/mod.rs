//! # Problem Model
//!
//! The immutable description of one timetabling instance. A [`Problem`] is built
//! once through [`ProblemBuilder`] and is read-only afterwards, so it can be
//! shared behind an `Arc` by every worker evaluating fitness.
//!
//! Items and participants are stored in lexicographic order of their
//! identifiers and referred to by index everywhere else in the crate. The
//! conflict relation and its complement are derived at build time.
//!
//! ## Example
//!
//! ```rust
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
//! assert_eq!(problem.items().len(), 3);
//! assert_eq!(problem.conflicts().len(), 2);
//! assert_eq!(problem.conflict_free_pairs().len(), 1);
//! ```

mod slot;

pub use slot::Slot;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{Result, TimetableError};

/// Something that needs a slot, typically an examination.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    /// Indices into [`Problem::participants`], ascending.
    pub participants: Vec<usize>,
}

impl Item {
    /// Number of participants sitting this item.
    pub fn size(&self) -> usize {
        self.participants.len()
    }
}

/// Someone registered for one or more items, typically a student.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    /// Indices into [`Problem::items`], ascending.
    pub items: Vec<usize>,
}

/// A named window of days used by the weekly load indicators.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    pub label: String,
    pub days: BTreeSet<u32>,
}

/// Interned `(day, sub-period)` of a slot. Two slots clash when their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeKey {
    pub day: u32,
    period: u32,
}

/// An immutable timetabling instance.
#[derive(Debug, Clone)]
pub struct Problem {
    items: Vec<Item>,
    item_lookup: HashMap<String, usize>,
    participants: Vec<Participant>,
    slots: Vec<Slot>,
    time_keys: Vec<TimeKey>,
    available_slots: usize,
    weeks: Vec<Week>,
    day_weeks: HashMap<u32, Vec<usize>>,
    fixed: Vec<Option<usize>>,
    conflicts: Vec<(usize, usize)>,
    conflict_free: Vec<(usize, usize)>,
}

impl Problem {
    pub fn builder() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    /// All items, sorted by identifier.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, index: usize) -> &Item {
        &self.items[index]
    }

    /// Looks up the index of an item by identifier.
    pub fn item_index(&self, id: &str) -> Option<usize> {
        self.item_lookup.get(id).copied()
    }

    /// All participants, sorted by identifier.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// The full slot table: the available slots first, in the order they were
    /// added, followed by slots that only host fixed items.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    pub(crate) fn time_key(&self, slot: usize) -> TimeKey {
        self.time_keys[slot]
    }

    /// The slots the search engine may place free items into.
    pub fn available_slots(&self) -> &[Slot] {
        &self.slots[..self.available_slots]
    }

    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    /// Indices of the weeks containing `day`.
    pub fn weeks_of_day(&self, day: u32) -> &[usize] {
        self.day_weeks.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Slot index an item was pinned to, if any.
    pub fn fixed_slot(&self, item: usize) -> Option<usize> {
        self.fixed[item]
    }

    pub fn is_fixed(&self, item: usize) -> bool {
        self.fixed[item].is_some()
    }

    /// Iterates over `(item, slot)` pairs of fixed assignments in item order.
    pub fn fixed_assignments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.fixed
            .iter()
            .enumerate()
            .filter_map(|(item, slot)| slot.map(|slot| (item, slot)))
    }

    /// Item pairs sharing at least one participant, `(a, b)` with `a < b`.
    pub fn conflicts(&self) -> &[(usize, usize)] {
        &self.conflicts
    }

    /// Item pairs sharing no participant, in lexicographic order of identifiers.
    pub fn conflict_free_pairs(&self) -> &[(usize, usize)] {
        &self.conflict_free
    }

    /// The largest day ordinal of any slot in the table.
    pub fn last_day(&self) -> u32 {
        self.slots.iter().map(|slot| slot.day).max().unwrap_or(0)
    }
}

/// Builder for [`Problem`].
///
/// Items must be declared before registrations or fixed assignments can refer
/// to them; the check happens in [`ProblemBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    items: BTreeSet<String>,
    registrations: BTreeMap<String, BTreeSet<String>>,
    slots: Vec<Slot>,
    weeks: Vec<Week>,
    fixed: BTreeMap<String, Slot>,
}

impl ProblemBuilder {
    pub fn item<S: Into<String>>(mut self, id: S) -> Self {
        self.items.insert(id.into());
        self
    }

    pub fn items<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Registers `participant` for `items`. Repeated calls accumulate.
    pub fn registration<P, I, S>(mut self, participant: P, items: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registrations
            .entry(participant.into())
            .or_default()
            .extend(items.into_iter().map(Into::into));
        self
    }

    /// Appends an available slot. Enumeration order is insertion order.
    pub fn slot(mut self, slot: Slot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn slots<I>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = Slot>,
    {
        self.slots.extend(slots);
        self
    }

    pub fn week<S, I>(mut self, label: S, days: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = u32>,
    {
        self.weeks.push(Week {
            label: label.into(),
            days: days.into_iter().collect(),
        });
        self
    }

    /// Pins `item` to `slot` for the whole run.
    pub fn fixed<S: Into<String>>(mut self, item: S, slot: Slot) -> Self {
        self.fixed.insert(item.into(), slot);
        self
    }

    pub fn build(self) -> Result<Problem> {
        for (participant, items) in &self.registrations {
            if let Some(unknown) = items.iter().find(|item| !self.items.contains(*item)) {
                return Err(TimetableError::UnknownItem {
                    item: unknown.clone(),
                    referenced_by: format!("participant '{}'", participant),
                });
            }
        }
        if let Some(unknown) = self.fixed.keys().find(|item| !self.items.contains(*item)) {
            return Err(TimetableError::UnknownItem {
                item: unknown.clone(),
                referenced_by: "a fixed assignment".to_string(),
            });
        }

        // Only items somebody sits, or that are pinned, take part in the timetable.
        let mut sat: BTreeMap<&str, usize> = BTreeMap::new();
        for items in self.registrations.values() {
            for item in items {
                *sat.entry(item.as_str()).or_default() += 1;
            }
        }
        let item_ids: Vec<String> = self
            .items
            .iter()
            .filter(|id| {
                let kept = sat.contains_key(id.as_str()) || self.fixed.contains_key(*id);
                if !kept {
                    debug!(item = %id, "dropping item without registrations");
                }
                kept
            })
            .cloned()
            .collect();
        let item_lookup: HashMap<String, usize> = item_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();

        let mut items: Vec<Item> = item_ids
            .into_iter()
            .map(|id| Item {
                id,
                participants: Vec::new(),
            })
            .collect();
        let participants: Vec<Participant> = self
            .registrations
            .iter()
            .enumerate()
            .map(|(index, (id, registered))| {
                let mut indices: Vec<usize> =
                    registered.iter().map(|item| item_lookup[item]).collect();
                indices.sort_unstable();
                for &item in &indices {
                    items[item].participants.push(index);
                }
                Participant {
                    id: id.clone(),
                    items: indices,
                }
            })
            .collect();

        let available_slots = self.slots.len();
        let mut slots = self.slots;
        let mut fixed = vec![None; items.len()];
        for (item, slot) in self.fixed {
            let position = match slots.iter().position(|known| *known == slot) {
                Some(position) => {
                    if position < available_slots {
                        warn!(
                            item = %item,
                            slot = %slot,
                            "fixed item pinned to a slot that is also offered to the search"
                        );
                    }
                    position
                }
                None => {
                    slots.push(slot);
                    slots.len() - 1
                }
            };
            fixed[item_lookup[&item]] = Some(position);
        }

        let mut periods: HashMap<Option<&str>, u32> = HashMap::new();
        let time_keys = slots
            .iter()
            .map(|slot| {
                let next = periods.len() as u32;
                let period = *periods.entry(slot.period.as_deref()).or_insert(next);
                TimeKey {
                    day: slot.day,
                    period,
                }
            })
            .collect();

        let mut day_weeks: HashMap<u32, Vec<usize>> = HashMap::new();
        for (index, week) in self.weeks.iter().enumerate() {
            for &day in &week.days {
                day_weeks.entry(day).or_default().push(index);
            }
        }

        let mut shared: HashSet<(usize, usize)> = HashSet::new();
        for participant in &participants {
            for (n, &a) in participant.items.iter().enumerate() {
                for &b in &participant.items[n + 1..] {
                    shared.insert((a, b));
                }
            }
        }
        let mut conflicts = Vec::with_capacity(shared.len());
        let mut conflict_free = Vec::new();
        for a in 0..items.len() {
            for b in a + 1..items.len() {
                if shared.contains(&(a, b)) {
                    conflicts.push((a, b));
                } else {
                    conflict_free.push((a, b));
                }
            }
        }

        debug!(
            items = items.len(),
            participants = participants.len(),
            slots = available_slots,
            conflicts = conflicts.len(),
            "problem model built"
        );

        Ok(Problem {
            items,
            item_lookup,
            participants,
            slots,
            time_keys,
            available_slots,
            weeks: self.weeks,
            day_weeks,
            fixed,
            conflicts,
            conflict_free,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Problem {
        Problem::builder()
            .items(["C", "A", "B", "D"])
            .registration("s2", ["B", "C"])
            .registration("s1", ["A", "B"])
            .slots((1..=4).map(Slot::on_day))
            .week("w1", [1, 2, 3])
            .fixed("D", Slot::on_day(7))
            .build()
            .unwrap()
    }

    #[test]
    fn test_items_and_participants_are_sorted() {
        let problem = small();
        let ids: Vec<&str> = problem.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        assert_eq!(problem.participants()[0].id, "s1");
        assert_eq!(problem.participants()[0].items, vec![0, 1]);
        assert_eq!(problem.item(1).participants, vec![0, 1]);
        assert_eq!(problem.item_index("C"), Some(2));
    }

    #[test]
    fn test_conflict_relation() {
        let problem = small();
        assert_eq!(problem.conflicts(), &[(0, 1), (1, 2)]);
        assert_eq!(
            problem.conflict_free_pairs(),
            &[(0, 2), (0, 3), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn test_fixed_slot_is_appended_after_available_slots() {
        let problem = small();
        assert_eq!(problem.available_slots().len(), 4);
        assert_eq!(problem.slots().len(), 5);
        assert_eq!(problem.fixed_slot(3), Some(4));
        assert_eq!(problem.slot(4).day, 7);
        assert!(problem.is_fixed(3));
        assert_eq!(problem.fixed_assignments().collect::<Vec<_>>(), vec![(3, 4)]);
        assert_eq!(problem.last_day(), 7);
    }

    #[test]
    fn test_weeks_of_day() {
        let problem = small();
        assert_eq!(problem.weeks_of_day(2), &[0]);
        assert!(problem.weeks_of_day(4).is_empty());
    }

    #[test]
    fn test_unknown_item_in_registration() {
        let result = Problem::builder()
            .items(["A"])
            .registration("s1", ["A", "Z"])
            .build();
        match result {
            Err(TimetableError::UnknownItem { item, .. }) => assert_eq!(item, "Z"),
            other => panic!("expected unknown item error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_fixed_item() {
        let result = Problem::builder()
            .items(["A"])
            .registration("s1", ["A"])
            .fixed("B", Slot::on_day(1))
            .build();
        assert!(matches!(result, Err(TimetableError::UnknownItem { .. })));
    }

    #[test]
    fn test_items_without_registrations_are_dropped() {
        let problem = Problem::builder()
            .items(["A", "B", "C"])
            .registration("s1", ["A"])
            .fixed("C", Slot::on_day(1))
            .build()
            .unwrap();
        assert_eq!(problem.items().len(), 2);
        assert_eq!(problem.item_index("B"), None);
        assert!(problem.is_fixed(problem.item_index("C").unwrap()));
    }

    #[test]
    fn test_time_keys_follow_day_and_period() {
        let problem = Problem::builder()
            .items(["A"])
            .registration("s1", ["A"])
            .slot(Slot::on_day(1).with_period("am").in_room("R1", 10))
            .slot(Slot::on_day(1).with_period("am").in_room("R2", 10))
            .slot(Slot::on_day(1).with_period("pm").in_room("R1", 10))
            .build()
            .unwrap();
        assert_eq!(problem.time_key(0), problem.time_key(1));
        assert_ne!(problem.time_key(0), problem.time_key(2));
    }
}
