use std::collections::BTreeMap;

use crate::error::{Result, TimetableError};
use crate::model::{Problem, Slot};

/// A complete timetable: every item of a [`Problem`] mapped to one slot index.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    slots: Vec<usize>,
}

impl Assignment {
    pub(crate) fn from_slots(slots: Vec<usize>) -> Self {
        Self { slots }
    }

    /// Builds an assignment from a named timetable, e.g. one produced by an
    /// earlier run and loaded back for analysis.
    ///
    /// Every item of `problem` must appear and every slot must be part of the
    /// problem's slot table.
    pub fn from_named<I, S>(problem: &Problem, table: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Slot)>,
        S: AsRef<str>,
    {
        let mut slots = vec![None; problem.items().len()];
        for (id, slot) in table {
            let id = id.as_ref();
            let item = problem
                .item_index(id)
                .ok_or_else(|| TimetableError::UnknownItem {
                    item: id.to_string(),
                    referenced_by: "a timetable entry".to_string(),
                })?;
            let index = problem
                .slots()
                .iter()
                .position(|known| *known == slot)
                .ok_or_else(|| {
                    TimetableError::Configuration(format!(
                        "item '{}' is placed in {}, which is not in the slot table",
                        id, slot
                    ))
                })?;
            slots[item] = Some(index);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(item, slot)| {
                slot.ok_or_else(|| {
                    TimetableError::Configuration(format!(
                        "item '{}' is missing from the timetable",
                        problem.item(item).id
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::from_slots)
    }

    /// Slot index of `item`.
    pub fn slot_of(&self, item: usize) -> usize {
        self.slots[item]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over `(item, slot)` index pairs in item order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots.iter().copied().enumerate()
    }

    /// Resolves indices to identifiers and slots.
    pub fn to_table(&self, problem: &Problem) -> BTreeMap<String, Slot> {
        self.iter()
            .map(|(item, slot)| (problem.item(item).id.clone(), problem.slot(slot).clone()))
            .collect()
    }
}
