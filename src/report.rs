//! # Reports
//!
//! Human-oriented views of a finished timetable: what each participant sits
//! and when, and how many participants each KPI actually hits.

use std::collections::BTreeMap;
use std::fmt;

use crate::encoding::Assignment;
use crate::kpi::{self, Kpi, KpiValues};
use crate::model::{Problem, Slot};

/// The timetable of one participant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantReport {
    pub participant: String,
    /// Items with their slots, ordered by day.
    pub items: Vec<(String, Slot)>,
    /// Duration is always zero here; it is a property of the whole timetable.
    pub kpis: KpiValues,
}

impl ParticipantReport {
    fn build(problem: &Problem, assignment: &Assignment, participant: usize) -> Self {
        let mut items: Vec<(String, Slot)> = problem.participants()[participant]
            .items
            .iter()
            .map(|&item| {
                (
                    problem.item(item).id.clone(),
                    problem.slot(assignment.slot_of(item)).clone(),
                )
            })
            .collect();
        items.sort_by_key(|(_, slot)| slot.day);

        Self {
            participant: problem.participants()[participant].id.clone(),
            items,
            kpis: kpi::participant_kpis(problem, assignment, participant),
        }
    }
}

impl fmt::Display for ParticipantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.participant)?;
        for (item, slot) in &self.items {
            writeln!(f, "  {:<12} {}", item, slot)?;
        }
        for (kpi, value) in self.kpis.iter().filter(|&(_, v)| v > 0) {
            writeln!(f, "  {}: {}", kpi, value)?;
        }
        Ok(())
    }
}

/// One report per participant, in participant order.
pub fn participant_reports(problem: &Problem, assignment: &Assignment) -> Vec<ParticipantReport> {
    (0..problem.participants().len())
        .map(|participant| ParticipantReport::build(problem, assignment, participant))
        .collect()
}

/// The report of the participant called `id`, if registered.
pub fn participant_report(
    problem: &Problem,
    assignment: &Assignment,
    id: &str,
) -> Option<ParticipantReport> {
    problem
        .participants()
        .iter()
        .position(|p| p.id == id)
        .map(|participant| ParticipantReport::build(problem, assignment, participant))
}

/// Aggregate KPI values together with how many participants each one touches.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiSummary {
    pub totals: KpiValues,
    /// Participants with a non-zero value, per KPI. Duration is not listed.
    pub affected: BTreeMap<Kpi, usize>,
    /// Participants with at least one non-zero KPI.
    pub loaded: usize,
}

impl KpiSummary {
    pub fn summarize(problem: &Problem, assignment: &Assignment) -> Self {
        let mut affected: BTreeMap<Kpi, usize> = Kpi::ALL
            .into_iter()
            .filter(|&kpi| kpi != Kpi::Duration)
            .map(|kpi| (kpi, 0))
            .collect();
        let mut loaded = 0;

        for participant in 0..problem.participants().len() {
            let values = kpi::participant_kpis(problem, assignment, participant);
            if values.any_load() {
                loaded += 1;
            }
            for (kpi, count) in affected.iter_mut() {
                if values.get(*kpi) > 0 {
                    *count += 1;
                }
            }
        }

        Self {
            totals: kpi::evaluate(problem, assignment),
            affected,
            loaded,
        }
    }
}

impl fmt::Display for KpiSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kpi, value) in self.totals.iter() {
            match self.affected.get(&kpi) {
                Some(people) => writeln!(f, "{}: {} ({} participants)", kpi, value, people)?,
                None => writeln!(f, "{}: {}", kpi, value)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        Problem::builder()
            .items(["A", "B", "C", "D"])
            .registration("s1", ["A", "B", "C"])
            .registration("s2", ["C", "D"])
            .registration("s3", ["D"])
            .slots((1..=9).map(Slot::on_day))
            .build()
            .unwrap()
    }

    fn assignment(problem: &Problem) -> Assignment {
        Assignment::from_named(
            problem,
            [
                ("A", Slot::on_day(6)),
                ("B", Slot::on_day(5)),
                ("C", Slot::on_day(9)),
                ("D", Slot::on_day(9)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_participant_report_sorts_by_day() {
        let problem = problem();
        let report = participant_report(&problem, &assignment(&problem), "s1").unwrap();

        let days: Vec<u32> = report.items.iter().map(|(_, slot)| slot.day).collect();
        assert_eq!(days, vec![5, 6, 9]);
        assert_eq!(report.items[0].0, "B");
        assert_eq!(report.kpis.get(Kpi::TwoConsecutive), 1);
        assert_eq!(report.kpis.get(Kpi::Duration), 0);
    }

    #[test]
    fn test_unknown_participant() {
        let problem = problem();
        assert!(participant_report(&problem, &assignment(&problem), "nobody").is_none());
    }

    #[test]
    fn test_summary_counts_affected_participants() {
        let problem = problem();
        let summary = KpiSummary::summarize(&problem, &assignment(&problem));

        assert_eq!(summary.totals.get(Kpi::TwoConsecutive), 1);
        assert_eq!(summary.totals.get(Kpi::SameDay), 1);
        assert_eq!(summary.totals.get(Kpi::Duration), 9);
        assert_eq!(summary.affected[&Kpi::TwoConsecutive], 1);
        assert_eq!(summary.affected[&Kpi::SameDay], 1);
        assert_eq!(summary.affected[&Kpi::ThreeConsecutive], 0);
        assert!(!summary.affected.contains_key(&Kpi::Duration));
        assert_eq!(summary.loaded, 2);
        assert_eq!(participant_reports(&problem, &assignment(&problem)).len(), 3);
    }

    #[test]
    fn test_summary_counts_long_streaks() {
        let problem = Problem::builder()
            .items(["A", "B", "C", "D", "E"])
            .registration("s1", ["A", "B", "C", "D"])
            .registration("s2", ["E"])
            .slots((1..=10).map(Slot::on_day))
            .build()
            .unwrap();
        let assignment = Assignment::from_named(
            &problem,
            [
                ("A", Slot::on_day(1)),
                ("B", Slot::on_day(2)),
                ("C", Slot::on_day(3)),
                ("D", Slot::on_day(4)),
                ("E", Slot::on_day(10)),
            ],
        )
        .unwrap();
        let summary = KpiSummary::summarize(&problem, &assignment);

        assert_eq!(summary.affected[&Kpi::FourConsecutive], 1);
        assert_eq!(summary.affected[&Kpi::FiveConsecutive], 0);
        assert_eq!(summary.affected[&Kpi::ThreeConsecutive], 0);
        assert_eq!(summary.affected[&Kpi::TwoConsecutive], 0);
    }
}
