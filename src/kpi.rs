//! # Soft Quality Indicators
//!
//! Counts how uncomfortable a timetable is for the people sitting it. For every
//! participant the days of their items are sorted and scanned once:
//!
//! - two items on the same day count towards [`Kpi::SameDay`];
//! - runs of items on consecutive days count towards [`Kpi::TwoConsecutive`],
//!   [`Kpi::ThreeConsecutive`] or [`Kpi::FourConsecutive`] when the run is two,
//!   three or four days long, and towards [`Kpi::FiveConsecutive`] when it is
//!   five days or longer;
//! - every week window in which the participant has more than three distinct
//!   exam days counts towards [`Kpi::MoreThanThreeInWeek`], and exactly four
//!   or five days additionally towards [`Kpi::FourInWeek`] / [`Kpi::FiveInWeek`].
//!
//! [`Kpi::Duration`] is the last day used by any item of the timetable.
//!
//! The computation is a pure function of the problem and the assignment. The
//! weighted sum of the values forms the soft part of the fitness score.

use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::encoding::Assignment;
use crate::error::{Result, TimetableError};
use crate::model::Problem;

/// The soft indicators tracked for a timetable.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kpi {
    TwoConsecutive,
    ThreeConsecutive,
    FourConsecutive,
    FiveConsecutive,
    SameDay,
    MoreThanThreeInWeek,
    FourInWeek,
    FiveInWeek,
    Duration,
}

impl Kpi {
    pub const COUNT: usize = 9;

    /// Every KPI in declaration order. Weighted sums always run in this order.
    pub const ALL: [Kpi; Kpi::COUNT] = [
        Kpi::TwoConsecutive,
        Kpi::ThreeConsecutive,
        Kpi::FourConsecutive,
        Kpi::FiveConsecutive,
        Kpi::SameDay,
        Kpi::MoreThanThreeInWeek,
        Kpi::FourInWeek,
        Kpi::FiveInWeek,
        Kpi::Duration,
    ];

    /// The name used in weight configurations and reports.
    pub fn name(self) -> &'static str {
        match self {
            Kpi::TwoConsecutive => "2 consecutive exams in a week",
            Kpi::ThreeConsecutive => "3 consecutive exams in a week",
            Kpi::FourConsecutive => "4 consecutive exams",
            Kpi::FiveConsecutive => "5 consecutive exams",
            Kpi::SameDay => "more than 1 exam in a day",
            Kpi::MoreThanThreeInWeek => "more than 3 exams in a week",
            Kpi::FourInWeek => "4 exams in a week",
            Kpi::FiveInWeek => "5 exams in a week",
            Kpi::Duration => "duration of the exam period",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kpi {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self> {
        Kpi::ALL
            .into_iter()
            .find(|kpi| kpi.name() == s)
            .ok_or_else(|| TimetableError::UnknownWeight(s.to_string()))
    }
}

/// Values of every KPI for a timetable or a single participant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiValues {
    values: [u64; Kpi::COUNT],
}

impl KpiValues {
    pub fn get(&self, kpi: Kpi) -> u64 {
        self.values[kpi.index()]
    }

    /// Iterates over `(kpi, value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Kpi, u64)> + '_ {
        Kpi::ALL.into_iter().map(|kpi| (kpi, self.get(kpi)))
    }

    /// `Σ weight[kpi] * value[kpi]` in declaration order.
    pub fn weighted(&self, weights: &KpiWeights) -> f64 {
        Kpi::ALL
            .into_iter()
            .map(|kpi| weights.get(kpi) * self.get(kpi) as f64)
            .sum()
    }

    /// `true` if any indicator other than the duration is non-zero.
    pub fn any_load(&self) -> bool {
        self.iter()
            .any(|(kpi, value)| kpi != Kpi::Duration && value > 0)
    }

    fn bump(&mut self, kpi: Kpi) {
        self.values[kpi.index()] += 1;
    }
}

impl Add for KpiValues {
    type Output = KpiValues;

    /// Adds counts. The duration is a maximum, not a sum.
    fn add(mut self, rhs: KpiValues) -> KpiValues {
        self += rhs;
        self
    }
}

impl AddAssign for KpiValues {
    fn add_assign(&mut self, rhs: KpiValues) {
        for kpi in Kpi::ALL {
            let i = kpi.index();
            self.values[i] = match kpi {
                Kpi::Duration => self.values[i].max(rhs.values[i]),
                _ => self.values[i] + rhs.values[i],
            };
        }
    }
}

/// Signed coefficients per KPI. Negative weights penalize, positive reward.
///
/// ```rust
/// use examga::kpi::{Kpi, KpiWeights};
///
/// let weights = KpiWeights::zero()
///     .with(Kpi::ThreeConsecutive, -5.0)
///     .with(Kpi::Duration, -200.0);
/// assert_eq!(weights.get(Kpi::Duration), -200.0);
/// assert_eq!(weights.get(Kpi::SameDay), 0.0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiWeights {
    weights: [f64; Kpi::COUNT],
}

impl KpiWeights {
    /// All weights zero.
    pub fn zero() -> Self {
        Self {
            weights: [0.0; Kpi::COUNT],
        }
    }

    pub fn with(mut self, kpi: Kpi, weight: f64) -> Self {
        self.weights[kpi.index()] = weight;
        self
    }

    /// Parses a named weight table. Every KPI must be present exactly by its
    /// [`Kpi::name`]; unknown names are rejected.
    pub fn from_named<I, S>(named: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut weights = [None; Kpi::COUNT];
        for (name, weight) in named {
            let kpi: Kpi = name.as_ref().parse()?;
            if weights[kpi.index()].is_some() {
                return Err(TimetableError::Configuration(format!(
                    "weight of '{}' is given more than once",
                    kpi
                )));
            }
            if !weight.is_finite() {
                return Err(TimetableError::Configuration(format!(
                    "weight of '{}' must be finite, got {}",
                    kpi, weight
                )));
            }
            weights[kpi.index()] = Some(weight);
        }

        let mut resolved = [0.0; Kpi::COUNT];
        for kpi in Kpi::ALL {
            resolved[kpi.index()] = weights[kpi.index()]
                .ok_or_else(|| TimetableError::MissingWeight(kpi.name().to_string()))?;
        }
        Ok(Self { weights: resolved })
    }

    pub fn get(&self, kpi: Kpi) -> f64 {
        self.weights[kpi.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Kpi, f64)> + '_ {
        Kpi::ALL.into_iter().map(|kpi| (kpi, self.get(kpi)))
    }

    /// An upper bound of `|Σ weight * value|` over every possible assignment
    /// of `problem`.
    pub fn soft_bound(&self, problem: &Problem) -> f64 {
        let mut bound = KpiValues::default();
        let weeks = problem.weeks().len() as u64;
        for participant in problem.participants() {
            let n = participant.items.len() as u64;
            bound.values[Kpi::TwoConsecutive.index()] += n / 2;
            bound.values[Kpi::ThreeConsecutive.index()] += n / 3;
            bound.values[Kpi::FourConsecutive.index()] += n / 4;
            bound.values[Kpi::FiveConsecutive.index()] += n / 5;
            bound.values[Kpi::SameDay.index()] += n.saturating_sub(1);
            bound.values[Kpi::MoreThanThreeInWeek.index()] += weeks;
            bound.values[Kpi::FourInWeek.index()] += weeks;
            bound.values[Kpi::FiveInWeek.index()] += weeks;
        }
        bound.values[Kpi::Duration.index()] = u64::from(problem.last_day());

        Kpi::ALL
            .into_iter()
            .map(|kpi| self.get(kpi).abs() * bound.get(kpi) as f64)
            .sum()
    }
}

impl Default for KpiWeights {
    fn default() -> Self {
        Self::zero()
    }
}

/// KPI values of a single participant. The duration is left at zero.
pub fn participant_kpis(problem: &Problem, assignment: &Assignment, participant: usize) -> KpiValues {
    let mut days = Vec::new();
    let mut week_days = vec![0u32; problem.weeks().len()];
    scan_participant(problem, assignment, participant, &mut days, &mut week_days)
}

/// KPI values of a complete timetable.
pub fn evaluate(problem: &Problem, assignment: &Assignment) -> KpiValues {
    let mut days = Vec::new();
    let mut week_days = vec![0u32; problem.weeks().len()];

    let mut total = (0..problem.participants().len())
        .map(|participant| {
            scan_participant(problem, assignment, participant, &mut days, &mut week_days)
        })
        .fold(KpiValues::default(), Add::add);

    total.values[Kpi::Duration.index()] = assignment
        .iter()
        .map(|(_, slot)| u64::from(problem.slot(slot).day))
        .max()
        .unwrap_or(0);
    total
}

fn scan_participant(
    problem: &Problem,
    assignment: &Assignment,
    participant: usize,
    days: &mut Vec<u32>,
    week_days: &mut [u32],
) -> KpiValues {
    let mut values = KpiValues::default();

    days.clear();
    days.extend(
        problem.participants()[participant]
            .items
            .iter()
            .map(|&item| problem.slot(assignment.slot_of(item)).day),
    );
    days.sort_unstable();

    let mut streak = 1;
    for pair in days.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next == prev {
            values.bump(Kpi::SameDay);
        } else if next - prev == 1 {
            streak += 1;
        } else {
            close_streak(streak, &mut values);
            streak = 1;
        }
    }
    close_streak(streak, &mut values);

    if !week_days.is_empty() {
        week_days.fill(0);
        let mut last = None;
        for &day in days.iter() {
            if last == Some(day) {
                continue;
            }
            last = Some(day);
            for &week in problem.weeks_of_day(day) {
                week_days[week] += 1;
            }
        }
        for &count in week_days.iter() {
            if count > 3 {
                values.bump(Kpi::MoreThanThreeInWeek);
            }
            match count {
                4 => values.bump(Kpi::FourInWeek),
                5 => values.bump(Kpi::FiveInWeek),
                _ => {}
            }
        }
    }

    values
}

fn close_streak(streak: u32, values: &mut KpiValues) {
    match streak {
        2 => values.bump(Kpi::TwoConsecutive),
        3 => values.bump(Kpi::ThreeConsecutive),
        4 => values.bump(Kpi::FourConsecutive),
        n if n >= 5 => values.bump(Kpi::FiveConsecutive),
        _ => {}
    }
}
