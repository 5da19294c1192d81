use std::fmt;

/// A discrete unit an item can occupy: a day, optionally a sub-period of that
/// day and optionally a room with a seat capacity.
///
/// Date-only timetables leave `period` and `room` empty; spatio-temporal ones
/// fill in all four fields. A slot without a capacity never overflows.
///
/// ```rust
/// use examga::model::Slot;
///
/// let morning = Slot::on_day(5).with_period("am").in_room("R060", 84);
/// let evening = Slot::on_day(5).with_period("pm").in_room("R060", 84);
///
/// assert!(!morning.same_time(&evening));
/// assert!(morning.fits(80));
/// assert!(!morning.fits(85));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    /// Day ordinal. Consecutive days differ by exactly one.
    pub day: u32,
    /// Sub-period label such as `am` or `pm`.
    pub period: Option<String>,
    /// Room name.
    pub room: Option<String>,
    /// Number of seats in the room.
    pub capacity: Option<usize>,
}

impl Slot {
    /// Creates a date-only slot.
    pub fn on_day(day: u32) -> Self {
        Self {
            day,
            period: None,
            room: None,
            capacity: None,
        }
    }

    pub fn with_period<S: Into<String>>(mut self, period: S) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn in_room<S: Into<String>>(mut self, room: S, capacity: usize) -> Self {
        self.room = Some(room.into());
        self.capacity = Some(capacity);
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Returns `true` when both slots fall on the same day and sub-period.
    pub fn same_time(&self, other: &Slot) -> bool {
        self.day == other.day && self.period == other.period
    }

    /// Returns `true` when `participants` people fit into the slot.
    pub fn fits(&self, participants: usize) -> bool {
        self.capacity.map_or(true, |capacity| participants <= capacity)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {}", self.day)?;
        if let Some(period) = &self.period {
            write!(f, " {}", period)?;
        }
        if let Some(room) = &self.room {
            write!(f, " {}", room)?;
        }
        Ok(())
    }
}
