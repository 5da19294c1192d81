//! # Error Types
//!
//! This module defines the error type shared by every stage of the timetabling
//! pipeline. Only configuration problems are errors: a timetable that breaks a
//! hard constraint is still a valid result, it just scores badly and shows up in
//! the feasibility report.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use examga::error::{Result, TimetableError};
//!
//! fn check_slots(free_items: usize, slots: usize) -> Result<()> {
//!     if free_items > slots {
//!         return Err(TimetableError::Configuration(format!(
//!             "{} free items do not fit into {} slots",
//!             free_items, slots
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_slots(5, 4).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use examga::error::{OptionExt, TimetableError};
//!
//! fn first_day(days: &[u32]) -> examga::error::Result<u32> {
//!     days.iter().min().copied().ok_or_else_config(|| {
//!         TimetableError::Configuration("no days available".to_string())
//!     })
//! }
//!
//! assert_eq!(first_day(&[9, 5, 6]).unwrap(), 5);
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while building or solving a timetable.
#[derive(Error, Debug)]
pub enum TimetableError {
    /// The instance or the run parameters are malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A registration or a fixed assignment refers to an item that was never declared.
    #[error("Unknown item '{item}' referenced by {referenced_by}")]
    UnknownItem { item: String, referenced_by: String },

    /// A binding points at a leader that has no slot after expansion.
    #[error("Binding leader '{leader}' of follower '{follower}' has no resolved slot")]
    UnresolvedLeader { follower: String, leader: String },

    /// The weight configuration lacks a KPI.
    #[error("Weight configuration is missing KPI '{0}'")]
    MissingWeight(String),

    /// The weight configuration names a KPI that does not exist.
    #[error("Weight configuration names unknown KPI '{0}'")]
    UnknownWeight(String),

    /// An operation needed at least one individual.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// A fitness evaluation produced NaN or infinity.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// Selection returned too few survivors or an index outside the population.
    #[error("Selection error: {0}")]
    Selection(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for timetabling operations.
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use examga::error::ResultExt;
/// use std::fs::File;
///
/// fn open_registrations(path: &str) -> examga::error::Result<()> {
///     File::open(path).context("Failed to open registrations")?;
///     Ok(())
/// }
///
/// assert!(open_registrations("/definitely/not/here.csv").is_err());
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error into a `TimetableError` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| TimetableError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, TimetableError>` using `err_fn`
    /// to build the error.
    fn ok_or_else_config<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> TimetableError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_config<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> TimetableError,
    {
        self.ok_or_else(err_fn)
    }
}
