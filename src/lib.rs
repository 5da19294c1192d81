pub mod binding;
pub mod constraints;
pub mod encoding;
pub mod error;
pub mod evolution;
pub mod feasibility;
pub mod kpi;
pub mod model;
pub mod phenotype;
pub mod report;
pub mod rng;
pub mod selection;
pub mod strategy;
pub mod timetabler;

// Re-export commonly used types for convenience
pub use error::{OptionExt, Result, ResultExt, TimetableError};
pub use evolution::{EvolutionOptions, LogLevel};
pub use kpi::{Kpi, KpiValues, KpiWeights};
pub use model::{Problem, Slot};
pub use timetabler::{Schedule, Timetabler};
