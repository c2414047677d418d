//! Roster (rota) engine: pattern-based generation, fairness statistics, cell
//! editing and conversion to and from flat shift rows. Everything here is
//! synchronous and free of I/O.

pub mod analyzer;
pub mod editor;
pub mod export;
pub mod generator;
pub mod import;
pub mod model;
pub mod pattern;
pub mod records;

pub use analyzer::{analyze, FairnessStats};
pub use editor::{cycle_assignment, RosterEditor};
pub use generator::{generate, GeneratorConfig};
pub use model::{DailySchedule, Employee, EmployeeId, RosterSchedule, ShiftType};
pub use records::{FlatShiftRecord, Reconstruction, ShiftTimes, StoredRange};
