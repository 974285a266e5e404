//! Guided breath-hold training.
//!
//! A session runs a fixed number of cycles. Each cycle is:
//! - paced breathing: `breaths_per_cycle` inhale/exhale pairs
//! - an exhale hold, ended by the user
//! - an inhale hold, ended by the user
//!
//! [`BreathMachine`] is the pure state machine. [`SessionController`] drives
//! it from a [`Clock`], a frame [`Ticker`] and a [`SessionStore`].

pub mod clock;
pub mod controller;
pub mod format;
pub mod machine;
pub mod record;
pub mod report;
pub mod settings;
pub mod storage;
pub mod summary;
pub mod ticker;

pub use clock::{Clock, ClockReading, ManualClock, MonoTime, SystemClock};
pub use controller::{PersistOutcome, SessionController};
pub use machine::{BreathMachine, BreathState, Effect, Phase, Signal, Snapshot};
pub use record::{BreathingRecord, CycleRecord, HoldRecord, SessionRecord};
pub use report::{BreathReport, ReportPeriod};
pub use settings::{BreathSettings, Pace, PacePreset};
pub use storage::{SessionStore, SqliteSessionStore};
pub use summary::SessionSummary;
pub use ticker::Ticker;
