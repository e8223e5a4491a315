//! # daybook
//!
//! Daily-habit tracker core built around the five daily prayers.
//!
//! The library exists so the binary stays a thin dispatcher and so the
//! engine and state machine can be tested directly.
//!
//! ## Architecture
//!
//! - **Prayer times**: `prayer` computes the six daily instants for a fixed
//!   location and derives the window in which each gated field may change
//! - **Daily records**: `daily` holds the per-day record, the write-through
//!   state machine and the day/week summaries
//! - **Persistence**: `store` defines the store seam with in-memory and SQLite
//!   implementations
//! - **Configuration**: `config` for the TOML settings file
//! - **Commands**: `args` and `commands` for the command-line surface
//! - **Infrastructure**: logging macros, constants and the process clock

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod args;
pub mod commands;
pub mod config;
pub mod daily;
pub mod error;
pub mod prayer;
pub mod store;
pub mod time_source;

pub use daily::{DailyLog, DailyLogStateMachine, UngatedEntry, UngatedField};
pub use error::{ComputationError, DaybookError, PayloadError, StoreError};
pub use prayer::{GatedField, HygieneKind, Location, PrayerId, PrayerTimeEngine};
pub use store::{LogStore, MemoryStore, SqliteStore};
