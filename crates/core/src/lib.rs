//! # Timetable Core
//!
//! Clash detection and slot assignment for weekly course timetables.
//!
//! - [`clash`]: per-entity registry of committed windows and overlap queries
//! - [`generator`]: greedy first-fit placement and the pairwise clash audit
//! - [`catalog`]: the fixed weekly slot catalog and per-assignment availability
//! - [`protocol`]: selecting and withdrawing slots for one assignment
//! - [`validator`]: stateless rule predicates and the bulk timetable audit
//! - [`gateway`]: the persistence contract the engine reads and writes through
//! - [`services`]: gateway-driven entry points used by the API
//!
//! Everything except [`protocol`] and [`services`] is a pure in-memory
//! transform. State such as a [`clash::ClashDetector`] is built per call from
//! fresh reads and dropped afterwards.

pub mod catalog;
pub mod clash;
pub mod errors;
pub mod gateway;
pub mod generator;
pub mod models;
pub mod protocol;
pub mod services;
pub mod validator;

/// Maximum live entries a teaching assignment may hold per week.
pub const MAX_ENTRIES_PER_ASSIGNMENT: usize = 2;
