//! Route planner CLI library.
//!
//! Coordinate input, output formatting, and terminal styling shared by the
//! `routeplanner` binary and its tests.

pub mod input;
pub mod output;
pub mod terminal;
