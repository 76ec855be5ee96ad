//! State module for tracking unit-of-work progress
//!
//! `UnitState` is shared by every strategy so that a batch behaves the same
//! way whichever concurrency model runs it.

mod unit_state;

pub use unit_state::UnitState;
