//! Domain managers for hub state.
//!
//! Each manager owns one piece of shared state behind its own lock or
//! atomics. No operation holds two of these locks at once.

pub mod admission;
pub mod lifecycle;
pub mod registry;
pub mod stats;
