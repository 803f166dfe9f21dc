//! Heuristics module for the tour optimizer.
//!
//! This module exports the construction heuristics, the local search operators and
//! the guided local search built on top of them.

pub mod construction;
pub mod guided;
pub mod local_search;

pub use construction::*;
pub use guided::*;
pub use local_search::*;
