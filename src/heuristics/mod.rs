//! Heuristics module.
//! 
//! This module exports the population operators and the genetic algorithm.

pub mod selection;
pub mod genetic;

pub use selection::*;
pub use genetic::*;
