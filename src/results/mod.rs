//! The growing result table and its crash-safe snapshot.
mod accumulator;
mod row;

pub use accumulator::*;
pub use row::*;
