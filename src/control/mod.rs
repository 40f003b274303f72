//! Closed-loop control laws.

pub mod proportional;
