//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the in-memory adapters.  Time is driven by a manual clock, so
//! days of operation run instantly.

mod controller_tests;
mod mock_ports;
mod persistence_tests;
