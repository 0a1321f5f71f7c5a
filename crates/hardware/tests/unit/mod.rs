//! # Unit Tests
//!
//! One module per library module, from the golden model up to the runners.





/// End-to-end sequential and parallel runs.
pub mod runner;
