// src/probe/mod.rs
mod executor;

pub use executor::{ProbeError, ProbeExecutor, ProbeOutcome};
