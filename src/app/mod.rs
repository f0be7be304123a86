// Application layer: wiring of context, strategies and output for the binaries.

pub mod report;
pub mod runner;
