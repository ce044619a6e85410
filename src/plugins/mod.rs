//! Subsystem implementations.

pub mod checkpoint;
