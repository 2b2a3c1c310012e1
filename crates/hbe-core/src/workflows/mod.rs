//! # Workflows Module
//!
//! High-level entry points that run the complete hydrogen-bond energy pipeline.
//!
//! ## Architecture
//!
//! - **Energy Workflow** ([`energy`]) - Evaluates every selected bond of a listing against
//!   one structure, recording an outcome per bond and continuing past per-bond failures.

pub mod energy;
