//! # HBE Core Library
//!
//! A library for computing the interaction energy of individual hydrogen bonds, given a
//! protein structure and a listing of its hydrogen bonds as produced by HBPlus.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `Atom`, `HBond`),
//!   the HBPlus listing parser, PDB coordinate I/O, and geometry helpers.
//!
//! - **[`engine`]: The Logic Core.** Residue location, covalent-link detection, fragment
//!   construction, terminal capping, scratch file management, and the pluggable
//!   `EnergyEvaluator` that drives the external energy program.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into the
//!   per-bond energy pipeline and reports the outcome of every bond.

pub mod core;
pub mod engine;
pub mod workflows;
