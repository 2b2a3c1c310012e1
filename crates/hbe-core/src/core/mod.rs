//! # Core Module
//!
//! Fundamental building blocks shared by the rest of the library.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residue keys, structures and hydrogen bonds
//! - **File I/O** ([`io`]) - HBPlus bond listings and PDB coordinate files
//! - **Utilities** ([`utils`]) - Atom name tables and terminal-capping geometry

pub mod io;
pub mod models;
pub mod utils;
