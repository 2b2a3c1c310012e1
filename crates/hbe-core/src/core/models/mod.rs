//! # Core Models Module
//!
//! Data structures representing the inputs of an interaction-energy run.
//!
//! ## Key Components
//!
//! - [`atom`] - One atom record with its residue identity, positional name and coordinates
//! - [`residue`] - The [`residue::ResidueKey`] triple and its specifier parser
//! - [`structure`] - The ordered atom sequence loaded from a coordinate file
//! - [`locator`] - Finding contiguous residue runs inside an atom slice
//! - [`hbond`] - Hydrogen-bond records produced by HBPlus or given on the command line
//!
//! ## Usage
//!
//! ```ignore
//! use hbenergy::core::models::{hbond::HBond, structure::Structure};
//!
//! let bond = HBond::from_atom_specifiers("A0012-.OG", "A0015-.OD1")?;
//! let donor_atoms = structure.residue(&bond.donor.residue);
//! ```

pub mod atom;
pub mod hbond;
pub mod locator;
pub mod residue;
pub mod structure;
