//! Provides input/output functionality for the file formats of an energy run.
//!
//! [`pdb`] reads the structure carrying hydrogens and writes the coordinate subsets
//! handed to the energy evaluator; [`hbplus`] reads the hydrogen-bond listing. Both
//! coordinate directions go through the [`traits::CoordinateFile`] interface.

pub mod hbplus;
pub mod pdb;
pub mod traits;
