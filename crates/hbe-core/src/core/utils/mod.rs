//! Stateless helpers shared by the engine: atom-name classification and geometry.

pub mod geometry;
pub mod identifiers;
