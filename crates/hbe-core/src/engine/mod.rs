//! # Engine Module
//!
//! The stateful machinery behind the energy pipeline.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Evaluation mode, external program and bond filtering
//! - **Link Detection** ([`linkage`]) - Peptide-bond detection between the two partner residues
//! - **Fragments** ([`fragment`]) - Value copies of residues relabeled onto synthetic chains
//! - **Capping** ([`capping`]) - Terminal atoms added to each fragment before evaluation
//! - **Evaluation** ([`evaluator`]) - Invocation of the external energy program
//! - **Scratch Files** ([`scratch`]) - Per-bond temporary files, removed on drop
//! - **Context** ([`context`]) - Lazily loaded structure shared across one run
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod capping;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod fragment;
pub mod linkage;
pub mod progress;
pub mod scratch;
