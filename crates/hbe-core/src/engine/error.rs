use super::config::ConfigError;
use super::evaluator::EvaluatorError;
use crate::core::io::hbplus::HbPlusError;
use crate::core::io::pdb::PdbError;
use crate::core::models::hbond::PartnerRole;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load structure from '{}': {source}", .path.display())]
    StructureLoad {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("{role} residue {spec} not found")]
    ResidueNotFound { role: PartnerRole, spec: String },

    #[error("Energy evaluation failed: {source}")]
    Evaluator {
        #[from]
        source: EvaluatorError,
    },

    #[error("Failed to write scratch file '{}': {source}", .path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read hydrogen bond listing: {0}")]
    BondListing(#[from] HbPlusError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Whether the error concerns only the bond being evaluated, so that a run over many
    /// bonds can record it and move on.
    pub fn is_recoverable(&self) -> bool {
        match self {
            EngineError::ResidueNotFound { .. } => true,
            EngineError::Evaluator { source } => !source.is_scratch_failure(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_per_bond_errors_are_recoverable() {
        let missing = EngineError::ResidueNotFound {
            role: PartnerRole::Acceptor,
            spec: "A0099 ".to_string(),
        };
        assert!(missing.is_recoverable());
        assert_eq!(missing.to_string(), "Acceptor residue A0099  not found");

        let evaluator: EngineError = EvaluatorError::Timeout {
            timeout: std::time::Duration::from_secs(1),
        }
        .into();
        assert!(evaluator.is_recoverable());

        let scratch = EngineError::Scratch {
            path: PathBuf::from("/tmp/x.pdh"),
            source: io::Error::other("disk full"),
        };
        assert!(!scratch.is_recoverable());
        assert!(!EngineError::Config(ConfigError::MissingParameter("program")).is_recoverable());

        let report: EngineError = EvaluatorError::ReportFile {
            path: PathBuf::from("/tmp/x.ec"),
            source: io::Error::other("is a directory"),
        }
        .into();
        assert!(!report.is_recoverable());
    }
}
