use super::evaluator::{
    DEFAULT_EVALUATOR_TIMEOUT, EvaluationMode, ExternalEvaluator, InvocationStyle,
};
use crate::core::io::hbplus::MAX_HBONDS;
use crate::core::models::hbond::HBond;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Which bonds of a listing are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BondFilter {
    /// Side-chain to side-chain bonds not involving the terminal oxygen.
    #[default]
    SideChainOnly,
    All,
}

impl BondFilter {
    pub fn accepts(&self, bond: &HBond) -> bool {
        match self {
            BondFilter::SideChainOnly => {
                bond.bond_type.is_side_chain_pair() && !bond.involves_terminal_oxygen()
            }
            BondFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    pub program: PathBuf,
    pub mode: EvaluationMode,
    pub invocation: InvocationStyle,
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyConfig {
    pub evaluator: EvaluatorConfig,
    pub bond_filter: BondFilter,
    pub scratch_dir: PathBuf,
    pub max_records: usize,
    pub fix_hydrogen_names: bool,
}

impl From<&EvaluatorConfig> for ExternalEvaluator {
    fn from(config: &EvaluatorConfig) -> Self {
        ExternalEvaluator::new(&config.program)
            .with_timeout(config.timeout)
            .with_max_retries(config.max_retries)
    }
}

#[derive(Default)]
pub struct EnergyConfigBuilder {
    program: Option<PathBuf>,
    mode: Option<EvaluationMode>,
    invocation: Option<InvocationStyle>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    bond_filter: Option<BondFilter>,
    scratch_dir: Option<PathBuf>,
    max_records: Option<usize>,
    fix_hydrogen_names: Option<bool>,
}

impl EnergyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(mut self, path: PathBuf) -> Self {
        self.program = Some(path);
        self
    }
    pub fn mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn invocation(mut self, style: InvocationStyle) -> Self {
        self.invocation = Some(style);
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
    pub fn bond_filter(mut self, filter: BondFilter) -> Self {
        self.bond_filter = Some(filter);
        self
    }
    pub fn scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = Some(dir);
        self
    }
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }
    pub fn fix_hydrogen_names(mut self, enabled: bool) -> Self {
        self.fix_hydrogen_names = Some(enabled);
        self
    }

    pub fn build(self) -> Result<EnergyConfig, ConfigError> {
        let program = self
            .program
            .ok_or(ConfigError::MissingParameter("program"))?;
        if program.as_os_str().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "program",
                reason: "path is empty".to_string(),
            });
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_EVALUATOR_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidParameter {
                name: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        let max_records = self.max_records.unwrap_or(MAX_HBONDS);
        if max_records == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_records",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(EnergyConfig {
            evaluator: EvaluatorConfig {
                program,
                mode: self.mode.unwrap_or_default(),
                invocation: self.invocation.unwrap_or_default(),
                timeout,
                max_retries: self.max_retries.unwrap_or(0),
            },
            bond_filter: self.bond_filter.unwrap_or_default(),
            scratch_dir: self.scratch_dir.unwrap_or_else(std::env::temp_dir),
            max_records,
            fix_hydrogen_names: self.fix_hydrogen_names.unwrap_or(false),
        })
    }
}
