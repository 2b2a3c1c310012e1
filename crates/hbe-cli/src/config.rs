mod defaults;

use crate::cli::EvalArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use hbenergy::engine::config::{BondFilter, EnergyConfig, EnergyConfigBuilder};
use hbenergy::engine::evaluator::{EvaluationMode, InvocationStyle};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialEvaluatorConfig {
    program: Option<PathBuf>,
    mode: Option<String>,
    invocation: Option<String>,
    #[serde(rename = "timeout-secs")]
    timeout_secs: Option<u64>,
    #[serde(rename = "max-retries")]
    max_retries: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSelectionConfig {
    #[serde(rename = "all-bonds")]
    all_bonds: Option<bool>,
    #[serde(rename = "max-records")]
    max_records: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialStructureConfig {
    #[serde(rename = "fix-hydrogen-names")]
    fix_hydrogen_names: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialScratchConfig {
    directory: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialEnergyConfig {
    evaluator: Option<PartialEvaluatorConfig>,
    selection: Option<PartialSelectionConfig>,
    structure: Option<PartialStructureConfig>,
    scratch: Option<PartialScratchConfig>,
}

impl PartialEnergyConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file named by `--config`, or starts empty.
    pub fn load(args: &EvalArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the final configuration. `all_bonds` is the subcommand's `--all` flag.
    pub fn merge_with_cli(mut self, args: &EvalArgs, all_bonds: bool) -> Result<EnergyConfig> {
        self.apply_set_values(&args.set_values)?;

        let defaults = DefaultsConfig::default();
        let evaluator = self.evaluator.take().unwrap_or_default();
        let selection = self.selection.take().unwrap_or_default();
        let structure = self.structure.take().unwrap_or_default();
        let scratch = self.scratch.take().unwrap_or_default();

        let program = args
            .evaluator
            .clone()
            .or(evaluator.program)
            .unwrap_or_else(|| PathBuf::from(defaults.program));

        let mode = if args.hbonds_only {
            EvaluationMode::HBondOnly
        } else if args.relax {
            EvaluationMode::Relax
        } else {
            parse_option::<EvaluationMode>("evaluator.mode", evaluator.mode.as_deref())?
                .unwrap_or_default()
        };

        let invocation = if args.direct {
            InvocationStyle::Direct
        } else {
            parse_option::<InvocationStyle>(
                "evaluator.invocation",
                evaluator.invocation.as_deref(),
            )?
            .unwrap_or_default()
        };

        let timeout_secs = args
            .timeout
            .or(evaluator.timeout_secs)
            .unwrap_or(defaults.timeout_secs);
        let max_retries = args
            .retries
            .or(evaluator.max_retries)
            .unwrap_or(defaults.max_retries);

        let bond_filter = if all_bonds || selection.all_bonds.unwrap_or(defaults.all_bonds) {
            BondFilter::All
        } else {
            BondFilter::SideChainOnly
        };
        let max_records = args
            .max_records
            .or(selection.max_records)
            .unwrap_or(defaults.max_records);

        let fix_hydrogen_names = args.fix_hydrogen_names
            || structure
                .fix_hydrogen_names
                .unwrap_or(defaults.fix_hydrogen_names);

        let mut builder = EnergyConfigBuilder::new()
            .program(program)
            .mode(mode)
            .invocation(invocation)
            .timeout(Duration::from_secs(timeout_secs))
            .max_retries(max_retries)
            .bond_filter(bond_filter)
            .max_records(max_records)
            .fix_hydrogen_names(fix_hydrogen_names);
        if let Some(dir) = args.scratch_dir.clone().or(scratch.directory) {
            builder = builder.scratch_dir(dir);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let parts: Vec<_> = kv_pair.splitn(2, '=').collect();
            if parts.len() != 2 {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            }
            let key = parts[0];
            let value_str = parts[1];

            match key {
                "evaluator.program" => {
                    self.evaluator_mut().program = Some(PathBuf::from(value_str));
                }
                "evaluator.mode" => {
                    self.evaluator_mut().mode = Some(value_str.to_string());
                }
                "evaluator.invocation" => {
                    self.evaluator_mut().invocation = Some(value_str.to_string());
                }
                "evaluator.timeout-secs" => {
                    self.evaluator_mut().timeout_secs = Some(parse_value(key, value_str)?);
                }
                "evaluator.max-retries" => {
                    self.evaluator_mut().max_retries = Some(parse_value(key, value_str)?);
                }
                "selection.all-bonds" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .all_bonds = Some(parse_value(key, value_str)?);
                }
                "selection.max-records" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .max_records = Some(parse_value(key, value_str)?);
                }
                "structure.fix-hydrogen-names" => {
                    self.structure
                        .get_or_insert_with(Default::default)
                        .fix_hydrogen_names = Some(parse_value(key, value_str)?);
                }
                "scratch.directory" => {
                    self.scratch
                        .get_or_insert_with(Default::default)
                        .directory = Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn evaluator_mut(&mut self) -> &mut PartialEvaluatorConfig {
        self.evaluator.get_or_insert_with(Default::default)
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value_str)))
}

fn parse_option<T>(key: &str, value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| CliError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}
