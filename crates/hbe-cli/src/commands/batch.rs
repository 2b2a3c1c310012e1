use super::evaluate_bonds;
use crate::cli::BatchArgs;
use crate::config::PartialEnergyConfig;
use crate::error::{CliError, Result};
use hbenergy::core::io::hbplus::read_hbonds_from_path;
use tracing::info;

pub fn run(args: BatchArgs) -> Result<()> {
    let config = PartialEnergyConfig::load(&args.eval)?.merge_with_cli(&args.eval, args.all)?;

    let bonds = read_hbonds_from_path(&args.bonds, config.max_records).map_err(|e| {
        CliError::FileParsing {
            path: args.bonds.clone(),
            source: e.into(),
        }
    })?;
    info!(
        "Read {} hydrogen bond(s) from {}",
        bonds.len(),
        args.bonds.display()
    );

    evaluate_bonds(&bonds, &args.structure, &config, args.eval.csv.as_deref())
}
