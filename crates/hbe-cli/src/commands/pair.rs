use super::evaluate_bonds;
use crate::cli::PairArgs;
use crate::config::PartialEnergyConfig;
use crate::error::{CliError, Result};
use hbenergy::core::models::hbond::HBond;
use tracing::debug;

pub fn run(args: PairArgs) -> Result<()> {
    let config = PartialEnergyConfig::load(&args.eval)?.merge_with_cli(&args.eval, false)?;

    let bond = HBond::from_atom_specifiers(&args.donor, &args.acceptor)
        .map_err(|e| CliError::Argument(e.to_string()))?;
    debug!(?bond, "Synthesized bond from atom specifiers.");

    if !config.bond_filter.accepts(&bond) {
        return Err(CliError::Argument(
            "Can't calc energy involving non-SS or OXT".to_string(),
        ));
    }

    evaluate_bonds(&[bond], &args.structure, &config, args.eval.csv.as_deref())
}
