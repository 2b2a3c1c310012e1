use hbenergy::core::models::hbond::HBondPartner;
use hbenergy::workflows::energy::{BondOutcome, EnergyReport};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct BondRow {
    index: usize,
    donor: String,
    acceptor: String,
    bond_type: String,
    status: &'static str,
    energy: Option<f64>,
}

fn partner_label(partner: &HBondPartner) -> String {
    format!("{}.{}", partner.residue, partner.atom_name)
}

/// Writes one row per bond of the run, including skipped and failed bonds.
pub fn write_csv<W: Write>(report: &EnergyReport, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in &report.outcomes {
        let (status, energy) = match &entry.outcome {
            BondOutcome::Evaluated { energy } => ("evaluated", Some(*energy)),
            BondOutcome::Skipped => ("skipped", None),
            BondOutcome::Failed { .. } => ("failed", None),
        };
        wtr.serialize(BondRow {
            index: entry.index,
            donor: partner_label(&entry.bond.donor),
            acceptor: partner_label(&entry.bond.acceptor),
            bond_type: entry.bond.bond_type.to_string(),
            status,
            energy,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_to_path(report: &EnergyReport, path: &Path) -> csv::Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(report, file)
}
