use crate::core::models::hbond::{
    BondType, HBond, HBondGeometry, HBondPartner, ParseBondTypeError,
};
use crate::core::models::residue::ParseResidueKeyError;
use std::f64::consts::PI;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of banner lines at the top of every HBPlus `.hb2` listing.
pub const HBPLUS_HEADER_LINES: usize = 8;

/// Default upper bound on the number of bond records accepted from one listing.
pub const MAX_HBONDS: usize = 10_000;

#[derive(Debug, Error)]
pub enum HbPlusError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: HbPlusParseErrorKind,
    },
    #[error("Bond listing holds more than {max} records")]
    CapacityExceeded { max: usize },
}

#[derive(Debug, Error)]
pub enum HbPlusParseErrorKind {
    #[error("Invalid {role} residue: {source}")]
    InvalidResidue {
        role: &'static str,
        source: ParseResidueKeyError,
    },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error(transparent)]
    InvalidBondType(#[from] ParseBondTypeError),
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

/// Reads a numeric column. Blank or absent columns read as zero.
fn parse_numeric(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, HbPlusError> {
    let value = slice_and_trim(line, start, end);
    if value.is_empty() {
        return Ok(0.0);
    }
    value.parse().map_err(|_| HbPlusError::Parse {
        line: line_num,
        kind: HbPlusParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_angle(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, HbPlusError> {
    Ok(parse_numeric(line, line_num, start, end)? * PI / 180.0)
}

fn parse_partner(
    line: &str,
    line_num: usize,
    role: &'static str,
    spec_cols: (usize, usize),
    name_cols: (usize, usize),
    atom_cols: (usize, usize),
) -> Result<HBondPartner, HbPlusError> {
    let residue_spec = line
        .get(spec_cols.0..spec_cols.1.min(line.len()))
        .unwrap_or("");
    let residue = residue_spec.parse().map_err(|source| HbPlusError::Parse {
        line: line_num,
        kind: HbPlusParseErrorKind::InvalidResidue { role, source },
    })?;

    Ok(HBondPartner {
        residue,
        residue_spec: residue_spec.to_string(),
        residue_name: slice_and_trim(line, name_cols.0, name_cols.1).to_string(),
        atom_name: slice_and_trim(line, atom_cols.0, atom_cols.1).to_string(),
    })
}

/// Parses one data line of an HBPlus listing.
///
/// Returns `Ok(None)` for lines whose donor column is blank, and for short records that
/// end before the acceptor or bond type columns. Angles are converted from degrees to
/// radians.
pub fn parse_record(line: &str, line_num: usize) -> Result<Option<HBond>, HbPlusError> {
    if slice_and_trim(line, 0, 6).is_empty() {
        return Ok(None);
    }
    if slice_and_trim(line, 14, 20).is_empty() || slice_and_trim(line, 33, 35).is_empty() {
        warn!(line = line_num, "Skipping incomplete hydrogen bond record.");
        return Ok(None);
    }

    let donor = parse_partner(line, line_num, "donor", (0, 6), (6, 9), (10, 13))?;
    let acceptor = parse_partner(line, line_num, "acceptor", (14, 20), (20, 23), (24, 27))?;

    let bond_type: BondType = slice_and_trim(line, 33, 35)
        .parse()
        .map_err(|e: ParseBondTypeError| HbPlusError::Parse {
            line: line_num,
            kind: e.into(),
        })?;

    let geometry = HBondGeometry {
        distance_da: parse_numeric(line, line_num, 27, 32)?,
        angle_dha: parse_angle(line, line_num, 45, 51)?,
        distance_ha: parse_numeric(line, line_num, 52, 57)?,
        angle_haaa: parse_angle(line, line_num, 57, 63)?,
        angle_daaa: parse_angle(line, line_num, 63, 69)?,
    };

    Ok(Some(HBond {
        donor,
        acceptor,
        donor_hydrogen: None,
        bond_type,
        geometry,
    }))
}

/// Reads every bond record from an HBPlus listing, skipping the banner.
///
/// Fails with [`HbPlusError::CapacityExceeded`] as soon as the listing holds more than
/// `max_records` records; no partial list is returned.
pub fn read_hbonds(reader: impl BufRead, max_records: usize) -> Result<Vec<HBond>, HbPlusError> {
    let mut bonds = Vec::new();

    for (index, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = index + 1;
        if line_num <= HBPLUS_HEADER_LINES {
            continue;
        }

        if let Some(bond) = parse_record(&line, line_num)? {
            if bonds.len() == max_records {
                return Err(HbPlusError::CapacityExceeded { max: max_records });
            }
            bonds.push(bond);
        }
    }

    debug!(count = bonds.len(), "Read hydrogen bond listing.");
    Ok(bonds)
}

pub fn read_hbonds_from_path(
    path: impl AsRef<Path>,
    max_records: usize,
) -> Result<Vec<HBond>, HbPlusError> {
    let file = File::open(path)?;
    read_hbonds(BufReader::new(file), max_records)
}
