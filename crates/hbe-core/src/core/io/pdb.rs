use crate::core::io::traits::CoordinateFile;
use crate::core::models::atom::Atom;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const MIN_ATOM_RECORD_LENGTH: usize = 54;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> char {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .unwrap_or(' ')
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_optional_float(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
    default: f64,
) -> Result<f64, PdbError> {
    if slice_and_trim(line, start, end).is_empty() {
        Ok(default)
    } else {
        parse_float(line, line_num, start, end)
    }
}

/// Reader and writer for the fixed-column PDB coordinate format.
pub struct PdbFile;

impl PdbFile {
    fn parse_atom(line: &str, line_num: usize, is_hetero: bool) -> Result<Atom, PdbError> {
        if line.len() < MIN_ATOM_RECORD_LENGTH {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::LineTooShort,
            });
        }

        let serial_str = slice_and_trim(line, 6, 11);
        let serial: usize = serial_str.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidInt {
                columns: "7-11".into(),
                value: serial_str.into(),
            },
        })?;

        let name = slice_and_trim(line, 12, 16);
        if name.is_empty() {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::MissingRequiredField {
                    columns: "13-16".into(),
                },
            });
        }
        let raw_name = format!("{:<4}", line.get(12..16).unwrap_or(name));

        let res_seq_str = slice_and_trim(line, 22, 26);
        let residue_number: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidInt {
                columns: "23-26".into(),
                value: res_seq_str.into(),
            },
        })?;

        let x = parse_float(line, line_num, 30, 38)?;
        let y = parse_float(line, line_num, 38, 46)?;
        let z = parse_float(line, line_num, 46, 54)?;

        Ok(Atom {
            serial,
            name: name.to_string(),
            raw_name,
            residue_name: slice_and_trim(line, 17, 20).to_string(),
            chain_id: column_char(line, 21),
            residue_number,
            insertion_code: column_char(line, 26),
            position: Point3::new(x, y, z),
            occupancy: parse_optional_float(line, line_num, 54, 60, 1.0)?,
            b_factor: parse_optional_float(line, line_num, 60, 66, 0.0)?,
            element: slice_and_trim(line, 76, 78).to_string(),
            is_hetero,
        })
    }

    fn format_atom(atom: &Atom, serial: usize) -> String {
        let record_type = if atom.is_hetero { "HETATM" } else { "ATOM" };
        format!(
            "{:<6}{:>5} {:<4}{}{:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
            record_type,
            serial,
            atom.raw_name,
            ' ',
            atom.residue_name,
            atom.chain_id,
            atom.residue_number,
            atom.insertion_code,
            atom.position.x,
            atom.position.y,
            atom.position.z,
            atom.occupancy,
            atom.b_factor,
            atom.element
        )
    }
}

impl CoordinateFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut structure = Structure::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" => structure.push(Self::parse_atom(&line, line_num, false)?),
                "HETATM" => structure.push(Self::parse_atom(&line, line_num, true)?),
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if structure.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok(structure)
    }

    /// Writes one record per atom using each atom's positional name, renumbering serials
    /// from 1, and terminates the file with `END`.
    fn write_atoms_to(atoms: &[Atom], writer: &mut impl Write) -> Result<(), Self::Error> {
        for (i, atom) in atoms.iter().enumerate() {
            writeln!(writer, "{}", Self::format_atom(atom, i + 1))?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}

/// Rewrites the positional name of every hydrogen as a space followed by its name,
/// truncated to four columns.
///
/// Structures produced by hydrogen-adding tools often carry names such as `HG1` left
/// justified in column 13; the energy evaluator expects them shifted one column right.
pub fn fix_hydrogen_names(structure: &mut Structure) {
    for atom in structure.atoms_mut().iter_mut().filter(|a| a.is_hydrogen()) {
        atom.raw_name = format!(" {}", atom.name).chars().take(4).collect();
        if atom.raw_name.len() < 4 {
            atom.raw_name = format!("{:<4}", atom.raw_name);
        }
    }
}
