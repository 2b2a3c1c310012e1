use super::residue::ResidueKey;
use nalgebra::Point3;

/// Represents one atom record of a coordinate file.
///
/// Atoms are stored in structural order inside a [`Structure`](super::structure::Structure)
/// and carry the full identity of their enclosing residue, so that a residue is simply a
/// maximal run of consecutive atoms sharing the same [`ResidueKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom serial number from the source file.
    pub serial: usize,
    /// The trimmed atom name (e.g., "CA", "OG1").
    pub name: String,
    /// The exact four-column atom name used when the record is written back out.
    pub raw_name: String,
    /// The three-letter residue name (e.g., "SER").
    pub residue_name: String,
    /// The chain identifier; a space means unlabeled.
    pub chain_id: char,
    /// The residue sequence number.
    pub residue_number: isize,
    /// The insertion code; a space means none.
    pub insertion_code: char,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The occupancy column.
    pub occupancy: f64,
    /// The temperature factor column.
    pub b_factor: f64,
    /// The element symbol, empty when the source file omits it.
    pub element: String,
    /// Whether the record was read from a `HETATM` line.
    pub is_hetero: bool,
}

impl Atom {
    /// Creates a new `Atom` belonging to the residue identified by `key`.
    ///
    /// The raw name is derived from `name` using the PDB convention: names shorter than
    /// four characters start in the second column.
    pub fn new(name: &str, residue_name: &str, key: ResidueKey, position: Point3<f64>) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            raw_name: pad_atom_name(name),
            residue_name: residue_name.to_string(),
            chain_id: key.chain_id,
            residue_number: key.residue_number,
            insertion_code: key.insertion_code,
            position,
            occupancy: 1.0,
            b_factor: 0.0,
            element: String::new(),
            is_hetero: false,
        }
    }

    /// Returns the key of the residue this atom belongs to.
    pub fn residue_key(&self) -> ResidueKey {
        ResidueKey::new(self.chain_id, self.residue_number, self.insertion_code)
    }

    /// Returns `true` if the atom is a hydrogen, judged from its name.
    pub fn is_hydrogen(&self) -> bool {
        self.name.starts_with('H')
    }

    /// Renames the atom, keeping `name` and `raw_name` consistent.
    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
        self.raw_name = pad_atom_name(name);
    }
}

/// Formats an atom name into the four positional columns of a PDB record.
pub fn pad_atom_name(name: &str) -> String {
    let name = name.trim();
    if name.chars().count() >= 4 {
        name.chars().take(4).collect()
    } else {
        format!(" {:<3}", name)
    }
}
