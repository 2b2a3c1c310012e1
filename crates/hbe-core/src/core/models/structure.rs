use super::atom::Atom;
use super::residue::ResidueKey;
use super::locator;
use std::ops::Range;

/// An ordered, owned sequence of atoms loaded from a coordinate file.
///
/// Residues are not stored explicitly: a residue is the maximal run of consecutive atoms
/// sharing one [`ResidueKey`], and is addressed by an index range into [`Structure::atoms`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    atoms: Vec<Atom>,
}

impl Structure {
    /// Creates a new, empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a structure from atoms already in structural order.
    pub fn from_atoms(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns the index of the first atom of the residue identified by `key`.
    pub fn find_residue(&self, key: &ResidueKey) -> Option<usize> {
        locator::find_residue(&self.atoms, key)
    }

    /// Returns the index range covering the residue identified by `key`.
    pub fn residue_range(&self, key: &ResidueKey) -> Option<Range<usize>> {
        locator::residue_range(&self.atoms, key)
    }

    /// Returns the atoms of the residue identified by `key`.
    pub fn residue(&self, key: &ResidueKey) -> Option<&[Atom]> {
        self.residue_range(key).map(|range| &self.atoms[range])
    }

    /// Counts the residues, i.e. the runs of consecutive atoms sharing a key.
    pub fn residue_count(&self) -> usize {
        let mut count = 0;
        let mut start = 0;
        while start < self.atoms.len() {
            start = locator::next_residue_boundary(&self.atoms, start);
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn atom(name: &str, number: isize) -> Atom {
        Atom::new(name, "ALA", ResidueKey::new(' ', number, ' '), Point3::origin())
    }

    #[test]
    fn new_structure_is_empty() {
        let structure = Structure::new();
        assert!(structure.is_empty());
        assert_eq!(structure.len(), 0);
        assert_eq!(structure.residue_count(), 0);
    }

    #[test]
    fn residue_returns_only_matching_run() {
        let structure = Structure::from_atoms(vec![
            atom("N", 1),
            atom("CA", 1),
            atom("N", 2),
            atom("CA", 2),
            atom("CB", 2),
        ]);

        let residue = structure.residue(&ResidueKey::new(' ', 2, ' ')).unwrap();
        assert_eq!(residue.len(), 3);
        assert!(residue.iter().all(|a| a.residue_number == 2));
        assert_eq!(structure.residue_count(), 2);
    }

    #[test]
    fn residue_returns_none_for_unknown_key() {
        let structure = Structure::from_atoms(vec![atom("N", 1)]);
        assert!(structure.residue(&ResidueKey::new('A', 1, ' ')).is_none());
        assert!(structure.find_residue(&ResidueKey::new(' ', 9, ' ')).is_none());
    }
}
