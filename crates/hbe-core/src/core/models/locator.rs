use super::atom::Atom;
use super::residue::ResidueKey;
use std::ops::Range;

/// Returns the index of the first atom whose residue key equals `key`.
pub fn find_residue(atoms: &[Atom], key: &ResidueKey) -> Option<usize> {
    atoms.iter().position(|atom| atom.residue_key() == *key)
}

/// Returns one past the last atom of the residue that starts at `start`.
///
/// The residue is the maximal run of consecutive atoms sharing the key of `atoms[start]`.
/// Returns `start` itself when it is out of bounds.
pub fn next_residue_boundary(atoms: &[Atom], start: usize) -> usize {
    let Some(first) = atoms.get(start) else {
        return start;
    };
    let key = first.residue_key();
    atoms[start..]
        .iter()
        .position(|atom| atom.residue_key() != key)
        .map_or(atoms.len(), |offset| start + offset)
}

pub fn residue_range(atoms: &[Atom], key: &ResidueKey) -> Option<Range<usize>> {
    let start = find_residue(atoms, key)?;
    Some(start..next_residue_boundary(atoms, start))
}
