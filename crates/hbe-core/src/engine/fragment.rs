use super::capping::TerminalCapper;
use super::linkage::Linkage;
use crate::core::models::atom::Atom;
use crate::core::models::locator::next_residue_boundary;

/// Chain label given to a donor residue evaluated on its own.
pub const DONOR_CHAIN_LABEL: char = 'D';
/// Chain label given to an acceptor residue evaluated on its own.
pub const ACCEPTOR_CHAIN_LABEL: char = 'A';
/// Chain label given to two peptide-bonded residues fused into one fragment.
pub const FUSED_CHAIN_LABEL: char = 'X';

/// An owned copy of one or more residues, all carrying the same synthetic chain label.
///
/// Fragments never alias the structure they were copied from, so they can be capped and
/// written out freely.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueFragment {
    chain_id: char,
    atoms: Vec<Atom>,
}

impl ResidueFragment {
    pub fn new(chain_id: char, atoms: Vec<Atom>) -> Self {
        let mut fragment = Self { chain_id, atoms };
        fragment.relabel(chain_id);
        fragment
    }

    pub fn chain_id(&self) -> char {
        self.chain_id
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut Vec<Atom> {
        &mut self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Moves every atom onto `chain_id`.
    pub fn relabel(&mut self, chain_id: char) {
        self.chain_id = chain_id;
        for atom in &mut self.atoms {
            atom.chain_id = chain_id;
        }
    }
}

/// Copies the residue starting at `start` onto the chain `chain_label`.
pub fn copy_residue(atoms: &[Atom], start: usize, chain_label: char) -> ResidueFragment {
    let end = next_residue_boundary(atoms, start);
    ResidueFragment::new(chain_label, atoms.get(start..end).unwrap_or_default().to_vec())
}

/// Concatenates `b` after `a`. The result keeps the chain label of `a`.
pub fn fuse(a: ResidueFragment, b: ResidueFragment) -> ResidueFragment {
    let chain_id = a.chain_id;
    let mut atoms = a.atoms;
    atoms.extend(b.atoms);
    ResidueFragment::new(chain_id, atoms)
}

/// The capped fragments to be evaluated for one bond.
///
/// When the two residues are peptide bonded only one slot is filled: the slot of the
/// residue that comes first along the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentPair {
    pub donor: Option<ResidueFragment>,
    pub acceptor: Option<ResidueFragment>,
}

impl FragmentPair {
    /// All atoms to be written, donor fragment first.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.donor
            .iter()
            .chain(self.acceptor.iter())
            .flat_map(|fragment| fragment.atoms().iter())
    }

    pub fn is_fused(&self) -> bool {
        self.donor.is_none() || self.acceptor.is_none()
    }
}

/// Builds the capped fragments for a bond whose residues start at `donor_start` and
/// `acceptor_start` in `atoms`.
pub fn build_fragments<C: TerminalCapper + ?Sized>(
    atoms: &[Atom],
    donor_start: usize,
    acceptor_start: usize,
    linkage: Linkage,
    capper: &C,
) -> FragmentPair {
    let copy = |start, label| copy_residue(atoms, start, label);

    match linkage {
        Linkage::AcceptorThenDonor => {
            let acceptor = copy(acceptor_start, FUSED_CHAIN_LABEL);
            let donor = copy(donor_start, FUSED_CHAIN_LABEL);
            FragmentPair {
                donor: None,
                acceptor: Some(capper.cap(fuse(acceptor, donor))),
            }
        }
        Linkage::DonorThenAcceptor => {
            let donor = copy(donor_start, FUSED_CHAIN_LABEL);
            let acceptor = copy(acceptor_start, FUSED_CHAIN_LABEL);
            FragmentPair {
                donor: Some(capper.cap(fuse(donor, acceptor))),
                acceptor: None,
            }
        }
        Linkage::Unlinked => FragmentPair {
            donor: Some(capper.cap(copy(donor_start, DONOR_CHAIN_LABEL))),
            acceptor: Some(capper.cap(copy(acceptor_start, ACCEPTOR_CHAIN_LABEL))),
        },
    }
}
