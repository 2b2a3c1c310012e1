use crate::core::models::atom::Atom;
use crate::core::utils::geometry::distance_squared;
use crate::core::utils::identifiers::{BACKBONE_NITROGEN, CARBONYL_CARBON};
use tracing::trace;

/// Squared C–N distance (Å²) below which two residues are treated as peptide bonded.
pub const PEPTIDE_BOND_CUTOFF_SQ: f64 = 3.5;

/// How the donor and acceptor residues of a bond are covalently connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// The acceptor's carbonyl carbon is bonded to the donor's nitrogen.
    AcceptorThenDonor,
    /// The donor's carbonyl carbon is bonded to the acceptor's nitrogen.
    DonorThenAcceptor,
    Unlinked,
}

impl Linkage {
    pub fn is_linked(self) -> bool {
        self != Linkage::Unlinked
    }
}

fn find_atom<'a>(atoms: &'a [Atom], name: &str) -> Option<&'a Atom> {
    atoms.iter().find(|atom| atom.name == name)
}

/// Squared distance between the carbonyl carbon of `c_side` and the nitrogen of `n_side`,
/// or infinity when either atom is absent.
fn peptide_distance_squared(c_side: &[Atom], n_side: &[Atom]) -> f64 {
    match (
        find_atom(c_side, CARBONYL_CARBON),
        find_atom(n_side, BACKBONE_NITROGEN),
    ) {
        (Some(c), Some(n)) => distance_squared(&c.position, &n.position),
        _ => f64::INFINITY,
    }
}

/// Decides whether the two residues are joined by a peptide bond and in which direction.
///
/// The acceptor-to-donor pairing is tested first.
pub fn detect_link(donor_atoms: &[Atom], acceptor_atoms: &[Atom]) -> Linkage {
    let acceptor_c_donor_n = peptide_distance_squared(acceptor_atoms, donor_atoms);
    let donor_c_acceptor_n = peptide_distance_squared(donor_atoms, acceptor_atoms);
    trace!(acceptor_c_donor_n, donor_c_acceptor_n, "Peptide link distances.");

    if acceptor_c_donor_n < PEPTIDE_BOND_CUTOFF_SQ {
        Linkage::AcceptorThenDonor
    } else if donor_c_acceptor_n < PEPTIDE_BOND_CUTOFF_SQ {
        Linkage::DonorThenAcceptor
    } else {
        Linkage::Unlinked
    }
}
