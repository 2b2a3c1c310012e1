use super::fragment::ResidueFragment;
use crate::core::models::atom::Atom;
use crate::core::models::locator::next_residue_boundary;
use crate::core::utils::geometry::{calculate_carboxyl_oxygen, generate_sp3_hydrogens};
use crate::core::utils::identifiers::{
    ALPHA_CARBON, BACKBONE_NITROGEN, CARBONYL_CARBON, CARBONYL_OXYGEN, PROLINE_DELTA_CARBON,
    PROLINE_RESIDUE_NAME, is_amide_hydrogen, is_terminal_oxygen,
};
use nalgebra::Point3;
use tracing::warn;

const N_TERMINAL_HYDROGEN_BOND_LENGTH: f64 = 1.01;
const CARBOXYL_OXYGEN_BOND_LENGTH: f64 = 1.25;

const N_TERMINAL_HYDROGEN_NAMES: [&str; 3] = ["HT1", "HT2", "HT3"];
const FIRST_CARBOXYL_OXYGEN_NAME: &str = "OT1";
const SECOND_CARBOXYL_OXYGEN_NAME: &str = "OT2";

/// Adds terminal atoms to a fragment so it can be evaluated as a free peptide.
///
/// The fragment must be in N-to-C order on a single chain label; the label is preserved.
pub trait TerminalCapper {
    fn cap(&self, fragment: ResidueFragment) -> ResidueFragment;
}

/// Caps fragments using CHARMM terminal naming: a charged `NH3+` N-terminus with
/// hydrogens `HT1`..`HT3` and a carboxylate C-terminus with oxygens `OT1`/`OT2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharmmCapper;

impl TerminalCapper for CharmmCapper {
    fn cap(&self, mut fragment: ResidueFragment) -> ResidueFragment {
        if fragment.is_empty() {
            return fragment;
        }
        cap_n_terminus(fragment.atoms_mut());
        cap_c_terminus(fragment.atoms_mut());
        fragment
    }
}

fn find_in(atoms: &[Atom], start: usize, end: usize, name: &str) -> Option<usize> {
    atoms[start..end]
        .iter()
        .position(|atom| atom.name == name)
        .map(|offset| start + offset)
}

fn last_residue_start(atoms: &[Atom]) -> usize {
    let mut start = 0;
    loop {
        let end = next_residue_boundary(atoms, start);
        if end >= atoms.len() {
            return start;
        }
        start = end;
    }
}

fn terminal_atom(template: &Atom, name: &str, position: Point3<f64>, element: &str) -> Atom {
    let mut atom = Atom::new(name, &template.residue_name, template.residue_key(), position);
    atom.element = element.to_string();
    atom.is_hetero = template.is_hetero;
    atom
}

fn cap_n_terminus(atoms: &mut Vec<Atom>) {
    let end = next_residue_boundary(atoms, 0);

    let (Some(n_index), Some(ca_index)) = (
        find_in(atoms, 0, end, BACKBONE_NITROGEN),
        find_in(atoms, 0, end, ALPHA_CARBON),
    ) else {
        warn!(
            residue = %atoms[0].residue_key(),
            "N-terminus lacks N or CA; leaving it uncapped."
        );
        return;
    };

    let nitrogen = atoms[n_index].clone();
    let mut neighbors = vec![atoms[ca_index].position];
    if nitrogen.residue_name == PROLINE_RESIDUE_NAME {
        match find_in(atoms, 0, end, PROLINE_DELTA_CARBON) {
            Some(cd_index) => neighbors.push(atoms[cd_index].position),
            None => {
                warn!(
                    residue = %nitrogen.residue_key(),
                    "Proline N-terminus lacks CD; leaving it uncapped."
                );
                return;
            }
        }
    }

    let hydrogens: Vec<Atom> = generate_sp3_hydrogens(
        &nitrogen.position,
        &neighbors,
        N_TERMINAL_HYDROGEN_BOND_LENGTH,
    )
    .into_iter()
    .zip(N_TERMINAL_HYDROGEN_NAMES)
    .map(|(position, name)| terminal_atom(&nitrogen, name, position, "H"))
    .collect();

    let mut capped = Vec::with_capacity(atoms.len() + hydrogens.len());
    for (index, atom) in atoms.drain(..).enumerate() {
        if index < end && is_amide_hydrogen(&atom.name) {
            continue;
        }
        capped.push(atom);
        if index == n_index {
            capped.extend(hydrogens.iter().cloned());
        }
    }
    *atoms = capped;
}

fn cap_c_terminus(atoms: &mut Vec<Atom>) {
    let start = last_residue_start(atoms);
    let end = atoms.len();

    let (Some(c_index), Some(o_index)) = (
        find_in(atoms, start, end, CARBONYL_CARBON),
        find_in(atoms, start, end, CARBONYL_OXYGEN),
    ) else {
        warn!(
            residue = %atoms[start].residue_key(),
            "C-terminus lacks C or O; leaving it uncapped."
        );
        return;
    };

    let existing = atoms[start..end]
        .iter()
        .position(|atom| is_terminal_oxygen(&atom.name))
        .map(|offset| start + offset);

    let (second_oxygen, o_index) = match existing {
        Some(index) => {
            let mut atom = atoms.remove(index);
            atom.rename(SECOND_CARBOXYL_OXYGEN_NAME);
            (atom, if index < o_index { o_index - 1 } else { o_index })
        }
        None => {
            let Some(ca_index) = find_in(atoms, start, end, ALPHA_CARBON) else {
                warn!(
                    residue = %atoms[start].residue_key(),
                    "C-terminus lacks CA; cannot place OT2."
                );
                return;
            };
            let position = calculate_carboxyl_oxygen(
                &atoms[c_index].position,
                &atoms[ca_index].position,
                &atoms[o_index].position,
                CARBOXYL_OXYGEN_BOND_LENGTH,
            );
            let atom = terminal_atom(&atoms[o_index], SECOND_CARBOXYL_OXYGEN_NAME, position, "O");
            (atom, o_index)
        }
    };

    atoms[o_index].rename(FIRST_CARBOXYL_OXYGEN_NAME);
    atoms.insert(o_index + 1, second_oxygen);
}
