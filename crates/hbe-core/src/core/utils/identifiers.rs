use phf::{Set, phf_set};

pub const BACKBONE_NITROGEN: &str = "N";
pub const ALPHA_CARBON: &str = "CA";
pub const CARBONYL_CARBON: &str = "C";
pub const CARBONYL_OXYGEN: &str = "O";
pub const PROLINE_DELTA_CARBON: &str = "CD";
pub const PROLINE_RESIDUE_NAME: &str = "PRO";

static AMIDE_HYDROGEN_NAMES: Set<&'static str> = phf_set! {
    "H", "HN", "H1", "H2", "H3", "HN1", "HN2", "HN3", "HT1", "HT2", "HT3", "1H", "2H", "3H",
};

static TERMINAL_OXYGEN_NAMES: Set<&'static str> = phf_set! {
    "OXT", "OT2", "O2", "OC2",
};

/// Returns `true` for any of the names used for hydrogens on the backbone nitrogen.
pub fn is_amide_hydrogen(atom_name: &str) -> bool {
    AMIDE_HYDROGEN_NAMES.contains(atom_name.trim())
}

/// Returns `true` for the names used for the second carboxyl oxygen of a C-terminus.
pub fn is_terminal_oxygen(atom_name: &str) -> bool {
    TERMINAL_OXYGEN_NAMES.contains(atom_name.trim())
}
