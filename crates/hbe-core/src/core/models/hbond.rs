use super::residue::{ParseResidueKeyError, ResidueKey};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the terminal carboxyl oxygen that HBPlus occasionally reports as a partner.
pub const TERMINAL_OXYGEN_ATOM_NAME: &str = "OXT";

/// The part of the polymer an HBPlus bond partner belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondCategory {
    MainChain,
    SideChain,
    Hetero,
}

impl BondCategory {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'M' => Some(BondCategory::MainChain),
            'S' => Some(BondCategory::SideChain),
            'H' => Some(BondCategory::Hetero),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            BondCategory::MainChain => 'M',
            BondCategory::SideChain => 'S',
            BondCategory::Hetero => 'H',
        }
    }
}

/// The two-character HBPlus bond classification (donor category, acceptor category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BondType {
    pub donor: BondCategory,
    pub acceptor: BondCategory,
}

impl BondType {
    pub const SIDE_CHAIN_PAIR: BondType = BondType {
        donor: BondCategory::SideChain,
        acceptor: BondCategory::SideChain,
    };

    /// Returns `true` for side-chain to side-chain (`SS`) bonds.
    pub fn is_side_chain_pair(&self) -> bool {
        *self == Self::SIDE_CHAIN_PAIR
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Invalid bond type '{0}' (expected two of 'M', 'S', 'H')")]
pub struct ParseBondTypeError(pub String);

impl FromStr for BondType {
    type Err = ParseBondTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(d), Some(a), None) => BondCategory::from_code(d)
                .zip(BondCategory::from_code(a))
                .map(|(donor, acceptor)| BondType { donor, acceptor }),
            _ => None,
        };
        parsed.ok_or_else(|| ParseBondTypeError(s.to_string()))
    }
}

impl fmt::Display for BondType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.donor.code(), self.acceptor.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartnerRole {
    Donor,
    Acceptor,
}

impl fmt::Display for PartnerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartnerRole::Donor => f.write_str("Donor"),
            PartnerRole::Acceptor => f.write_str("Acceptor"),
        }
    }
}

/// One side of a hydrogen bond.
#[derive(Debug, Clone, PartialEq)]
pub struct HBondPartner {
    pub residue: ResidueKey,
    /// The residue specifier exactly as it appeared in the input, kept for diagnostics.
    pub residue_spec: String,
    /// Three-letter residue name; empty when the bond was given on the command line.
    pub residue_name: String,
    pub atom_name: String,
}

/// Geometric measurements of a hydrogen bond. Distances are in Angstroms, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HBondGeometry {
    pub distance_da: f64,
    pub angle_dha: f64,
    pub distance_ha: f64,
    pub angle_haaa: f64,
    pub angle_daaa: f64,
}

/// A hydrogen bond between a donor and an acceptor residue.
#[derive(Debug, Clone, PartialEq)]
pub struct HBond {
    pub donor: HBondPartner,
    pub acceptor: HBondPartner,
    pub donor_hydrogen: Option<String>,
    pub bond_type: BondType,
    pub geometry: HBondGeometry,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseAtomSpecifierError {
    #[error("Atom specifier '{0}' must have the form [c]nnnn[i].ATOM")]
    MissingSeparator(String),
    #[error("Atom specifier '{0}' has an empty atom name")]
    EmptyAtomName(String),
    #[error("Invalid residue in atom specifier: {0}")]
    Residue(#[from] ParseResidueKeyError),
}

impl HBondPartner {
    /// Parses a `[chain]NNNN[insertion].ATOMNAME` specifier, upper-casing it first and
    /// splitting on the first `.`.
    pub fn from_atom_specifier(spec: &str) -> Result<Self, ParseAtomSpecifierError> {
        let upper = spec.to_ascii_uppercase();
        let (residue_spec, atom_name) = upper
            .split_once('.')
            .ok_or_else(|| ParseAtomSpecifierError::MissingSeparator(spec.to_string()))?;
        let atom_name = atom_name.trim();
        if atom_name.is_empty() {
            return Err(ParseAtomSpecifierError::EmptyAtomName(spec.to_string()));
        }
        Ok(Self {
            residue: residue_spec.parse()?,
            residue_spec: residue_spec.to_string(),
            residue_name: String::new(),
            atom_name: atom_name.to_string(),
        })
    }
}

impl HBond {
    /// Synthesizes a side-chain to side-chain bond from two atom specifiers.
    ///
    /// No geometry is known for such a bond, so all measurements are zero.
    pub fn from_atom_specifiers(donor: &str, acceptor: &str) -> Result<Self, ParseAtomSpecifierError> {
        Ok(Self {
            donor: HBondPartner::from_atom_specifier(donor)?,
            acceptor: HBondPartner::from_atom_specifier(acceptor)?,
            donor_hydrogen: None,
            bond_type: BondType::SIDE_CHAIN_PAIR,
            geometry: HBondGeometry::default(),
        })
    }

    pub fn partner(&self, role: PartnerRole) -> &HBondPartner {
        match role {
            PartnerRole::Donor => &self.donor,
            PartnerRole::Acceptor => &self.acceptor,
        }
    }

    /// Returns `true` if either partner atom is the terminal carboxyl oxygen.
    pub fn involves_terminal_oxygen(&self) -> bool {
        self.donor.atom_name == TERMINAL_OXYGEN_ATOM_NAME
            || self.acceptor.atom_name == TERMINAL_OXYGEN_ATOM_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_type_parses_all_category_pairs() {
        assert_eq!("SS".parse::<BondType>(), Ok(BondType::SIDE_CHAIN_PAIR));
        assert_eq!(
            "MH".parse::<BondType>(),
            Ok(BondType {
                donor: BondCategory::MainChain,
                acceptor: BondCategory::Hetero
            })
        );
        assert_eq!("MS".parse::<BondType>().unwrap().to_string(), "MS");
    }

    #[test]
    fn bond_type_rejects_unknown_codes() {
        assert!("XS".parse::<BondType>().is_err());
        assert!("S".parse::<BondType>().is_err());
        assert!("SSS".parse::<BondType>().is_err());
        assert!("".parse::<BondType>().is_err());
    }

    #[test]
    fn from_atom_specifiers_synthesizes_side_chain_bond() {
        let bond = HBond::from_atom_specifiers("A0012 .CA", "A0015 .CB").unwrap();

        assert_eq!(bond.bond_type, BondType::SIDE_CHAIN_PAIR);
        assert_eq!(bond.donor.atom_name, "CA");
        assert_eq!(bond.acceptor.atom_name, "CB");
        assert_eq!(bond.donor.residue, ResidueKey::new('A', 12, ' '));
        assert_eq!(bond.acceptor.residue, ResidueKey::new('A', 15, ' '));
        assert_eq!(bond.donor.residue_spec, "A0012 ");
        assert!(bond.donor_hydrogen.is_none());
    }

    #[test]
    fn from_atom_specifier_uppercases_input() {
        let partner = HBondPartner::from_atom_specifier("b27a.og1").unwrap();
        assert_eq!(partner.residue, ResidueKey::new('B', 27, 'A'));
        assert_eq!(partner.atom_name, "OG1");
    }

    #[test]
    fn from_atom_specifier_rejects_malformed_input() {
        assert!(matches!(
            HBondPartner::from_atom_specifier("A12"),
            Err(ParseAtomSpecifierError::MissingSeparator(_))
        ));
        assert!(matches!(
            HBondPartner::from_atom_specifier("A12."),
            Err(ParseAtomSpecifierError::EmptyAtomName(_))
        ));
        assert!(matches!(
            HBondPartner::from_atom_specifier("XYZ.CA"),
            Err(ParseAtomSpecifierError::Residue(_))
        ));
    }

    #[test]
    fn involves_terminal_oxygen_checks_both_partners() {
        let mut bond = HBond::from_atom_specifiers("A1.OG", "A2.OD1").unwrap();
        assert!(!bond.involves_terminal_oxygen());
        bond.acceptor.atom_name = "OXT".to_string();
        assert!(bond.involves_terminal_oxygen());
    }
}
