use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The placeholder used by residue specifiers for a blank chain or insertion code.
pub const BLANK_PLACEHOLDER: char = '-';

/// Identifies one residue of a structure by chain, sequence number and insertion code.
///
/// Equality is exact on all three fields. Blank chains and insertion codes are stored as
/// a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueKey {
    pub chain_id: char,
    pub residue_number: isize,
    pub insertion_code: char,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseResidueKeyError {
    #[error("Residue specifier is empty")]
    Empty,
    #[error("Residue specifier '{0}' does not contain a valid residue number")]
    InvalidNumber(String),
    #[error("Residue specifier '{0}' has unexpected trailing characters")]
    TrailingCharacters(String),
}

impl ResidueKey {
    /// Creates a key, normalizing the `-` placeholder to a space.
    pub fn new(chain_id: char, residue_number: isize, insertion_code: char) -> Self {
        Self {
            chain_id: normalize_blank(chain_id),
            residue_number,
            insertion_code: normalize_blank(insertion_code),
        }
    }
}

fn normalize_blank(c: char) -> char {
    if c == BLANK_PLACEHOLDER { ' ' } else { c }
}

impl FromStr for ResidueKey {
    type Err = ParseResidueKeyError;

    /// Parses a residue specifier.
    ///
    /// Two layouts are accepted. The six-column HBPlus layout `CNNNNI` (chain, four number
    /// columns, insertion code) is tried first, so that `A0012-`, `A  12 ` and `-0034A`
    /// parse positionally. Anything else is read as `[chain]NNNN[insertion]`, where the
    /// chain is any leading non-digit character and the insertion code is at most one
    /// trailing character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseResidueKeyError::Empty);
        }
        if let Some(key) = parse_fixed_width(s) {
            return Ok(key);
        }
        parse_flexible(s.trim())
    }
}

fn parse_fixed_width(s: &str) -> Option<ResidueKey> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 6 {
        return None;
    }
    let number: String = chars[1..5].iter().collect();
    let number = number.trim().parse::<isize>().ok()?;
    Some(ResidueKey::new(chars[0], number, chars[5]))
}

fn parse_flexible(s: &str) -> Result<ResidueKey, ParseResidueKeyError> {
    let chars: Vec<char> = s.chars().collect();
    let mut pos = 0;

    let starts_number = |c: char| c.is_ascii_digit() || c == '-' || c == '+';
    let mut chain_id = ' ';
    if !chars[0].is_ascii_digit() && chars.get(1).is_some_and(|&c| starts_number(c)) {
        chain_id = chars[0];
        pos = 1;
    }

    let number_start = pos;
    if chars.get(pos).is_some_and(|&c| c == '-' || c == '+') {
        pos += 1;
    }
    while chars.get(pos).is_some_and(|c| c.is_ascii_digit()) {
        pos += 1;
    }
    let number: String = chars[number_start..pos].iter().collect();
    let residue_number = number
        .parse::<isize>()
        .map_err(|_| ParseResidueKeyError::InvalidNumber(s.to_string()))?;

    let insertion_code = match &chars[pos..] {
        [] => ' ',
        [c] => *c,
        _ => return Err(ParseResidueKeyError::TrailingCharacters(s.to_string())),
    };

    Ok(ResidueKey::new(chain_id, residue_number, insertion_code))
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chain_id != ' ' {
            write!(f, "{}", self.chain_id)?;
        }
        write!(f, "{}", self.residue_number)?;
        if self.insertion_code != ' ' {
            write!(f, "{}", self.insertion_code)?;
        }
        Ok(())
    }
}
