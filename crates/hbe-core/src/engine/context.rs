use super::error::EngineError;
use crate::core::io::pdb::{PdbFile, fix_hydrogen_names};
use crate::core::io::traits::CoordinateFile;
use crate::core::models::structure::Structure;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use tracing::info;

/// The structure a run evaluates bonds against.
///
/// A file-backed source is read on first use and at most once; later calls return the
/// same structure. Nothing is read if the run never needs it.
#[derive(Debug)]
pub struct StructureSource {
    path: Option<PathBuf>,
    fix_hydrogen_names: bool,
    structure: OnceCell<Structure>,
}

impl StructureSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            fix_hydrogen_names: false,
            structure: OnceCell::new(),
        }
    }

    pub fn from_structure(structure: Structure) -> Self {
        Self {
            path: None,
            fix_hydrogen_names: false,
            structure: OnceCell::from(structure),
        }
    }

    /// Rewrites hydrogen names with [`fix_hydrogen_names`] when the structure is loaded.
    pub fn with_hydrogen_name_fix(mut self, enabled: bool) -> Self {
        self.fix_hydrogen_names = enabled;
        if enabled {
            if let Some(structure) = self.structure.get_mut() {
                fix_hydrogen_names(structure);
            }
        }
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.structure.get().is_some()
    }

    pub fn get(&self) -> Result<&Structure, EngineError> {
        if let Some(structure) = self.structure.get() {
            return Ok(structure);
        }
        let loaded = self.load()?;
        Ok(self.structure.get_or_init(|| loaded))
    }

    fn load(&self) -> Result<Structure, EngineError> {
        let path = self.path.as_deref().unwrap_or(Path::new(""));
        let mut structure =
            PdbFile::read_from_path(path).map_err(|source| EngineError::StructureLoad {
                path: path.to_path_buf(),
                source,
            })?;
        if self.fix_hydrogen_names {
            fix_hydrogen_names(&mut structure);
        }
        info!(
            path = %path.display(),
            atoms = structure.len(),
            residues = structure.residue_count(),
            "Loaded structure."
        );
        Ok(structure)
    }
}
