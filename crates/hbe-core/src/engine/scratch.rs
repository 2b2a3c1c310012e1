use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::trace;

/// The three temporary files used to evaluate one bond.
///
/// Names combine the process id with a caller-supplied tag, so concurrent runs and
/// successive bonds never collide. All files are removed when the value is dropped,
/// whether or not they were ever created.
#[derive(Debug)]
pub struct ScratchFiles {
    structure: PathBuf,
    report: PathBuf,
    control: PathBuf,
}

impl ScratchFiles {
    pub fn new(dir: &Path, tag: impl std::fmt::Display) -> Self {
        let stem = format!("{}_{}", process::id(), tag);
        Self {
            structure: dir.join(format!("{stem}.pdh")),
            report: dir.join(format!("{stem}.ec")),
            control: dir.join(format!("control.dat.{stem}")),
        }
    }

    /// The capped fragments written as a PDB file.
    pub fn structure_path(&self) -> &Path {
        &self.structure
    }

    /// The evaluator's captured standard output.
    pub fn report_path(&self) -> &Path {
        &self.report
    }

    pub fn control_path(&self) -> &Path {
        &self.control
    }

    fn paths(&self) -> [&Path; 3] {
        [&self.structure, &self.report, &self.control]
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in self.paths() {
            match fs::remove_file(path) {
                Ok(()) => trace!(path = %path.display(), "Removed scratch file."),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => trace!(path = %path.display(), error = %e, "Could not remove scratch file."),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_include_process_id_and_tag() {
        let dir = Path::new("/scratch");
        let files = ScratchFiles::new(dir, 7);
        let pid = process::id();

        assert_eq!(files.structure_path(), dir.join(format!("{pid}_7.pdh")));
        assert_eq!(files.report_path(), dir.join(format!("{pid}_7.ec")));
        assert_eq!(files.control_path(), dir.join(format!("control.dat.{pid}_7")));
    }

    #[test]
    fn drop_removes_created_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = ScratchFiles::new(dir.path(), "bond");
        let paths: Vec<PathBuf> = files.paths().iter().map(|p| p.to_path_buf()).collect();
        for path in &paths {
            fs::write(path, "x").unwrap();
        }

        drop(files);

        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[test]
    fn drop_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = ScratchFiles::new(dir.path(), 1);
        fs::write(files.report_path(), "partial").unwrap();
        let report = files.report_path().to_path_buf();

        drop(files);

        assert!(!report.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
