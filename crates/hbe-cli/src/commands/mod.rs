pub mod batch;
pub mod pair;
mod report;

use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use hbenergy::core::models::hbond::HBond;
use hbenergy::engine::capping::CharmmCapper;
use hbenergy::engine::config::EnergyConfig;
use hbenergy::engine::context::StructureSource;
use hbenergy::engine::evaluator::ExternalEvaluator;
use hbenergy::engine::progress::ProgressReporter;
use hbenergy::workflows;
use std::path::Path;
use tracing::info;

/// Evaluates `bonds` against the structure at `structure_path`, printing one energy line
/// per evaluated bond. Fails when any attempted bond could not be evaluated.
fn evaluate_bonds(
    bonds: &[HBond],
    structure_path: &Path,
    config: &EnergyConfig,
    csv_path: Option<&Path>,
) -> Result<()> {
    let structure = StructureSource::from_path(structure_path)
        .with_hydrogen_name_fix(config.fix_hydrogen_names);
    let evaluator = ExternalEvaluator::from(&config.evaluator);
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = workflows::energy::run(
        bonds,
        &structure,
        config,
        &evaluator,
        &CharmmCapper,
        &reporter,
    )?;

    if let Some(path) = csv_path {
        report::write_csv_to_path(&report, path).map_err(|e| CliError::Other(e.into()))?;
        info!("Wrote per-bond results to {}", path.display());
    }

    let failed = report.failures().count();
    if failed > 0 {
        return Err(CliError::BondsFailed {
            failed,
            attempted: failed + report.evaluated().count(),
        });
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use hbenergy::engine::config::EnergyConfigBuilder;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    const PDB: &str = "\
ATOM      1  N   SER A  12      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  SER A  12      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  C   SER A  12      13.149   5.828  -5.143  1.00  0.00           C
ATOM      4  O   SER A  12      13.747   5.396  -6.126  1.00  0.00           O
ATOM      5  OG  SER A  12      11.398   7.370  -4.573  1.00  0.00           O
ATOM      6  N   ASP A  15      16.104   9.134  -1.504  1.00  0.00           N
ATOM      7  CA  ASP A  15      16.639   9.071  -0.147  1.00  0.00           C
ATOM      8  C   ASP A  15      18.149   8.828  -0.143  1.00  0.00           C
ATOM      9  O   ASP A  15      18.747   8.396  -1.126  1.00  0.00           O
ATOM     10  OD1 ASP A  15      14.398   8.370  -2.573  1.00  0.00           O
END
";

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new(evaluator_body: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("input.pdb"), PDB).unwrap();
            let program = dir.path().join("ecalc.sh");
            fs::write(&program, format!("#!/bin/sh\n{}\n", evaluator_body)).unwrap();
            fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
            fs::create_dir(dir.path().join("scratch")).unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn config(&self) -> EnergyConfig {
            EnergyConfigBuilder::new()
                .program(self.path("ecalc.sh"))
                .scratch_dir(self.path("scratch"))
                .build()
                .unwrap()
        }
    }

    #[test]
    #[serial]
    fn evaluates_bonds_and_writes_csv() {
        let fixture = Fixture::new("echo ECalc\necho \"Total energy of system: -4.5\"");
        let bond = HBond::from_atom_specifiers("A12.OG", "A15.OD1").unwrap();
        let csv_path = fixture.path("out.csv");

        evaluate_bonds(
            &[bond],
            &fixture.path("input.pdb"),
            &fixture.config(),
            Some(&csv_path),
        )
        .unwrap();

        let csv = fs::read_to_string(&csv_path).unwrap();
        assert!(csv.contains("1,A12.OG,A15.OD1,SS,evaluated,-4.5"));
        assert_eq!(fs::read_dir(fixture.path("scratch")).unwrap().count(), 0);
    }

    #[test]
    #[serial]
    fn missing_residue_fails_the_run() {
        let fixture = Fixture::new("echo ECalc\necho \"Total energy of system: -4.5\"");
        let bond = HBond::from_atom_specifiers("A12.OG", "A99.OD1").unwrap();

        let result = evaluate_bonds(&[bond], &fixture.path("input.pdb"), &fixture.config(), None);
        assert!(matches!(
            result,
            Err(CliError::BondsFailed {
                failed: 1,
                attempted: 1
            })
        ));
    }

    #[test]
    #[serial]
    fn unreadable_structure_is_a_core_error() {
        let fixture = Fixture::new("exit 0");
        let bond = HBond::from_atom_specifiers("A12.OG", "A15.OD1").unwrap();

        let result = evaluate_bonds(&[bond], &fixture.path("absent.pdb"), &fixture.config(), None);
        assert!(matches!(result, Err(CliError::Core(_))));
    }
}
