use crate::core::io::pdb::{PdbError, PdbFile};
use crate::core::io::traits::CoordinateFile;
use crate::core::models::atom::Atom;
use crate::core::models::hbond::{HBond, PartnerRole};
use crate::core::models::locator::next_residue_boundary;
use crate::core::models::structure::Structure;
use crate::engine::capping::TerminalCapper;
use crate::engine::config::EnergyConfig;
use crate::engine::context::StructureSource;
use crate::engine::error::EngineError;
use crate::engine::evaluator::{EnergyEvaluator, EvaluationJob, write_control_file_to_path};
use crate::engine::fragment::build_fragments;
use crate::engine::linkage::detect_link;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scratch::ScratchFiles;
use std::fs::File;
use std::io;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum BondOutcome {
    Evaluated { energy: f64 },
    /// Rejected by the configured bond filter.
    Skipped,
    Failed { reason: String },
}

/// The outcome for one bond of the listing. `index` is the 1-based position in the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct BondEnergy {
    pub index: usize,
    pub bond: HBond,
    pub outcome: BondOutcome,
}

impl BondEnergy {
    pub fn energy(&self) -> Option<f64> {
        match self.outcome {
            BondOutcome::Evaluated { energy } => Some(energy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyReport {
    pub outcomes: Vec<BondEnergy>,
}

impl EnergyReport {
    pub fn evaluated(&self) -> impl Iterator<Item = &BondEnergy> {
        self.outcomes.iter().filter(|o| o.energy().is_some())
    }

    pub fn failures(&self) -> impl Iterator<Item = &BondEnergy> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, BondOutcome::Failed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == BondOutcome::Skipped)
            .count()
    }

    /// `true` when every bond that passed the filter was evaluated.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Evaluates every bond in `bonds` against the structure.
///
/// Bonds rejected by the configured filter are recorded as skipped. A bond whose residues
/// cannot be found, or whose evaluation fails, is recorded as failed and the run moves on;
/// any other error aborts the run.
#[instrument(skip_all, name = "energy_workflow", fields(bonds = bonds.len()))]
pub fn run<E, C>(
    bonds: &[HBond],
    structure: &StructureSource,
    config: &EnergyConfig,
    evaluator: &E,
    capper: &C,
    reporter: &ProgressReporter,
) -> Result<EnergyReport, EngineError>
where
    E: EnergyEvaluator + ?Sized,
    C: TerminalCapper + ?Sized,
{
    reporter.report(Progress::RunStart {
        total: bonds.len() as u64,
    });
    info!(
        mode = %config.evaluator.mode,
        filter = ?config.bond_filter,
        "Starting hydrogen bond energy evaluation."
    );

    let mut outcomes = Vec::with_capacity(bonds.len());
    for (offset, bond) in bonds.iter().enumerate() {
        let index = offset + 1;

        let outcome = if !config.bond_filter.accepts(bond) {
            debug!(index, bond_type = %bond.bond_type, "Bond rejected by filter.");
            reporter.report(Progress::BondSkipped { index });
            BondOutcome::Skipped
        } else {
            match evaluate_bond(index, bond, structure, config, evaluator, capper) {
                Ok(energy) => {
                    reporter.report(Progress::BondEvaluated { index, energy });
                    BondOutcome::Evaluated { energy }
                }
                Err(e) if e.is_recoverable() => {
                    warn!(index, error = %e, "Bond could not be evaluated.");
                    let reason = e.to_string();
                    reporter.report(Progress::BondFailed {
                        index,
                        message: reason.clone(),
                    });
                    BondOutcome::Failed { reason }
                }
                Err(e) => return Err(e),
            }
        };

        outcomes.push(BondEnergy {
            index,
            bond: bond.clone(),
            outcome,
        });
    }

    let report = EnergyReport { outcomes };
    info!(
        evaluated = report.evaluated().count(),
        failed = report.failures().count(),
        skipped = report.skipped_count(),
        "Hydrogen bond energy evaluation finished."
    );
    reporter.report(Progress::RunFinish);
    Ok(report)
}

/// Computes the interaction energy of a single bond, ignoring the bond filter.
///
/// `index` tags the scratch files, so it must be unique among evaluations sharing a
/// scratch directory.
#[instrument(
    skip(bond, structure, config, evaluator, capper),
    fields(donor = %bond.donor.residue, acceptor = %bond.acceptor.residue)
)]
pub fn evaluate_bond<E, C>(
    index: usize,
    bond: &HBond,
    structure: &StructureSource,
    config: &EnergyConfig,
    evaluator: &E,
    capper: &C,
) -> Result<f64, EngineError>
where
    E: EnergyEvaluator + ?Sized,
    C: TerminalCapper + ?Sized,
{
    let structure = structure.get()?;
    let atoms = structure.atoms();

    let donor_start = locate(structure, bond, PartnerRole::Donor)?;
    let acceptor_start = locate(structure, bond, PartnerRole::Acceptor)?;
    let donor_atoms = &atoms[donor_start..next_residue_boundary(atoms, donor_start)];
    let acceptor_atoms = &atoms[acceptor_start..next_residue_boundary(atoms, acceptor_start)];

    let linkage = detect_link(donor_atoms, acceptor_atoms);
    debug!(?linkage, "Detected residue linkage.");
    let fragments = build_fragments(atoms, donor_start, acceptor_start, linkage, capper);

    let scratch = ScratchFiles::new(&config.scratch_dir, index);
    let fragment_atoms: Vec<Atom> = fragments.atoms().cloned().collect();
    PdbFile::write_atoms_to_path(&fragment_atoms, scratch.structure_path()).map_err(|e| {
        EngineError::Scratch {
            path: scratch.structure_path().to_path_buf(),
            source: match e {
                PdbError::Io(source) => source,
                other => io::Error::other(other),
            },
        }
    })?;

    let job = EvaluationJob {
        structure_path: scratch.structure_path(),
        control_path: scratch.control_path(),
        report_path: scratch.report_path(),
        mode: config.evaluator.mode,
        invocation: config.evaluator.invocation,
    };
    if job.uses_control_file() {
        write_control_file_to_path(job.control_path, job.structure_path, job.mode).map_err(
            |source| EngineError::Scratch {
                path: job.control_path.to_path_buf(),
                source,
            },
        )?;
    }

    File::create(job.report_path).map_err(|source| EngineError::Scratch {
        path: job.report_path.to_path_buf(),
        source,
    })?;

    let energy = evaluator.evaluate(&job)?;
    debug!(energy, "Bond evaluated.");
    Ok(energy)
}

fn locate(structure: &Structure, bond: &HBond, role: PartnerRole) -> Result<usize, EngineError> {
    let partner = bond.partner(role);
    structure
        .find_residue(&partner.residue)
        .ok_or_else(|| EngineError::ResidueNotFound {
            role,
            spec: partner.residue_spec.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::ResidueKey;
    use crate::engine::capping::CharmmCapper;
    use crate::engine::config::{BondFilter, EnergyConfigBuilder};
    use crate::engine::evaluator::{EvaluationMode, EvaluatorError, InvocationStyle};
    use nalgebra::Point3;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Call {
        chains: Vec<char>,
        residue_numbers: Vec<isize>,
        control: Option<String>,
    }

    /// Reads back what the pipeline wrote and returns a canned energy.
    struct RecordingEvaluator {
        energy: f64,
        fail_on_call: Option<usize>,
        calls: RefCell<Vec<Call>>,
    }

    impl RecordingEvaluator {
        fn returning(energy: f64) -> Self {
            Self {
                energy,
                fail_on_call: None,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl EnergyEvaluator for RecordingEvaluator {
        fn evaluate(&self, job: &EvaluationJob) -> Result<f64, EvaluatorError> {
            let structure = PdbFile::read_from_path(job.structure_path).unwrap();
            let control = job
                .uses_control_file()
                .then(|| fs::read_to_string(job.control_path).unwrap());
            let mut calls = self.calls.borrow_mut();
            calls.push(Call {
                chains: structure.atoms().iter().map(|a| a.chain_id).collect(),
                residue_numbers: structure.atoms().iter().map(|a| a.residue_number).collect(),
                control,
            });
            if self.fail_on_call == Some(calls.len()) {
                return Err(EvaluatorError::Timeout {
                    timeout: Duration::from_secs(1),
                });
            }
            Ok(self.energy)
        }
    }

    fn add_residue(atoms: &mut Vec<Atom>, name: &str, number: isize, layout: &[(&str, [f64; 3])]) {
        let key = ResidueKey::new('A', number, ' ');
        for (atom_name, [x, y, z]) in layout {
            atoms.push(Atom::new(atom_name, name, key, Point3::new(*x, *y, *z)));
        }
    }

    fn structure() -> Structure {
        let mut atoms = Vec::new();
        add_residue(
            &mut atoms,
            "SER",
            10,
            &[
                ("N", [0.0, 0.0, 0.0]),
                ("CA", [1.46, 0.0, 0.0]),
                ("C", [2.0, 1.42, 0.0]),
                ("O", [1.3, 2.4, 0.0]),
                ("CB", [2.0, -0.8, 1.2]),
                ("OG", [3.4, -0.8, 1.2]),
            ],
        );
        add_residue(
            &mut atoms,
            "GLY",
            11,
            &[
                ("N", [3.3, 1.6, 0.0]),
                ("CA", [4.0, 2.8, 0.0]),
                ("C", [5.5, 2.8, 0.0]),
                ("O", [6.1, 3.8, 0.0]),
            ],
        );
        add_residue(
            &mut atoms,
            "ASP",
            20,
            &[
                ("N", [20.0, 0.0, 0.0]),
                ("CA", [21.46, 0.0, 0.0]),
                ("C", [22.0, 1.42, 0.0]),
                ("O", [21.3, 2.4, 0.0]),
                ("CB", [22.0, -0.8, 1.2]),
                ("CG", [23.4, -0.8, 1.2]),
                ("OD1", [24.0, 0.2, 1.2]),
                ("OD2", [24.0, -1.8, 1.2]),
            ],
        );
        Structure::from_atoms(atoms)
    }

    fn config(scratch: &Path, filter: BondFilter) -> EnergyConfig {
        EnergyConfigBuilder::new()
            .program("ecalc".into())
            .scratch_dir(scratch.to_path_buf())
            .bond_filter(filter)
            .build()
            .unwrap()
    }

    fn scratch_is_empty(dir: &TempDir) -> bool {
        fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    #[test]
    fn single_side_chain_bond_yields_one_energy() {
        let dir = tempfile::tempdir().unwrap();
        let bonds = vec![HBond::from_atom_specifiers("A10.OG", "A20.OD1").unwrap()];
        let evaluator = RecordingEvaluator::returning(-2.5);

        let report = run(
            &bonds,
            &StructureSource::from_structure(structure()),
            &config(dir.path(), BondFilter::SideChainOnly),
            &evaluator,
            &CharmmCapper,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(report.is_success());
        let evaluated: Vec<_> = report.evaluated().collect();
        assert_eq!(evaluated.len(), 1);
        assert_eq!(evaluated[0].index, 1);
        assert_eq!(evaluated[0].energy(), Some(-2.5));

        let calls = evaluator.calls.borrow();
        let chains: BTreeSet<char> = calls[0].chains.iter().copied().collect();
        assert_eq!(chains, BTreeSet::from(['A', 'D']));
        assert_eq!(calls[0].chains.first(), Some(&'D'));
        assert_eq!(calls[0].chains.last(), Some(&'A'));
        assert!(calls[0].control.as_deref().unwrap().starts_with("PDBFILE "));
        assert!(scratch_is_empty(&dir));
    }

    #[test]
    fn missing_residue_is_recorded_and_yields_no_energy() {
        let dir = tempfile::tempdir().unwrap();
        let bonds = vec![HBond::from_atom_specifiers("A10.OG", "A99.OD1").unwrap()];
        let evaluator = RecordingEvaluator::returning(-1.0);

        let report = run(
            &bonds,
            &StructureSource::from_structure(structure()),
            &config(dir.path(), BondFilter::SideChainOnly),
            &evaluator,
            &CharmmCapper,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.evaluated().count(), 0);
        match &report.outcomes[0].outcome {
            BondOutcome::Failed { reason } => assert!(reason.contains("Acceptor residue A99")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(evaluator.calls.borrow().is_empty());
        assert!(scratch_is_empty(&dir));
    }

    #[test]
    fn peptide_bonded_residues_are_fused_into_one_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let mut bond = HBond::from_atom_specifiers("A11.N", "A10.O").unwrap();
        bond.bond_type = "MM".parse().unwrap();
        let evaluator = RecordingEvaluator::returning(0.75);

        let report = run(
            &[bond],
            &StructureSource::from_structure(structure()),
            &config(dir.path(), BondFilter::All),
            &evaluator,
            &CharmmCapper,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(report.is_success());
        let calls = evaluator.calls.borrow();
        assert!(calls[0].chains.iter().all(|&c| c == 'X'));
        assert_eq!(calls[0].residue_numbers.first(), Some(&10));
        assert_eq!(calls[0].residue_numbers.last(), Some(&11));
    }

    #[test]
    fn filtered_bonds_are_skipped_without_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let mut main_chain = HBond::from_atom_specifiers("A11.N", "A10.O").unwrap();
        main_chain.bond_type = "MM".parse().unwrap();
        let terminal = HBond::from_atom_specifiers("A10.OG", "A20.OXT").unwrap();
        let evaluator = RecordingEvaluator::returning(1.0);

        let report = run(
            &[main_chain, terminal],
            &StructureSource::from_structure(structure()),
            &config(dir.path(), BondFilter::SideChainOnly),
            &evaluator,
            &CharmmCapper,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(report.skipped_count(), 2);
        assert!(report.is_success());
        assert!(evaluator.calls.borrow().is_empty());
    }

    #[test]
    fn evaluator_failure_is_recorded_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let bond = HBond::from_atom_specifiers("A10.OG", "A20.OD1").unwrap();
        let evaluator = RecordingEvaluator {
            energy: -3.0,
            fail_on_call: Some(1),
            calls: RefCell::new(Vec::new()),
        };
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(format!("{:?}", event));
        }));

        let report = run(
            &[bond.clone(), bond],
            &StructureSource::from_structure(structure()),
            &config(dir.path(), BondFilter::SideChainOnly),
            &evaluator,
            &CharmmCapper,
            &reporter,
        )
        .unwrap();
        drop(reporter);

        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.evaluated().map(|b| b.index).collect::<Vec<_>>(), vec![2]);
        assert!(scratch_is_empty(&dir));

        let events = events.into_inner().unwrap();
        assert!(events[0].starts_with("RunStart"));
        assert!(events[1].starts_with("BondFailed"));
        assert!(events[2].starts_with("BondEvaluated"));
        assert_eq!(events[3], "RunFinish");
    }

    #[test]
    fn unreadable_structure_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let bonds = vec![HBond::from_atom_specifiers("A10.OG", "A20.OD1").unwrap()];

        let result = run(
            &bonds,
            &StructureSource::from_path(dir.path().join("absent.pdb")),
            &config(dir.path(), BondFilter::SideChainOnly),
            &RecordingEvaluator::returning(0.0),
            &CharmmCapper,
            &ProgressReporter::new(),
        );

        assert!(matches!(result, Err(EngineError::StructureLoad { .. })));
    }

    #[test]
    fn uncreatable_report_file_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(format!("{}_1.ec", std::process::id()))).unwrap();
        let bonds = vec![HBond::from_atom_specifiers("A10.OG", "A20.OD1").unwrap()];
        let evaluator = RecordingEvaluator::returning(-1.0);

        let result = run(
            &bonds,
            &StructureSource::from_structure(structure()),
            &config(dir.path(), BondFilter::SideChainOnly),
            &evaluator,
            &CharmmCapper,
            &ProgressReporter::new(),
        );

        assert!(matches!(result, Err(EngineError::Scratch { path, .. }) if path.ends_with(format!("{}_1.ec", std::process::id()))));
        assert!(evaluator.calls.borrow().is_empty());
    }

    #[test]
    fn evaluate_bond_honors_direct_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), BondFilter::SideChainOnly);
        config.evaluator.invocation = InvocationStyle::Direct;
        let bond = HBond::from_atom_specifiers("a10.og", "a20.od1").unwrap();
        let evaluator = RecordingEvaluator::returning(-0.5);

        let energy = evaluate_bond(
            1,
            &bond,
            &StructureSource::from_structure(structure()),
            &config,
            &evaluator,
            &CharmmCapper,
        )
        .unwrap();

        assert_eq!(energy, -0.5);
        assert!(evaluator.calls.borrow()[0].control.is_none());

        config.evaluator.mode = EvaluationMode::HBondOnly;
        evaluate_bond(
            2,
            &bond,
            &StructureSource::from_structure(structure()),
            &config,
            &evaluator,
            &CharmmCapper,
        )
        .unwrap();
        let calls = evaluator.calls.borrow();
        assert!(calls[1].control.as_deref().unwrap().ends_with("POTENTIAL\nHBONDS\nEND\n"));
    }
}
