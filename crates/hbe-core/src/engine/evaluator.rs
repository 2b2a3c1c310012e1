use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Default time allowed for one evaluator invocation.
pub const DEFAULT_EVALUATOR_TIMEOUT: Duration = Duration::from_secs(300);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What the external energy program is asked to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Total interaction energy of the fragments as given.
    #[default]
    SinglePoint,
    /// Energy after the program has relaxed the fragments.
    Relax,
    /// Hydrogen-bond potential term only.
    HBondOnly,
}

/// How the external program receives its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvocationStyle {
    /// `program <control file>`.
    #[default]
    ControlFile,
    /// `program -p <pdb file>`; only honored for [`EvaluationMode::SinglePoint`].
    Direct,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseEvaluationOptionError {
    kind: &'static str,
    value: String,
}

impl FromStr for EvaluationMode {
    type Err = ParseEvaluationOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single-point" | "singlepoint" => Ok(Self::SinglePoint),
            "relax" => Ok(Self::Relax),
            "hbond-only" | "hbonds-only" | "hbonds" => Ok(Self::HBondOnly),
            _ => Err(ParseEvaluationOptionError {
                kind: "evaluation mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SinglePoint => "single-point",
            Self::Relax => "relax",
            Self::HBondOnly => "hbond-only",
        };
        f.write_str(name)
    }
}

impl FromStr for InvocationStyle {
    type Err = ParseEvaluationOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "control-file" | "control" => Ok(Self::ControlFile),
            "direct" => Ok(Self::Direct),
            _ => Err(ParseEvaluationOptionError {
                kind: "invocation style",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for InvocationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlFile => f.write_str("control-file"),
            Self::Direct => f.write_str("direct"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Failed to start evaluator '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Evaluator '{program}' failed with {status}")]
    ExitStatus { program: String, status: ExitStatus },
    #[error("Evaluator did not finish within {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("Evaluator produced no report at '{}'", .path.display())]
    MissingOutput { path: PathBuf },
    #[error("Malformed evaluator report '{}': {reason}", .path.display())]
    MalformedOutput { path: PathBuf, reason: String },
    #[error("Failed to create evaluator report '{}': {source}", .path.display())]
    ReportFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error while running evaluator: {0}")]
    Io(#[from] io::Error),
}

impl EvaluatorError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::Spawn { .. } | Self::ReportFile { .. })
    }

    /// Whether the error comes from the scratch report file rather than the evaluator.
    pub fn is_scratch_failure(&self) -> bool {
        matches!(self, Self::ReportFile { .. })
    }
}

/// The files and options for evaluating one pair of fragments.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationJob<'a> {
    pub structure_path: &'a Path,
    pub control_path: &'a Path,
    pub report_path: &'a Path,
    pub mode: EvaluationMode,
    pub invocation: InvocationStyle,
}

impl EvaluationJob<'_> {
    /// The invocation style actually used. Only single-point evaluations may bypass the
    /// control file.
    pub fn effective_invocation(&self) -> InvocationStyle {
        match self.mode {
            EvaluationMode::SinglePoint => self.invocation,
            _ => InvocationStyle::ControlFile,
        }
    }

    pub fn uses_control_file(&self) -> bool {
        self.effective_invocation() == InvocationStyle::ControlFile
    }
}

/// Computes the interaction energy of the fragments described by a job.
pub trait EnergyEvaluator {
    fn evaluate(&self, job: &EvaluationJob) -> Result<f64, EvaluatorError>;
}

/// Writes the control file that tells the energy program what to compute.
pub fn write_control_file(
    writer: &mut impl Write,
    structure_path: &Path,
    mode: EvaluationMode,
) -> io::Result<()> {
    writeln!(writer, "PDBFILE {}", structure_path.display())?;
    writeln!(writer, "IGNTER")?;
    match mode {
        EvaluationMode::SinglePoint => {}
        EvaluationMode::Relax => writeln!(writer, "RELAX")?,
        EvaluationMode::HBondOnly => {
            writeln!(writer, "POTENTIAL")?;
            writeln!(writer, "HBONDS")?;
            writeln!(writer, "END")?;
        }
    }
    Ok(())
}

pub fn write_control_file_to_path(
    path: &Path,
    structure_path: &Path,
    mode: EvaluationMode,
) -> io::Result<()> {
    let mut file = File::create(path)?;
    write_control_file(&mut file, structure_path, mode)?;
    file.flush()
}

/// Extracts the energy from an evaluator report: the fifth whitespace-separated token of
/// the second line.
pub fn parse_energy_report(path: &Path) -> Result<f64, EvaluatorError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => EvaluatorError::MissingOutput {
            path: path.to_path_buf(),
        },
        _ => EvaluatorError::Io(e),
    })?;
    let malformed = |reason: &str| EvaluatorError::MalformedOutput {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let mut lines = BufReader::new(file).lines();
    lines.next().transpose()?;
    let energy_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| malformed("report has fewer than two lines"))?;
    let token = energy_line
        .split_whitespace()
        .nth(4)
        .ok_or_else(|| malformed("energy line has fewer than five fields"))?;
    token
        .parse()
        .map_err(|_| malformed(&format!("'{}' is not a number", token)))
}

/// Runs an external energy program as a child process, without a shell.
#[derive(Debug, Clone)]
pub struct ExternalEvaluator {
    program: PathBuf,
    timeout: Duration,
    max_retries: u32,
}

impl ExternalEvaluator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_EVALUATOR_TIMEOUT,
            max_retries: 0,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    fn command(&self, job: &EvaluationJob) -> Command {
        let mut command = Command::new(&self.program);
        match job.effective_invocation() {
            InvocationStyle::ControlFile => command.arg(job.control_path),
            InvocationStyle::Direct => command.arg("-p").arg(job.structure_path),
        };
        command
    }

    fn run_once(&self, job: &EvaluationJob) -> Result<f64, EvaluatorError> {
        let report =
            File::create(job.report_path).map_err(|source| EvaluatorError::ReportFile {
                path: job.report_path.to_path_buf(),
                source,
            })?;
        let mut command = self.command(job);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::from(report))
            .stderr(Stdio::inherit());
        debug!(command = ?command, "Spawning evaluator.");

        let mut child = command.spawn().map_err(|source| EvaluatorError::Spawn {
            program: self.program_name(),
            source,
        })?;
        let status = wait_with_deadline(&mut child, self.timeout)?;
        if !status.success() {
            return Err(EvaluatorError::ExitStatus {
                program: self.program_name(),
                status,
            });
        }

        parse_energy_report(job.report_path)
    }
}

impl EnergyEvaluator for ExternalEvaluator {
    fn evaluate(&self, job: &EvaluationJob) -> Result<f64, EvaluatorError> {
        let mut attempt = 0;
        loop {
            match self.run_once(job) {
                Ok(energy) => return Ok(energy),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, max_retries = self.max_retries, error = %e, "Retrying evaluator.");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, EvaluatorError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            if let Err(e) = child.kill() {
                warn!(error = %e, "Failed to kill timed-out evaluator.");
            }
            child.wait()?;
            return Err(EvaluatorError::Timeout { timeout });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
