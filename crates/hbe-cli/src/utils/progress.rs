use hbenergy::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// The line printed on stdout for each evaluated bond.
pub fn energy_line(index: usize, energy: f64) -> String {
    format!("HBond {} Energy: {:.6}", index, energy)
}

/// Drives a stderr progress bar from workflow events and prints energy lines on stdout.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
            .with_style(Self::bar_style())
            .with_message("Evaluating");
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::RunStart { total } => {
                    pb_guard.reset();
                    pb_guard.set_length(total);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                    pb_guard.set_message("Evaluating");
                }
                Progress::BondEvaluated { index, energy } => {
                    pb_guard.suspend(|| println!("{}", energy_line(index, energy)));
                    pb_guard.inc(1);
                }
                Progress::BondSkipped { .. } => {
                    pb_guard.inc(1);
                }
                Progress::BondFailed { index, message } => {
                    pb_guard.println(format!("  HBond {}: {}", index, message));
                    pb_guard.inc(1);
                }
                Progress::RunFinish => {
                    pb_guard.finish_and_clear();
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<12} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
