use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use smact::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Terminal view of an enumeration run: a spinner while a phase is searching, a counter bar
/// while it walks a known number of combinations, and one `✓` line per finished phase.
#[derive(Clone)]
pub struct ProgressDisplay {
    state: Arc<Mutex<DisplayState>>,
}

struct DisplayState {
    bar: ProgressBar,
    phase: Option<&'static str>,
    finished_phases: usize,
}

impl DisplayState {
    fn apply(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                debug!(phase = name, "Phase started.");
                self.phase = Some(name);
                self.bar.reset();
                self.bar.set_length(0);
                self.bar.set_style(spinner_style());
                self.bar.set_prefix(name);
                self.bar.enable_steady_tick(SPINNER_TICK);
            }
            Progress::TaskStart { total_steps } => {
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_length(total_steps);
                self.bar.set_style(counter_style());
            }
            Progress::TaskIncrement => self.bar.inc(1),
            Progress::TaskFinish => {
                if let Some(total) = self.bar.length() {
                    self.bar.set_position(total);
                }
            }
            Progress::PhaseFinish => {
                self.bar.disable_steady_tick();
                self.finished_phases += 1;
                let name = self.phase.take().unwrap_or("phase");
                self.bar.finish_with_message(format!("✓ {name}"));
            }
            Progress::Message(text) => self.bar.println(format!("  {text}")),
        }
    }
}

impl ProgressDisplay {
    /// A display drawing to stderr, or to nowhere when `hidden`.
    pub fn new(hidden: bool) -> Self {
        let target = if hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        Self {
            state: Arc::new(Mutex::new(DisplayState {
                bar,
                phase: None,
                finished_phases: 0,
            })),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);
        Box::new(move |event| match state.lock() {
            Ok(mut state) => state.apply(event),
            Err(_) => warn!("Progress display lock poisoned; dropping event."),
        })
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn counter_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<26} [{bar:32.cyan/blue}] {human_pos}/{human_len} {per_sec}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
