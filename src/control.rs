use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    #[default]
    Ready,
    Calculating,
    Paused,
    Stopped,
    Finished,
    Error,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Stopped | RunState::Finished | RunState::Error)
    }

    pub fn is_active(self) -> bool {
        matches!(self, RunState::Calculating | RunState::Paused)
    }

    pub fn label(self) -> &'static str {
        match self {
            RunState::Ready => "READY",
            RunState::Calculating => "CALCULATING",
            RunState::Paused => "PAUSED",
            RunState::Stopped => "STOPPED",
            RunState::Finished => "FINISHED",
            RunState::Error => "ERROR",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pause/stop flags shared between the front end and the worker.
#[derive(Debug, Default)]
pub struct Controls {
    paused: AtomicBool,
    stopped: AtomicBool,
}

impl Controls {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Clear both flags before a new run.
    pub fn reset(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.stopped.store(false, Ordering::SeqCst);
    }
}

/// What an observer sees of the current or last run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Status {
    pub generator: String,
    pub state: RunState,
    pub message: Option<String>,
    pub columns_done: u32,
    pub columns_total: u32,
    pub seed: Option<u32>,
    pub elapsed: Option<Duration>,
}

impl Status {
    /// `"<name> Status: <STATE>[: message]"`
    pub fn line(&self) -> String {
        let mut s = format!("{} Status: {}", self.generator, self.state);
        if let Some(m) = &self.message {
            s.push_str(": ");
            s.push_str(m);
        }
        s
    }

    pub fn progress(&self) -> f32 {
        if self.columns_total == 0 {
            return 0.0;
        }
        self.columns_done as f32 / self.columns_total as f32
    }
}

/// Shared, lock-protected [`Status`]. Cloning shares the same board.
#[derive(Clone, Debug, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<Status>>,
}

impl StatusBoard {
    pub fn new(generator: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Status {
                generator: generator.to_string(),
                ..Status::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Status> {
        // a panicked writer leaves a usable status behind
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Status {
        self.lock().clone()
    }

    pub fn state(&self) -> RunState {
        self.lock().state
    }

    pub fn set_state(&self, state: RunState) {
        let mut s = self.lock();
        if s.state != state {
            log::debug!("{}: {} -> {}", s.generator, s.state, state);
            s.state = state;
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut Status)) {
        f(&mut self.lock());
    }
}

/// Column-loop decision after a checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Handed to a generator for one run.
pub struct RunContext {
    controls: Arc<Controls>,
    status: StatusBoard,
    poll: Duration,
}

impl RunContext {
    pub fn new(controls: Arc<Controls>, status: StatusBoard) -> Self {
        Self {
            controls,
            status,
            poll: Duration::from_millis(1),
        }
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Called before each column. Holds in PAUSED while the pause flag is
    /// set, re-checking stop each round.
    pub fn checkpoint(&self) -> Flow {
        if self.controls.is_stopped() {
            return Flow::Stop;
        }
        if self.controls.is_paused() {
            self.status.set_state(RunState::Paused);
            while self.controls.is_paused() {
                if self.controls.is_stopped() {
                    return Flow::Stop;
                }
                std::thread::sleep(self.poll);
            }
            if self.controls.is_stopped() {
                return Flow::Stop;
            }
        }
        self.status.set_state(RunState::Calculating);
        Flow::Continue
    }

    pub fn column_done(&self, done: u32, total: u32) {
        self.status.update(|s| {
            s.columns_done = done;
            s.columns_total = total;
        });
    }

    pub fn report_seed(&self, seed: u32) {
        self.status.update(|s| s.seed = Some(seed));
    }
}

/// Wall time of one run.
pub struct CalcTimer(Instant);

impl CalcTimer {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}
