//! Transfer progress.
//!
//! `ProgressReporter` is a small state machine:
//! `Idle(total) -> Running(completed/total) -> Finished | Error`.
//! Each transition is pushed to a `ProgressSurface`, which only renders.
//! A reporter reaches a terminal state at most once; later calls are ignored.

use tracing::{debug, trace};

use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Files,
    Attachments,
}

impl ProgressKind {
    fn noun(self) -> &'static str {
        match self {
            ProgressKind::Files => "files",
            ProgressKind::Attachments => "attachments",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Idle { total: usize },
    Running { completed: usize, total: usize },
    Finished { completed: usize, total: usize },
    Error { completed: usize, total: usize },
}

impl ProgressState {
    pub fn completed(&self) -> usize {
        match *self {
            ProgressState::Idle { .. } => 0,
            ProgressState::Running { completed, .. }
            | ProgressState::Finished { completed, .. }
            | ProgressState::Error { completed, .. } => completed,
        }
    }

    pub fn total(&self) -> usize {
        match *self {
            ProgressState::Idle { total }
            | ProgressState::Running { total, .. }
            | ProgressState::Finished { total, .. }
            | ProgressState::Error { total, .. } => total,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressState::Finished { .. } | ProgressState::Error { .. })
    }
}

/// Icon name and label text for a state.
pub fn describe(kind: ProgressKind, state: &ProgressState) -> (&'static str, String) {
    match *state {
        ProgressState::Idle { total } => (
            "search-check",
            match kind {
                ProgressKind::Files => format!("Number of files to transfer: {total}"),
                ProgressKind::Attachments => format!("Number of attachments found to transfer: {total}"),
            },
        ),
        ProgressState::Running { completed, total } => ("hourglass", format!("Transferring: {completed}/{total}")),
        ProgressState::Finished { completed, .. } => {
            ("check", format!("Finished transferring {completed} {}.", kind.noun()))
        }
        ProgressState::Error { .. } => ("cross", "Error during transfer.".to_string()),
    }
}

/// Rendering side of a reporter.
pub trait ProgressSurface {
    fn render(&self, kind: ProgressKind, state: &ProgressState);
}

/// Renders progress as debug log lines only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSurface;

impl ProgressSurface for TracingSurface {
    fn render(&self, kind: ProgressKind, state: &ProgressState) {
        let (icon, label) = describe(kind, state);
        debug!(icon, completed = state.completed(), total = state.total(), "{label}");
    }
}

/// Prints progress lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSurface;

impl ProgressSurface for ConsoleSurface {
    fn render(&self, kind: ProgressKind, state: &ProgressState) {
        let (icon, label) = describe(kind, state);
        trace!(icon, completed = state.completed(), total = state.total(), "{label}");
        output::print_status(icon, &label);
    }
}

pub struct ProgressReporter<'a> {
    kind: ProgressKind,
    state: ProgressState,
    surface: &'a dyn ProgressSurface,
}

impl<'a> ProgressReporter<'a> {
    /// Start in `Idle` and render it.
    pub fn new(kind: ProgressKind, total: usize, surface: &'a dyn ProgressSurface) -> Self {
        let reporter = Self {
            kind,
            state: ProgressState::Idle { total },
            surface,
        };
        reporter.render();
        reporter
    }

    fn render(&self) {
        self.surface.render(self.kind, &self.state);
    }

    pub fn increment(&mut self) {
        self.state = match self.state {
            ProgressState::Idle { total } => ProgressState::Running { completed: 1, total },
            ProgressState::Running { completed, total } => ProgressState::Running {
                completed: completed + 1,
                total,
            },
            terminal => {
                debug!(state = ?terminal, "Ignoring increment after completion");
                return;
            }
        };
        self.render();
    }

    pub fn finish(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = ProgressState::Finished {
            completed: self.state.completed(),
            total: self.state.total(),
        };
        self.render();
    }

    pub fn error(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = ProgressState::Error {
            completed: self.state.completed(),
            total: self.state.total(),
        };
        self.render();
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn kind(&self) -> ProgressKind {
        self.kind
    }

    pub fn completed(&self) -> usize {
        self.state.completed()
    }

    pub fn total(&self) -> usize {
        self.state.total()
    }
}
