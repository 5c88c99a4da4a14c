//! User-visible notices.
//!
//! Every failure and every batch summary ends up here. Notices are
//! fire-and-forget; a sink must never fail the transfer that raised it.

use std::sync::Mutex;
use tracing::info;

use crate::output;

pub trait NoticeSink {
    fn show(&self, message: &str);
}

/// Prints notices to the terminal and mirrors them to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotices;

impl NoticeSink for ConsoleNotices {
    fn show(&self, message: &str) {
        info!(target: "vault_transfer::notice", "{message}");
        match message.strip_prefix("Error: ") {
            Some(rest) => output::print_error(rest),
            None => output::print_user(message),
        }
    }
}

/// Keeps every notice in memory; handy for embedding and for tests.
#[derive(Debug, Default)]
pub struct RecordedNotices {
    messages: Mutex<Vec<String>>,
}

impl RecordedNotices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl NoticeSink for RecordedNotices {
    fn show(&self, message: &str) {
        info!(target: "vault_transfer::notice", "{message}");
        if let Ok(mut m) = self.messages.lock() {
            m.push(message.to_string());
        }
    }
}
