//! User-facing progress and advisory warnings
//!
//! The session manager never prints directly. Progress lines and advisory
//! failures (fetch, fast-forward, post-removal branch delete) go through a
//! `Reporter`, so tests can assert on them without capturing process output.

use std::sync::Mutex;

/// Sink for progress messages and non-fatal warnings
pub trait Reporter: Send + Sync {
    /// A step of a workflow is starting or has finished
    fn progress(&self, message: &str);

    /// Something failed but the operation carries on
    fn warn(&self, message: &str);
}

/// Reporter writing progress to stdout and warnings to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn progress(&self, message: &str) {
        println!("{}", message);
    }

    fn warn(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }
}

/// Reporter that keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    progress: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress messages received so far
    pub fn progress_messages(&self) -> Vec<String> {
        self.progress.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Warnings received so far
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Reporter for RecordingReporter {
    fn progress(&self, message: &str) {
        if let Ok(mut messages) = self.progress.lock() {
            messages.push(message.to_string());
        }
    }

    fn warn(&self, message: &str) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(message.to_string());
        }
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn progress(&self, message: &str) {
        (**self).progress(message)
    }

    fn warn(&self, message: &str) {
        (**self).warn(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter() {
        let reporter = RecordingReporter::new();
        reporter.progress("Fetching from origin...");
        reporter.warn("failed to fetch from origin");

        let by_ref: &dyn Reporter = &reporter;
        by_ref.warn("second");

        assert_eq!(reporter.progress_messages(), vec!["Fetching from origin..."]);
        assert_eq!(
            reporter.warnings(),
            vec!["failed to fetch from origin", "second"]
        );
    }
}
