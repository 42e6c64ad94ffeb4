use std::io::Write;

use crate::operation::Operation;

/// Status line shown while waiting: `<message>...done.`
///
/// Writes go to stderr by default so stdout only carries command output.
pub struct ProgressTracker {
    out: Option<Box<dyn Write + Send>>,
    polls: u32,
}

impl ProgressTracker {
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    pub fn quiet() -> Self {
        Self {
            out: None,
            polls: 0,
        }
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Some(out),
            polls: 0,
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn start(&mut self, message: &str) {
        self.write(&format!("{}...", message));
    }

    pub fn tick(&mut self, operation: &Operation) {
        self.polls += 1;
        tracing::debug!(
            operation = %operation.name,
            attempt = self.polls,
            done = operation.done,
            "operation polled"
        );
    }

    pub fn finish(&mut self, succeeded: bool) {
        self.write(if succeeded { "done.\n" } else { "failed.\n" });
    }

    /// One-off status line, e.g. `Request issued for: [...]`.
    pub fn status(&mut self, line: &str) {
        self.write(&format!("{}\n", line));
    }

    fn write(&mut self, text: &str) {
        if let Some(out) = self.out.as_mut() {
            // NOTE: Status output is best-effort; a closed stderr must not fail the wait
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("enabled", &self.out.is_some())
            .field("polls", &self.polls)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_success_line() {
        let buf = SharedBuf::default();
        let mut tracker = ProgressTracker::with_writer(Box::new(buf.clone()));
        tracker.start("Waiting for operation [operations/o] to complete");
        tracker.finish(true);
        assert_eq!(
            buf.contents(),
            "Waiting for operation [operations/o] to complete...done.\n"
        );
    }

    #[test]
    fn test_failure_line() {
        let buf = SharedBuf::default();
        let mut tracker = ProgressTracker::with_writer(Box::new(buf.clone()));
        tracker.start("Deleting");
        tracker.finish(false);
        assert_eq!(buf.contents(), "Deleting...failed.\n");
    }

    #[test]
    fn test_ticks_counted_but_not_printed() {
        let buf = SharedBuf::default();
        let mut tracker = ProgressTracker::with_writer(Box::new(buf.clone()));
        let op = Operation::default();
        tracker.tick(&op);
        tracker.tick(&op);
        assert_eq!(tracker.polls(), 2);
        assert!(buf.contents().is_empty());
    }

    #[test]
    fn test_quiet_tracker_writes_nothing() {
        let mut tracker = ProgressTracker::quiet();
        tracker.start("Waiting");
        tracker.status("Request issued");
        tracker.finish(true);
        assert!(format!("{:?}", tracker).contains("enabled: false"));
    }
}
