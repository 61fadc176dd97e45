use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use urldispatch_core::error::FakeDispatcherError;

/// A single recorded dispatch invocation. Created on each call, never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub url: String,
    pub dispatched_at: DateTime<Utc>,
}

/// Ordered in-memory log of dispatch invocations, most-recent-last.
///
/// Appends are mutex-guarded because the IPC layer may run handlers on
/// worker threads. Entries are retained until the owning service stops or
/// the log is cleared.
#[derive(Debug, Default)]
pub struct CallRecorder {
    calls: Mutex<Vec<DispatchCall>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call stamped with the current time.
    pub fn record(&self, url: &str) {
        let call = DispatchCall {
            url: url.to_owned(),
            dispatched_at: Utc::now(),
        };
        self.lock().push(call);
    }

    /// The most recently appended entry.
    pub fn last(&self) -> Result<DispatchCall, FakeDispatcherError> {
        self.lock()
            .last()
            .cloned()
            .ok_or(FakeDispatcherError::NoCallsRecorded)
    }

    /// Snapshot of the full log in insertion order.
    pub fn calls(&self) -> Vec<DispatchCall> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Empty the log without restarting the service.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DispatchCall>> {
        // No path panics while holding the guard, so a poisoned lock
        // still holds a consistent log.
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn last_on_empty_log_fails_with_no_calls_recorded() {
        let recorder = CallRecorder::new();
        let result = recorder.last();
        assert!(
            matches!(result, Err(FakeDispatcherError::NoCallsRecorded)),
            "expected NoCallsRecorded, got {result:?}"
        );
    }

    #[test]
    fn record_then_last_returns_the_url() {
        let recorder = CallRecorder::new();
        recorder.record("http://example.com");
        assert_eq!(recorder.last().unwrap().url, "http://example.com");
    }

    #[test]
    fn most_recent_call_wins() {
        let recorder = CallRecorder::new();
        recorder.record("first://one");
        recorder.record("second://two");
        recorder.record("third://three");
        assert_eq!(recorder.last().unwrap().url, "third://three");
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn calls_preserves_insertion_order() {
        let recorder = CallRecorder::new();
        recorder.record("a://1");
        recorder.record("b://2");
        let urls: Vec<String> = recorder.calls().into_iter().map(|c| c.url).collect();
        assert_eq!(urls, vec!["a://1", "b://2"]);
    }

    #[test]
    fn clear_empties_the_log() {
        let recorder = CallRecorder::new();
        recorder.record("test://url");
        recorder.clear();
        assert!(recorder.is_empty());
        assert!(matches!(
            recorder.last(),
            Err(FakeDispatcherError::NoCallsRecorded)
        ));
    }

    #[test]
    fn timestamps_are_monotone_within_the_log() {
        let recorder = CallRecorder::new();
        recorder.record("first://call");
        recorder.record("second://call");
        let calls = recorder.calls();
        assert!(calls[0].dispatched_at <= calls[1].dispatched_at);
    }

    #[test]
    fn concurrent_appends_lose_no_calls() {
        let recorder = Arc::new(CallRecorder::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let recorder = Arc::clone(&recorder);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        recorder.record(&format!("test://{worker}/{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(recorder.len(), 800);
    }
}
