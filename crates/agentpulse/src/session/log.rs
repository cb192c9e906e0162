//! Bounded per-session activity log.

use std::collections::VecDeque;
use std::sync::Arc;

use agentpulse_protocol::{LogEntry, LogKind};
use dashmap::DashMap;

use crate::ws::{WsEvent, WsHub};

/// Default number of entries kept per session.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Newest-first ring of recent events, one per session.
pub struct ActivityLog {
    entries: DashMap<String, VecDeque<LogEntry>>,
    capacity: usize,
    hub: Arc<WsHub>,
}

impl ActivityLog {
    pub fn new(hub: Arc<WsHub>, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
            hub,
        }
    }

    /// Prepend an entry, drop the oldest beyond capacity, and push it to the
    /// session's connections.
    pub fn append(
        &self,
        session_id: &str,
        agent: &str,
        message: impl Into<String>,
        kind: LogKind,
    ) -> LogEntry {
        let entry = LogEntry::new(agent, message, kind);
        let mut log = self.entries.entry(session_id.to_string()).or_default();
        log.push_front(entry.clone());
        log.truncate(self.capacity);
        self.hub.broadcast(
            session_id,
            WsEvent::Log {
                data: entry.clone(),
            },
        );
        entry
    }

    /// All entries, newest first. Unknown sessions yield an empty list.
    pub fn entries(&self, session_id: &str) -> Vec<LogEntry> {
        self.entries
            .get(session_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self, session_id: &str) {
        if let Some(mut log) = self.entries.get_mut(session_id) {
            log.clear();
        }
    }

    pub(crate) fn remove(&self, session_id: &str) {
        self.entries.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> ActivityLog {
        ActivityLog::new(Arc::new(WsHub::new()), DEFAULT_LOG_CAPACITY)
    }

    #[test]
    fn entries_are_newest_first() {
        let log = log();
        log.append("s", "System", "first", LogKind::Info);
        log.append("s", "Gemini Pro", "second", LogKind::Error);

        let entries = log.entries("s");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[0].kind, LogKind::Error);
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn appending_past_capacity_evicts_oldest() {
        let log = log();
        for i in 0..=DEFAULT_LOG_CAPACITY {
            log.append("s", "System", format!("entry {i}"), LogKind::Info);
        }

        let entries = log.entries("s");
        assert_eq!(entries.len(), DEFAULT_LOG_CAPACITY);
        assert_eq!(entries[0].message, format!("entry {DEFAULT_LOG_CAPACITY}"));
        assert_eq!(entries.last().unwrap().message, "entry 1");
    }

    #[test]
    fn unknown_session_has_empty_log() {
        assert!(log().entries("missing").is_empty());
    }

    #[test]
    fn concurrent_appends_are_pushed_in_log_order() {
        for _ in 0..50 {
            let hub = Arc::new(WsHub::new());
            let log = ActivityLog::new(hub.clone(), DEFAULT_LOG_CAPACITY);
            let (mut rx, _) = hub.register_connection("s");

            std::thread::scope(|scope| {
                for worker in 0..2 {
                    let log = &log;
                    scope.spawn(move || {
                        for i in 0..30 {
                            log.append("s", "System", format!("{worker}-{i}"), LogKind::Info);
                        }
                    });
                }
            });

            let mut pushed = Vec::new();
            while let Ok(WsEvent::Log { data }) = rx.try_recv() {
                pushed.push(data.message);
            }
            // The log is newest first; pushes arrive oldest first.
            let stored: Vec<String> = log
                .entries("s")
                .into_iter()
                .rev()
                .map(|e| e.message)
                .collect();
            assert_eq!(pushed, stored);
        }
    }

    #[tokio::test]
    async fn append_pushes_log_event() {
        let hub = Arc::new(WsHub::new());
        let log = ActivityLog::new(hub.clone(), 10);
        let (mut rx, _) = hub.register_connection("s");

        let entry = log.append("s", "System", "hello", LogKind::Info);

        assert_eq!(rx.recv().await, Some(WsEvent::Log { data: entry }));
    }
}
