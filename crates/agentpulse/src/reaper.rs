//! Periodic eviction of idle sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::{Session, SessionStore};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Evicts sessions whose agents have all been inactive for longer than the
/// idle TTL. Sessions that never ran a task count as idle.
pub struct IdleReaper {
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    idle_ttl: Duration,
    interval: Duration,
}

impl IdleReaper {
    pub fn new(store: Arc<SessionStore>, idle_ttl: Duration, interval: Duration) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), idle_ttl, interval)
    }

    pub fn with_clock(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        idle_ttl: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            idle_ttl,
            interval,
        }
    }

    /// Evict every idle session now. Returns the evicted session ids.
    pub fn sweep(&self) -> Vec<String> {
        let ttl = TimeDelta::from_std(self.idle_ttl).unwrap_or(TimeDelta::MAX);
        let cutoff = self.clock.now().checked_sub_signed(ttl);

        let mut evicted = Vec::new();
        for session_id in self.store.session_ids() {
            if self
                .store
                .evict_if(&session_id, |session| is_idle(session, cutoff))
            {
                debug!(session_id = %session_id, "Evicted idle session");
                evicted.push(session_id);
            }
        }
        evicted
    }

    /// Run [`sweep`](Self::sweep) on a fixed interval in the background.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let evicted = self.sweep();
                if !evicted.is_empty() {
                    info!(
                        count = evicted.len(),
                        remaining = self.store.len(),
                        "Cleaned up idle sessions"
                    );
                }
            }
        })
    }
}

fn is_idle(session: &Session, cutoff: Option<DateTime<Utc>>) -> bool {
    match (session.last_active(), cutoff) {
        (None, _) => true,
        (Some(last), Some(cutoff)) => last <= cutoff,
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use agentpulse_protocol::{AgentId, LogKind};

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(now)))
        }

        fn advance(&self, by: TimeDelta) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    const HOUR: Duration = Duration::from_secs(3600);

    fn reaper(store: &Arc<SessionStore>, clock: Arc<ManualClock>) -> IdleReaper {
        IdleReaper::with_clock(store.clone(), clock, HOUR, HOUR)
    }

    #[test]
    fn never_active_sessions_are_evicted() {
        let store = Arc::new(SessionStore::default());
        store.get_or_create("quiet");
        store.append_log("quiet", "System", "API keys updated", LogKind::Info);

        let evicted = reaper(&store, ManualClock::at(Utc::now())).sweep();

        assert_eq!(evicted, vec!["quiet".to_string()]);
        assert!(store.is_empty());
        assert!(store.log().entries("quiet").is_empty());
    }

    #[test]
    fn recently_active_sessions_survive() {
        let start = Utc::now();
        let clock = ManualClock::at(start);
        let store = Arc::new(SessionStore::default());
        store.update_agent("busy", AgentId::Claude, |a| a.last_active = Some(start));
        let reaper = reaper(&store, clock.clone());

        clock.advance(TimeDelta::minutes(59));
        assert!(reaper.sweep().is_empty());
        assert!(store.contains("busy"));

        clock.advance(TimeDelta::minutes(2));
        assert_eq!(reaper.sweep(), vec!["busy".to_string()]);
        assert!(!store.contains("busy"));
    }

    #[test]
    fn any_recent_agent_keeps_the_session() {
        let now = Utc::now();
        let store = Arc::new(SessionStore::default());
        store.update_agent("s", AgentId::Claude, |a| {
            a.last_active = Some(now - TimeDelta::hours(5))
        });
        store.update_agent("s", AgentId::Gemini, |a| {
            a.last_active = Some(now - TimeDelta::minutes(5))
        });

        assert!(reaper(&store, ManualClock::at(now)).sweep().is_empty());
    }

    #[tokio::test]
    async fn spawned_reaper_sweeps_on_interval() {
        let store = Arc::new(SessionStore::default());
        store.get_or_create("stale");
        let reaper = Arc::new(IdleReaper::new(
            store.clone(),
            Duration::from_secs(60),
            Duration::from_millis(20),
        ));

        let handle = reaper.spawn();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!store.contains("stale"));
        handle.abort();
    }
}
