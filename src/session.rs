//! Per-session state and the registry that isolates sessions
//!
//! A [`Session`] owns everything one visitor has entered or derived. Every
//! field is initialised once, in [`Session::new`]; later accesses never
//! re-initialise it. Sessions are never shared: the [`SessionStore`] hands
//! out one mutex per session so requests of a single visitor are serialised,
//! and tears sessions down once they go idle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::assessment::Assessment;
use crate::challenges::ChallengeKind;
use crate::feedback::FeedbackReport;
use crate::journal::Journal;
use crate::literacy::{LiteracyModuleId, LiteracyProgress};

pub type SessionId = Uuid;

/// Section of the reflection page currently shown
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionModule {
    Experience,
    Assessment,
    Report,
}

/// Names of the resettable session fields
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionKey {
    SelectedModule,
    Journal,
    Assessment,
    LastSaved,
    LastReport,
    Literacy,
    SelectedLiteracyModule,
    SelectedChallenge,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub selected_module: Option<ReflectionModule>,
    pub journal: Journal,
    pub assessment: Assessment,
    pub last_saved: Option<DateTime<Utc>>,
    pub last_report: Option<FeedbackReport>,
    pub literacy: LiteracyProgress,
    pub selected_literacy_module: Option<LiteracyModuleId>,
    pub selected_challenge: Option<ChallengeKind>,
    created_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Empty journal and bank, empty answers, nothing selected
    pub fn new() -> Self {
        Self {
            selected_module: None,
            journal: Journal::new(),
            assessment: Assessment::new(),
            last_saved: None,
            last_report: None,
            literacy: LiteracyProgress::default(),
            selected_literacy_module: None,
            selected_challenge: None,
            created_at: Utc::now(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Saves a journal entry and stamps `last_saved`.
    pub fn submit_journal_entry(
        &mut self,
        task: &str,
        tool: &str,
        usage: &str,
    ) -> Result<&crate::journal::JournalEntry, crate::error::JournalError> {
        let entry = self.journal.submit_entry(task, tool, usage)?;
        self.last_saved = Some(entry.created_at);
        Ok(entry)
    }

    /// Restores the named fields to their initial values.
    pub fn reset(&mut self, keys: &[SessionKey]) {
        for key in keys {
            match key {
                SessionKey::SelectedModule => self.selected_module = None,
                SessionKey::Journal => self.journal.clear(),
                SessionKey::Assessment => self.assessment.reset(),
                SessionKey::LastSaved => self.last_saved = None,
                SessionKey::LastReport => self.last_report = None,
                SessionKey::Literacy => self.literacy = LiteracyProgress::default(),
                SessionKey::SelectedLiteracyModule => self.selected_literacy_module = None,
                SessionKey::SelectedChallenge => self.selected_challenge = None,
            }
        }
    }

    /// The "clear all data" action: journal, questions, answers and report.
    pub fn clear_all(&mut self) {
        self.reset(&[
            SessionKey::Journal,
            SessionKey::Assessment,
            SessionKey::LastReport,
        ]);
        tracing::info!("Cleared all session data");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            selected_module: self.selected_module,
            journal_entries: self.journal.len(),
            questions_loaded: self.assessment.questions().len(),
            answers_recorded: self.assessment.answers().len(),
            last_saved: self.last_saved,
            has_report: self.last_report.is_some(),
            selected_literacy_module: self.selected_literacy_module,
            selected_challenge: self.selected_challenge,
        }
    }
}

/// Read-only summary for the UI
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub selected_module: Option<ReflectionModule>,
    pub journal_entries: usize,
    pub questions_loaded: usize,
    pub answers_recorded: usize,
    pub last_saved: Option<DateTime<Utc>>,
    pub has_report: bool,
    pub selected_literacy_module: Option<LiteracyModuleId>,
    pub selected_challenge: Option<ChallengeKind>,
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Idle time after which a session is torn down
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Live session bound used by [`SessionStore::new`]
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Slot {
    handle: SessionHandle,
    /// Milliseconds since the store's epoch at the last access
    last_seen: AtomicU64,
}

/// Registry of live sessions
///
/// A session ends when it has been idle longer than the idle timeout, when
/// the store is full and it is the least recently seen, or when it is
/// removed explicitly.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Slot>>>>,
    epoch: Instant,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            epoch: Instant::now(),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    fn millis(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.epoch).as_millis() as u64
    }

    fn is_idle(&self, slot: &Slot, now: u64) -> bool {
        let last_seen = slot.last_seen.load(Ordering::Relaxed);
        now.saturating_sub(last_seen) > self.idle_timeout.as_millis() as u64
    }

    /// Returns the session for `id`, creating a fresh one when the id is
    /// absent, unknown or expired. A live session is never replaced.
    pub async fn get_or_create(&self, id: Option<SessionId>) -> (SessionId, SessionHandle) {
        self.get_or_create_at(id, Instant::now()).await
    }

    async fn get_or_create_at(&self, id: Option<SessionId>, at: Instant) -> (SessionId, SessionHandle) {
        let now = self.millis(at);

        if let Some(id) = id {
            if let Some(slot) = self.sessions.read().await.get(&id) {
                if !self.is_idle(slot, now) {
                    slot.last_seen.store(now, Ordering::Relaxed);
                    return (id, slot.handle.clone());
                }
            }
        }

        let mut sessions = self.sessions.write().await;
        if let Some(id) = id {
            // another request may have created or expired it while we waited
            match sessions.get(&id) {
                Some(slot) if !self.is_idle(slot, now) => {
                    slot.last_seen.store(now, Ordering::Relaxed);
                    return (id, slot.handle.clone());
                }
                Some(_) => {
                    sessions.remove(&id);
                    tracing::info!(session = %id, "Session expired");
                }
                None => {}
            }
        }

        if sessions.len() >= self.max_sessions {
            let evicted = self.evict_idle_locked(&mut sessions, now);
            if evicted == 0 {
                let oldest = sessions
                    .iter()
                    .min_by_key(|(_, slot)| slot.last_seen.load(Ordering::Relaxed))
                    .map(|(id, _)| *id);
                if let Some(oldest) = oldest {
                    sessions.remove(&oldest);
                    tracing::warn!(session = %oldest, "Session store full, dropped least recently seen session");
                }
            }
        }

        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new()));
        sessions.insert(
            id,
            Arc::new(Slot {
                handle: handle.clone(),
                last_seen: AtomicU64::new(now),
            }),
        );
        tracing::info!(session = %id, "Started new session");
        (id, handle)
    }

    fn evict_idle_locked(&self, sessions: &mut HashMap<SessionId, Arc<Slot>>, now: u64) -> usize {
        let before = sessions.len();
        sessions.retain(|_, slot| !self.is_idle(slot, now));
        before - sessions.len()
    }

    /// Tears down every session idle for longer than the idle timeout.
    pub async fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now()).await
    }

    async fn evict_idle_at(&self, at: Instant) -> usize {
        let now = self.millis(at);
        let mut sessions = self.sessions.write().await;
        let evicted = self.evict_idle_locked(&mut sessions, now);
        if evicted > 0 {
            tracing::info!(evicted, live = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Runs [`SessionStore::evict_idle`] on a fixed period until the
    /// runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                store.evict_idle().await;
            }
        })
    }

    pub async fn get(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|slot| slot.handle.clone())
    }

    /// Tears a session down.
    pub async fn remove(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session = %id, "Ended session");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
