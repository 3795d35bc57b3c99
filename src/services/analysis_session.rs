//! Published analysis state and logical cancellation.
//!
//! A session owns the state a consumer observes through a
//! [`tokio::sync::watch`] channel. Each request gets a [`ResultPublisher`]
//! tagged with a generation number; starting another request or resetting
//! the session bumps the generation, after which the old publisher's
//! updates are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::PartialResult;

/// Lifecycle of the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisStatus {
    /// No request in flight
    #[default]
    Idle,
    /// Fragments are still arriving
    Streaming,
    /// The stream finished; `result` is definitive
    Complete,
    /// The request failed with the given message
    Failed(String),
}

/// State observed by consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisState {
    pub request_id: Option<Uuid>,
    pub status: AnalysisStatus,
    /// Latest best-known result for `request_id`
    pub result: Option<PartialResult>,
}

struct SessionInner {
    generation: AtomicU64,
    state: watch::Sender<AnalysisState>,
}

/// Owner of the published state for a sequence of analysis requests.
#[derive(Clone)]
pub struct AnalysisSession {
    inner: Arc<SessionInner>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AnalysisState::default());
        Self {
            inner: Arc::new(SessionInner {
                generation: AtomicU64::new(0),
                state,
            }),
        }
    }

    /// Watch the published state.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the published state.
    pub fn current(&self) -> AnalysisState {
        self.inner.state.borrow().clone()
    }

    /// Start a new request, discarding whatever the previous one published.
    pub fn begin(&self) -> ResultPublisher {
        let request_id = Uuid::new_v4();
        let mut generation = 0;

        self.inner.state.send_modify(|state| {
            generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
            *state = AnalysisState {
                request_id: Some(request_id),
                status: AnalysisStatus::Streaming,
                result: None,
            };
        });

        debug!(%request_id, generation, "analysis request started");

        ResultPublisher {
            inner: Arc::clone(&self.inner),
            generation,
            request_id,
        }
    }

    /// Return to idle. Any in-flight request stops publishing.
    pub fn reset(&self) {
        self.inner.state.send_modify(|state| {
            self.inner.generation.fetch_add(1, Ordering::AcqRel);
            *state = AnalysisState::default();
        });
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Write handle for a single request.
///
/// Every method returns `false` without touching the state once the
/// request has been superseded.
pub struct ResultPublisher {
    inner: Arc<SessionInner>,
    generation: u64,
    request_id: Uuid,
}

impl ResultPublisher {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Whether this request is still the session's current one.
    pub fn is_current(&self) -> bool {
        self.inner.generation.load(Ordering::Acquire) == self.generation
    }

    /// Replace the best-known result.
    pub fn publish_partial(&self, result: PartialResult) -> bool {
        self.update(|state| state.result = Some(result))
    }

    /// Publish the definitive result and mark the request complete.
    pub fn complete(&self, result: Option<PartialResult>) -> bool {
        self.update(|state| {
            state.status = AnalysisStatus::Complete;
            state.result = result;
        })
    }

    /// Mark the request failed. The last partial result stays visible.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.update(|state| state.status = AnalysisStatus::Failed(message))
    }

    // The generation check runs under the channel's write lock, so it cannot
    // interleave with `begin` or `reset`.
    fn update(&self, apply: impl FnOnce(&mut AnalysisState)) -> bool {
        let current = self.inner.state.send_if_modified(|state| {
            if self.inner.generation.load(Ordering::Acquire) != self.generation {
                return false;
            }
            apply(state);
            true
        });

        if !current {
            debug!(request_id = %self.request_id, "dropping update from superseded request");
        }
        current
    }
}
