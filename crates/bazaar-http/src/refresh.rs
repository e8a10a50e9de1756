//! Single-flight coordination of token refreshes.
//!
//! The first request to hit an expired token becomes the leader and runs the
//! exchange. Everyone arriving while it runs is parked on a oneshot channel
//! and settled with the leader's outcome.

use std::sync::Mutex;

use tokio::sync::oneshot;

use bazaar_core::AccessToken;
use bazaar_core::error::{AuthError, Error};

/// Why a queued request did not get a new token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RefreshRejected {
    /// The server rejected the refresh token.
    InvalidToken,
    /// The exchange failed for another reason.
    Failed(String),
}

impl From<RefreshRejected> for Error {
    fn from(rejected: RefreshRejected) -> Self {
        match rejected {
            RefreshRejected::InvalidToken => AuthError::RefreshTokenInvalid.into(),
            RefreshRejected::Failed(reason) => AuthError::RefreshFailed { reason }.into(),
        }
    }
}

pub(crate) type RefreshOutcome = Result<AccessToken, RefreshRejected>;

#[derive(Debug, Default)]
struct QueueState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// The in-flight flag plus the pending request queue.
#[derive(Debug, Default)]
pub(crate) struct RefreshQueue {
    state: Mutex<QueueState>,
}

/// What a caller has to do after [`RefreshQueue::join`].
pub(crate) enum Role<'a> {
    /// Run the exchange, then settle the guard.
    Leader(LeaderGuard<'a>),
    /// Wait for the leader's outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshQueue {
    /// Either claim the refresh or join the queue behind the current one.
    ///
    /// The flag is checked and set under one lock, before any await, so two
    /// near-simultaneous callers cannot both become leader.
    pub(crate) fn join(&self) -> Role<'_> {
        let mut state = self.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Role::Waiter(rx)
        } else {
            state.in_flight = true;
            Role::Leader(LeaderGuard {
                queue: self,
                settled: false,
            })
        }
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        self.lock().in_flight
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.lock().waiters.len()
    }

    fn settle(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A waiter that gave up has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Held by the leader for the duration of the exchange.
///
/// Dropping it unsettled (the leader's future was cancelled) rejects every
/// waiter and releases the flag.
pub(crate) struct LeaderGuard<'a> {
    queue: &'a RefreshQueue,
    settled: bool,
}

impl LeaderGuard<'_> {
    pub(crate) fn settle(mut self, outcome: RefreshOutcome) {
        self.settled = true;
        self.queue.settle(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.queue
                .settle(Err(RefreshRejected::Failed("refresh abandoned".to_string())));
        }
    }
}
