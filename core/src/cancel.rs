//! Cancellable, deadline-bound execution of an upload.
//!
//! # Design
//! The blocking transport runs on a dedicated worker thread. The caller waits
//! on the token's condition variable, which is signalled both by `cancel()`
//! and by the worker when its result is ready. A caller that gives up drops
//! the receiver; the worker's late result is discarded.

use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::UploadError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Cloneable handle that aborts in-flight `post_cancellable` calls.
///
/// One token may be shared by many calls; cancelling is permanent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    changed: Condvar,
}

impl CancelState {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        *self.state.lock() = true;
        self.state.changed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.lock()
    }

    /// Wake waiters so they re-check their result channel.
    fn notify(&self) {
        let _guard = self.state.lock();
        self.state.changed.notify_all();
    }
}

struct WakeOnDrop(CancelToken);

impl Drop for WakeOnDrop {
    fn drop(&mut self) {
        self.0.notify();
    }
}

/// Run `request` on a worker thread and wait for the first of: a response,
/// cancellation, or `timeout` elapsing.
pub(crate) fn run_cancellable<T: Transport>(
    transport: Arc<T>,
    request: HttpRequest,
    token: &CancelToken,
    timeout: Option<Duration>,
) -> Result<HttpResponse, UploadError> {
    if token.is_cancelled() {
        return Err(UploadError::Cancelled);
    }

    let (tx, rx) = mpsc::channel();
    let waker = token.clone();
    let url = request.url.clone();
    thread::Builder::new()
        .name("formpost-upload".to_string())
        .spawn(move || {
            // Declared before `tx` so the wake-up happens after the sender is
            // gone, including when the transport panics.
            let _wake = WakeOnDrop(waker);
            let tx = tx;
            let _ = tx.send(transport.execute(&request));
        })
        .map_err(UploadError::Spawn)?;

    let deadline = timeout.map(|timeout| Instant::now() + timeout);
    let mut cancelled = token.state.lock();
    loop {
        match rx.try_recv() {
            Ok(outcome) => return outcome,
            Err(TryRecvError::Disconnected) => return Err(UploadError::WorkerLost),
            Err(TryRecvError::Empty) => {}
        }
        if *cancelled {
            warn!(%url, "upload cancelled");
            return Err(UploadError::Cancelled);
        }
        cancelled = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    let timeout = timeout.unwrap_or_default();
                    warn!(%url, ?timeout, "upload timed out");
                    return Err(UploadError::TimedOut(timeout));
                }
                token
                    .state
                    .changed
                    .wait_timeout(cancelled, deadline - now)
                    .map(|(guard, _)| guard)
                    .unwrap_or_else(|poisoned| poisoned.into_inner().0)
            }
            None => token
                .state
                .changed
                .wait(cancelled)
                .unwrap_or_else(PoisonError::into_inner),
        };
    }
}
