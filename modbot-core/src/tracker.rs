use futures::future::{AbortHandle, Abortable};
use modbot::model::{ChannelId, MessageId};
use parking_lot::Mutex;
use tokio::sync::watch;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// A response sent by the bot, identified by its channel and id.
pub type Response = (ChannelId, MessageId);

/// Keeps track of inbound messages, the responses sent for them and the
/// dispatches still running for them.
///
/// A message stays tracked for a fixed time after it was first seen.
#[derive(Clone, Debug)]
pub struct MessageTracker {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    timeout: Duration,
    tracked: Mutex<HashMap<MessageId, Vec<Response>>>,
    running: Mutex<HashMap<MessageId, Running>>,
    generation: AtomicU64,
}

#[derive(Debug)]
struct Running {
    generation: u64,
    handle: AbortHandle,
    /// Closed once the dispatch future was dropped.
    done: watch::Receiver<()>,
}

impl MessageTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                timeout,
                tracked: Mutex::default(),
                running: Mutex::default(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Starts tracking `id`. Returns `false` if it is already tracked.
    ///
    /// Must be called from within a tokio runtime.
    pub fn track(&self, id: MessageId) -> bool {
        {
            let mut tracked = self.inner.tracked.lock();
            if tracked.contains_key(&id) {
                return false;
            }

            tracked.insert(id, Vec::new());
        }

        let inner = Arc::downgrade(&self.inner);
        let timeout = self.inner.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            release(inner, id);
        });

        true
    }

    pub fn is_tracked(&self, id: MessageId) -> bool {
        self.inner.tracked.lock().contains_key(&id)
    }

    /// Registers `response` as a response to `id`. Returns `false` and
    /// discards the response if `id` is not tracked.
    pub fn register_response(&self, id: MessageId, response: Response) -> bool {
        match self.inner.tracked.lock().get_mut(&id) {
            Some(responses) => {
                responses.push(response);
                true
            }
            None => {
                log::debug!("[TRACKER] Request {} outdated, not registering", id);
                false
            }
        }
    }

    /// Returns the responses to `id` registered so far.
    pub fn responses(&self, id: MessageId) -> Vec<Response> {
        self.inner
            .tracked
            .lock()
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Removes and returns all responses to `id`, keeping `id` tracked.
    pub fn take_responses(&self, id: MessageId) -> Vec<Response> {
        match self.inner.tracked.lock().get_mut(&id) {
            Some(responses) => std::mem::take(responses),
            None => Vec::new(),
        }
    }

    /// Stops tracking `id` and returns all of its responses.
    pub fn untrack(&self, id: MessageId) -> Vec<Response> {
        self.inner.tracked.lock().remove(&id).unwrap_or_default()
    }

    /// Runs `fut` as the dispatch of `id`. Returns `None` if the dispatch
    /// was cancelled using [`cancel`].
    ///
    /// [`cancel`]: Self::cancel
    pub async fn run<F>(&self, id: MessageId, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let (tx, done) = watch::channel(());
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);

        self.inner.running.lock().insert(
            id,
            Running {
                generation,
                handle,
                done,
            },
        );

        let _guard = RunGuard {
            inner: &self.inner,
            id,
            generation,
            _tx: tx,
        };

        Abortable::new(fut, registration).await.ok()
    }

    /// Returns `true` if a dispatch for `id` is running.
    pub fn is_running(&self, id: MessageId) -> bool {
        self.inner.running.lock().contains_key(&id)
    }

    /// Cancels the running dispatch of `id` and waits until it stopped.
    /// Returns `false` if none was running.
    pub async fn cancel(&self, id: MessageId) -> bool {
        let done = {
            let running = self.inner.running.lock();

            match running.get(&id) {
                Some(running) => {
                    running.handle.abort();
                    running.done.clone()
                }
                None => return false,
            }
        };

        let mut done = done;
        // Only fails once the sender was dropped together with the
        // dispatch future.
        while done.changed().await.is_ok() {}

        log::trace!("[TRACKER] Cancelled dispatch for message {}", id);
        true
    }
}

fn release(inner: Weak<Inner>, id: MessageId) {
    if let Some(inner) = inner.upgrade() {
        inner.tracked.lock().remove(&id);
    }
}

struct RunGuard<'a> {
    inner: &'a Inner,
    id: MessageId,
    generation: u64,
    _tx: watch::Sender<()>,
}

impl<'a> Drop for RunGuard<'a> {
    fn drop(&mut self) {
        let mut running = self.inner.running.lock();

        // A newer dispatch for the same message may have replaced ours.
        if running
            .get(&self.id)
            .map_or(false, |running| running.generation == self.generation)
        {
            running.remove(&self.id);
        }
    }
}
