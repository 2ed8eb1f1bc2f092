//! Broadcast event bus and cancellable listener subscriptions
//!
//! [`EventBus`] is a thin wrapper over `tokio::sync::broadcast`. Listeners are
//! spawned with [`Subscription::listen`]; each one handles its events in order
//! on a single task and stops when cancelled, dropped or when the sender side
//! closes. State channels (`tokio::sync::watch`) are followed with
//! [`Subscription::watch`].

use std::future::Future;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default channel capacity for buses created with `Default`
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Multi-consumer event channel
#[derive(Debug, Clone)]
pub struct EventBus<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone + Send + 'static> EventBus<E> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event, returning how many receivers saw it
    ///
    /// Publishing with no receivers is not an error.
    pub fn publish(&self, event: E) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

/// Handle to a spawned listener task
///
/// Dropping the subscription cancels the listener.
#[derive(Debug)]
pub struct Subscription {
    name: &'static str,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Spawn a task that feeds every event from `receiver` to `handler`
    ///
    /// Lagged receivers log the number of skipped events and keep going.
    pub fn listen<E, F, Fut>(name: &'static str, mut receiver: broadcast::Receiver<E>, mut handler: F) -> Self
    where
        E: Clone + Send + 'static,
        F: FnMut(E) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancel = token.clone();

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    received = receiver.recv() => received,
                };

                match event {
                    Ok(event) => handler(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(listener = name, skipped, "listener lagged; events dropped");
                    }
                    Err(RecvError::Closed) => {
                        debug!(listener = name, "event source closed");
                        break;
                    }
                }
            }
        });

        Self { name, token, task: Some(task) }
    }

    /// Spawn a task that feeds the current value of `receiver`, then every
    /// change, to `handler`
    ///
    /// Changes that happen while the handler runs are coalesced into the
    /// latest value.
    pub fn watch<T, F, Fut>(name: &'static str, mut receiver: watch::Receiver<T>, mut handler: F) -> Self
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancel = token.clone();

        let task = tokio::spawn(async move {
            let initial = receiver.borrow_and_update().clone();
            handler(initial).await;

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    changed = receiver.changed() => {
                        if changed.is_err() {
                            debug!(listener = name, "watched value dropped");
                            break;
                        }
                    }
                }
                let value = receiver.borrow_and_update().clone();
                handler(value).await;
            }
        });

        Self { name, token, task: Some(task) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the listener is still receiving events
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the listener and wait for its task to exit
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if err.is_panic() {
                    warn!(listener = self.name, "listener task panicked");
                }
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Group of subscriptions torn down together
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.subscriptions.iter().filter(|sub| sub.is_active()).count()
    }

    /// Cancel every subscription and empty the set
    ///
    /// Listener tasks observe the cancellation at their next await point and
    /// never handle another event.
    pub fn teardown(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
    }
}
