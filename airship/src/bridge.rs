//! Per-guest bridge between an overlay and its caller.
//!
//! A bridge composes two independent primitives: a one-shot settlable
//! future (the value `show` hands back) and a small event channel scoped
//! to the guest's lifetime. Settlement and removal are deliberately
//! separate acts, so an overlay can listen for the result, run its exit
//! animation, and only then unmount itself.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use log::trace;
use tokio::sync::oneshot;

use crate::registry::GuestKey;

/// How a [`ShowFuture`] can fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShowError {
    /// The overlay rejected with a caller-supplied error.
    #[error("{0}")]
    Rejected(Arc<dyn Error + Send + Sync>),
    /// Every bridge handle was dropped before the overlay settled.
    #[error("overlay went away without settling")]
    Disconnected,
}

/// Topics a bridge emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The result future settled. Fires exactly once; subscribing after
    /// settlement invokes the callback immediately.
    Result,
    /// A global clear was requested while this guest was alive. Carries
    /// no payload and neither settles nor removes; the guest decides how
    /// to dismiss itself.
    Clear,
}

type Callback = Arc<Mutex<Box<dyn FnMut() + Send>>>;

struct Listener {
    id: u64,
    event: BridgeEvent,
    callback: Callback,
}

struct BridgeState<T> {
    sender: Option<oneshot::Sender<Result<T, ShowError>>>,
    result_emitted: bool,
    listeners: Vec<Listener>,
    next_listener: u64,
}

struct BridgeInner<T> {
    key: GuestKey,
    state: Mutex<BridgeState<T>>,
    remover: Arc<dyn Fn() + Send + Sync>,
}

/// Control handle for one shown overlay.
///
/// Clones all drive the same guest. `resolve`/`reject` settle the result
/// at most once; later calls are no-ops. `remove` unmounts the guest and
/// is safe to call repeatedly.
pub struct AirshipBridge<T> {
    inner: Arc<BridgeInner<T>>,
}

impl<T> Clone for AirshipBridge<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> AirshipBridge<T> {
    pub(crate) fn new(key: GuestKey, remover: Arc<dyn Fn() + Send + Sync>) -> (Self, ShowFuture<T>) {
        let (sender, receiver) = oneshot::channel();
        let bridge = Self {
            inner: Arc::new(BridgeInner {
                key,
                state: Mutex::new(BridgeState {
                    sender: Some(sender),
                    result_emitted: false,
                    listeners: Vec::new(),
                    next_listener: 0,
                }),
                remover,
            }),
        };
        (bridge, ShowFuture { receiver })
    }

    /// Key of the guest this bridge controls.
    pub fn key(&self) -> GuestKey {
        self.inner.key
    }

    /// Settle the show future with a value.
    pub fn resolve(&self, value: T) {
        self.settle(Ok(value));
    }

    /// Settle the show future with an error. A rejection is a normal
    /// outcome (user cancellation), not a system fault.
    pub fn reject(&self, error: impl Error + Send + Sync + 'static) {
        self.settle(Err(ShowError::Rejected(Arc::new(error))));
    }

    fn settle(&self, outcome: Result<T, ShowError>) {
        let fired = {
            let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            let Some(sender) = state.sender.take() else {
                return;
            };
            // The caller may have dropped the future; the guest list does
            // not care.
            let _ = sender.send(outcome);
            state.result_emitted = true;
            let (fired, kept) = std::mem::take(&mut state.listeners)
                .into_iter()
                .partition::<Vec<_>, _>(|listener| listener.event == BridgeEvent::Result);
            state.listeners = kept;
            fired
        };
        trace!("{} settled", self.inner.key);
        for listener in fired {
            let mut callback = listener.callback.lock().unwrap_or_else(|e| e.into_inner());
            (*callback)();
        }
    }

    /// Unmount the guest. Does not settle the future; overlays that need
    /// a result should resolve first, run their exit animation off the
    /// result event, and remove last.
    pub fn remove(&self) {
        (self.inner.remover)();
    }

    /// Subscribe to a bridge event. The returned handle detaches the
    /// callback when cancelled; dropping it without cancelling keeps the
    /// subscription for the guest's lifetime.
    pub fn on(&self, event: BridgeEvent, callback: impl FnMut() + Send + 'static) -> Subscription {
        let mut callback = callback;
        let id = {
            let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            if event == BridgeEvent::Result && state.result_emitted {
                // Replay the one-shot for late subscribers.
                drop(state);
                callback();
                return Subscription { cancel: None };
            }
            let id = state.next_listener;
            state.next_listener += 1;
            state.listeners.push(Listener {
                id,
                event,
                callback: Arc::new(Mutex::new(Box::new(callback))),
            });
            id
        };
        let inner = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = inner.upgrade() {
                    inner
                        .state
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .listeners
                        .retain(|listener| listener.id != id);
                }
            })),
        }
    }

    /// Run a callback when the result settles, whichever way. Useful for
    /// starting exit animations.
    pub fn on_result(&self, callback: impl FnMut() + Send + 'static) -> Subscription {
        self.on(BridgeEvent::Result, callback)
    }

    /// Deliver a clear broadcast to this guest's subscribers.
    pub(crate) fn emit_clear(&self) {
        let callbacks: Vec<Callback> = {
            let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            state
                .listeners
                .iter()
                .filter(|listener| listener.event == BridgeEvent::Clear)
                .map(|listener| Arc::clone(&listener.callback))
                .collect()
        };
        for callback in callbacks {
            let mut callback = callback.lock().unwrap_or_else(|e| e.into_inner());
            (*callback)();
        }
    }
}

/// Handle for one bridge subscription.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Detach the callback.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// The value `show` returns. Settles when the overlay resolves or
/// rejects; yields [`ShowError::Disconnected`] if the guest disappears
/// without ever settling.
pub struct ShowFuture<T> {
    receiver: oneshot::Receiver<Result<T, ShowError>>,
}

impl<T> Future for ShowFuture<T> {
    type Output = Result<T, ShowError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(ShowError::Disconnected)),
            Poll::Pending => Poll::Pending,
        }
    }
}
