//! Guest registry and host plumbing.
//!
//! One [`Airship`] value is one independent overlay system: its own
//! guest list, its own hosts, its own `show`/`clear`. Several systems
//! can coexist in a process without seeing each other.
//!
//! The guest list is the only shared mutable state here. It is owned and
//! mutated exclusively by this module; hosts and overlays observe it
//! through snapshots and bridges, never directly.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::trace;

use airship_core::platform::Platform;

use crate::barometer::{Barometer, BarometerConfig};
use crate::bridge::{AirshipBridge, ShowFuture};
use crate::keyboard::KeyboardMonitor;
use crate::wrapper::{HostOptions, Wrapper};

/// Identity of one shown overlay. Keys count up for the lifetime of a
/// registry and are never reused, even across rapid show/remove cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuestKey(u64);

impl GuestKey {
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GuestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guest{}", self.0)
    }
}

/// One active overlay entry, as hosts see it. Insertion order is display
/// order: older guests keep earlier positions.
#[derive(Debug, Clone)]
pub struct Guest<E> {
    pub key: GuestKey,
    pub element: E,
}

struct GuestEntry<E> {
    key: GuestKey,
    element: E,
    /// Delivers the clear broadcast to this guest's bridge. Dropping the
    /// entry is what unsubscribes the guest from clear.
    clear: Arc<dyn Fn() + Send + Sync>,
}

type HostCallback = Arc<dyn Fn() + Send + Sync>;

struct Shared<E> {
    next_key: AtomicU64,
    next_host: AtomicU64,
    guests: Mutex<Vec<GuestEntry<E>>>,
    hosts: Mutex<Vec<(u64, HostCallback)>>,
}

impl<E> Shared<E> {
    fn remove(shared: &Arc<Self>, key: GuestKey) {
        let removed = {
            let mut guests = shared.guests.lock().unwrap_or_else(|e| e.into_inner());
            let before = guests.len();
            guests.retain(|guest| guest.key != key);
            guests.len() != before
        };
        // Unknown or already-removed keys are a no-op.
        if removed {
            trace!("{key} removed");
            Self::notify_hosts(shared);
        }
    }

    fn notify_hosts(shared: &Arc<Self>) {
        let callbacks: Vec<HostCallback> = {
            let hosts = shared.hosts.lock().unwrap_or_else(|e| e.into_inner());
            hosts.iter().map(|(_, callback)| Arc::clone(callback)).collect()
        };
        for callback in callbacks {
            callback();
        }
    }
}

/// An independent overlay system.
///
/// Mount any number of [`Host`]s; call [`Airship::show`] from anywhere
/// to float an overlay above them. Construction requires a running tokio
/// runtime (the environment tracker measures asynchronously).
pub struct Airship<E> {
    shared: Arc<Shared<E>>,
    platform: Arc<dyn Platform>,
    barometer: Arc<Barometer>,
    keyboard: Arc<KeyboardMonitor>,
}

impl<E> Clone for Airship<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            platform: Arc::clone(&self.platform),
            barometer: Arc::clone(&self.barometer),
            keyboard: Arc::clone(&self.keyboard),
        }
    }
}

impl<E: Send + 'static> Airship<E> {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self::with_config(platform, BarometerConfig::default())
    }

    pub fn with_config(platform: Arc<dyn Platform>, config: BarometerConfig) -> Self {
        let barometer = Arc::new(Barometer::new(Arc::clone(&platform), config));
        let keyboard = Arc::new(KeyboardMonitor::new(Arc::clone(&platform)));
        Self {
            shared: Arc::new(Shared {
                next_key: AtomicU64::new(0),
                next_host: AtomicU64::new(0),
                guests: Mutex::new(Vec::new()),
                hosts: Mutex::new(Vec::new()),
            }),
            platform,
            barometer,
            keyboard,
        }
    }

    /// Float an overlay. The renderer runs synchronously with a fresh
    /// bridge and returns the element hosts will display; the returned
    /// future settles whenever the overlay resolves or rejects.
    ///
    /// The guest stays listed after settlement until its bridge calls
    /// `remove`; that window is where exit animations run.
    pub fn show<T, F>(&self, render: F) -> ShowFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(AirshipBridge<T>) -> E,
    {
        let key = GuestKey(self.shared.next_key.fetch_add(1, Ordering::Relaxed));
        let shared = Arc::downgrade(&self.shared);
        let remover: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            if let Some(shared) = shared.upgrade() {
                Shared::remove(&shared, key);
            }
        });
        let (bridge, future) = AirshipBridge::new(key, remover);
        let clear: Arc<dyn Fn() + Send + Sync> = {
            let bridge = bridge.clone();
            Arc::new(move || bridge.emit_clear())
        };
        let element = render(bridge);
        {
            let mut guests = self.shared.guests.lock().unwrap_or_else(|e| e.into_inner());
            guests.push(GuestEntry {
                key,
                element,
                clear,
            });
        }
        trace!("{key} shown");
        Shared::notify_hosts(&self.shared);
        future
    }

    /// Ask every live guest to dismiss itself. Broadcasts a clear event
    /// to each bridge; membership is untouched. The standard overlays'
    /// own cancel handlers resolve and remove in reaction. Safe to call
    /// with zero guests.
    pub fn clear(&self) {
        let clears: Vec<Arc<dyn Fn() + Send + Sync>> = {
            let guests = self.shared.guests.lock().unwrap_or_else(|e| e.into_inner());
            guests.iter().map(|guest| Arc::clone(&guest.clear)).collect()
        };
        trace!("clear broadcast to {} guests", clears.len());
        for clear in clears {
            clear();
        }
    }

    /// Mount a host. `on_change` fires after every guest-list mutation;
    /// the host reads the current list with [`Host::guests`]. Any number
    /// of hosts may be mounted at once and all see the same list; the
    /// duplication is intentional layering, not a bug.
    pub fn host(&self, options: HostOptions, on_change: impl Fn() + Send + Sync + 'static) -> Host<E> {
        let id = self.shared.next_host.fetch_add(1, Ordering::Relaxed);
        self.shared
            .hosts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(on_change)));
        let wrapper = Wrapper::new(
            Arc::clone(&self.platform),
            &self.barometer,
            &self.keyboard,
            options,
        );
        Host {
            shared: Arc::clone(&self.shared),
            id,
            wrapper,
        }
    }

    /// The environment tracker backing this system.
    pub fn barometer(&self) -> &Barometer {
        &self.barometer
    }

    /// The keyboard coordinator backing this system.
    pub fn keyboard(&self) -> &KeyboardMonitor {
        &self.keyboard
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }
}

/// A mounted render target for the guest list.
///
/// Unmounting (dropping) a host detaches only that host; other hosts and
/// the guest list are unaffected.
pub struct Host<E> {
    shared: Arc<Shared<E>>,
    id: u64,
    wrapper: Wrapper,
}

impl<E: Clone> Host<E> {
    /// Snapshot of the current guest list, in insertion order.
    pub fn guests(&self) -> Vec<Guest<E>> {
        let guests = self.shared.guests.lock().unwrap_or_else(|e| e.into_inner());
        guests
            .iter()
            .map(|guest| Guest {
                key: guest.key,
                element: guest.element.clone(),
            })
            .collect()
    }
}

impl<E> Host<E> {
    /// The environment-aware wrapper this host applies around every
    /// guest element.
    pub fn wrapper(&self) -> &Wrapper {
        &self.wrapper
    }
}

impl<E> Drop for Host<E> {
    fn drop(&mut self) {
        self.shared
            .hosts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(id, _)| *id != self.id);
    }
}
