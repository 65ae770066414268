//! Airship: transient, stacked overlay coordination.
//!
//! Call [`Airship::show`] from anywhere to float an overlay above the
//! mounted hosts; get back a future that settles when the overlay's
//! lifecycle ends. Each guest talks to its caller through an
//! [`bridge::AirshipBridge`] carrying a one-shot result plus lifecycle
//! events, while the [`barometer::Barometer`] and the
//! [`keyboard::KeyboardMonitor`] keep every host's wrapper clear of
//! notches, status bars, and the on-screen keyboard.

pub mod barometer;
pub mod bridge;
pub mod keyboard;
pub mod overlays;
pub mod registry;
pub mod wrapper;

pub use registry::{Airship, Guest, GuestKey, Host};

pub mod prelude {
    pub use airship_core::geometry::{RectF, SizeF};
    pub use airship_core::layout::LayoutSnapshot;
    pub use airship_core::platform::{
        AnimatedScalar, KeyboardEvent, Platform, PlatformCaps, ProbeView,
    };
    pub use airship_core::sides::Sides;

    pub use crate::barometer::{Barometer, BarometerConfig};
    pub use crate::bridge::{AirshipBridge, BridgeEvent, ShowError, ShowFuture, Subscription};
    pub use crate::keyboard::{KeyboardMonitor, KeyboardTracker, UpValue};
    pub use crate::overlays::{
        Color, Dropdown, DropdownConfig, Modal, ModalConfig, ModalPlacement, Toast, ToastConfig,
    };
    pub use crate::registry::{Airship, Guest, GuestKey, Host};
    pub use crate::wrapper::{HostOptions, Wrapper, WrapperFrame};
}
