//! The snapshot the environment tracker publishes.

use crate::sides::Sides;

/// Computed overlay geometry.
///
/// `offset` is how far a full-bleed overlay container must be pushed
/// outward (negative margins) to cover the true window edges. `padding`
/// is how much inward padding must be reserved so content clears the
/// safe area and the on-screen keyboard.
///
/// Snapshots compare structurally; consumers publish a new one only when
/// at least one field changed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutSnapshot {
    pub offset: Sides,
    pub padding: Sides,
}
