//! CSS-style side lists.
//!
//! Many overlay options take 0-4 numbers with web `margin`/`padding`
//! shorthand semantics. [`Sides::unpack`] normalizes the shorthand into a
//! concrete four-field record at the API boundary, so nothing downstream
//! ever sees a partial list.

/// Four sides in top, right, bottom, left order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Sides {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Interpret a list of 0-4 numbers as a web CSS sides shorthand.
    ///
    /// `top` defaults to 0, `right` defaults to `top`, `bottom` defaults
    /// to `top`, and `left` defaults to `right`.
    pub fn unpack(values: &[f32]) -> Self {
        let top = values.first().copied().unwrap_or(0.0);
        let right = values.get(1).copied().unwrap_or(top);
        let bottom = values.get(2).copied().unwrap_or(top);
        let left = values.get(3).copied().unwrap_or(right);
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn add(self, other: Self) -> Self {
        Self {
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
            left: self.left + other.left,
        }
    }

    pub fn subtract(self, other: Self) -> Self {
        Self {
            top: self.top - other.top,
            right: self.right - other.right,
            bottom: self.bottom - other.bottom,
            left: self.left - other.left,
        }
    }

    /// Apply a function to each side.
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }
}

impl From<f32> for Sides {
    /// One value applies to all four sides.
    fn from(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}
