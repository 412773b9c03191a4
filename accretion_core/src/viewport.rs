// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Half-open integer viewports and their packed attribute encoding.
//!
//! Window attributes are stored as four-element integer vectors
//! (`min_x, min_y, max_x, max_y`). A first element equal to [`UNSET`] means
//! the user never configured the window; [`Viewport::from_setting`] turns
//! that encoding into an `Option` so resolution code never compares against
//! the sentinel itself.

use alloc::vec;
use alloc::vec::Vec;

/// Sentinel stored in the first element of an unconfigured window or pair.
pub const UNSET: i32 = i32::MIN;

/// A half-open integer rectangle; `max_x` and `max_y` are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Left edge (inclusive).
    pub min_x: i32,
    /// Top edge (inclusive).
    pub min_y: i32,
    /// Right edge (exclusive).
    pub max_x: i32,
    /// Bottom edge (exclusive).
    pub max_y: i32,
}

impl Viewport {
    /// Creates a viewport from its edges.
    #[inline]
    #[must_use]
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a viewport at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(self) -> i32 {
        self.max_x - self.min_x
    }

    /// Returns the height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(self) -> i32 {
        self.max_y - self.min_y
    }

    /// Returns whether the viewport covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    /// Returns whether pixel `(x, y)` lies inside the viewport.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Scales every edge by `inv_res`, truncating toward zero.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "truncation toward zero is the defined rounding for rezed windows"
    )]
    #[must_use]
    pub fn scaled(self, inv_res: f32) -> Self {
        let scale = |v: i32| (v as f32 * inv_res) as i32;
        Self::new(
            scale(self.min_x),
            scale(self.min_y),
            scale(self.max_x),
            scale(self.max_y),
        )
    }

    /// Clamps the viewport to `bounds`: the larger of the minimums and the
    /// smaller of the maximums.
    #[must_use]
    pub fn clipped_to(self, bounds: Self) -> Self {
        Self::new(
            self.min_x.max(bounds.min_x),
            self.min_y.max(bounds.min_y),
            self.max_x.min(bounds.max_x),
            self.max_y.min(bounds.max_y),
        )
    }

    /// Decodes a packed window attribute; `None` if unset or malformed.
    #[must_use]
    pub fn from_setting(values: &[i32]) -> Option<Self> {
        match *values {
            [min_x, min_y, max_x, max_y] if min_x != UNSET => {
                Some(Self::new(min_x, min_y, max_x, max_y))
            }
            _ => None,
        }
    }

    /// Encodes the viewport as a window attribute value.
    #[must_use]
    pub fn to_setting(self) -> Vec<i32> {
        vec![self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Returns the packed encoding of an unset window.
    #[must_use]
    pub fn unset_setting() -> Vec<i32> {
        vec![UNSET; 4]
    }

    /// Converts to a floating-point rectangle.
    #[must_use]
    pub fn to_rect(self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.min_x),
            f64::from(self.min_y),
            f64::from(self.max_x),
            f64::from(self.max_y),
        )
    }
}

impl From<Viewport> for kurbo::Rect {
    fn from(viewport: Viewport) -> Self {
        viewport.to_rect()
    }
}

/// Decodes a packed `(x, y)` pair attribute; `None` if unset or malformed.
#[must_use]
pub fn pair_from_setting(values: &[i32]) -> Option<(i32, i32)> {
    match *values {
        [x, y] if x != UNSET => Some((x, y)),
        _ => None,
    }
}

/// A resolved value together with whether a user override produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value.
    pub value: T,
    /// Whether an explicitly configured override was applied.
    pub user_set: bool,
}
