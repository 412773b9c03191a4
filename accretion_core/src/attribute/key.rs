// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed, class-scoped attribute handles.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use super::class::ClassId;
use super::kind::{AttributeKind, AttributeType};

/// A handle to one declared attribute of one class.
///
/// Keys are produced by [`ClassBuilder::declare`](super::ClassBuilder::declare)
/// while a class is registered, and carry the attribute's Rust value type
/// statically. A key stays valid for the declaring class and every class
/// derived from it, since derived classes inherit the attribute table
/// unchanged. Using a key against an object of any other class panics.
pub struct AttributeKey<T> {
    /// Class that declared the attribute.
    pub(crate) class: ClassId,
    /// Position in the declaring class's attribute table.
    pub(crate) index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AttributeKey<T> {
    pub(crate) const fn new(class: ClassId, index: u32) -> Self {
        Self {
            class,
            index,
            _marker: PhantomData,
        }
    }

    /// Returns the attribute's position in declaration order.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the class that declared the attribute.
    #[inline]
    #[must_use]
    pub const fn declaring_class(self) -> ClassId {
        self.class
    }
}

impl<T: AttributeKind> AttributeKey<T> {
    /// Returns the attribute's type tag.
    #[inline]
    #[must_use]
    pub const fn attribute_type(self) -> AttributeType {
        T::TYPE
    }
}

// Manual impls: deriving would bound `T` by each trait.

impl<T> Clone for AttributeKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AttributeKey<T> {}

impl<T> PartialEq for AttributeKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.index == other.index
    }
}

impl<T> Eq for AttributeKey<T> {}

impl<T> Hash for AttributeKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for AttributeKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeKey(#{} of {:?})", self.index, self.class)
    }
}
