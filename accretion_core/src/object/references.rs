// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference traversal utilities.

use super::id::ObjectId;
use super::store::ObjectStore;
use crate::attribute::AttributeValue;

/// An iterator over the live objects referenced by one object.
///
/// Yields targets of single references, object vectors, and indexable
/// collections in attribute declaration order, then element order. Null and
/// dangling references are skipped; a target referenced twice is yielded
/// twice.
///
/// Created by [`ObjectStore::references`].
#[derive(Debug)]
pub struct References<'a> {
    store: &'a ObjectStore,
    values: &'a [AttributeValue],
    attribute: usize,
    element: usize,
}

impl<'a> References<'a> {
    pub(crate) fn new(store: &'a ObjectStore, values: &'a [AttributeValue]) -> Self {
        Self {
            store,
            values,
            attribute: 0,
            element: 0,
        }
    }
}

impl Iterator for References<'_> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<ObjectId> {
        loop {
            let targets = self.values.get(self.attribute)?.referenced();
            match targets.get(self.element) {
                Some(&target) => {
                    self.element += 1;
                    if self.store.is_alive(target) {
                        return Some(target);
                    }
                }
                None => {
                    self.attribute += 1;
                    self.element = 0;
                }
            }
        }
    }
}
