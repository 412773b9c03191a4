// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object change flags for one edit/evaluate cycle.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use crate::attribute::AttributeValue;

/// Fixed-size bitset indexed by attribute position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Bits(Vec<u64>);

impl Bits {
    fn with_len(len: usize) -> Self {
        Self(vec![0; len.div_ceil(64)])
    }

    fn get(&self, i: u32) -> bool {
        self.0[(i / 64) as usize] & (1 << (i % 64)) != 0
    }

    fn set(&mut self, i: u32, on: bool) {
        let word = &mut self.0[(i / 64) as usize];
        if on {
            *word |= 1 << (i % 64);
        } else {
            *word &= !(1 << (i % 64));
        }
    }

    fn any(&self) -> bool {
        self.0.iter().any(|&w| w != 0)
    }

    fn clear(&mut self) {
        self.0.fill(0);
    }
}

/// Value and binding change flags of one object.
///
/// A value counts as changed when it differs from the baseline captured at
/// its first edit in the current cycle, so setting it back clears the flag.
/// Objects created during the cycle report every attribute as changed.
#[derive(Clone, Debug)]
pub(crate) struct ChangeSet {
    values: Bits,
    bindings: Bits,
    baseline: BTreeMap<u32, AttributeValue>,
    created: bool,
}

impl ChangeSet {
    /// Change set for an object created in the current cycle.
    pub(crate) fn created(attribute_count: usize) -> Self {
        Self {
            values: Bits::with_len(attribute_count),
            bindings: Bits::with_len(attribute_count),
            baseline: BTreeMap::new(),
            created: true,
        }
    }

    /// Records an edit of attribute `index` from `previous` to `current`.
    pub(crate) fn record_edit(
        &mut self,
        index: u32,
        previous: &AttributeValue,
        current: &AttributeValue,
    ) {
        let baseline = self
            .baseline
            .entry(index)
            .or_insert_with(|| previous.clone());
        let changed = baseline != current;
        self.values.set(index, changed);
    }

    pub(crate) fn mark_binding(&mut self, index: u32) {
        self.bindings.set(index, true);
    }

    pub(crate) fn value_changed(&self, index: u32) -> bool {
        self.created || self.values.get(index)
    }

    pub(crate) fn binding_changed(&self, index: u32) -> bool {
        self.bindings.get(index)
    }

    pub(crate) fn any_changed(&self) -> bool {
        self.created || self.values.any() || self.bindings.any()
    }

    /// Ends the cycle: current values become the new baseline.
    pub(crate) fn commit(&mut self) {
        self.values.clear();
        self.bindings.clear();
        self.baseline.clear();
        self.created = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(len: usize) -> ChangeSet {
        let mut changes = ChangeSet::created(len);
        changes.commit();
        changes
    }

    #[test]
    fn created_objects_report_all_changed() {
        let changes = ChangeSet::created(3);
        assert!(changes.value_changed(0));
        assert!(changes.value_changed(2));
        assert!(!changes.binding_changed(0));
        assert!(changes.any_changed());
    }

    #[test]
    fn edit_back_to_baseline_clears_flag() {
        let mut changes = committed(2);
        let one = AttributeValue::Int(1);
        let two = AttributeValue::Int(2);

        changes.record_edit(1, &one, &two);
        assert!(changes.value_changed(1));
        assert!(!changes.value_changed(0));

        changes.record_edit(1, &two, &one);
        assert!(!changes.value_changed(1));
        assert!(!changes.any_changed());
    }

    #[test]
    fn bits_span_multiple_words() {
        let mut changes = committed(130);
        let a = AttributeValue::Bool(false);
        let b = AttributeValue::Bool(true);
        changes.record_edit(129, &a, &b);
        changes.mark_binding(64);
        assert!(changes.value_changed(129));
        assert!(changes.binding_changed(64));
        assert!(!changes.binding_changed(63));

        changes.commit();
        assert!(!changes.any_changed());
    }
}
