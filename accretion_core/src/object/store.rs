// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays object storage with class registration, typed attribute
//! access, and change bookkeeping.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::Cell;
use core::mem;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::change::ChangeSet;
use super::id::ObjectId;
use super::references::References;
use super::update::Memo;
use crate::attribute::{
    Attribute, AttributeError, AttributeKey, AttributeKind, AttributeValue, ClassBuilder, ClassId,
    Interface, SceneClass,
};
use crate::dirty;
use crate::trace::UpdateSummary;

/// Struct-of-arrays storage for all scene objects and their classes.
///
/// Objects are addressed by [`ObjectId`] handles. Each object occupies a slot
/// in parallel arrays; destroyed objects are recycled via a free list, and
/// generation counters turn references to destroyed objects into dangling
/// handles that lookups skip.
///
/// The store is deliberately not `Sync`: the update walk writes per-object
/// memo cells through a shared reference.
#[derive(Debug)]
pub struct ObjectStore {
    // -- Classes --
    pub(crate) classes: Vec<SceneClass>,

    // -- Identity --
    pub(crate) class_of: Vec<ClassId>,
    pub(crate) name: Vec<String>,
    /// Live slots in creation order.
    pub(crate) order: Vec<u32>,

    // -- Attribute state (set by callers) --
    pub(crate) values: Vec<Vec<AttributeValue>>,
    pub(crate) bindings: Vec<BTreeMap<u32, ObjectId>>,
    pub(crate) changes: Vec<ChangeSet>,
    /// Outgoing dependency edges with multiplicity (target slot -> count).
    pub(crate) edges: Vec<BTreeMap<u32, u32>>,
    pub(crate) rejected_edges: u32,

    // -- Update state (written by the update walk) --
    pub(crate) attribute_tree_changed: Vec<Cell<bool>>,
    pub(crate) memo: Vec<Cell<Memo>>,
    pub(crate) epoch: u64,
    pub(crate) summary: Cell<UpdateSummary>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore {
    /// Creates an empty store with no registered classes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            class_of: Vec::new(),
            name: Vec::new(),
            order: Vec::new(),
            values: Vec::new(),
            bindings: Vec::new(),
            changes: Vec::new(),
            edges: Vec::new(),
            rejected_edges: 0,
            attribute_tree_changed: Vec::new(),
            memo: Vec::new(),
            epoch: 0,
            summary: Cell::new(UpdateSummary::default()),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    // -- Class API --

    /// Registers a class and returns its handle together with the keys the
    /// `declare` closure produced.
    ///
    /// A derived class starts from a copy of its base's attribute table, so
    /// keys declared on the base remain valid for it.
    ///
    /// # Panics
    ///
    /// Panics if a class with the same name is already registered or if
    /// `base` is unknown.
    pub fn register_class<R>(
        &mut self,
        name: &str,
        base: Option<ClassId>,
        interface: Interface,
        declare: impl FnOnce(&mut ClassBuilder) -> R,
    ) -> (ClassId, R) {
        assert!(
            self.find_class(name).is_none(),
            "class `{name}` already registered"
        );
        #[expect(
            clippy::cast_possible_truncation,
            reason = "class counts never approach u32::MAX"
        )]
        let id = ClassId(self.classes.len() as u32);
        let base = base.map(|b| self.class(b));
        let mut builder = ClassBuilder::new(id, name, interface, base);
        let keys = declare(&mut builder);
        self.classes.push(builder.finish());
        (id, keys)
    }

    /// Returns a registered class.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this store.
    #[must_use]
    pub fn class(&self, id: ClassId) -> &SceneClass {
        assert!(
            (id.0 as usize) < self.classes.len(),
            "unknown {id:?} ({} classes registered)",
            self.classes.len()
        );
        &self.classes[id.0 as usize]
    }

    /// Looks a class up by name.
    #[must_use]
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .find(|c| c.name() == name)
            .map(SceneClass::id)
    }

    // -- Allocation API --

    /// Creates an object of `class` with every attribute at its default.
    ///
    /// The new object reports all attributes as changed until the next
    /// [`commit_changes`](Self::commit_changes).
    pub fn create_object(&mut self, class: ClassId, name: &str) -> ObjectId {
        let defaults: Vec<AttributeValue> = self
            .class(class)
            .attributes()
            .iter()
            .map(|a| a.default_value().clone())
            .collect();
        let changes = ChangeSet::created(defaults.len());

        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.class_of[i] = class;
            self.name[i] = name.to_string();
            self.values[i] = defaults;
            self.bindings[i].clear();
            self.changes[i] = changes;
            self.edges[i].clear();
            self.attribute_tree_changed[i].set(false);
            self.memo[i].set(Memo::default());
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.class_of.push(class);
            self.name.push(name.to_string());
            self.values.push(defaults);
            self.bindings.push(BTreeMap::new());
            self.changes.push(changes);
            self.edges.push(BTreeMap::new());
            self.attribute_tree_changed.push(Cell::new(false));
            self.memo.push(Cell::new(Memo::default()));
            self.generation.push(0);
            idx
        };

        self.order.push(idx);
        self.dirty.mark_with(idx, dirty::ATTRIBUTE_TREE, &EagerPolicy);

        ObjectId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys an object, freeing its slot for reuse.
    ///
    /// Objects that referenced it keep a dangling handle, which reference
    /// iteration and the update walk treat as null. Their attribute trees are
    /// marked changed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_object(&mut self, id: ObjectId) {
        self.validate(id);
        let idx = id.idx;

        // Referencers observe the removal before the edges go away.
        self.dirty.mark_with(idx, dirty::ATTRIBUTE_TREE, &EagerPolicy);
        self.dirty.remove_key(idx);
        for edges in &mut self.edges {
            edges.remove(&idx);
        }

        let i = idx as usize;
        self.values[i].clear();
        self.bindings[i].clear();
        self.edges[i].clear();
        self.name[i].clear();

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(idx);
        self.order.retain(|&o| o != idx);
    }

    /// Returns whether the given handle refers to a live object.
    #[must_use]
    pub fn is_alive(&self, id: ObjectId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns whether the store holds no live objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // -- Lookup API --

    /// Returns the live objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.order.iter().map(|&idx| self.handle(idx))
    }

    /// Returns the live objects whose class implements `interface`, in
    /// creation order.
    pub fn objects_with_interface(
        &self,
        interface: Interface,
    ) -> impl Iterator<Item = ObjectId> + '_ {
        self.order
            .iter()
            .filter(move |&&idx| self.class_at(idx).is_a(interface))
            .map(|&idx| self.handle(idx))
    }

    /// Finds the first live object named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.order
            .iter()
            .find(|&&idx| self.name[idx as usize] == name)
            .map(|&idx| self.handle(idx))
    }

    /// Returns the object's name.
    #[must_use]
    pub fn name(&self, id: ObjectId) -> &str {
        self.validate(id);
        &self.name[id.idx as usize]
    }

    /// Returns the object's class.
    #[must_use]
    pub fn class_of(&self, id: ObjectId) -> &SceneClass {
        self.validate(id);
        self.class_at(id.idx)
    }

    /// Returns an iterator over the live objects referenced by `id`'s
    /// reference attributes, in declaration order.
    #[must_use]
    pub fn references(&self, id: ObjectId) -> References<'_> {
        self.validate(id);
        References::new(self, &self.values[id.idx as usize])
    }

    // -- Attribute API --

    /// Returns the current value of an attribute.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `key` does not belong to the
    /// object's class.
    #[must_use]
    pub fn get<T: AttributeKind>(&self, id: ObjectId, key: AttributeKey<T>) -> &T {
        self.validate(id);
        self.class_at(id.idx).validate_key(key);
        let value = &self.values[id.idx as usize][key.index as usize];
        let Some(v) = T::from_value(value) else {
            unreachable!("stored value of {key:?} does not match its declared type");
        };
        v
    }

    /// Sets an attribute value.
    ///
    /// Reference attributes only accept live objects implementing the
    /// attribute's interface filter. A successful edit updates the change
    /// flags and marks the attribute tree of this object, and of every object
    /// that depends on it, as changed.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::InterfaceMismatch`] or
    /// [`AttributeError::StaleReference`] for rejected reference values; the
    /// stored value is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `key` does not belong to the
    /// object's class.
    pub fn set<T: AttributeKind>(
        &mut self,
        id: ObjectId,
        key: AttributeKey<T>,
        value: T,
    ) -> Result<(), AttributeError> {
        self.validate(id);
        let class = self.class_at(id.idx);
        class.validate_key(key);
        let value = value.into_value();
        self.check_references(class.attribute(key.index), &value)?;

        let (i, a) = (id.idx as usize, key.index as usize);
        let added: Vec<u32> = value.referenced().iter().map(|r| r.idx).collect();
        let previous = mem::replace(&mut self.values[i][a], value);
        if previous == self.values[i][a] {
            return Ok(());
        }
        // Dead targets lost their edges in `destroy_object`; their slot may
        // already belong to a new object.
        let removed: Vec<u32> = previous
            .referenced()
            .iter()
            .filter(|&&r| self.is_alive(r))
            .map(|r| r.idx)
            .collect();

        // Link before unlinking so shared targets keep their edge.
        for target in added {
            self.link(id.idx, target);
        }
        for target in removed {
            self.unlink(id.idx, target);
        }

        self.changes[i].record_edit(key.index, &previous, &self.values[i][a]);
        self.dirty
            .mark_with(id.idx, dirty::ATTRIBUTE_TREE, &EagerPolicy);
        Ok(())
    }

    /// Binds an attribute to an external driver object, or removes the
    /// binding with `None`.
    ///
    /// The bound object depends on the driver: edits to the driver mark the
    /// bound object's attribute tree as changed, and report the binding as
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::StaleDriver`] if `driver` is destroyed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `key` does not belong to the
    /// object's class.
    pub fn bind<T: AttributeKind>(
        &mut self,
        id: ObjectId,
        key: AttributeKey<T>,
        driver: Option<ObjectId>,
    ) -> Result<(), AttributeError> {
        self.validate(id);
        let class = self.class_at(id.idx);
        class.validate_key(key);
        if let Some(d) = driver.filter(|&d| !self.is_alive(d)) {
            return Err(AttributeError::StaleDriver {
                attribute: class.attribute(key.index).name().to_string(),
                driver: d,
            });
        }

        let bindings = &mut self.bindings[id.idx as usize];
        let previous = match driver {
            Some(d) => bindings.insert(key.index, d),
            None => bindings.remove(&key.index),
        };
        if previous == driver {
            return Ok(());
        }
        if let Some(d) = driver {
            self.link(id.idx, d.idx);
        }
        if let Some(p) = previous.filter(|&p| self.is_alive(p)) {
            self.unlink(id.idx, p.idx);
        }

        self.changes[id.idx as usize].mark_binding(key.index);
        self.dirty
            .mark_with(id.idx, dirty::ATTRIBUTE_TREE, &EagerPolicy);
        Ok(())
    }

    /// Records that a bound attribute's driver produced new output.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, `key` does not belong to the object's
    /// class, or the attribute is not bound.
    pub fn touch_binding<T: AttributeKind>(&mut self, id: ObjectId, key: AttributeKey<T>) {
        self.validate(id);
        let class = self.class_at(id.idx);
        class.validate_key(key);
        assert!(
            self.bindings[id.idx as usize].contains_key(&key.index),
            "attribute `{}` is not bound",
            class.attribute(key.index).name()
        );
        self.changes[id.idx as usize].mark_binding(key.index);
        self.dirty
            .mark_with(id.idx, dirty::ATTRIBUTE_TREE, &EagerPolicy);
    }

    /// Returns the driver an attribute is bound to, if any.
    #[must_use]
    pub fn binding<T: AttributeKind>(&self, id: ObjectId, key: AttributeKey<T>) -> Option<ObjectId> {
        self.validate(id);
        self.class_at(id.idx).validate_key(key);
        self.bindings[id.idx as usize].get(&key.index).copied()
    }

    // -- Change tracking API --

    /// Returns whether the attribute differs from its value at the start of
    /// the current edit/evaluate cycle.
    #[must_use]
    pub fn has_changed<T: AttributeKind>(&self, id: ObjectId, key: AttributeKey<T>) -> bool {
        self.validate(id);
        self.class_at(id.idx).validate_key(key);
        self.changes[id.idx as usize].value_changed(key.index)
    }

    /// Returns whether the attribute's binding changed this cycle: it was
    /// assigned, removed, or touched, or its driver changed.
    #[must_use]
    pub fn has_binding_changed<T: AttributeKind>(
        &self,
        id: ObjectId,
        key: AttributeKey<T>,
    ) -> bool {
        self.validate(id);
        self.class_at(id.idx).validate_key(key);
        self.binding_changed_at(id.idx, key.index)
    }

    /// Returns whether any attribute of the object, or the attribute tree
    /// of anything it depends on, changed this cycle.
    ///
    /// Dependent objects are only marked once
    /// [`begin_update`](Self::begin_update) has drained pending edits.
    #[must_use]
    pub fn attribute_tree_changed(&self, id: ObjectId) -> bool {
        self.validate(id);
        self.attribute_tree_changed[id.idx as usize].get()
    }

    /// Ends the edit/evaluate cycle: clears every change flag, baseline, and
    /// attribute-tree marker.
    pub fn commit_changes(&mut self) {
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::ATTRIBUTE_TREE)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &self.order {
            self.changes[idx as usize].commit();
            self.attribute_tree_changed[idx as usize].set(false);
        }
    }

    /// Returns how many dependency edges were skipped because they would
    /// have closed a cycle in the dirty tracker.
    #[must_use]
    pub fn rejected_edge_count(&self) -> u32 {
        self.rejected_edges
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ObjectId) {
        assert!(
            self.is_alive(id),
            "stale ObjectId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn handle(&self, idx: u32) -> ObjectId {
        ObjectId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn class_at(&self, idx: u32) -> &SceneClass {
        &self.classes[self.class_of[idx as usize].0 as usize]
    }

    pub(crate) fn binding_changed_at(&self, idx: u32, attribute: u32) -> bool {
        if self.changes[idx as usize].binding_changed(attribute) {
            return true;
        }
        self.bindings[idx as usize]
            .get(&attribute)
            .is_some_and(|&driver| {
                self.is_alive(driver)
                    && (self.changes[driver.idx as usize].any_changed()
                        || self.attribute_tree_changed[driver.idx as usize].get())
            })
    }

    fn check_references(
        &self,
        attribute: &Attribute,
        value: &AttributeValue,
    ) -> Result<(), AttributeError> {
        let filter = attribute.object_interface();
        for &target in value.referenced() {
            if !self.is_alive(target) {
                return Err(AttributeError::StaleReference {
                    attribute: attribute.name().to_string(),
                    object: target,
                });
            }
            let found = self.class_at(target.idx).interface();
            if !found.contains(filter) {
                return Err(AttributeError::InterfaceMismatch {
                    attribute: attribute.name().to_string(),
                    object: self.name[target.idx as usize].clone(),
                    expected: filter,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Records that `from` depends on `to`.
    fn link(&mut self, from: u32, to: u32) {
        let count = self.edges[from as usize].entry(to).or_insert(0);
        *count += 1;
        if *count == 1
            && self
                .dirty
                .add_dependency(from, to, dirty::ATTRIBUTE_TREE)
                .is_err()
        {
            self.rejected_edges += 1;
        }
    }

    /// Drops one `from -> to` dependency, removing the edge at zero.
    fn unlink(&mut self, from: u32, to: u32) {
        let edges = &mut self.edges[from as usize];
        let Some(count) = edges.get_mut(&to) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            edges.remove(&to);
            self.dirty
                .remove_dependency(from, to, dirty::ATTRIBUTE_TREE);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::attribute::{AttributeFlags, ObjectVector, SceneObjectRef};

    struct Keys {
        count: AttributeKey<i32>,
        target: AttributeKey<SceneObjectRef>,
        list: AttributeKey<ObjectVector>,
    }

    fn setup() -> (ObjectStore, ClassId, Keys, ClassId) {
        let mut store = ObjectStore::new();
        let (node, keys) = store.register_class("Node", None, Interface::GEOMETRY, |b| Keys {
            count: b.declare("count", 0),
            target: b.declare_with(
                "target",
                None,
                AttributeFlags::empty(),
                Interface::GEOMETRY,
            ),
            list: b.declare("list", ObjectVector::default()),
        });
        let (light, ()) = store.register_class("Light", None, Interface::LIGHT, |_| ());
        (store, node, keys, light)
    }

    #[test]
    fn create_and_destroy() {
        let (mut store, node, _, _) = setup();
        let id = store.create_object(node, "a");
        assert!(store.is_alive(id));
        assert_eq!(store.len(), 1);
        store.destroy_object(id);
        assert!(!store.is_alive(id));
        assert!(store.is_empty());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let (mut store, node, _, _) = setup();
        let id1 = store.create_object(node, "a");
        store.destroy_object(id1);
        let id2 = store.create_object(node, "b");
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn defaults_and_typed_access() {
        let (mut store, node, keys, _) = setup();
        let id = store.create_object(node, "a");
        assert_eq!(*store.get(id, keys.count), 0);
        store.set(id, keys.count, 5).unwrap();
        assert_eq!(*store.get(id, keys.count), 5);
        assert_eq!(store.name(id), "a");
        assert_eq!(store.class_of(id).name(), "Node");
        assert_eq!(store.find("a"), Some(id));
        assert_eq!(store.find("missing"), None);
    }

    #[test]
    fn change_flags_follow_baseline() {
        let (mut store, node, keys, _) = setup();
        let id = store.create_object(node, "a");
        assert!(store.has_changed(id, keys.count), "new objects are changed");
        store.commit_changes();
        assert!(!store.has_changed(id, keys.count));

        store.set(id, keys.count, 3).unwrap();
        assert!(store.has_changed(id, keys.count));
        assert!(!store.has_changed(id, keys.list));

        store.set(id, keys.count, 0).unwrap();
        assert!(!store.has_changed(id, keys.count), "restored to baseline");
    }

    #[test]
    fn reference_filter_is_enforced() {
        let (mut store, node, keys, light) = setup();
        let a = store.create_object(node, "a");
        let l = store.create_object(light, "key light");

        let err = store.set(a, keys.target, Some(l)).unwrap_err();
        assert!(matches!(err, AttributeError::InterfaceMismatch { .. }));
        assert_eq!(*store.get(a, keys.target), None);

        // Unfiltered attributes accept anything.
        store.set(a, keys.list, ObjectVector(vec![l])).unwrap();
    }

    #[test]
    fn stale_reference_is_rejected() {
        let (mut store, node, keys, _) = setup();
        let a = store.create_object(node, "a");
        let b = store.create_object(node, "b");
        store.destroy_object(b);
        assert_eq!(
            store.set(a, keys.target, Some(b)),
            Err(AttributeError::StaleReference {
                attribute: "target".into(),
                object: b,
            })
        );
    }

    #[test]
    fn references_skip_null_and_dangling() {
        let (mut store, node, keys, _) = setup();
        let a = store.create_object(node, "a");
        let b = store.create_object(node, "b");
        let c = store.create_object(node, "c");
        store.set(a, keys.target, Some(b)).unwrap();
        store.set(a, keys.list, ObjectVector(vec![c, b])).unwrap();
        assert_eq!(store.references(a).collect::<Vec<_>>(), vec![b, c, b]);

        store.destroy_object(c);
        assert_eq!(store.references(a).collect::<Vec<_>>(), vec![b, b]);
        assert_eq!(store.references(b).count(), 0);
    }

    #[test]
    fn objects_with_interface_in_creation_order() {
        let (mut store, node, _, light) = setup();
        let a = store.create_object(node, "a");
        let l = store.create_object(light, "l");
        let b = store.create_object(node, "b");
        assert_eq!(
            store
                .objects_with_interface(Interface::GEOMETRY)
                .collect::<Vec<_>>(),
            vec![a, b]
        );
        assert_eq!(store.objects().collect::<Vec<_>>(), vec![a, l, b]);
    }

    #[test]
    fn binding_assignment_and_touch() {
        let (mut store, node, keys, light) = setup();
        let a = store.create_object(node, "a");
        let driver = store.create_object(light, "driver");
        store.commit_changes();

        store.bind(a, keys.count, Some(driver)).unwrap();
        assert_eq!(store.binding(a, keys.count), Some(driver));
        assert!(store.has_binding_changed(a, keys.count));
        assert!(!store.has_changed(a, keys.count));
        store.commit_changes();
        assert!(!store.has_binding_changed(a, keys.count));

        store.touch_binding(a, keys.count);
        assert!(store.has_binding_changed(a, keys.count));
    }

    #[test]
    fn driver_edits_count_as_binding_changes() {
        let (mut store, node, keys, _) = setup();
        let a = store.create_object(node, "a");
        let driver = store.create_object(node, "driver");
        store.bind(a, keys.count, Some(driver)).unwrap();
        store.commit_changes();
        assert!(!store.has_binding_changed(a, keys.count));

        store.set(driver, keys.count, 9).unwrap();
        assert!(store.has_binding_changed(a, keys.count));
    }

    #[test]
    fn stale_driver_is_rejected() {
        let (mut store, node, keys, _) = setup();
        let a = store.create_object(node, "a");
        let d = store.create_object(node, "d");
        store.destroy_object(d);
        assert!(matches!(
            store.bind(a, keys.count, Some(d)),
            Err(AttributeError::StaleDriver { .. })
        ));
    }

    #[test]
    fn self_reference_edge_is_skipped() {
        let (mut store, node, keys, _) = setup();
        let a = store.create_object(node, "a");
        let b = store.create_object(node, "b");
        store.set(a, keys.target, Some(b)).unwrap();
        assert_eq!(store.rejected_edge_count(), 0);
        store.set(b, keys.target, Some(a)).unwrap();
        assert_eq!(store.rejected_edge_count(), 1);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_class_panics() {
        let (mut store, _, _, _) = setup();
        store.register_class("Node", None, Interface::GENERIC, |_| ());
    }

    #[test]
    #[should_panic(expected = "is not bound")]
    fn touch_unbound_panics() {
        let (mut store, node, keys, _) = setup();
        let a = store.create_object(node, "a");
        store.touch_binding(a, keys.count);
    }

    #[test]
    #[should_panic(expected = "is not declared on class")]
    fn key_from_unrelated_class_panics() {
        let (mut store, _, keys, light) = setup();
        let l = store.create_object(light, "l");
        let _ = store.get(l, keys.count);
    }

    #[test]
    #[should_panic(expected = "stale ObjectId")]
    fn destroyed_handle_panics_on_get() {
        let (mut store, node, keys, _) = setup();
        let id = store.create_object(node, "a");
        store.destroy_object(id);
        let _ = store.get(id, keys.count);
    }

    #[test]
    #[should_panic(expected = "stale ObjectId")]
    fn destroyed_handle_panics_on_set() {
        let (mut store, node, keys, _) = setup();
        let id = store.create_object(node, "a");
        store.destroy_object(id);
        let _ = store.set(id, keys.count, 1);
    }
}
