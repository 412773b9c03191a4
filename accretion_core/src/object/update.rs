// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Update passes and the geometry staleness walk.
//!
//! An update pass is opened with [`ObjectStore::begin_update`], which drains
//! pending edits from the [`ATTRIBUTE_TREE`](crate::dirty::ATTRIBUTE_TREE)
//! channel into per-object "attribute tree changed" markers and starts a new
//! epoch. Within the pass, [`ObjectStore::requires_update`] answers whether an
//! object's derived geometry must be regenerated:
//!
//! 1. A memo stamped with the current epoch answers immediately. An object
//!    still being resolved further up the walk answers "not stale" (cycle).
//! 2. Attributes are scanned in declaration order, skipping those flagged
//!    [`CAN_SKIP_GEOM_RELOAD`](crate::attribute::AttributeFlags::CAN_SKIP_GEOM_RELOAD).
//! 3. A changed value or binding makes the object stale immediately.
//! 4. Referenced objects are asked in element order. Geometry references are
//!    resolved recursively and, only if stale, handed to the caller's
//!    [`UpdatePrep`]. Every other kind of reference is always prepared, and
//!    its preparation result decides.
//! 5. An object with no stale cause clears its attribute-tree marker.
//!
//! A "not stale" answer that relied on a cycle is provisional: it holds only
//! if the object the cycle closed on also ends up clean. Such answers are
//! memoized once that object resolves clean, and dropped if it resolves
//! stale, so the answer for every member of a cycle does not depend on which
//! member is queried first.
//!
//! The walk recurses once per reference hop. Its native stack depth is the
//! length of the longest acyclic reference chain below the queried object.
//!
//! Memo cells are written through `&self`, so edits cannot happen while a
//! walk is in progress; between queries of one pass the memo keeps earlier
//! answers even if the scene is edited.

use alloc::vec::Vec;

use super::id::ObjectId;
use super::store::ObjectStore;
use crate::attribute::Interface;
use crate::dirty;
use crate::trace::{
    CycleEvent, MemoHitEvent, ObjectResolvedEvent, ObjectVisitEvent, PrepEvent, StaleCause,
    StaleReason, Tracer, UpdateBeginEvent, UpdateSummary,
};

/// Resolution state of one object in one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum MemoState {
    /// Being resolved further up the current walk.
    Visiting,
    /// Up to date.
    #[default]
    Clean,
    /// Requires an update.
    Stale,
}

/// Epoch-stamped per-object memo. Epoch 0 never belongs to a pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Memo {
    pub(crate) epoch: u64,
    pub(crate) state: MemoState,
}

/// Side-effecting preparation for referenced objects that are not resolved
/// by the walk itself.
///
/// Called for every live non-geometry reference, and for geometry references
/// that were resolved as stale. Returns whether the object requires an
/// update. Closures of the matching signature implement this trait.
pub trait UpdatePrep {
    /// Prepares `id` for the coming update.
    fn update_prep(&mut self, store: &ObjectStore, id: ObjectId, depth: u32) -> bool;
}

impl<F> UpdatePrep for F
where
    F: FnMut(&ObjectStore, ObjectId, u32) -> bool,
{
    fn update_prep(&mut self, store: &ObjectStore, id: ObjectId, depth: u32) -> bool {
        self(store, id, depth)
    }
}

/// Preparation that performs no work and reports the object's
/// attribute-tree marker.
#[derive(Clone, Copy, Debug, Default)]
pub struct AttributeTreePrep;

impl UpdatePrep for AttributeTreePrep {
    fn update_prep(&mut self, store: &ObjectStore, id: ObjectId, _depth: u32) -> bool {
        store.attribute_tree_changed[id.idx as usize].get()
    }
}

struct Walk<'w, 'a> {
    prep: &'w mut dyn UpdatePrep,
    tracer: &'w mut Tracer<'a>,
    /// Objects being resolved, outermost first.
    path: Vec<u32>,
    /// Shallowest `path` position a cycle below the current object closed on.
    low: usize,
    /// Clean answers waiting on an object still in `path`.
    provisional: Vec<u32>,
}

impl ObjectStore {
    /// Opens a new update pass.
    ///
    /// Drains pending edits into attribute-tree markers (the edited objects
    /// and everything that references or is bound to them) and invalidates
    /// every memo from earlier passes.
    pub fn begin_update(&mut self) -> UpdateBeginEvent {
        let dirty: Vec<u32> = self
            .dirty
            .drain(dirty::ATTRIBUTE_TREE)
            .affected()
            .deterministic()
            .run()
            .collect();
        let mut dirty_objects = 0;
        for idx in dirty {
            // Slots destroyed after being marked.
            if idx >= self.len || self.free_list.contains(&idx) {
                continue;
            }
            self.attribute_tree_changed[idx as usize].set(true);
            dirty_objects += 1;
        }

        self.epoch += 1;
        self.summary.set(UpdateSummary {
            epoch: self.epoch,
            dirty_objects,
            ..UpdateSummary::default()
        });
        UpdateBeginEvent {
            epoch: self.epoch,
            dirty_objects,
        }
    }

    /// Returns whether `id`'s derived geometry must be regenerated in the
    /// current pass.
    ///
    /// Repeated queries within a pass return the memoized answer. The walk
    /// recurses once per reference hop, so very long acyclic reference chains
    /// need a correspondingly large thread stack.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or no pass has been opened with
    /// [`begin_update`](Self::begin_update).
    pub fn requires_update(
        &self,
        id: ObjectId,
        prep: &mut dyn UpdatePrep,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        self.validate(id);
        assert!(self.epoch != 0, "requires_update called outside an update pass");
        let mut walk = Walk {
            prep,
            tracer,
            path: Vec::new(),
            low: usize::MAX,
            provisional: Vec::new(),
        };
        self.resolve(id.idx, 0, &mut walk)
    }

    /// [`requires_update`](Self::requires_update) with [`AttributeTreePrep`]
    /// and no tracing.
    #[must_use]
    pub fn requires_geometry_update(&self, id: ObjectId) -> bool {
        self.requires_update(id, &mut AttributeTreePrep, &mut Tracer::none())
    }

    /// Returns the memoized answer for `id` in the current pass, if it has
    /// been resolved.
    #[must_use]
    pub fn memoized(&self, id: ObjectId) -> Option<bool> {
        self.validate(id);
        let memo = self.memo[id.idx as usize].get();
        if memo.epoch != self.epoch || self.epoch == 0 {
            return None;
        }
        match memo.state {
            MemoState::Visiting => None,
            MemoState::Clean => Some(false),
            MemoState::Stale => Some(true),
        }
    }

    /// Returns the current pass epoch (0 before the first pass).
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns the counters of the current pass.
    #[must_use]
    pub fn update_summary(&self) -> UpdateSummary {
        self.summary.get()
    }

    /// Emits the counters of the current pass (and, with `trace-rich`, the
    /// stale objects) and returns the counters.
    pub fn finish_update(&self, tracer: &mut Tracer<'_>) -> UpdateSummary {
        #[cfg(feature = "trace-rich")]
        {
            let stale: Vec<u32> = self
                .order
                .iter()
                .copied()
                .filter(|&idx| {
                    self.memo[idx as usize].get()
                        == Memo {
                            epoch: self.epoch,
                            state: MemoState::Stale,
                        }
                })
                .collect();
            tracer.stale_objects(self.epoch, &stale);
        }
        let summary = self.summary.get();
        tracer.update_summary(&summary);
        summary
    }

    // -- Walk --

    fn resolve(&self, idx: u32, depth: u32, walk: &mut Walk<'_, '_>) -> bool {
        let epoch = self.epoch;
        let memo = self.memo[idx as usize].get();
        if memo.epoch == epoch {
            if memo.state == MemoState::Visiting {
                if let Some(pos) = walk.path.iter().position(|&p| p == idx) {
                    walk.low = walk.low.min(pos);
                }
                self.count(|s| s.cycles += 1);
                walk.tracer.cycle(&CycleEvent {
                    epoch,
                    object: idx,
                    depth,
                });
                return false;
            }
            let stale = memo.state == MemoState::Stale;
            self.count(|s| s.memo_hits += 1);
            walk.tracer.memo_hit(&MemoHitEvent {
                epoch,
                object: idx,
                depth,
                stale,
            });
            return stale;
        }

        self.memo[idx as usize].set(Memo {
            epoch,
            state: MemoState::Visiting,
        });
        walk.tracer.object_visit(&ObjectVisitEvent {
            epoch,
            object: idx,
            depth,
        });

        let pos = walk.path.len();
        walk.path.push(idx);
        let outer_low = core::mem::replace(&mut walk.low, usize::MAX);
        let pending = walk.provisional.len();
        let cause = self.stale_cause(idx, depth, walk);
        walk.path.pop();
        let low = core::mem::replace(&mut walk.low, outer_low);

        if cause.is_some() {
            // Provisional answers below re-resolve on their next query.
            walk.provisional.truncate(pending);
            self.memo[idx as usize].set(Memo {
                epoch,
                state: MemoState::Stale,
            });
        } else if low < pos {
            // Clean only if the object at `low` resolves clean too.
            self.memo[idx as usize].set(Memo::default());
            walk.provisional.push(idx);
            walk.low = walk.low.min(low);
        } else {
            walk.provisional.push(idx);
            for member in walk.provisional.drain(pending..) {
                self.attribute_tree_changed[member as usize].set(false);
                self.memo[member as usize].set(Memo {
                    epoch,
                    state: MemoState::Clean,
                });
            }
        }
        self.count(|s| {
            s.visited += 1;
            s.stale += u32::from(cause.is_some());
        });
        walk.tracer.object_resolved(&ObjectResolvedEvent {
            epoch,
            object: idx,
            depth,
            cause,
        });
        cause.is_some()
    }

    /// Finds the first attribute that makes `idx` stale.
    fn stale_cause(&self, idx: u32, depth: u32, walk: &mut Walk<'_, '_>) -> Option<StaleCause> {
        let changes = &self.changes[idx as usize];
        let values = &self.values[idx as usize];
        for (attribute, declaration) in (0_u32..).zip(self.class_at(idx).attributes()) {
            if !declaration.update_requires_geom_reload() {
                continue;
            }
            let reason = if changes.value_changed(attribute) {
                StaleReason::ValueChanged
            } else if self.binding_changed_at(idx, attribute) {
                StaleReason::BindingChanged
            } else if values[attribute as usize]
                .referenced()
                .iter()
                .any(|&target| self.reference_requires_update(target, depth + 1, walk))
            {
                StaleReason::Reference
            } else {
                continue;
            };
            return Some(StaleCause { reason, attribute });
        }
        None
    }

    fn reference_requires_update(
        &self,
        target: ObjectId,
        depth: u32,
        walk: &mut Walk<'_, '_>,
    ) -> bool {
        // Null and dangling references never make the referencer stale.
        if !self.is_alive(target) {
            return false;
        }
        let propagates = self.class_at(target.idx).is_a(Interface::GEOMETRY);
        if propagates && !self.resolve(target.idx, depth, walk) {
            return false;
        }

        let prepared = walk.prep.update_prep(self, target, depth);
        self.count(|s| s.preparations += 1);
        walk.tracer.prep(&PrepEvent {
            epoch: self.epoch,
            object: target.idx,
            depth,
            stale: prepared,
        });
        propagates || prepared
    }

    fn count(&self, f: impl FnOnce(&mut UpdateSummary)) {
        let mut summary = self.summary.get();
        f(&mut summary);
        self.summary.set(summary);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::attribute::{
        AttributeFlags, AttributeKey, ClassId, ObjectIndexable, ObjectVector, SceneObjectRef,
    };

    struct MeshKeys {
        points: AttributeKey<i32>,
        epsilon: AttributeKey<f32>,
        material: AttributeKey<SceneObjectRef>,
        refs: AttributeKey<ObjectVector>,
    }

    struct Scene {
        store: ObjectStore,
        mesh: ClassId,
        material: ClassId,
        keys: MeshKeys,
        color: AttributeKey<f32>,
        texture: AttributeKey<SceneObjectRef>,
    }

    impl Scene {
        fn new() -> Self {
            let mut store = ObjectStore::new();
            let (mesh, keys) = store.register_class("Mesh", None, Interface::GEOMETRY, |b| {
                MeshKeys {
                    points: b.declare("points", 0),
                    epsilon: b.declare_with(
                        "epsilon",
                        0.0,
                        AttributeFlags::CAN_SKIP_GEOM_RELOAD,
                        Interface::empty(),
                    ),
                    material: b.declare_with(
                        "material",
                        None,
                        AttributeFlags::empty(),
                        Interface::MATERIAL,
                    ),
                    refs: b.declare_with(
                        "references",
                        ObjectVector::default(),
                        AttributeFlags::empty(),
                        Interface::GEOMETRY,
                    ),
                }
            });
            let (material, (color, texture)) =
                store.register_class("Material", None, Interface::MATERIAL, |b| {
                    (
                        b.declare("color", 0.5),
                        b.declare_with(
                            "texture",
                            None,
                            AttributeFlags::empty(),
                            Interface::empty(),
                        ),
                    )
                });
            Self {
                store,
                mesh,
                material,
                keys,
                color,
                texture,
            }
        }

        fn mesh(&mut self, name: &str) -> ObjectId {
            self.store.create_object(self.mesh, name)
        }

        fn link(&mut self, from: ObjectId, to: &[ObjectId]) {
            self.store
                .set(from, self.keys.refs, ObjectVector(to.to_vec()))
                .unwrap();
        }

        /// Ends the setup cycle and opens a pass with no pending edits.
        fn settle(&mut self) {
            self.store.commit_changes();
            let _ = self.store.begin_update();
        }

        fn next_pass(&mut self) {
            let _ = self.store.begin_update();
        }
    }

    fn never(_: &ObjectStore, _: ObjectId, _: u32) -> bool {
        false
    }

    #[test]
    fn unchanged_object_is_clean() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        scene.settle();
        assert!(!scene.store.requires_geometry_update(a));
        assert!(!scene.store.attribute_tree_changed(a));
    }

    #[test]
    fn clean_resolution_clears_attribute_tree_marker() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        scene.settle();

        scene.store.set(a, scene.keys.epsilon, 0.01).unwrap();
        scene.next_pass();
        assert!(scene.store.attribute_tree_changed(a));
        assert!(!scene.store.requires_geometry_update(a));
        assert!(!scene.store.attribute_tree_changed(a));
    }

    #[test]
    fn skip_reload_attribute_alone_is_not_stale() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.settle();

        scene.store.set(b, scene.keys.epsilon, 1.0).unwrap();
        scene.next_pass();
        assert!(!scene.store.requires_geometry_update(a));
        assert!(!scene.store.requires_geometry_update(b));
    }

    #[test]
    fn changed_reload_attribute_short_circuits() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.settle();

        scene.store.set(a, scene.keys.points, 10).unwrap();
        scene.store.set(b, scene.keys.points, 10).unwrap();
        scene.next_pass();

        let mut prepared = Vec::new();
        let mut prep = |_: &ObjectStore, id: ObjectId, _: u32| {
            prepared.push(id);
            true
        };
        assert!(scene.store.requires_update(a, &mut prep, &mut Tracer::none()));
        assert!(prepared.is_empty(), "references are not scanned");
        assert_eq!(scene.store.memoized(b), None, "b was never visited");
    }

    #[test]
    fn stale_reference_makes_referencer_stale() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.settle();

        scene.store.set(b, scene.keys.points, 3).unwrap();
        scene.next_pass();
        assert!(scene.store.requires_geometry_update(a));
        assert_eq!(scene.store.memoized(b), Some(true));
    }

    #[test]
    fn memo_is_honored_within_a_pass() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.settle();

        scene.store.set(b, scene.keys.points, 3).unwrap();
        scene.next_pass();
        assert!(scene.store.requires_geometry_update(a));

        // Restoring b's value does not change answers within the pass.
        scene.store.set(b, scene.keys.points, 0).unwrap();
        assert!(!scene.store.has_changed(b, scene.keys.points));
        assert!(scene.store.requires_geometry_update(a));
        assert!(scene.store.requires_geometry_update(b));
        assert!(scene.store.update_summary().memo_hits >= 2);
    }

    #[test]
    fn memo_from_older_pass_is_ignored() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        scene.settle();

        scene.store.set(a, scene.keys.points, 1).unwrap();
        scene.next_pass();
        assert!(scene.store.requires_geometry_update(a));

        scene.store.commit_changes();
        scene.next_pass();
        assert_eq!(scene.store.memoized(a), None);
        assert!(!scene.store.requires_geometry_update(a));
    }

    #[test]
    fn diamond_resolves_shared_object_once() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        let c = scene.mesh("c");
        let d = scene.mesh("d");
        scene.link(a, &[b, c]);
        scene.link(b, &[d]);
        scene.link(c, &[d]);
        scene.settle();

        scene.store.set(d, scene.keys.epsilon, 2.0).unwrap();
        scene.next_pass();
        assert!(!scene.store.requires_geometry_update(a));

        let summary = scene.store.update_summary();
        assert_eq!(summary.visited, 4);
        assert_eq!(summary.memo_hits, 1);
        assert_eq!(summary.stale, 0);
    }

    #[test]
    fn cycle_terminates_as_not_stale() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.link(b, &[a]);
        scene.settle();

        assert!(!scene.store.requires_geometry_update(a));
        assert_eq!(scene.store.update_summary().cycles, 1);
        assert_eq!(scene.store.memoized(b), Some(false));
    }

    #[test]
    fn cycle_with_changed_member_is_stale() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.link(b, &[a]);
        scene.settle();

        scene.store.set(b, scene.keys.points, 7).unwrap();
        scene.next_pass();
        assert!(scene.store.requires_geometry_update(a));
        assert!(scene.store.requires_geometry_update(b));
    }

    /// A ring whose reference attribute is scanned before its own points.
    fn edited_ring() -> (ObjectStore, ObjectId, ObjectId) {
        let mut store = ObjectStore::new();
        let (ring, (refs, points)) = store.register_class("Ring", None, Interface::GEOMETRY, |b| {
            (
                b.declare_with(
                    "references",
                    ObjectVector::default(),
                    AttributeFlags::empty(),
                    Interface::GEOMETRY,
                ),
                b.declare("points", 0),
            )
        });
        let a = store.create_object(ring, "a");
        let b = store.create_object(ring, "b");
        store.set(a, refs, ObjectVector(vec![b])).unwrap();
        store.set(b, refs, ObjectVector(vec![a])).unwrap();
        store.commit_changes();
        let _ = store.begin_update();

        store.set(a, points, 3).unwrap();
        let _ = store.begin_update();
        (store, a, b)
    }

    #[test]
    fn cycle_answers_do_not_depend_on_query_order() {
        let (store, a, b) = edited_ring();
        assert!(store.requires_geometry_update(a));
        assert_eq!(store.memoized(b), None, "b's clean answer assumed a clean");
        assert!(store.requires_geometry_update(b));

        let (store, a, b) = edited_ring();
        assert!(store.requires_geometry_update(b));
        assert!(store.requires_geometry_update(a));
    }

    #[test]
    fn clean_cycle_is_memoized_for_every_member() {
        let (mut store, a, b) = edited_ring();
        store.commit_changes();
        let _ = store.begin_update();
        assert!(!store.requires_geometry_update(a));
        assert_eq!(store.memoized(b), Some(false));
        assert!(!store.attribute_tree_changed(b));
    }

    #[test]
    fn clean_geometry_reference_skips_prep() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.settle();

        let mut calls = 0;
        let mut prep = |_: &ObjectStore, _: ObjectId, _: u32| {
            calls += 1;
            true
        };
        assert!(!scene.store.requires_update(a, &mut prep, &mut Tracer::none()));
        assert_eq!(calls, 0);
    }

    #[test]
    fn stale_geometry_reference_is_prepared() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.settle();
        scene.store.set(b, scene.keys.points, 1).unwrap();
        scene.next_pass();

        let mut prepared = Vec::new();
        let mut prep = |_: &ObjectStore, id: ObjectId, depth: u32| {
            prepared.push((id, depth));
            false
        };
        assert!(scene.store.requires_update(a, &mut prep, &mut Tracer::none()));
        assert_eq!(prepared, vec![(b, 1)]);
    }

    #[test]
    fn non_geometry_reference_is_always_prepared() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let m = scene.store.create_object(scene.material, "m");
        scene
            .store
            .set(a, scene.keys.material, Some(m))
            .unwrap();
        scene.settle();

        assert!(!scene.store.requires_update(a, &mut never, &mut Tracer::none()));
        assert_eq!(scene.store.update_summary().preparations, 1);

        scene.next_pass();
        let mut always = |_: &ObjectStore, _: ObjectId, _: u32| true;
        assert!(scene.store.requires_update(a, &mut always, &mut Tracer::none()));
    }

    #[test]
    fn default_prep_follows_attribute_tree() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let m = scene.store.create_object(scene.material, "m");
        scene
            .store
            .set(a, scene.keys.material, Some(m))
            .unwrap();
        scene.settle();
        assert!(!scene.store.requires_geometry_update(a));

        scene.store.set(m, scene.color, 0.9).unwrap();
        scene.next_pass();
        assert!(scene.store.attribute_tree_changed(a), "edit propagated");
        assert!(scene.store.requires_geometry_update(a));
    }

    #[test]
    fn binding_change_makes_object_stale() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let driver = scene.store.create_object(scene.material, "curve");
        scene
            .store
            .bind(a, scene.keys.points, Some(driver))
            .unwrap();
        scene.settle();
        assert!(!scene.store.requires_geometry_update(a));

        scene.store.touch_binding(a, scene.keys.points);
        scene.next_pass();
        assert!(scene.store.requires_geometry_update(a));
    }

    #[test]
    fn binding_on_skip_reload_attribute_is_ignored() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let driver = scene.store.create_object(scene.material, "curve");
        scene
            .store
            .bind(a, scene.keys.epsilon, Some(driver))
            .unwrap();
        scene.settle();

        scene.store.touch_binding(a, scene.keys.epsilon);
        scene.next_pass();
        assert!(!scene.store.requires_geometry_update(a));
    }

    #[test]
    fn dangling_reference_is_not_stale() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.settle();

        scene.store.destroy_object(b);
        scene.next_pass();
        assert!(scene.store.attribute_tree_changed(a));
        assert!(!scene.store.requires_geometry_update(a));
    }

    #[test]
    fn reference_into_reused_slot_tracks_new_object() {
        let mut scene = Scene::new();
        let g = scene.mesh("g");
        let m = scene.store.create_object(scene.material, "m");
        let old = scene.store.create_object(scene.material, "old");
        scene.store.set(g, scene.keys.material, Some(m)).unwrap();
        scene.store.set(m, scene.texture, Some(old)).unwrap();
        scene.store.destroy_object(old);

        let new = scene.store.create_object(scene.material, "new");
        assert_eq!(new.index(), old.index(), "slot is reused");
        scene.store.set(m, scene.texture, Some(new)).unwrap();
        scene.settle();
        assert!(!scene.store.requires_geometry_update(g));

        scene.store.set(new, scene.color, 1.0).unwrap();
        scene.next_pass();
        assert!(scene.store.attribute_tree_changed(m), "edit reaches m");
        assert!(scene.store.requires_geometry_update(g));
    }

    #[test]
    fn rebinding_from_reused_slot_keeps_driver_edge() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let old = scene.store.create_object(scene.material, "old");
        scene.store.bind(a, scene.keys.points, Some(old)).unwrap();
        scene.store.destroy_object(old);

        let new = scene.store.create_object(scene.material, "new");
        assert_eq!(new.index(), old.index(), "slot is reused");
        scene.store.bind(a, scene.keys.points, Some(new)).unwrap();
        scene.settle();

        scene.store.set(new, scene.color, 0.25).unwrap();
        scene.next_pass();
        assert!(scene.store.attribute_tree_changed(a), "driver edit reaches a");
    }

    #[test]
    fn indexable_references_stop_at_first_stale_element() {
        let mut scene = Scene::new();
        let (instancer, instances) =
            scene
                .store
                .register_class("Instancer", None, Interface::GEOMETRY, |b| {
                    b.declare_with(
                        "instances",
                        ObjectIndexable::default(),
                        AttributeFlags::empty(),
                        Interface::GEOMETRY,
                    )
                });
        let clean = scene.mesh("clean");
        let stale = scene.mesh("stale");
        let unvisited = scene.mesh("unvisited");
        let root = scene.store.create_object(instancer, "root");
        scene
            .store
            .set(root, instances, ObjectIndexable(vec![clean, stale, unvisited]))
            .unwrap();
        scene.settle();

        scene.store.set(stale, scene.keys.points, 9).unwrap();
        scene.next_pass();

        let mut prepared = Vec::new();
        let mut prep = |_: &ObjectStore, id: ObjectId, _: u32| {
            prepared.push(id);
            false
        };
        assert!(scene.store.requires_update(root, &mut prep, &mut Tracer::none()));
        assert_eq!(prepared, vec![stale]);

        let summary = scene.store.update_summary();
        assert_eq!(summary.visited, 3);
        assert_eq!(summary.preparations, 1);
        assert_eq!(summary.stale, 2);
        assert_eq!(scene.store.memoized(clean), Some(false));
        assert_eq!(scene.store.memoized(unvisited), None, "scan stopped at stale");
    }

    #[test]
    fn long_reference_chain_reaches_head() {
        let mut scene = Scene::new();
        let chain: Vec<ObjectId> = (0..256)
            .map(|i| scene.mesh(&alloc::format!("n{i}")))
            .collect();
        for pair in chain.windows(2) {
            scene.link(pair[0], &[pair[1]]);
        }
        scene.settle();

        scene.store.set(chain[255], scene.keys.points, 1).unwrap();
        scene.next_pass();
        assert!(scene.store.requires_geometry_update(chain[0]));
        assert_eq!(scene.store.update_summary().visited, 256);
        assert_eq!(scene.store.update_summary().cycles, 0);
    }

    #[test]
    fn new_objects_are_stale() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        scene.next_pass();
        assert!(scene.store.requires_geometry_update(a));
    }

    #[test]
    fn begin_update_counts_propagated_objects() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        let c = scene.mesh("c");
        scene.link(a, &[b]);
        scene.link(b, &[c]);
        scene.settle();

        scene.store.set(c, scene.keys.epsilon, 4.0).unwrap();
        let begin = scene.store.begin_update();
        assert_eq!(begin.dirty_objects, 3);
        assert_eq!(begin.epoch, scene.store.epoch());
        assert!(scene.store.attribute_tree_changed(a));
    }

    #[test]
    #[should_panic(expected = "outside an update pass")]
    fn query_before_first_pass_panics() {
        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let _ = scene.store.requires_geometry_update(a);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn walk_emits_trace_events() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct RecordingSink {
            visits: Vec<u32>,
            causes: Vec<(u32, Option<StaleReason>)>,
            cycles: u32,
        }
        impl TraceSink for RecordingSink {
            fn on_object_visit(&mut self, e: &ObjectVisitEvent) {
                self.visits.push(e.object);
            }
            fn on_object_resolved(&mut self, e: &ObjectResolvedEvent) {
                self.causes.push((e.object, e.cause.map(|c| c.reason)));
            }
            fn on_cycle(&mut self, _: &CycleEvent) {
                self.cycles += 1;
            }
        }

        let mut scene = Scene::new();
        let a = scene.mesh("a");
        let b = scene.mesh("b");
        scene.link(a, &[b]);
        scene.link(b, &[a]);
        scene.settle();
        scene.store.set(b, scene.keys.points, 5).unwrap();
        scene.next_pass();

        let mut sink = RecordingSink::default();
        let mut tracer = Tracer::new(&mut sink);
        assert!(scene.store.requires_update(a, &mut AttributeTreePrep, &mut tracer));
        let _ = scene.store.finish_update(&mut tracer);
        drop(tracer);

        assert_eq!(sink.visits, vec![a.index(), b.index()]);
        assert_eq!(
            sink.causes,
            vec![
                (b.index(), Some(StaleReason::ValueChanged)),
                (a.index(), Some(StaleReason::Reference)),
            ]
        );
        assert_eq!(sink.cycles, 0);
    }
}
