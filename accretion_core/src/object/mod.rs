// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene object data model.
//!
//! A *scene object* is an instance of a registered class. Each object has:
//!
//! - An identity ([`ObjectId`]), a generational handle that becomes stale
//!   when the object is destroyed. References held by other objects then
//!   dangle and are treated as null.
//! - A value per declared attribute, read and written through typed
//!   [`AttributeKey`](crate::attribute::AttributeKey)s.
//! - **Change flags** for the current edit/evaluate cycle: per-attribute
//!   "value changed" and "binding changed", cleared by
//!   [`commit_changes`](ObjectStore::commit_changes).
//! - **Update state** written by the staleness walk: an epoch-stamped memo
//!   and an "attribute tree changed" marker (see
//!   [`ObjectStore::requires_update`]).
//!
//! Objects are stored in struct-of-arrays layout with index-based handles.
//! References between objects are non-owning; the graph may share objects
//! and contain cycles.
//!
//! # Dirty tracking
//!
//! Every reference and binding adds a dependency edge from the referencing
//! object to its target on the [`ATTRIBUTE_TREE`](crate::dirty::ATTRIBUTE_TREE)
//! channel. Edits mark that channel eagerly, so the edited object and all of
//! its transitive referencers are drained into "attribute tree changed"
//! markers when the next pass begins.

mod change;
mod id;
mod references;
mod store;
mod update;

pub use id::ObjectId;
pub use references::References;
pub use store::ObjectStore;
pub use update::{AttributeTreePrep, UpdatePrep};
