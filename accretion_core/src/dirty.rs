// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Accretion uses [`understory_dirty`] to propagate edit-phase invalidation
//! through the object reference graph.
//!
//! # Propagation semantics
//!
//! [`ATTRIBUTE_TREE`] uses [`EagerPolicy`](understory_dirty::EagerPolicy) and
//! has a dependency edge from every object to each object it references or
//! is bound to. Marking an edited object therefore marks everything that can
//! observe the edit through references, however deep.
//!
//! Edges that would close a cycle are rejected by the tracker and counted
//! ([`ObjectStore::rejected_edge_count`](crate::object::ObjectStore::rejected_edge_count));
//! the reference itself is still stored and walked.
//!
//! # Consumption
//!
//! [`ObjectStore::begin_update`](crate::object::ObjectStore::begin_update)
//! drains the channel into per-object markers.
//! [`ObjectStore::commit_changes`](crate::object::ObjectStore::commit_changes)
//! discards anything still pending.

use understory_dirty::Channel;

/// An attribute of the object, or of something it depends on, changed.
pub const ATTRIBUTE_TREE: Channel = Channel::new(0);
