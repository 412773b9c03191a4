// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental scene-update core for an offline renderer.
//!
//! `accretion_core` decides, between frames, which scene objects must have
//! their expensive derived geometry regenerated, and resolves the render
//! windows a frame covers. It is `no_std` compatible (with `alloc`) and uses
//! struct-of-arrays storage with generational index handles.
//!
//! # Architecture
//!
//! Each frame alternates an edit phase and an update pass:
//!
//! ```text
//!   ObjectStore::set / bind / touch_binding
//!       │  change flags + ATTRIBUTE_TREE marks (eager, along references)
//!       ▼
//!   ObjectStore::begin_update() ──► UpdateBeginEvent
//!       │
//!       ▼
//!   ObjectStore::requires_update(root) ──► UpdatePrep (non-geometry refs)
//!       │  memoized per epoch, cycles answer "not stale"
//!       ▼
//!   ObjectStore::finish_update() ──► UpdateSummary
//!       │
//!       ▼
//!   ObjectStore::commit_changes()
//! ```
//!
//! **[`attribute`]**: Class registration, typed [`AttributeKey`]s, value
//! types, declaration flags, and the recoverable [`AttributeError`].
//!
//! **[`object`]**: Struct-of-arrays object store with change tracking and
//! the memoized geometry staleness walk.
//!
//! **[`dirty`]**: Edit propagation along references via `understory_dirty`.
//!
//! **[`geometry`]**: The geometry base class and ray [`VisibilityMask`]
//! composition.
//!
//! **[`scene_variables`]**: Global render settings and the aperture →
//! region → sub-viewport resolution chain.
//!
//! **[`viewport`]**: Half-open integer [`Viewport`]s and their packed,
//! sentinel-encoded attribute form.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! update-walk instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! [`AttributeKey`]: attribute::AttributeKey
//! [`AttributeError`]: attribute::AttributeError
//! [`VisibilityMask`]: geometry::VisibilityMask
//! [`Viewport`]: viewport::Viewport
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates the per-pass
//!   stale object list.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod attribute;
pub mod dirty;
pub mod geometry;
pub mod object;
pub mod scene_variables;
pub mod trace;
pub mod viewport;
