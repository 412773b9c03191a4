// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the update walk.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! update walk calls as it resolves objects. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Object indices in events are raw slot indices
//! ([`ObjectId::index`](crate::object::ObjectId::index)).
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates the per-pass list of stale
//!   objects and the corresponding `TraceSink` method.

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why an object was resolved as stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StaleReason {
    /// The attribute's value changed this cycle.
    ValueChanged,
    /// The attribute's binding or its driver changed this cycle.
    BindingChanged,
    /// An object referenced by the attribute requires an update.
    Reference,
}

/// The first attribute that made an object stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StaleCause {
    /// What kind of change was found.
    pub reason: StaleReason,
    /// Attribute index in declaration order.
    pub attribute: u32,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an update pass begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateBeginEvent {
    /// Epoch of the new pass.
    pub epoch: u64,
    /// Objects whose attribute tree was marked changed by pending edits.
    pub dirty_objects: u32,
}

/// Emitted when the walk starts resolving an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectVisitEvent {
    /// Pass epoch.
    pub epoch: u64,
    /// Slot index of the object.
    pub object: u32,
    /// Recursion depth (0 for the queried root).
    pub depth: u32,
}

/// Emitted when the walk finishes resolving an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectResolvedEvent {
    /// Pass epoch.
    pub epoch: u64,
    /// Slot index of the object.
    pub object: u32,
    /// Recursion depth.
    pub depth: u32,
    /// Why the object is stale, or `None` if it is up to date.
    pub cause: Option<StaleCause>,
}

/// Emitted when a query is answered from the pass memo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoHitEvent {
    /// Pass epoch.
    pub epoch: u64,
    /// Slot index of the object.
    pub object: u32,
    /// Recursion depth of the query.
    pub depth: u32,
    /// The memoized answer.
    pub stale: bool,
}

/// Emitted when the walk reaches an object it is still resolving.
///
/// The re-entrant query answers "not stale".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleEvent {
    /// Pass epoch.
    pub epoch: u64,
    /// Slot index of the object closing the cycle.
    pub object: u32,
    /// Recursion depth at which the cycle was found.
    pub depth: u32,
}

/// Emitted after external update preparation ran for a referenced object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrepEvent {
    /// Pass epoch.
    pub epoch: u64,
    /// Slot index of the prepared object.
    pub object: u32,
    /// Recursion depth.
    pub depth: u32,
    /// Whether preparation reported the object as requiring an update.
    pub stale: bool,
}

/// Per-pass counters, accumulated while the pass is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Pass epoch.
    pub epoch: u64,
    /// Objects marked by pending edits when the pass began.
    pub dirty_objects: u32,
    /// Objects resolved (each at most once per pass).
    pub visited: u32,
    /// Queries answered from the memo.
    pub memo_hits: u32,
    /// Re-entrant queries on objects still being resolved.
    pub cycles: u32,
    /// External preparation calls.
    pub preparations: u32,
    /// Objects resolved as stale.
    pub stale: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the update walk.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an update pass begins.
    fn on_update_begin(&mut self, e: &UpdateBeginEvent) {
        _ = e;
    }

    /// Called when the walk starts resolving an object.
    fn on_object_visit(&mut self, e: &ObjectVisitEvent) {
        _ = e;
    }

    /// Called when the walk finishes resolving an object.
    fn on_object_resolved(&mut self, e: &ObjectResolvedEvent) {
        _ = e;
    }

    /// Called when a query is answered from the memo.
    fn on_memo_hit(&mut self, e: &MemoHitEvent) {
        _ = e;
    }

    /// Called when a reference cycle is found.
    fn on_cycle(&mut self, e: &CycleEvent) {
        _ = e;
    }

    /// Called after external preparation ran.
    fn on_prep(&mut self, e: &PrepEvent) {
        _ = e;
    }

    /// Called with the pass counters.
    fn on_update_summary(&mut self, s: &UpdateSummary) {
        _ = s;
    }

    /// Called with the objects resolved as stale in a pass (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_stale_objects(&mut self, epoch: u64, objects: &[u32]) {
        _ = (epoch, objects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`UpdateBeginEvent`].
    #[inline]
    pub fn update_begin(&mut self, e: &UpdateBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_update_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ObjectVisitEvent`].
    #[inline]
    pub fn object_visit(&mut self, e: &ObjectVisitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_object_visit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ObjectResolvedEvent`].
    #[inline]
    pub fn object_resolved(&mut self, e: &ObjectResolvedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_object_resolved(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MemoHitEvent`].
    #[inline]
    pub fn memo_hit(&mut self, e: &MemoHitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_memo_hit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CycleEvent`].
    #[inline]
    pub fn cycle(&mut self, e: &CycleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cycle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PrepEvent`].
    #[inline]
    pub fn prep(&mut self, e: &PrepEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_prep(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`UpdateSummary`].
    #[inline]
    pub fn update_summary(&mut self, s: &UpdateSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_update_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits the stale objects of a pass (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn stale_objects(&mut self, epoch: u64, objects: &[u32]) {
        if let Some(s) = &mut self.sink {
            s.on_stale_objects(epoch, objects);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resolved() -> ObjectResolvedEvent {
        ObjectResolvedEvent {
            epoch: 3,
            object: 7,
            depth: 1,
            cause: Some(StaleCause {
                reason: StaleReason::Reference,
                attribute: 1,
            }),
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_update_begin(&UpdateBeginEvent {
            epoch: 1,
            dirty_objects: 0,
        });
        sink.on_object_resolved(&sample_resolved());
        sink.on_update_summary(&UpdateSummary::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.object_resolved(&sample_resolved());
        tracer.cycle(&CycleEvent {
            epoch: 1,
            object: 0,
            depth: 2,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            resolved: Vec<(u32, bool)>,
        }
        impl TraceSink for RecordingSink {
            fn on_object_resolved(&mut self, e: &ObjectResolvedEvent) {
                self.resolved.push((e.object, e.cause.is_some()));
            }
        }

        let mut sink = RecordingSink {
            resolved: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.object_resolved(&sample_resolved());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.resolved, &[(7, true)]);
    }
}
