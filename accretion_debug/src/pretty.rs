// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Walk events
//! are indented by recursion depth so a propagation reads as a tree.
//!
//! Objects print as `#slot` unless names were captured with
//! [`PrettyPrintSink::label_objects`].

use std::io::Write;

use accretion_core::object::ObjectStore;
use accretion_core::trace::{
    CycleEvent, MemoHitEvent, ObjectResolvedEvent, ObjectVisitEvent, PrepEvent, StaleCause,
    StaleReason, TraceSink, UpdateBeginEvent, UpdateSummary,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    names: Vec<Option<String>>,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("names", &self.names.len())
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            names: Vec::new(),
        }
    }

    /// Captures the names of every live object in `store`.
    ///
    /// Slots created afterwards print as `#slot` until this is called again.
    pub fn label_objects(&mut self, store: &ObjectStore) {
        self.names.clear();
        for id in store.objects() {
            let idx = id.index() as usize;
            if self.names.len() <= idx {
                self.names.resize(idx + 1, None);
            }
            self.names[idx] = Some(store.name(id).to_owned());
        }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn object(&self, idx: u32) -> String {
        match self.names.get(idx as usize) {
            Some(Some(name)) => name.clone(),
            _ => format!("#{idx}"),
        }
    }
}

fn indent(depth: u32) -> String {
    "  ".repeat(depth as usize)
}

fn cause_text(cause: Option<StaleCause>) -> String {
    match cause {
        None => "clean".to_owned(),
        Some(c) => {
            let reason = match c.reason {
                StaleReason::ValueChanged => "value",
                StaleReason::BindingChanged => "binding",
                StaleReason::Reference => "reference",
            };
            format!("stale={reason}@attr{}", c.attribute)
        }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_update_begin(&mut self, e: &UpdateBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[update:begin] epoch={} dirty={}",
            e.epoch, e.dirty_objects,
        );
    }

    fn on_object_visit(&mut self, e: &ObjectVisitEvent) {
        let _ = writeln!(
            self.writer,
            "[visit] {}{} depth={}",
            indent(e.depth),
            self.object(e.object),
            e.depth,
        );
    }

    fn on_object_resolved(&mut self, e: &ObjectResolvedEvent) {
        let _ = writeln!(
            self.writer,
            "[resolved] {}{} {}",
            indent(e.depth),
            self.object(e.object),
            cause_text(e.cause),
        );
    }

    fn on_memo_hit(&mut self, e: &MemoHitEvent) {
        let _ = writeln!(
            self.writer,
            "[memo] {}{} stale={}",
            indent(e.depth),
            self.object(e.object),
            e.stale,
        );
    }

    fn on_cycle(&mut self, e: &CycleEvent) {
        let _ = writeln!(
            self.writer,
            "[cycle] {}{} depth={}",
            indent(e.depth),
            self.object(e.object),
            e.depth,
        );
    }

    fn on_prep(&mut self, e: &PrepEvent) {
        let _ = writeln!(
            self.writer,
            "[prep] {}{} stale={}",
            indent(e.depth),
            self.object(e.object),
            e.stale,
        );
    }

    fn on_update_summary(&mut self, s: &UpdateSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] epoch={} dirty={} visited={} memo={} cycles={} preps={} stale={}",
            s.epoch, s.dirty_objects, s.visited, s.memo_hits, s.cycles, s.preparations, s.stale,
        );
    }

    fn on_stale_objects(&mut self, epoch: u64, objects: &[u32]) {
        let list: Vec<String> = objects.iter().map(|&o| self.object(o)).collect();
        let _ = writeln!(
            self.writer,
            "[stale] epoch={epoch} count={} [{}]",
            objects.len(),
            list.join(", "),
        );
    }
}
