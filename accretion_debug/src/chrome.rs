// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! The update walk has no wall-clock timestamps. Each event is placed one
//! logical microsecond after the previous one, so nested visits render as a
//! flame graph of the propagation.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use accretion_core::trace::{StaleCause, StaleReason};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Update passes become `update` slices and each resolved object becomes a
/// nested slice named after its slot index.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in (0_u64..).zip(decode(bytes)) {
        match recorded {
            RecordedEvent::UpdateBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "update",
                    "cat": "Pass",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "epoch": e.epoch,
                        "dirty_objects": e.dirty_objects,
                    }
                }));
            }
            RecordedEvent::ObjectVisit(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("#{}", e.object),
                    "cat": "Walk",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "epoch": e.epoch,
                        "depth": e.depth,
                    }
                }));
            }
            RecordedEvent::ObjectResolved(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("#{}", e.object),
                    "cat": "Walk",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "stale": e.cause.is_some(),
                        "cause": cause_value(e.cause),
                    }
                }));
            }
            RecordedEvent::MemoHit(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "MemoHit",
                    "cat": "Walk",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "object": e.object,
                        "depth": e.depth,
                        "stale": e.stale,
                    }
                }));
            }
            RecordedEvent::Cycle(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Cycle",
                    "cat": "Walk",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "object": e.object,
                        "depth": e.depth,
                    }
                }));
            }
            RecordedEvent::Prep(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Prep",
                    "cat": "Walk",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "object": e.object,
                        "depth": e.depth,
                        "stale": e.stale,
                    }
                }));
            }
            RecordedEvent::UpdateSummary(s) => {
                events.push(json!({
                    "ph": "E",
                    "name": "update",
                    "cat": "Pass",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "epoch": s.epoch,
                        "visited": s.visited,
                        "memo_hits": s.memo_hits,
                        "cycles": s.cycles,
                        "preparations": s.preparations,
                        "stale": s.stale,
                    }
                }));
            }
            RecordedEvent::StaleObjectsCount { epoch, count } => {
                events.push(json!({
                    "ph": "i",
                    "name": "StaleObjects",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "epoch": epoch,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn cause_value(cause: Option<StaleCause>) -> Value {
    match cause {
        None => Value::Null,
        Some(c) => json!({
            "reason": match c.reason {
                StaleReason::ValueChanged => "value",
                StaleReason::BindingChanged => "binding",
                StaleReason::Reference => "reference",
            },
            "attribute": c.attribute,
        }),
    }
}
