// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! The rich [`on_stale_objects`](TraceSink::on_stale_objects) event stores
//! only the count.

use accretion_core::trace::{
    CycleEvent, MemoHitEvent, ObjectResolvedEvent, ObjectVisitEvent, PrepEvent, StaleCause,
    StaleReason, TraceSink, UpdateBeginEvent, UpdateSummary,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_UPDATE_BEGIN: u8 = 1;
const TAG_OBJECT_VISIT: u8 = 2;
const TAG_OBJECT_RESOLVED: u8 = 3;
const TAG_MEMO_HIT: u8 = 4;
const TAG_CYCLE: u8 = 5;
const TAG_PREP: u8 = 6;
const TAG_UPDATE_SUMMARY: u8 = 7;
const TAG_STALE_OBJECTS_COUNT: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_header(&mut self, tag: u8, epoch: u64, object: u32, depth: u32) {
        self.write_u8(tag);
        self.write_u64(epoch);
        self.write_u32(object);
        self.write_u32(depth);
    }

    // 0 = clean, otherwise reason + 1 followed by the attribute index.
    fn write_cause(&mut self, cause: Option<StaleCause>) {
        match cause {
            None => {
                self.write_u8(0);
                self.write_u32(0);
            }
            Some(c) => {
                self.write_u8(match c.reason {
                    StaleReason::ValueChanged => 1,
                    StaleReason::BindingChanged => 2,
                    StaleReason::Reference => 3,
                });
                self.write_u32(c.attribute);
            }
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_update_begin(&mut self, e: &UpdateBeginEvent) {
        self.write_u8(TAG_UPDATE_BEGIN);
        self.write_u64(e.epoch);
        self.write_u32(e.dirty_objects);
    }

    fn on_object_visit(&mut self, e: &ObjectVisitEvent) {
        self.write_header(TAG_OBJECT_VISIT, e.epoch, e.object, e.depth);
    }

    fn on_object_resolved(&mut self, e: &ObjectResolvedEvent) {
        self.write_header(TAG_OBJECT_RESOLVED, e.epoch, e.object, e.depth);
        self.write_cause(e.cause);
    }

    fn on_memo_hit(&mut self, e: &MemoHitEvent) {
        self.write_header(TAG_MEMO_HIT, e.epoch, e.object, e.depth);
        self.write_u8(u8::from(e.stale));
    }

    fn on_cycle(&mut self, e: &CycleEvent) {
        self.write_header(TAG_CYCLE, e.epoch, e.object, e.depth);
    }

    fn on_prep(&mut self, e: &PrepEvent) {
        self.write_header(TAG_PREP, e.epoch, e.object, e.depth);
        self.write_u8(u8::from(e.stale));
    }

    fn on_update_summary(&mut self, s: &UpdateSummary) {
        self.write_u8(TAG_UPDATE_SUMMARY);
        self.write_u64(s.epoch);
        self.write_u32(s.dirty_objects);
        self.write_u32(s.visited);
        self.write_u32(s.memo_hits);
        self.write_u32(s.cycles);
        self.write_u32(s.preparations);
        self.write_u32(s.stale);
    }

    fn on_stale_objects(&mut self, epoch: u64, objects: &[u32]) {
        self.write_u8(TAG_STALE_OBJECTS_COUNT);
        self.write_u64(epoch);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "stale object count capped at u32::MAX for recording"
        )]
        self.write_u32(objects.len().min(u32::MAX as usize) as u32);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// An [`UpdateBeginEvent`].
    UpdateBegin(UpdateBeginEvent),
    /// An [`ObjectVisitEvent`].
    ObjectVisit(ObjectVisitEvent),
    /// An [`ObjectResolvedEvent`].
    ObjectResolved(ObjectResolvedEvent),
    /// A [`MemoHitEvent`].
    MemoHit(MemoHitEvent),
    /// A [`CycleEvent`].
    Cycle(CycleEvent),
    /// A [`PrepEvent`].
    Prep(PrepEvent),
    /// An [`UpdateSummary`].
    UpdateSummary(UpdateSummary),
    /// Number of objects resolved as stale in a pass.
    StaleObjectsCount {
        /// Pass epoch.
        epoch: u64,
        /// Number of stale objects.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_header(&mut self) -> Option<(u64, u32, u32)> {
        Some((self.read_u64()?, self.read_u32()?, self.read_u32()?))
    }

    fn read_cause(&mut self) -> Option<Option<StaleCause>> {
        let reason = match self.read_u8()? {
            0 => None,
            1 => Some(StaleReason::ValueChanged),
            2 => Some(StaleReason::BindingChanged),
            _ => Some(StaleReason::Reference),
        };
        let attribute = self.read_u32()?;
        Some(reason.map(|reason| StaleCause { reason, attribute }))
    }

    fn decode_update_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::UpdateBegin(UpdateBeginEvent {
            epoch: self.read_u64()?,
            dirty_objects: self.read_u32()?,
        }))
    }

    fn decode_object_visit(&mut self) -> Option<RecordedEvent> {
        let (epoch, object, depth) = self.read_header()?;
        Some(RecordedEvent::ObjectVisit(ObjectVisitEvent {
            epoch,
            object,
            depth,
        }))
    }

    fn decode_object_resolved(&mut self) -> Option<RecordedEvent> {
        let (epoch, object, depth) = self.read_header()?;
        Some(RecordedEvent::ObjectResolved(ObjectResolvedEvent {
            epoch,
            object,
            depth,
            cause: self.read_cause()?,
        }))
    }

    fn decode_memo_hit(&mut self) -> Option<RecordedEvent> {
        let (epoch, object, depth) = self.read_header()?;
        Some(RecordedEvent::MemoHit(MemoHitEvent {
            epoch,
            object,
            depth,
            stale: self.read_bool()?,
        }))
    }

    fn decode_cycle(&mut self) -> Option<RecordedEvent> {
        let (epoch, object, depth) = self.read_header()?;
        Some(RecordedEvent::Cycle(CycleEvent {
            epoch,
            object,
            depth,
        }))
    }

    fn decode_prep(&mut self) -> Option<RecordedEvent> {
        let (epoch, object, depth) = self.read_header()?;
        Some(RecordedEvent::Prep(PrepEvent {
            epoch,
            object,
            depth,
            stale: self.read_bool()?,
        }))
    }

    fn decode_update_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::UpdateSummary(UpdateSummary {
            epoch: self.read_u64()?,
            dirty_objects: self.read_u32()?,
            visited: self.read_u32()?,
            memo_hits: self.read_u32()?,
            cycles: self.read_u32()?,
            preparations: self.read_u32()?,
            stale: self.read_u32()?,
        }))
    }

    fn decode_stale_objects_count(&mut self) -> Option<RecordedEvent> {
        let epoch = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::StaleObjectsCount { epoch, count })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_UPDATE_BEGIN => self.decode_update_begin(),
            TAG_OBJECT_VISIT => self.decode_object_visit(),
            TAG_OBJECT_RESOLVED => self.decode_object_resolved(),
            TAG_MEMO_HIT => self.decode_memo_hit(),
            TAG_CYCLE => self.decode_cycle(),
            TAG_PREP => self.decode_prep(),
            TAG_UPDATE_SUMMARY => self.decode_update_summary(),
            TAG_STALE_OBJECTS_COUNT => self.decode_stale_objects_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
