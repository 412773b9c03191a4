// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for accretion update
//! passes.
//!
//! This crate provides [`TraceSink`](accretion_core::trace::TraceSink)
//! implementations for development and post-mortem analysis of the
//! dependency walk:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output,
//!   indented by walk depth.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.

pub mod chrome;
pub mod pretty;
pub mod recorder;
