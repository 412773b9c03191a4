// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable attribute edit errors.

use alloc::string::String;

use super::class::Interface;
use crate::object::ObjectId;

/// Errors returned by attribute edits on an
/// [`ObjectStore`](crate::object::ObjectStore).
///
/// Contract violations (stale handles, keys used against the wrong class)
/// panic instead; these variants cover edits that are well-formed but refer
/// to objects the attribute cannot accept.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// A reference attribute was given an object whose class does not
    /// implement the attribute's interface filter.
    #[error(
        "attribute `{attribute}` accepts {expected:?} objects, but `{object}` implements {found:?}"
    )]
    InterfaceMismatch {
        /// Attribute name.
        attribute: String,
        /// Name of the rejected object.
        object: String,
        /// Interface filter of the attribute.
        expected: Interface,
        /// Interfaces of the rejected object's class.
        found: Interface,
    },
    /// A reference attribute was given a destroyed object.
    #[error("attribute `{attribute}` cannot reference destroyed object {object:?}")]
    StaleReference {
        /// Attribute name.
        attribute: String,
        /// The stale handle.
        object: ObjectId,
    },
    /// A binding was given a destroyed driver object.
    #[error("attribute `{attribute}` cannot be bound to destroyed object {driver:?}")]
    StaleDriver {
        /// Attribute name.
        attribute: String,
        /// The stale handle.
        driver: ObjectId,
    },
}
