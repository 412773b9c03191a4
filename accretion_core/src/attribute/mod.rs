// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute declarations, typed keys, and values.
//!
//! Classes are registered once on an
//! [`ObjectStore`](crate::object::ObjectStore). The registration closure
//! receives a [`ClassBuilder`] and returns whatever table of
//! [`AttributeKey`]s it declared; the finished [`SceneClass`] is immutable.

mod class;
mod error;
mod key;
mod kind;

pub use class::{Attribute, AttributeFlags, ClassBuilder, ClassId, Interface, SceneClass};
pub use error::AttributeError;
pub use key::AttributeKey;
pub use kind::{
    AttributeKind, AttributeType, AttributeValue, Bool, Float, FloatVector, Int, IntVector,
    ObjectIndexable, ObjectVector, SceneObjectRef,
};
