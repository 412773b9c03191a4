// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute value types and the mapping from Rust types to type tags.

use alloc::string::String;
use alloc::vec::Vec;
use core::slice;

use crate::object::ObjectId;

/// Boolean attribute value.
pub type Bool = bool;
/// Integer attribute value.
pub type Int = i32;
/// Floating-point attribute value.
pub type Float = f32;
/// Integer vector attribute value (also used for packed windows and ranges).
pub type IntVector = Vec<i32>;
/// Floating-point vector attribute value.
pub type FloatVector = Vec<f32>;
/// Single (nullable) object reference.
pub type SceneObjectRef = Option<ObjectId>;

/// Semantic type tag of a declared attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// A boolean.
    Bool,
    /// A 32-bit signed integer.
    Int,
    /// A 32-bit float.
    Float,
    /// A string.
    String,
    /// A vector of integers.
    IntVector,
    /// A vector of floats.
    FloatVector,
    /// A single, possibly null, reference to another object.
    SceneObject,
    /// An ordered list of references.
    SceneObjectVector,
    /// An index-addressable collection of references.
    SceneObjectIndexable,
}

impl AttributeType {
    /// Returns whether values of this type reference other objects.
    #[must_use]
    pub const fn is_reference(self) -> bool {
        matches!(
            self,
            Self::SceneObject | Self::SceneObjectVector | Self::SceneObjectIndexable
        )
    }

    /// Returns the canonical lowercase name of the type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::IntVector => "int vector",
            Self::FloatVector => "float vector",
            Self::SceneObject => "scene object",
            Self::SceneObjectVector => "scene object vector",
            Self::SceneObjectIndexable => "scene object indexable",
        }
    }
}

/// An ordered list of object references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectVector(pub Vec<ObjectId>);

/// An index-addressable collection of object references.
///
/// Unlike [`ObjectVector`], consumers look elements up by position and ask
/// for the position of a given object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectIndexable(pub Vec<ObjectId>);

impl ObjectIndexable {
    /// Returns the position of `id` in the collection, if present.
    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.0.iter().position(|&candidate| candidate == id)
    }

    /// Returns the object at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ObjectId> {
        self.0.get(index).copied()
    }
}

/// A stored attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// See [`AttributeType::Bool`].
    Bool(Bool),
    /// See [`AttributeType::Int`].
    Int(Int),
    /// See [`AttributeType::Float`].
    Float(Float),
    /// See [`AttributeType::String`].
    String(String),
    /// See [`AttributeType::IntVector`].
    IntVector(IntVector),
    /// See [`AttributeType::FloatVector`].
    FloatVector(FloatVector),
    /// See [`AttributeType::SceneObject`].
    SceneObject(SceneObjectRef),
    /// See [`AttributeType::SceneObjectVector`].
    SceneObjectVector(ObjectVector),
    /// See [`AttributeType::SceneObjectIndexable`].
    SceneObjectIndexable(ObjectIndexable),
}

impl AttributeValue {
    /// Returns the type tag of this value.
    #[must_use]
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::Bool(_) => AttributeType::Bool,
            Self::Int(_) => AttributeType::Int,
            Self::Float(_) => AttributeType::Float,
            Self::String(_) => AttributeType::String,
            Self::IntVector(_) => AttributeType::IntVector,
            Self::FloatVector(_) => AttributeType::FloatVector,
            Self::SceneObject(_) => AttributeType::SceneObject,
            Self::SceneObjectVector(_) => AttributeType::SceneObjectVector,
            Self::SceneObjectIndexable(_) => AttributeType::SceneObjectIndexable,
        }
    }

    /// Returns the objects this value refers to (empty for non-reference
    /// values and null references).
    #[must_use]
    pub fn referenced(&self) -> &[ObjectId] {
        match self {
            Self::SceneObject(Some(id)) => slice::from_ref(id),
            Self::SceneObjectVector(v) => &v.0,
            Self::SceneObjectIndexable(v) => &v.0,
            _ => &[],
        }
    }
}

/// Rust types that can be stored in an attribute.
///
/// Each implementor corresponds to exactly one [`AttributeType`], which lets
/// [`AttributeKey<T>`](super::AttributeKey) carry the value type statically.
pub trait AttributeKind: Clone + PartialEq + Sized + 'static {
    /// The type tag for this Rust type.
    const TYPE: AttributeType;

    /// Wraps the value for storage.
    fn into_value(self) -> AttributeValue;

    /// Borrows the typed value out of storage, if the variant matches.
    fn from_value(value: &AttributeValue) -> Option<&Self>;
}

macro_rules! impl_attribute_kind {
    ($ty:ty, $variant:ident) => {
        impl AttributeKind for $ty {
            const TYPE: AttributeType = AttributeType::$variant;

            fn into_value(self) -> AttributeValue {
                AttributeValue::$variant(self)
            }

            fn from_value(value: &AttributeValue) -> Option<&Self> {
                match value {
                    AttributeValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_attribute_kind!(Bool, Bool);
impl_attribute_kind!(Int, Int);
impl_attribute_kind!(Float, Float);
impl_attribute_kind!(String, String);
impl_attribute_kind!(IntVector, IntVector);
impl_attribute_kind!(FloatVector, FloatVector);
impl_attribute_kind!(SceneObjectRef, SceneObject);
impl_attribute_kind!(ObjectVector, SceneObjectVector);
impl_attribute_kind!(ObjectIndexable, SceneObjectIndexable);

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn typed_access_requires_matching_variant() {
        let value = 3_i32.into_value();
        assert_eq!(i32::from_value(&value), Some(&3));
        assert_eq!(f32::from_value(&value), None);
        assert_eq!(value.attribute_type(), AttributeType::Int);
    }

    #[test]
    fn referenced_lists_reference_targets_only() {
        let a = ObjectId {
            idx: 0,
            generation: 0,
        };
        let b = ObjectId {
            idx: 1,
            generation: 0,
        };

        assert_eq!(AttributeValue::SceneObject(Some(a)).referenced(), &[a]);
        assert!(AttributeValue::SceneObject(None).referenced().is_empty());
        assert_eq!(
            AttributeValue::SceneObjectVector(ObjectVector(vec![a, b])).referenced(),
            &[a, b]
        );
        assert!(AttributeValue::IntVector(vec![1, 2]).referenced().is_empty());
    }

    #[test]
    fn indexable_lookup() {
        let a = ObjectId {
            idx: 4,
            generation: 1,
        };
        let b = ObjectId {
            idx: 9,
            generation: 0,
        };
        let indexable = ObjectIndexable(vec![a, b]);
        assert_eq!(indexable.index_of(b), Some(1));
        assert_eq!(indexable.get(0), Some(a));
        assert_eq!(indexable.get(2), None);
    }

    #[test]
    fn reference_types_are_flagged() {
        assert!(AttributeType::SceneObject.is_reference());
        assert!(AttributeType::SceneObjectIndexable.is_reference());
        assert!(!AttributeType::IntVector.is_reference());
    }
}
