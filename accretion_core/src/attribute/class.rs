// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class descriptors and the builder used to declare their attributes.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;

use super::key::AttributeKey;
use super::kind::{AttributeKind, AttributeType, AttributeValue};

/// A handle to a registered class.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    /// Returns the raw registration index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

bitflags! {
    /// Capability interfaces implemented by a class.
    ///
    /// A derived class implements the union of its own interfaces and its
    /// base's. Reference attributes use the same flags as a filter on the
    /// objects they accept.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Interface: u32 {
        /// Plain scene object.
        const GENERIC = 1 << 0;
        /// Participates in geometry-update propagation.
        const GEOMETRY = 1 << 1;
        /// Camera.
        const CAMERA = 1 << 2;
        /// Layer assigning materials to geometry parts.
        const LAYER = 1 << 3;
        /// Light.
        const LIGHT = 1 << 4;
        /// Material.
        const MATERIAL = 1 << 5;
        /// Free-form key/value metadata.
        const METADATA = 1 << 6;
        /// Global render settings.
        const SCENE_VARIABLES = 1 << 7;
    }
}

bitflags! {
    /// Per-attribute declaration flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AttributeFlags: u8 {
        /// Changing the attribute never forces geometry regeneration.
        const CAN_SKIP_GEOM_RELOAD = 1 << 0;
        /// The integer value is one of a declared set of enumerators.
        const ENUMERABLE = 1 << 1;
    }
}

/// Declaration of one attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    name: String,
    ty: AttributeType,
    default: AttributeValue,
    flags: AttributeFlags,
    object_interface: Interface,
    enum_values: Vec<(i32, String)>,
    metadata: Vec<(String, String)>,
    group: Option<String>,
}

impl Attribute {
    /// Returns the attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value type tag.
    #[must_use]
    pub fn attribute_type(&self) -> AttributeType {
        self.ty
    }

    /// Returns the default value new objects start with.
    #[must_use]
    pub fn default_value(&self) -> &AttributeValue {
        &self.default
    }

    /// Returns the declaration flags.
    #[must_use]
    pub fn flags(&self) -> AttributeFlags {
        self.flags
    }

    /// Returns whether changing this attribute forces geometry regeneration.
    #[must_use]
    pub fn update_requires_geom_reload(&self) -> bool {
        !self.flags.contains(AttributeFlags::CAN_SKIP_GEOM_RELOAD)
    }

    /// Returns the interface filter applied to referenced objects.
    ///
    /// Empty for non-reference attributes and for references that accept
    /// any object.
    #[must_use]
    pub fn object_interface(&self) -> Interface {
        self.object_interface
    }

    /// Returns the declared enumerators in declaration order.
    #[must_use]
    pub fn enum_values(&self) -> &[(i32, String)] {
        &self.enum_values
    }

    /// Returns the description of enumerator `value`, if declared.
    #[must_use]
    pub fn enum_description(&self, value: i32) -> Option<&str> {
        self.enum_values
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, d)| d.as_str())
    }

    /// Returns the metadata value stored under `key`.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the UI group the attribute belongs to.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

/// An immutable class descriptor.
#[derive(Clone, Debug)]
pub struct SceneClass {
    id: ClassId,
    name: String,
    interface: Interface,
    /// Every class this one derives from, root first, ending with `id`.
    lineage: Vec<ClassId>,
    attributes: Vec<Attribute>,
}

impl SceneClass {
    /// Returns the class handle.
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the interfaces this class implements.
    #[must_use]
    pub fn interface(&self) -> Interface {
        self.interface
    }

    /// Returns whether the class implements every interface in `interface`.
    #[must_use]
    pub fn is_a(&self, interface: Interface) -> bool {
        self.interface.contains(interface)
    }

    /// Returns whether this class is `class` or derives from it.
    #[must_use]
    pub fn derives_from(&self, class: ClassId) -> bool {
        self.lineage.contains(&class)
    }

    /// Returns the declared attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the attribute at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn attribute(&self, index: u32) -> &Attribute {
        &self.attributes[index as usize]
    }

    /// Looks an attribute up by name.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "attribute tables never approach u32::MAX entries"
    )]
    #[must_use]
    pub fn find_attribute(&self, name: &str) -> Option<(u32, &Attribute)> {
        self.attributes
            .iter()
            .position(|a| a.name == name)
            .map(|i| (i as u32, &self.attributes[i]))
    }

    /// Panics unless `key` belongs to this class's lineage and matches the
    /// declared type.
    pub(crate) fn validate_key<T: AttributeKind>(&self, key: AttributeKey<T>) {
        assert!(
            self.derives_from(key.class),
            "{key:?} is not declared on class `{}`",
            self.name
        );
        let ty = self.attributes[key.index as usize].ty;
        assert!(
            ty == T::TYPE,
            "{key:?} has type {} but `{}` is declared as {}",
            T::TYPE.name(),
            self.attributes[key.index as usize].name,
            ty.name()
        );
    }
}

/// Collects attribute declarations for a class being registered.
///
/// Obtained inside the closure passed to
/// [`ObjectStore::register_class`](crate::object::ObjectStore::register_class).
#[derive(Debug)]
pub struct ClassBuilder {
    class: SceneClass,
}

impl ClassBuilder {
    pub(crate) fn new(
        id: ClassId,
        name: &str,
        interface: Interface,
        base: Option<&SceneClass>,
    ) -> Self {
        let (interface, mut lineage, attributes) = match base {
            Some(base) => (
                base.interface | interface,
                base.lineage.clone(),
                base.attributes.clone(),
            ),
            None => (interface, Vec::new(), Vec::new()),
        };
        lineage.push(id);
        Self {
            class: SceneClass {
                id,
                name: name.to_string(),
                interface,
                lineage,
                attributes,
            },
        }
    }

    /// Returns the handle of the class being built.
    #[must_use]
    pub fn class_id(&self) -> ClassId {
        self.class.id
    }

    /// Declares an attribute with no flags and no interface filter.
    pub fn declare<T: AttributeKind>(&mut self, name: &str, default: T) -> AttributeKey<T> {
        self.declare_with(name, default, AttributeFlags::empty(), Interface::empty())
    }

    /// Declares an attribute.
    ///
    /// `object_interface` restricts which objects a reference attribute
    /// accepts; it must be empty for non-reference types.
    ///
    /// # Panics
    ///
    /// Panics if the name is already declared on this class (or inherited),
    /// or if an interface filter is given for a non-reference type.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "attribute tables never approach u32::MAX entries"
    )]
    pub fn declare_with<T: AttributeKind>(
        &mut self,
        name: &str,
        default: T,
        flags: AttributeFlags,
        object_interface: Interface,
    ) -> AttributeKey<T> {
        assert!(
            self.class.find_attribute(name).is_none(),
            "attribute `{name}` already declared on class `{}`",
            self.class.name
        );
        assert!(
            object_interface.is_empty() || T::TYPE.is_reference(),
            "interface filter on non-reference attribute `{name}`"
        );
        let index = self.class.attributes.len() as u32;
        self.class.attributes.push(Attribute {
            name: name.to_string(),
            ty: T::TYPE,
            default: default.into_value(),
            flags,
            object_interface,
            enum_values: Vec::new(),
            metadata: Vec::new(),
            group: None,
        });
        AttributeKey::new(self.class.id, index)
    }

    /// Adds an enumerator to an `ENUMERABLE` integer attribute.
    ///
    /// # Panics
    ///
    /// Panics if the attribute was not declared `ENUMERABLE`.
    pub fn set_enum_value(&mut self, key: AttributeKey<i32>, value: i32, description: &str) {
        let attribute = self.attribute_mut(key);
        assert!(
            attribute.flags.contains(AttributeFlags::ENUMERABLE),
            "attribute `{}` is not enumerable",
            attribute.name
        );
        attribute.enum_values.push((value, description.to_string()));
    }

    /// Stores a metadata entry (e.g. `"label"`, `"comment"`), replacing any
    /// previous value under the same key.
    pub fn set_metadata<T: AttributeKind>(&mut self, key: AttributeKey<T>, name: &str, value: &str) {
        let attribute = self.attribute_mut(key);
        match attribute.metadata.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attribute
                .metadata
                .push((name.to_string(), value.to_string())),
        }
    }

    /// Places an attribute in a UI group.
    pub fn set_group<T: AttributeKind>(&mut self, group: &str, key: AttributeKey<T>) {
        self.attribute_mut(key).group = Some(group.to_string());
    }

    pub(crate) fn finish(self) -> SceneClass {
        self.class
    }

    fn attribute_mut<T: AttributeKind>(&mut self, key: AttributeKey<T>) -> &mut Attribute {
        self.class.validate_key(key);
        &mut self.class.attributes[key.index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(name: &str) -> ClassBuilder {
        ClassBuilder::new(ClassId(0), name, Interface::GENERIC, None)
    }

    #[test]
    fn declarations_keep_order_and_defaults() {
        let mut b = builder("Thing");
        let a = b.declare("a", 1_i32);
        let c = b.declare("c", true);
        let class = b.finish();

        assert_eq!(a.index(), 0);
        assert_eq!(c.index(), 1);
        assert_eq!(class.attribute(0).name(), "a");
        assert_eq!(class.attribute(1).default_value(), &AttributeValue::Bool(true));
        assert_eq!(class.find_attribute("c").map(|(i, _)| i), Some(1));
    }

    #[test]
    fn derived_class_inherits_table_and_interfaces() {
        let mut base = ClassBuilder::new(ClassId(0), "Base", Interface::GEOMETRY, None);
        let key = base.declare("x", 0.5_f32);
        let base = base.finish();

        let mut derived =
            ClassBuilder::new(ClassId(1), "Derived", Interface::GENERIC, Some(&base));
        let extra = derived.declare("y", 2_i32);
        let derived = derived.finish();

        assert!(derived.derives_from(ClassId(0)));
        assert!(derived.is_a(Interface::GEOMETRY | Interface::GENERIC));
        assert_eq!(derived.attribute(key.index()).name(), "x");
        assert_eq!(extra.index(), 1);
        derived.validate_key(key);
    }

    #[test]
    fn enum_metadata_and_group() {
        let mut b = builder("Thing");
        let mode = b.declare_with("mode", 0_i32, AttributeFlags::ENUMERABLE, Interface::empty());
        b.set_enum_value(mode, 0, "off");
        b.set_enum_value(mode, 1, "on");
        b.set_metadata(mode, "label", "mode");
        b.set_metadata(mode, "label", "operating mode");
        b.set_group("General", mode);
        let class = b.finish();

        let attribute = class.attribute(mode.index());
        assert_eq!(attribute.enum_description(1), Some("on"));
        assert_eq!(attribute.enum_description(7), None);
        assert_eq!(attribute.metadata("label"), Some("operating mode"));
        assert_eq!(attribute.group(), Some("General"));
    }

    #[test]
    fn skip_reload_flag_is_reported() {
        let mut b = builder("Thing");
        b.declare_with(
            "epsilon",
            0.0_f32,
            AttributeFlags::CAN_SKIP_GEOM_RELOAD,
            Interface::empty(),
        );
        b.declare("count", 0_i32);
        let class = b.finish();
        assert!(!class.attribute(0).update_requires_geom_reload());
        assert!(class.attribute(1).update_requires_geom_reload());
    }

    #[test]
    #[should_panic(expected = "already declared")]
    fn duplicate_name_panics() {
        let mut b = builder("Thing");
        b.declare("a", 1_i32);
        b.declare("a", 2_i32);
    }

    #[test]
    #[should_panic(expected = "is not enumerable")]
    fn enum_value_on_plain_int_panics() {
        let mut b = builder("Thing");
        let key = b.declare("a", 1_i32);
        b.set_enum_value(key, 0, "zero");
    }

    #[test]
    #[should_panic(expected = "has type")]
    fn mistyped_key_panics() {
        let mut b = builder("Thing");
        b.declare("a", 1_i32);
        let class = b.finish();
        class.validate_key(AttributeKey::<f32>::new(ClassId(0), 0));
    }

    #[test]
    #[should_panic(expected = "is not declared on class")]
    fn foreign_key_panics() {
        let mut b = builder("Thing");
        b.declare("a", 1_i32);
        let class = b.finish();
        class.validate_key(AttributeKey::<i32>::new(ClassId(5), 0));
    }
}
