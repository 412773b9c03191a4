// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry base class and ray-visibility masks.
//!
//! [`Geometry::declare`] adds the attributes every geometry shares; concrete
//! geometry classes (meshes, curves, procedurals) derive from the class
//! [`Geometry::register`] creates and add their own attributes.

use alloc::string::String;

use bitflags::bitflags;

use crate::attribute::{
    AttributeFlags, AttributeKey, ClassBuilder, ClassId, Interface, ObjectVector, SceneObjectRef,
};
use crate::object::{ObjectId, ObjectStore};

bitflags! {
    /// Ray categories an object is visible to.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct VisibilityMask: u32 {
        /// Primary camera rays.
        const CAMERA = 1 << 0;
        /// Shadow rays.
        const SHADOW = 1 << 1;
        /// Diffuse reflection rays.
        const DIFFUSE_REFLECTION = 1 << 2;
        /// Diffuse transmission rays.
        const DIFFUSE_TRANSMISSION = 1 << 3;
        /// Glossy reflection rays.
        const GLOSSY_REFLECTION = 1 << 4;
        /// Glossy transmission rays.
        const GLOSSY_TRANSMISSION = 1 << 5;
        /// Mirror reflection rays.
        const MIRROR_REFLECTION = 1 << 6;
        /// Mirror transmission rays.
        const MIRROR_TRANSMISSION = 1 << 7;
        /// Volume phase-function reflection rays.
        const PHASE_REFLECTION = 1 << 8;
        /// Volume phase-function transmission rays.
        const PHASE_TRANSMISSION = 1 << 9;
        /// The geometry encloses the camera.
        const CONTAINS_CAMERA = 1 << 10;
    }
}

/// The visibility booleans of one geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RayVisibility {
    /// Visible to camera rays.
    pub camera: bool,
    /// Casts shadows.
    pub shadow: bool,
    /// Visible in diffuse reflections.
    pub diffuse_reflection: bool,
    /// Visible in diffuse transmission.
    pub diffuse_transmission: bool,
    /// Visible in glossy reflections.
    pub glossy_reflection: bool,
    /// Visible in glossy transmission.
    pub glossy_transmission: bool,
    /// Visible in mirror reflections.
    pub mirror_reflection: bool,
    /// Visible in mirror transmission.
    pub mirror_transmission: bool,
    /// Visible to volume phase rays, in both directions.
    pub volume: bool,
    /// Encloses the camera.
    pub contains_camera: bool,
}

impl RayVisibility {
    /// Everything visible, camera outside.
    pub const ALL: Self = Self {
        camera: true,
        shadow: true,
        diffuse_reflection: true,
        diffuse_transmission: true,
        glossy_reflection: true,
        glossy_transmission: true,
        mirror_reflection: true,
        mirror_transmission: true,
        volume: true,
        contains_camera: false,
    };

    /// Composes the bitmask.
    ///
    /// `volume` sets both phase bits.
    #[must_use]
    pub fn mask(self) -> VisibilityMask {
        let mut mask = VisibilityMask::empty();
        mask.set(VisibilityMask::CAMERA, self.camera);
        mask.set(VisibilityMask::SHADOW, self.shadow);
        mask.set(VisibilityMask::DIFFUSE_REFLECTION, self.diffuse_reflection);
        mask.set(VisibilityMask::DIFFUSE_TRANSMISSION, self.diffuse_transmission);
        mask.set(VisibilityMask::GLOSSY_REFLECTION, self.glossy_reflection);
        mask.set(VisibilityMask::GLOSSY_TRANSMISSION, self.glossy_transmission);
        mask.set(VisibilityMask::MIRROR_REFLECTION, self.mirror_reflection);
        mask.set(VisibilityMask::MIRROR_TRANSMISSION, self.mirror_transmission);
        mask.set(
            VisibilityMask::PHASE_REFLECTION | VisibilityMask::PHASE_TRANSMISSION,
            self.volume,
        );
        mask.set(VisibilityMask::CONTAINS_CAMERA, self.contains_camera);
        mask
    }
}

/// How a geometry's surfaces are sided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SideType {
    /// Both sides are rendered.
    TwoSided = 0,
    /// Only the front side is rendered.
    SingleSided = 1,
    /// Sidedness comes from the mesh data.
    MeshDefaultSided = 2,
}

impl SideType {
    /// Decodes the stored enumerator; unknown values fall back to
    /// [`MeshDefaultSided`](Self::MeshDefaultSided).
    #[must_use]
    pub fn from_value(value: i32) -> Self {
        match value {
            0 => Self::TwoSided,
            1 => Self::SingleSided,
            _ => Self::MeshDefaultSided,
        }
    }
}

/// Keys of the attributes every geometry declares, in declaration order.
#[derive(Clone, Copy, Debug)]
pub struct GeometryKeys {
    /// Free-form label.
    pub label: AttributeKey<String>,
    /// Other geometries this one is built from.
    pub references: AttributeKey<ObjectVector>,
    /// Whether the geometry never changes across frames.
    pub is_static: AttributeKey<bool>,
    /// Sidedness, see [`SideType`].
    pub side_type: AttributeKey<i32>,
    /// Flips surface normals.
    pub reverse_normals: AttributeKey<bool>,
    /// Camera ray visibility.
    pub visible_in_camera: AttributeKey<bool>,
    /// Shadow ray visibility.
    pub visible_shadow: AttributeKey<bool>,
    /// Diffuse reflection visibility.
    pub visible_diffuse_reflection: AttributeKey<bool>,
    /// Diffuse transmission visibility.
    pub visible_diffuse_transmission: AttributeKey<bool>,
    /// Glossy reflection visibility.
    pub visible_glossy_reflection: AttributeKey<bool>,
    /// Glossy transmission visibility.
    pub visible_glossy_transmission: AttributeKey<bool>,
    /// Mirror reflection visibility.
    pub visible_mirror_reflection: AttributeKey<bool>,
    /// Mirror transmission visibility.
    pub visible_mirror_transmission: AttributeKey<bool>,
    /// Volume phase visibility.
    pub visible_volume: AttributeKey<bool>,
    /// Ray origin offset.
    pub ray_epsilon: AttributeKey<f32>,
    /// Shadow ray origin offset.
    pub shadow_ray_epsilon: AttributeKey<f32>,
    /// Label matched by shadow exclusion rules.
    pub shadow_receiver_label: AttributeKey<String>,
    /// Shadow exclusion rules.
    pub shadow_exclusion_mappings: AttributeKey<String>,
    /// Whether the geometry encloses the camera.
    pub contains_camera: AttributeKey<bool>,
    /// Camera used to pick tessellation rates.
    pub dicing_camera: AttributeKey<SceneObjectRef>,
}

/// The geometry base class.
#[derive(Clone, Copy, Debug)]
pub struct Geometry;

impl Geometry {
    /// Class name used by [`register`](Self::register).
    pub const CLASS_NAME: &'static str = "Geometry";

    /// Declares the shared geometry attributes.
    pub fn declare(b: &mut ClassBuilder) -> GeometryKeys {
        let label = b.declare("label", String::new());
        b.set_metadata(label, "comment", "label used in material and light assignment");

        let references = b.declare_with(
            "references",
            ObjectVector::default(),
            AttributeFlags::empty(),
            Interface::GEOMETRY,
        );
        b.set_metadata(references, "comment", "geometries this one is built from");

        let is_static = b.declare("static", true);
        b.set_metadata(
            is_static,
            "comment",
            "static geometry is never regenerated between frames",
        );

        let side_type = b.declare_with(
            "side_type",
            SideType::MeshDefaultSided as i32,
            AttributeFlags::ENUMERABLE,
            Interface::empty(),
        );
        b.set_enum_value(side_type, SideType::TwoSided as i32, "force two-sided");
        b.set_enum_value(side_type, SideType::SingleSided as i32, "force single-sided");
        b.set_enum_value(
            side_type,
            SideType::MeshDefaultSided as i32,
            "use mesh sidedness",
        );

        let reverse_normals = b.declare("reverse_normals", false);

        let visible_in_camera = b.declare("visible_in_camera", true);
        let visible_shadow = b.declare("visible_shadow", true);
        let visible_diffuse_reflection = b.declare("visible_diffuse_reflection", true);
        let visible_diffuse_transmission = b.declare("visible_diffuse_transmission", true);
        let visible_glossy_reflection = b.declare("visible_glossy_reflection", true);
        let visible_glossy_transmission = b.declare("visible_glossy_transmission", true);
        let visible_mirror_reflection = b.declare("visible_mirror_reflection", true);
        let visible_mirror_transmission = b.declare("visible_mirror_transmission", true);
        let visible_volume = b.declare("visible_volume", true);
        for key in [
            visible_in_camera,
            visible_shadow,
            visible_diffuse_reflection,
            visible_diffuse_transmission,
            visible_glossy_reflection,
            visible_glossy_transmission,
            visible_mirror_reflection,
            visible_mirror_transmission,
            visible_volume,
        ] {
            b.set_group("Ray Visibility", key);
        }

        let ray_epsilon = b.declare_with(
            "ray_epsilon",
            0.0,
            AttributeFlags::CAN_SKIP_GEOM_RELOAD,
            Interface::empty(),
        );
        let shadow_ray_epsilon = b.declare_with(
            "shadow_ray_epsilon",
            0.0,
            AttributeFlags::CAN_SKIP_GEOM_RELOAD,
            Interface::empty(),
        );
        let shadow_receiver_label = b.declare("shadow_receiver_label", String::new());
        let shadow_exclusion_mappings = b.declare("shadow_exclusion_mappings", String::new());
        let contains_camera = b.declare("contains_camera", false);
        let dicing_camera = b.declare_with(
            "dicing_camera",
            None,
            AttributeFlags::empty(),
            Interface::CAMERA,
        );

        GeometryKeys {
            label,
            references,
            is_static,
            side_type,
            reverse_normals,
            visible_in_camera,
            visible_shadow,
            visible_diffuse_reflection,
            visible_diffuse_transmission,
            visible_glossy_reflection,
            visible_glossy_transmission,
            visible_mirror_reflection,
            visible_mirror_transmission,
            visible_volume,
            ray_epsilon,
            shadow_ray_epsilon,
            shadow_receiver_label,
            shadow_exclusion_mappings,
            contains_camera,
            dicing_camera,
        }
    }

    /// Registers the geometry base class on `store`.
    pub fn register(store: &mut ObjectStore) -> (ClassId, GeometryKeys) {
        store.register_class(Self::CLASS_NAME, None, Interface::GEOMETRY, Self::declare)
    }
}

impl GeometryKeys {
    /// Reads the visibility booleans of `id`.
    #[must_use]
    pub fn ray_visibility(&self, store: &ObjectStore, id: ObjectId) -> RayVisibility {
        RayVisibility {
            camera: *store.get(id, self.visible_in_camera),
            shadow: *store.get(id, self.visible_shadow),
            diffuse_reflection: *store.get(id, self.visible_diffuse_reflection),
            diffuse_transmission: *store.get(id, self.visible_diffuse_transmission),
            glossy_reflection: *store.get(id, self.visible_glossy_reflection),
            glossy_transmission: *store.get(id, self.visible_glossy_transmission),
            mirror_reflection: *store.get(id, self.visible_mirror_reflection),
            mirror_transmission: *store.get(id, self.visible_mirror_transmission),
            volume: *store.get(id, self.visible_volume),
            contains_camera: *store.get(id, self.contains_camera),
        }
    }

    /// Returns the ray visibility mask of `id`.
    #[must_use]
    pub fn visibility_mask(&self, store: &ObjectStore, id: ObjectId) -> VisibilityMask {
        self.ray_visibility(store, id).mask()
    }

    /// Returns the sidedness of `id`.
    #[must_use]
    pub fn side_type(&self, store: &ObjectStore, id: ObjectId) -> SideType {
        SideType::from_value(*store.get(id, self.side_type))
    }
}
