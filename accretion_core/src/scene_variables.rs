// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Global render settings and the viewport resolution chain.
//!
//! The scene variables object is the run-time configuration surface of a
//! scene. Window settings are resolved at the output resolution (`res`)
//! with a fixed precedence:
//!
//! ```text
//!   image_width × image_height ──► aperture window ──► region window
//!                  (unless aperture_window set)    (unless region_window set)
//!                                                          │
//!                    screen = (0, 0, region width, region height)
//!                                                          │
//!   debug pixel inside screen ──► 1×1 sub-viewport         │
//!   otherwise sub_viewport, scaled and clipped to screen ◄─┘
//!   otherwise the whole screen
//! ```

use alloc::vec;

use crate::attribute::{
    AttributeError, AttributeFlags, AttributeKey, ClassBuilder, ClassId, IntVector, Interface,
    SceneObjectRef,
};
use crate::object::{ObjectId, ObjectStore};
use crate::viewport::{self, Resolved, UNSET, Viewport};

/// Keys of the scene variables attributes.
#[derive(Clone, Copy, Debug)]
pub struct SceneVariablesKeys {
    /// Frame number being rendered.
    pub frame: AttributeKey<f32>,
    /// Render camera; falls back to the first camera in the scene.
    pub camera: AttributeKey<SceneObjectRef>,
    /// Material assignment layer; falls back to the first layer.
    pub layer: AttributeKey<SceneObjectRef>,
    /// Metadata written to EXR headers.
    pub exr_header_attributes: AttributeKey<SceneObjectRef>,
    /// Canonical image width before `res` is applied.
    pub image_width: AttributeKey<i32>,
    /// Canonical image height before `res` is applied.
    pub image_height: AttributeKey<i32>,
    /// Output resolution divisor.
    pub res: AttributeKey<f32>,
    /// Packed aperture window override.
    pub aperture_window: AttributeKey<IntVector>,
    /// Packed region window override.
    pub region_window: AttributeKey<IntVector>,
    /// Packed sub-viewport override.
    pub sub_viewport: AttributeKey<IntVector>,
    /// Index of this machine in a multi-machine render.
    pub machine_id: AttributeKey<i32>,
    /// Number of machines in a multi-machine render.
    pub num_machines: AttributeKey<i32>,
    /// Packed single-pixel render override.
    pub debug_pixel: AttributeKey<IntVector>,
    /// Packed primary ray index range for ray debugging.
    pub debug_rays_primary_range: AttributeKey<IntVector>,
    /// Packed ray depth range for ray debugging.
    pub debug_rays_depth_range: AttributeKey<IntVector>,
    /// Regenerate only tessellation-independent geometry data.
    pub fast_geometry_update: AttributeKey<bool>,
}

impl SceneVariablesKeys {
    /// Class name used by [`register`](Self::register).
    pub const CLASS_NAME: &'static str = "SceneVariables";

    /// Declares the scene variables attributes.
    pub fn declare(b: &mut ClassBuilder) -> Self {
        let frame = b.declare("frame", 0.0);
        let camera = b.declare_with("camera", None, AttributeFlags::empty(), Interface::CAMERA);
        let layer = b.declare_with("layer", None, AttributeFlags::empty(), Interface::LAYER);
        let exr_header_attributes = b.declare_with(
            "exr_header_attributes",
            None,
            AttributeFlags::empty(),
            Interface::METADATA,
        );

        let image_width = b.declare("image_width", 1920);
        let image_height = b.declare("image_height", 1080);
        let res = b.declare("res", 1.0);
        b.set_metadata(res, "comment", "divides the image size and every window");
        let aperture_window = b.declare("aperture_window", Viewport::unset_setting());
        let region_window = b.declare("region_window", Viewport::unset_setting());
        b.set_metadata(
            region_window,
            "comment",
            "overrides image size and aperture window",
        );
        let sub_viewport = b.declare("sub_viewport", Viewport::unset_setting());
        for key in [aperture_window, region_window, sub_viewport] {
            b.set_group("Frame", key);
        }
        b.set_group("Frame", image_width);
        b.set_group("Frame", image_height);
        b.set_group("Frame", res);

        let machine_id = b.declare("machine_id", -1);
        let num_machines = b.declare("num_machines", -1);
        b.set_group("Distributed", machine_id);
        b.set_group("Distributed", num_machines);

        let debug_pixel = b.declare("debug_pixel", vec![UNSET, UNSET]);
        b.set_metadata(debug_pixel, "comment", "renders only this pixel when inside the region");
        let debug_rays_primary_range = b.declare("debug_rays_primary_range", vec![UNSET, UNSET]);
        let debug_rays_depth_range = b.declare("debug_rays_depth_range", vec![UNSET, UNSET]);
        for key in [debug_pixel, debug_rays_primary_range, debug_rays_depth_range] {
            b.set_group("Debug", key);
        }

        let fast_geometry_update = b.declare("fast_geometry_update", false);

        Self {
            frame,
            camera,
            layer,
            exr_header_attributes,
            image_width,
            image_height,
            res,
            aperture_window,
            region_window,
            sub_viewport,
            machine_id,
            num_machines,
            debug_pixel,
            debug_rays_primary_range,
            debug_rays_depth_range,
            fast_geometry_update,
        }
    }

    /// Registers the scene variables class on `store`.
    pub fn register(store: &mut ObjectStore) -> (ClassId, Self) {
        store.register_class(
            Self::CLASS_NAME,
            None,
            Interface::SCENE_VARIABLES,
            Self::declare,
        )
    }

    /// Returns a read-only view of scene variables object `id`.
    #[must_use]
    pub fn view<'a>(&'a self, store: &'a ObjectStore, id: ObjectId) -> SceneVariables<'a> {
        SceneVariables {
            store,
            keys: self,
            id,
        }
    }

    /// Sets or clears one of the packed window attributes.
    ///
    /// # Errors
    ///
    /// Never fails for window attributes; the result mirrors
    /// [`ObjectStore::set`].
    pub fn set_window(
        &self,
        store: &mut ObjectStore,
        id: ObjectId,
        window: AttributeKey<IntVector>,
        value: Option<Viewport>,
    ) -> Result<(), AttributeError> {
        let packed = value.map_or_else(Viewport::unset_setting, Viewport::to_setting);
        store.set(id, window, packed)
    }

    /// Sets or clears the debug pixel.
    ///
    /// # Errors
    ///
    /// Never fails; the result mirrors [`ObjectStore::set`].
    pub fn set_debug_pixel(
        &self,
        store: &mut ObjectStore,
        id: ObjectId,
        pixel: Option<(i32, i32)>,
    ) -> Result<(), AttributeError> {
        let packed = pixel.map_or_else(|| vec![UNSET, UNSET], |(x, y)| vec![x, y]);
        store.set(id, self.debug_pixel, packed)
    }

    /// Resets the sub-viewport to unset, so the whole region renders.
    ///
    /// # Errors
    ///
    /// Never fails; the result mirrors [`ObjectStore::set`].
    pub fn disable_sub_viewport(
        &self,
        store: &mut ObjectStore,
        id: ObjectId,
    ) -> Result<(), AttributeError> {
        self.set_window(store, id, self.sub_viewport, None)
    }
}

/// Read-only view of one scene variables object.
#[derive(Clone, Copy, Debug)]
pub struct SceneVariables<'a> {
    store: &'a ObjectStore,
    keys: &'a SceneVariablesKeys,
    id: ObjectId,
}

impl SceneVariables<'_> {
    /// Returns the reciprocal of the output resolution divisor.
    #[must_use]
    pub fn inv_res(&self) -> f32 {
        1.0 / *self.store.get(self.id, self.keys.res)
    }

    /// Returns the aperture window at output resolution.
    ///
    /// Unset windows derive from the image size, each dimension at least one
    /// pixel.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "truncation toward zero is the defined rounding for rezed windows"
    )]
    #[must_use]
    pub fn rezed_aperture_window(&self) -> Resolved<Viewport> {
        let inv_res = self.inv_res();
        match self.window(self.keys.aperture_window) {
            Some(window) => Resolved {
                value: window.scaled(inv_res),
                user_set: true,
            },
            None => {
                let width = *self.store.get(self.id, self.keys.image_width) as f32;
                let height = *self.store.get(self.id, self.keys.image_height) as f32;
                Resolved {
                    value: Viewport::from_size(
                        ((width * inv_res) as i32).max(1),
                        ((height * inv_res) as i32).max(1),
                    ),
                    user_set: false,
                }
            }
        }
    }

    /// Returns the region window at output resolution.
    ///
    /// Unset regions equal the aperture window.
    #[must_use]
    pub fn rezed_region_window(&self) -> Resolved<Viewport> {
        match self.window(self.keys.region_window) {
            Some(window) => Resolved {
                value: window.scaled(self.inv_res()),
                user_set: true,
            },
            None => Resolved {
                user_set: false,
                ..self.rezed_aperture_window()
            },
        }
    }

    /// Returns the width of the rezed region window.
    #[must_use]
    pub fn rezed_width(&self) -> i32 {
        self.rezed_region_window().value.width()
    }

    /// Returns the height of the rezed region window.
    #[must_use]
    pub fn rezed_height(&self) -> i32 {
        self.rezed_region_window().value.height()
    }

    /// Returns the rendered part of the region, relative to the region's
    /// origin.
    ///
    /// A debug pixel inside the region collapses the result to that pixel,
    /// overriding any configured sub-viewport.
    ///
    /// # Panics
    ///
    /// Panics if the resolved minimum is negative.
    #[must_use]
    pub fn rezed_sub_viewport(&self) -> Resolved<Viewport> {
        let region = self.rezed_region_window().value;
        let screen = Viewport::from_size(region.width(), region.height());

        if let Some((x, y)) = self.debug_pixel()
            && screen.contains(x, y)
        {
            return Resolved {
                value: Viewport::new(x, y, x + 1, y + 1),
                user_set: true,
            };
        }

        let Some(sub_viewport) = self.sub_viewport() else {
            return Resolved {
                value: screen,
                user_set: false,
            };
        };
        let value = sub_viewport.scaled(self.inv_res()).clipped_to(screen);
        assert!(
            value.min_x >= 0 && value.min_y >= 0,
            "resolved sub-viewport {value:?} has a negative minimum"
        );
        Resolved {
            value,
            user_set: true,
        }
    }

    /// Returns the configured sub-viewport at canonical resolution.
    #[must_use]
    pub fn sub_viewport(&self) -> Option<Viewport> {
        self.window(self.keys.sub_viewport)
    }

    /// Returns the debug pixel, if set.
    #[must_use]
    pub fn debug_pixel(&self) -> Option<(i32, i32)> {
        viewport::pair_from_setting(self.store.get(self.id, self.keys.debug_pixel))
    }

    /// Returns the primary ray range to debug, if set.
    #[must_use]
    pub fn debug_rays_primary_range(&self) -> Option<(i32, i32)> {
        viewport::pair_from_setting(self.store.get(self.id, self.keys.debug_rays_primary_range))
    }

    /// Returns the ray depth range to debug, if set.
    #[must_use]
    pub fn debug_rays_depth_range(&self) -> Option<(i32, i32)> {
        viewport::pair_from_setting(self.store.get(self.id, self.keys.debug_rays_depth_range))
    }

    /// Returns this machine's index; negative (unset) values resolve to 0.
    #[must_use]
    pub fn machine_id(&self) -> i32 {
        (*self.store.get(self.id, self.keys.machine_id)).max(0)
    }

    /// Returns the machine count; values below 2 resolve to 1.
    #[must_use]
    pub fn num_machines(&self) -> i32 {
        (*self.store.get(self.id, self.keys.num_machines)).max(1)
    }

    /// Returns the render camera: the referenced one, or else the first
    /// camera in the scene.
    #[must_use]
    pub fn camera(&self) -> Option<ObjectId> {
        self.reference_or_first(self.keys.camera, Interface::CAMERA)
    }

    /// Returns the layer: the referenced one, or else the first layer in the
    /// scene.
    #[must_use]
    pub fn layer(&self) -> Option<ObjectId> {
        self.reference_or_first(self.keys.layer, Interface::LAYER)
    }

    /// Returns the referenced EXR header metadata, if any.
    #[must_use]
    pub fn exr_header_attributes(&self) -> Option<ObjectId> {
        self.store
            .get(self.id, self.keys.exr_header_attributes)
            .filter(|&m| self.store.is_alive(m))
    }

    /// Returns the frame number.
    #[must_use]
    pub fn frame(&self) -> f32 {
        *self.store.get(self.id, self.keys.frame)
    }

    /// Returns whether only tessellation-independent geometry data should
    /// be regenerated.
    #[must_use]
    pub fn fast_geometry_update(&self) -> bool {
        *self.store.get(self.id, self.keys.fast_geometry_update)
    }

    fn window(&self, key: AttributeKey<IntVector>) -> Option<Viewport> {
        Viewport::from_setting(self.store.get(self.id, key))
    }

    fn reference_or_first(
        &self,
        key: AttributeKey<SceneObjectRef>,
        interface: Interface,
    ) -> Option<ObjectId> {
        self.store
            .get(self.id, key)
            .filter(|&o| self.store.is_alive(o))
            .or_else(|| self.store.objects_with_interface(interface).next())
    }
}
