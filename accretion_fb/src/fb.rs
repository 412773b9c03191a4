// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tiled frame buffers and per-pixel readback.

use alloc::vec;
use alloc::vec::Vec;

use accretion_core::viewport::Viewport;
use bytemuck::{Pod, Zeroable};

use crate::tiler::Tiler;

/// An RGBA pixel with linear float channels.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderColor {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl RenderColor {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// The tiled output buffers of one frame.
///
/// Every buffer uses the same [`Tiler`] layout. Buffers start zeroed.
#[derive(Clone, Debug)]
pub struct Fb {
    tiler: Tiler,
    render: Vec<RenderColor>,
    render_odd: Vec<RenderColor>,
    pixel_info: Vec<f32>,
    heat_map: Vec<f32>,
    weight: Vec<f32>,
}

impl Fb {
    /// Creates zeroed buffers for an image of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let tiler = Tiler::new(width, height);
        let len = tiler.tiled_len();
        Self {
            tiler,
            render: vec![RenderColor::zeroed(); len],
            render_odd: vec![RenderColor::zeroed(); len],
            pixel_info: vec![0.0; len],
            heat_map: vec![0.0; len],
            weight: vec![0.0; len],
        }
    }

    /// Creates buffers covering a resolved viewport.
    ///
    /// Pixel coordinates are relative to the viewport's minimum corner. An
    /// empty viewport yields empty buffers.
    #[must_use]
    pub fn from_viewport(viewport: Viewport) -> Self {
        let width = u32::try_from(viewport.width()).unwrap_or(0);
        let height = u32::try_from(viewport.height()).unwrap_or(0);
        Self::new(width, height)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.tiler.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.tiler.height()
    }

    /// The tiled layout shared by every buffer.
    #[must_use]
    pub fn tiler(&self) -> &Tiler {
        &self.tiler
    }

    // -- Getters --

    /// Beauty color at `(sx, sy)`.
    #[must_use]
    pub fn pix_render_buffer(&self, sx: u32, sy: u32) -> RenderColor {
        self.render[self.tiler.linear_to_tiled_offset(sx, sy)]
    }

    /// Odd-sample beauty color at `(sx, sy)`.
    #[must_use]
    pub fn pix_render_buffer_odd(&self, sx: u32, sy: u32) -> RenderColor {
        self.render_odd[self.tiler.linear_to_tiled_offset(sx, sy)]
    }

    /// Pixel-info (depth) value at `(sx, sy)`.
    #[must_use]
    pub fn pix_pixel_info(&self, sx: u32, sy: u32) -> f32 {
        self.pixel_info[self.tiler.linear_to_tiled_offset(sx, sy)]
    }

    /// Heat-map time in seconds at `(sx, sy)`.
    #[must_use]
    pub fn pix_heat_map(&self, sx: u32, sy: u32) -> f32 {
        self.heat_map[self.tiler.linear_to_tiled_offset(sx, sy)]
    }

    /// Accumulated sample weight at `(sx, sy)`.
    #[must_use]
    pub fn pix_weight(&self, sx: u32, sy: u32) -> f32 {
        self.weight[self.tiler.linear_to_tiled_offset(sx, sy)]
    }

    // -- Setters --

    /// Stores the beauty color at `(sx, sy)`.
    pub fn set_pix_render_buffer(&mut self, sx: u32, sy: u32, color: RenderColor) {
        let ofs = self.tiler.linear_to_tiled_offset(sx, sy);
        self.render[ofs] = color;
    }

    /// Stores the odd-sample beauty color at `(sx, sy)`.
    pub fn set_pix_render_buffer_odd(&mut self, sx: u32, sy: u32, color: RenderColor) {
        let ofs = self.tiler.linear_to_tiled_offset(sx, sy);
        self.render_odd[ofs] = color;
    }

    /// Stores the pixel-info value at `(sx, sy)`.
    pub fn set_pix_pixel_info(&mut self, sx: u32, sy: u32, value: f32) {
        let ofs = self.tiler.linear_to_tiled_offset(sx, sy);
        self.pixel_info[ofs] = value;
    }

    /// Stores the heat-map time at `(sx, sy)`.
    pub fn set_pix_heat_map(&mut self, sx: u32, sy: u32, value: f32) {
        let ofs = self.tiler.linear_to_tiled_offset(sx, sy);
        self.heat_map[ofs] = value;
    }

    /// Stores the sample weight at `(sx, sy)`.
    pub fn set_pix_weight(&mut self, sx: u32, sy: u32, value: f32) {
        let ofs = self.tiler.linear_to_tiled_offset(sx, sy);
        self.weight[ofs] = value;
    }

    // -- Bulk access --

    /// Replaces the tiled beauty buffer from raw RGBA floats.
    ///
    /// Returns `false` and leaves the buffer untouched if `floats` does not
    /// hold exactly four channels per tiled pixel.
    pub fn load_render_buffer(&mut self, floats: &[f32]) -> bool {
        match bytemuck::try_cast_slice::<f32, RenderColor>(floats) {
            Ok(pixels) if pixels.len() == self.render.len() => {
                self.render.copy_from_slice(pixels);
                true
            }
            _ => false,
        }
    }

    /// The tiled beauty buffer as raw bytes.
    #[must_use]
    pub fn render_buffer_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.render)
    }

    /// Copies the beauty buffer into scanline order, padding dropped.
    #[must_use]
    pub fn untile_render_buffer(&self) -> Vec<RenderColor> {
        let mut out = Vec::with_capacity(self.width() as usize * self.height() as usize);
        for sy in 0..self.height() {
            for sx in 0..self.width() {
                out.push(self.pix_render_buffer(sx, sy));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_from_viewport() {
        let fb = Fb::from_viewport(Viewport::new(10, 20, 30, 25));
        assert_eq!(fb.width(), 20);
        assert_eq!(fb.height(), 5);
        assert_eq!(fb.tiler().tiled_len(), 24 * 8);
    }

    #[test]
    fn inverted_viewport_is_empty() {
        let fb = Fb::from_viewport(Viewport::new(5, 5, 0, 0));
        assert_eq!(fb.width(), 0);
        assert!(fb.untile_render_buffer().is_empty());
    }

    #[test]
    fn pixel_getters_read_back_setters() {
        let mut fb = Fb::new(17, 9);
        let c = RenderColor::new(0.25, 0.5, 0.75, 1.0);
        fb.set_pix_render_buffer(16, 8, c);
        fb.set_pix_render_buffer_odd(3, 2, c);
        fb.set_pix_pixel_info(9, 1, 42.0);
        fb.set_pix_heat_map(0, 8, 0.5);
        fb.set_pix_weight(15, 7, 3.0);

        assert_eq!(fb.pix_render_buffer(16, 8), c);
        assert_eq!(fb.pix_render_buffer(15, 8), RenderColor::default());
        assert_eq!(fb.pix_render_buffer_odd(3, 2), c);
        assert_eq!(fb.pix_pixel_info(9, 1), 42.0);
        assert_eq!(fb.pix_heat_map(0, 8), 0.5);
        assert_eq!(fb.pix_weight(15, 7), 3.0);
    }

    #[test]
    fn loaded_tiled_data_is_read_through_tiler() {
        let mut fb = Fb::new(16, 8);
        let len = fb.tiler().tiled_len();
        let mut floats = vec![0.0_f32; len * 4];
        // Second tile, first pixel: linear (8, 0).
        floats[64 * 4..64 * 4 + 4].copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert!(fb.load_render_buffer(&floats), "exact-length load accepted");
        assert_eq!(
            fb.pix_render_buffer(8, 0),
            RenderColor::new(1.0, 2.0, 3.0, 4.0)
        );
        assert_eq!(fb.render_buffer_bytes().len(), len * 16);
    }

    #[test]
    fn wrong_length_load_is_rejected() {
        let mut fb = Fb::new(8, 8);
        assert!(!fb.load_render_buffer(&[1.0; 7]), "partial pixel rejected");
        assert!(!fb.load_render_buffer(&[1.0; 8]), "short buffer rejected");
        assert_eq!(fb.pix_render_buffer(0, 0), RenderColor::default());
    }

    #[test]
    fn untiled_buffer_is_scanline_order() {
        let mut fb = Fb::new(10, 2);
        fb.set_pix_render_buffer(9, 0, RenderColor::new(1.0, 0.0, 0.0, 1.0));
        fb.set_pix_render_buffer(0, 1, RenderColor::new(0.0, 1.0, 0.0, 1.0));
        let linear = fb.untile_render_buffer();
        assert_eq!(linear.len(), 20);
        assert_eq!(linear[9].r, 1.0);
        assert_eq!(linear[10].g, 1.0);
    }
}
