// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear to tiled pixel addressing.

/// Edge length of a square tile, in pixels.
pub const TILE_SIZE: u32 = 8;

const TILE_SHIFT: u32 = 3;
const TILE_MASK: u32 = TILE_SIZE - 1;
const TILE_PIXELS: u32 = TILE_SIZE * TILE_SIZE;

/// Maps linear `(x, y)` coordinates onto an 8×8-tiled layout.
///
/// Tiles are stored row-major, and pixels inside a tile are stored row-major
/// too. The tiled dimensions are the image dimensions rounded up to a
/// multiple of [`TILE_SIZE`]; the padding pixels exist in the buffer but are
/// never addressed by in-range coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tiler {
    width: u32,
    height: u32,
    tiles_x: u32,
    tiles_y: u32,
}

impl Tiler {
    /// Creates a tiler for an image of the given size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles_x: width.div_ceil(TILE_SIZE),
            tiles_y: height.div_ceil(TILE_SIZE),
        }
    }

    /// Image width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width rounded up to a whole number of tiles.
    #[must_use]
    pub const fn aligned_width(&self) -> u32 {
        self.tiles_x * TILE_SIZE
    }

    /// Height rounded up to a whole number of tiles.
    #[must_use]
    pub const fn aligned_height(&self) -> u32 {
        self.tiles_y * TILE_SIZE
    }

    /// Number of pixels in a tiled buffer, padding included.
    #[must_use]
    pub const fn tiled_len(&self) -> usize {
        self.tiles_x as usize * self.tiles_y as usize * TILE_PIXELS as usize
    }

    /// Offset of pixel `(x, y)` inside a tiled buffer.
    ///
    /// The offset counts pixels, not channels.
    #[must_use]
    pub fn linear_to_tiled_offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(
            x < self.aligned_width() && y < self.aligned_height(),
            "pixel ({x}, {y}) outside tiled area {}x{}",
            self.aligned_width(),
            self.aligned_height(),
        );
        // Tile counts multiply past `u32::MAX` on large images.
        let tile =
            (y >> TILE_SHIFT) as usize * self.tiles_x as usize + (x >> TILE_SHIFT) as usize;
        let inner = ((y & TILE_MASK) << TILE_SHIFT) + (x & TILE_MASK);
        tile * TILE_PIXELS as usize + inner as usize
    }
}
