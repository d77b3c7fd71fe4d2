//! Frame compositing and integer upscaling.

use std::num::NonZeroU32;

/// Bytes per pixel in every buffer the host handles (RGB24).
pub const BYTES_PER_PIXEL: usize = 3;

/// User-chosen integer upscale factor, between 1 and [`DisplayScale::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayScale(NonZeroU32);

impl DisplayScale {
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Largest accepted factor. Keeps `base * factor` well inside `u32` for
    /// any realistic machine resolution.
    pub const MAX: u32 = 16;

    /// Returns `None` for zero or anything above [`MAX`](Self::MAX).
    pub fn new(factor: u32) -> Option<Self> {
        if factor > Self::MAX {
            return None;
        }
        NonZeroU32::new(factor).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// One step up, never above [`MAX`](Self::MAX).
    pub fn increase(self) -> Self {
        Self::new(self.get() + 1).unwrap_or(self)
    }

    /// One step down, never below 1.
    pub fn decrease(self) -> Self {
        Self::new(self.get() - 1).unwrap_or(Self::ONE)
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self::ONE
    }
}

impl std::fmt::Display for DisplayScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.get())
    }
}

/// RGB24 backing store of the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major RGB24 pixels, `width * 3` bytes per row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pitch(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ]
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels
            .resize(width as usize * height as usize * BYTES_PER_PIXEL, 0);
    }
}

/// Copies machine frames onto the display surface.
pub struct Compositor {
    base_width: u32,
    base_height: u32,
    surface: Surface,
}

impl Compositor {
    /// Create a compositor for frames of the given native resolution.
    pub fn new(base_width: u32, base_height: u32) -> Self {
        Self {
            base_width,
            base_height,
            surface: Surface::new(base_width, base_height),
        }
    }

    pub fn base_size(&self) -> (u32, u32) {
        (self.base_width, self.base_height)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Size of a `frame` buffer accepted by [`composite`](Self::composite).
    pub fn frame_len(&self) -> usize {
        self.base_width as usize * self.base_height as usize * BYTES_PER_PIXEL
    }

    /// Draw `frame` at 1:1 into the top-left of the surface, then magnify
    /// that base image to fill a `scale`-times surface using nearest
    /// neighbour sampling.
    ///
    /// `scale` is read fresh on every call; a change resizes the surface to
    /// `scale * base` before drawing.
    pub fn composite(&mut self, frame: &[u8], scale: DisplayScale) {
        debug_assert_eq!(frame.len(), self.frame_len());

        let factor = scale.get();
        let (width, height) = (
            self.base_width.saturating_mul(factor),
            self.base_height.saturating_mul(factor),
        );
        if self.surface.size() != (width, height) {
            log::debug!("compositor: surface resized to {width}x{height} ({scale})");
            self.surface.resize(width, height);
        }

        let pitch = self.surface.pitch();
        let base_pitch = self.base_width as usize * BYTES_PER_PIXEL;
        for (row, src) in frame.chunks_exact(base_pitch).enumerate() {
            let start = row * pitch;
            self.surface.pixels[start..start + base_pitch].copy_from_slice(src);
        }

        if factor > 1 {
            self.magnify(factor as usize);
        }
    }

    /// In-place nearest-neighbour magnification of the base image.
    ///
    /// Walks destination pixels from last to first. The source of pixel
    /// `(x, y)` is `(x / f, y / f)`, whose index is never greater than the
    /// destination's, so it is always read before it gets overwritten.
    fn magnify(&mut self, factor: usize) {
        let width = self.surface.width as usize;
        let height = self.surface.height as usize;
        let pixels = &mut self.surface.pixels;

        for y in (0..height).rev() {
            let src_row = (y / factor) * width;
            let dst_row = y * width;
            for x in (0..width).rev() {
                let src = (src_row + x / factor) * BYTES_PER_PIXEL;
                let dst = (dst_row + x) * BYTES_PER_PIXEL;
                pixels.copy_within(src..src + BYTES_PER_PIXEL, dst);
            }
        }
    }
}
