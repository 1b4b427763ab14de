//! CPU-side textures.
//!
//! A [`Texture`] owns decoded RGBA8 pixels plus the sampling state a material
//! applies to them: wrapping, repeat/offset/rotation of the UV transform, and
//! filtering.

use std::path::PathBuf;

use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};

/// How UVs outside `[0, 1]` are mapped back into the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Wrap {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl Wrap {
    fn apply(self, t: f32) -> f32 {
        match self {
            Wrap::ClampToEdge => t.clamp(0.0, 1.0),
            Wrap::Repeat => t.rem_euclid(1.0),
            Wrap::MirroredRepeat => {
                let t = t.rem_euclid(2.0);
                if t > 1.0 { 2.0 - t } else { t }
            }
        }
    }
}

/// Texel filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl Filter {
    fn is_nearest(self) -> bool {
        matches!(
            self,
            Filter::Nearest | Filter::NearestMipmapNearest | Filter::NearestMipmapLinear
        )
    }
}

/// Decoded image plus sampling parameters.
#[derive(Clone, Debug)]
pub struct Texture {
    image: RgbaImage,
    /// Where the pixels came from, if loaded from disk
    pub source: Option<PathBuf>,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub repeat: Vec2,
    pub offset: Vec2,
    /// UV rotation in radians around `center`
    pub rotation: f32,
    pub center: Vec2,
    pub mag_filter: Filter,
    pub min_filter: Filter,
}

impl Texture {
    /// Wrap decoded pixels with default sampling state.
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            source: None,
            wrap_s: Wrap::ClampToEdge,
            wrap_t: Wrap::ClampToEdge,
            repeat: Vec2::ONE,
            offset: Vec2::ZERO,
            rotation: 0.0,
            center: Vec2::ZERO,
            mag_filter: Filter::Linear,
            min_filter: Filter::LinearMipmapLinear,
        }
    }

    /// A single-color texture.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_image(RgbaImage::from_pixel(width.max(1), height.max(1), Rgba(rgba)))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The decoded pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Replace the pixels, keeping sampling state (used for video frames).
    pub fn replace_image(&mut self, image: RgbaImage) {
        self.image = image;
    }

    /// Set both wrap modes.
    pub fn with_wrap(mut self, wrap: Wrap) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self
    }

    /// Apply repeat, rotation and offset to a mesh UV.
    pub fn transform_uv(&self, uv: Vec2) -> Vec2 {
        let scaled = uv * self.repeat;
        let rotated = if self.rotation != 0.0 {
            let (sin, cos) = self.rotation.sin_cos();
            let p = scaled - self.center;
            Vec2::new(cos * p.x - sin * p.y, sin * p.x + cos * p.y) + self.center
        } else {
            scaled
        };
        rotated + self.offset
    }

    /// Sample the texture at a mesh UV, returning linear RGBA in `[0, 1]`.
    ///
    /// Mesh UVs have V pointing up; row 0 of the image is its top.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let uv = self.transform_uv(uv);
        let s = self.wrap_s.apply(uv.x);
        let t = self.wrap_t.apply(uv.y);
        let (w, h) = (self.width() as f32, self.height() as f32);
        let x = s * w - 0.5;
        let y = (1.0 - t) * h - 0.5;

        if self.mag_filter.is_nearest() {
            return self.texel(x.round() as i64, y.round() as i64);
        }

        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);
        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), fx);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), fx);
        top.lerp(bottom, fy)
    }

    fn texel(&self, x: i64, y: i64) -> Vec4 {
        let x = x.clamp(0, self.width() as i64 - 1) as u32;
        let y = y.clamp(0, self.height() as i64 - 1) as u32;
        let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }
}
