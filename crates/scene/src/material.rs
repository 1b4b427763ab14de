//! Material descriptors.
//!
//! A material is configuration data only: the renderer decides what each
//! field means for the pixels it writes.

use std::sync::Arc;

use glam::Vec3;
use stage_resources::Texture;

/// Convert a `0xRRGGBB` literal into a linear-range color.
pub fn rgb_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Shading family of a material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Unlit flat color
    Basic,
    Lambert,
    Phong,
    #[default]
    Standard,
    Physical,
    /// Point sprites
    Points,
    /// Line segments
    Line,
}

impl MaterialKind {
    /// Whether scene lights affect this material.
    pub fn is_lit(self) -> bool {
        !matches!(self, Self::Basic | Self::Points | Self::Line)
    }
}

/// Which triangle faces are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Material properties.
#[derive(Debug, Clone)]
pub struct Material {
    pub kind: MaterialKind,
    /// Base color (albedo)
    pub color: Vec3,
    pub emissive: Vec3,
    /// Phong specular color
    pub specular: Vec3,
    /// Phong specular exponent
    pub shininess: f32,
    /// Roughness factor (0.0 = smooth, 1.0 = rough)
    pub roughness: f32,
    /// Metallic factor (0.0 = dielectric, 1.0 = metal)
    pub metalness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub opacity: f32,
    /// `opacity` only applies when set
    pub transparent: bool,
    pub visible: bool,
    pub side: Side,
    pub wireframe: bool,
    pub flat_shading: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    /// Point size (pixels, or world units with attenuation)
    pub size: f32,
    pub size_attenuation: bool,
    /// Texels with alpha at or below this value are discarded
    pub alpha_test: f32,

    pub map: Option<Arc<Texture>>,
    pub normal_map: Option<Arc<Texture>>,
    pub ao_map: Option<Arc<Texture>>,
    pub ao_map_intensity: f32,
    pub roughness_map: Option<Arc<Texture>>,
    pub metalness_map: Option<Arc<Texture>>,
    pub displacement_map: Option<Arc<Texture>>,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub alpha_map: Option<Arc<Texture>>,
    pub light_map: Option<Arc<Texture>>,
    pub light_map_intensity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Standard,
            color: Vec3::ONE,
            emissive: Vec3::ZERO,
            specular: Vec3::splat(0x11 as f32 / 255.0),
            shininess: 30.0,
            roughness: 1.0,
            metalness: 0.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            opacity: 1.0,
            transparent: false,
            visible: true,
            side: Side::Front,
            wireframe: false,
            flat_shading: false,
            depth_test: true,
            depth_write: true,
            size: 1.0,
            size_attenuation: true,
            alpha_test: 0.0,
            map: None,
            normal_map: None,
            ao_map: None,
            ao_map_intensity: 1.0,
            roughness_map: None,
            metalness_map: None,
            displacement_map: None,
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            alpha_map: None,
            light_map: None,
            light_map_intensity: 1.0,
        }
    }
}

impl Material {
    /// A material of the given kind and color, other fields at defaults.
    pub fn new(kind: MaterialKind, color: Vec3) -> Self {
        Self {
            kind,
            color,
            ..Default::default()
        }
    }

    /// Unlit color material.
    pub fn basic(color: Vec3) -> Self {
        Self::new(MaterialKind::Basic, color)
    }

    /// Blinn-Phong material.
    pub fn phong(color: Vec3) -> Self {
        Self::new(MaterialKind::Phong, color)
    }

    /// Metal/roughness material.
    pub fn standard(color: Vec3, roughness: f32, metalness: f32) -> Self {
        Self {
            roughness,
            metalness,
            ..Self::new(MaterialKind::Standard, color)
        }
    }

    /// Point sprite material.
    pub fn points(color: Vec3, size: f32, size_attenuation: bool) -> Self {
        Self {
            size,
            size_attenuation,
            ..Self::new(MaterialKind::Points, color)
        }
    }

    /// Line material.
    pub fn line(color: Vec3) -> Self {
        Self::new(MaterialKind::Line, color)
    }

    /// Opacity the renderer should use.
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Iterate the texture slots that are filled, by name.
    pub fn textures(&self) -> impl Iterator<Item = (&'static str, &Arc<Texture>)> {
        [
            ("map", &self.map),
            ("normal_map", &self.normal_map),
            ("ao_map", &self.ao_map),
            ("roughness_map", &self.roughness_map),
            ("metalness_map", &self.metalness_map),
            ("displacement_map", &self.displacement_map),
            ("alpha_map", &self.alpha_map),
            ("light_map", &self.light_map),
        ]
        .into_iter()
        .filter_map(|(name, slot)| slot.as_ref().map(|texture| (name, texture)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex() {
        assert_eq!(rgb_hex(0xff0000), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(rgb_hex(0x000000), Vec3::ZERO);
        let c = rgb_hex(0x2c3e50);
        assert!((c.x - 44.0 / 255.0).abs() < 1e-6);
        assert!((c.z - 80.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_opacity_requires_transparent() {
        let mut material = Material::basic(Vec3::ONE);
        material.opacity = 0.5;
        assert_eq!(material.effective_opacity(), 1.0);

        material.transparent = true;
        assert_eq!(material.effective_opacity(), 0.5);
    }

    #[test]
    fn test_texture_slots() {
        let texture = Arc::new(Texture::solid(2, 2, [255, 0, 0, 255]));
        let material = Material {
            map: Some(texture.clone()),
            ao_map: Some(texture),
            ..Material::standard(Vec3::ONE, 0.5, 0.5)
        };

        let names: Vec<_> = material.textures().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["map", "ao_map"]);
    }

    #[test]
    fn test_lit_kinds() {
        assert!(MaterialKind::Phong.is_lit());
        assert!(!MaterialKind::Basic.is_lit());
        assert!(!MaterialKind::Points.is_lit());
    }
}
