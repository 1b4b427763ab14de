//! Light definitions for the scene.
//!
//! Lights are flat parameter records attached to scene nodes. A light's
//! position is the world position of the node carrying it.

use glam::Vec3;

/// Light that illuminates every surface equally.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

/// Shadow camera parameters for shadow-casting lights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSettings {
    /// Half extent of the orthographic shadow frustum
    pub extent: f32,
    /// Depth range of the shadow frustum along the light direction
    pub near: f32,
    pub far: f32,
    /// Shadow map resolution (square)
    pub map_size: u32,
    /// Blur radius
    pub radius: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            extent: 5.0,
            near: 0.5,
            far: 500.0,
            map_size: 512,
            radius: 1.0,
        }
    }
}

/// A directional light (sun-like), shining from its node toward `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    /// World-space point the light aims at
    pub target: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            target: Vec3::ZERO,
            cast_shadow: false,
            shadow: ShadowSettings::default(),
        }
    }
}

/// A point light (omnidirectional).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Range of the light; 0 means unlimited
    pub distance: f32,
    /// Attenuation exponent
    pub decay: f32,
    pub cast_shadow: bool,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            distance: 0.0,
            decay: 2.0,
            cast_shadow: false,
        }
    }
}

/// A spot light (cone-shaped).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    /// World-space point the cone axis passes through
    pub target: Vec3,
    /// Cone half-angle in radians
    pub angle: f32,
    /// Fraction of the cone that fades out, 0..=1
    pub penumbra: f32,
    pub distance: f32,
    pub decay: f32,
    pub cast_shadow: bool,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            target: Vec3::ZERO,
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            distance: 0.0,
            decay: 2.0,
            cast_shadow: false,
        }
    }
}

/// A rectangular area light emitting along its node's -Z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectAreaLight {
    pub color: Vec3,
    pub intensity: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for RectAreaLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            width: 10.0,
            height: 10.0,
        }
    }
}

/// Any light that can be attached to a scene node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
    RectArea(RectAreaLight),
}

impl Light {
    /// Light color.
    pub fn color(&self) -> Vec3 {
        match self {
            Light::Ambient(l) => l.color,
            Light::Directional(l) => l.color,
            Light::Point(l) => l.color,
            Light::Spot(l) => l.color,
            Light::RectArea(l) => l.color,
        }
    }

    /// Light intensity multiplier.
    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient(l) => l.intensity,
            Light::Directional(l) => l.intensity,
            Light::Point(l) => l.intensity,
            Light::Spot(l) => l.intensity,
            Light::RectArea(l) => l.intensity,
        }
    }

    /// Whether this light renders into a shadow map.
    pub fn casts_shadow(&self) -> bool {
        match self {
            Light::Directional(l) => l.cast_shadow,
            Light::Point(l) => l.cast_shadow,
            Light::Spot(l) => l.cast_shadow,
            Light::Ambient(_) | Light::RectArea(_) => false,
        }
    }

    /// Move the aim point of a targeted light. Returns false for lights without one.
    pub fn set_target(&mut self, target: Vec3) -> bool {
        match self {
            Light::Directional(l) => {
                l.target = target;
                true
            }
            Light::Spot(l) => {
                l.target = target;
                true
            }
            _ => false,
        }
    }

    /// Aim point of a targeted light.
    pub fn target(&self) -> Option<Vec3> {
        match self {
            Light::Directional(l) => Some(l.target),
            Light::Spot(l) => Some(l.target),
            _ => None,
        }
    }
}
