//! Renderers.
//!
//! The harness draws through the [`Renderer`] trait. [`SoftwareRenderer`]
//! is a small CPU rasterizer: triangles with per-vertex lambert lighting,
//! line segments and square point sprites, depth tested into an RGBA
//! surface. It produces observable frames for the headless runner and for
//! tests; it is not a shading model.

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use image::{Rgba, RgbaImage};
use stage_core::{FrameTime, Result};
use stage_scene::{Camera, GeometryData, Material, Payload, SceneGraph, Side, Topology};
use tracing::{debug, info, trace};

use crate::depth_buffer::DepthBuffer;
use crate::ubo::{
    CameraUbo, LIGHT_DIRECTIONAL, LIGHT_POINT, LIGHT_RECT_AREA, LIGHT_SPOT, LightUbo, ObjectUbo, SceneUbo,
};

/// Draws a scene from a camera into a surface.
pub trait Renderer {
    /// Resize the drawing surface.
    fn resize(&mut self, width: u32, height: u32);

    /// Current surface size.
    fn size(&self) -> (u32, u32);

    /// Draw one frame.
    fn render(&mut self, scene: &SceneGraph, camera: &Camera, time: &FrameTime) -> Result<()>;
}

/// Counters from the most recent frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub meshes: usize,
    pub lights: usize,
    pub triangles: usize,
    pub lines: usize,
    pub points: usize,
}

/// CPU rasterizer writing into an RGBA image.
pub struct SoftwareRenderer {
    color: RgbaImage,
    depth: DepthBuffer,
    clear_color: Vec3,
    frames_drawn: u64,
    stats: FrameStats,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        info!("Software renderer created ({}x{})", width, height);
        Self {
            color: RgbaImage::new(width, height),
            depth: DepthBuffer::new(width, height),
            clear_color: Vec3::ZERO,
            frames_drawn: 0,
            stats: FrameStats::default(),
        }
    }

    /// Color used when the scene has no background.
    pub fn with_clear_color(mut self, clear_color: Vec3) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// The last rendered frame.
    pub fn image(&self) -> &RgbaImage {
        &self.color
    }

    /// Number of frames rendered since creation.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Counters from the last frame.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    fn clear(&mut self, color: Vec3) {
        let pixel = to_rgba(color.extend(1.0));
        for p in self.color.pixels_mut() {
            *p = pixel;
        }
        self.depth.clear();
    }

    fn draw_mesh(&mut self, data: &GeometryData, material: &Material, object: &ObjectUbo, pass: &Pass) {
        let mvp = pass.camera.view_projection * object.model;
        let lit = material.kind.is_lit();
        let base = material.color.extend(material.effective_opacity());

        let vertices: Vec<ClipVertex> = (0..data.vertex_count())
            .map(|i| {
                let local = data.positions[i];
                let color = if lit {
                    let world = object.model.transform_point3(local);
                    let normal = object
                        .normal_matrix
                        .transform_vector3(data.normals.get(i).copied().unwrap_or(Vec3::Z))
                        .normalize_or_zero();
                    let light = pass.irradiance(world, normal);
                    (material.emissive + material.color * light).extend(base.w)
                } else {
                    base
                };
                ClipVertex {
                    clip: mvp * local.extend(1.0),
                    color,
                    uv: data.uvs.get(i).copied().unwrap_or(Vec2::ZERO),
                }
            })
            .collect();

        let indices: Vec<u32> = if data.indices.is_empty() {
            (0..vertices.len() as u32).collect()
        } else {
            data.indices.clone()
        };

        match data.topology {
            Topology::Triangles if material.wireframe => {
                for tri in indices.chunks_exact(3) {
                    for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                        self.draw_line(vertices[a as usize], vertices[b as usize], material);
                    }
                }
            }
            Topology::Triangles => {
                for tri in indices.chunks_exact(3) {
                    let tri = [
                        vertices[tri[0] as usize],
                        vertices[tri[1] as usize],
                        vertices[tri[2] as usize],
                    ];
                    self.draw_triangle(tri, material);
                }
            }
            Topology::Lines => {
                for seg in indices.chunks_exact(2) {
                    self.draw_line(vertices[seg[0] as usize], vertices[seg[1] as usize], material);
                }
            }
            Topology::Points => {
                let scale = pass.point_scale(self.color.height());
                for i in indices {
                    self.draw_point(vertices[i as usize], material, scale);
                }
            }
        }
    }

    fn draw_triangle(&mut self, tri: [ClipVertex; 3], material: &Material) {
        let polygon = clip_near(&tri);
        if polygon.len() < 3 {
            return;
        }
        let screen: Vec<ScreenVertex> = polygon.iter().map(|v| self.to_screen(v)).collect();
        for i in 1..screen.len() - 1 {
            self.fill_triangle([screen[0], screen[i], screen[i + 1]], material);
        }
        self.stats.triangles += 1;
    }

    fn fill_triangle(&mut self, [a, b, c]: [ScreenVertex; 3], material: &Material) {
        let area = edge(a.pos, b.pos, c.pos);
        if area.abs() < f32::EPSILON {
            return;
        }
        // Counter-clockwise in NDC is clockwise on screen (Y points down)
        let front = area < 0.0;
        match material.side {
            Side::Front if !front => return,
            Side::Back if front => return,
            _ => {}
        }

        let (w, h) = self.color.dimensions();
        let min = a.pos.min(b.pos).min(c.pos).floor().max(Vec2::ZERO);
        let max = a.pos.max(b.pos).max(c.pos).ceil().min(Vec2::new(w as f32 - 1.0, h as f32 - 1.0));
        if min.x > max.x || min.y > max.y {
            return;
        }

        for y in min.y as u32..=max.y as u32 {
            for x in min.x as u32..=max.x as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b.pos, c.pos, p) / area;
                let w1 = edge(c.pos, a.pos, p) / area;
                let w2 = edge(a.pos, b.pos, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                let color = a.color * w0 + b.color * w1 + c.color * w2;
                let uv = a.uv * w0 + b.uv * w1 + c.uv * w2;
                self.shade(x, y, depth, color, uv, material);
            }
        }
    }

    fn draw_line(&mut self, a: ClipVertex, b: ClipVertex, material: &Material) {
        let Some((a, b)) = clip_segment(a, b) else {
            return;
        };
        let (a, b) = (self.to_screen(&a), self.to_screen(&b));
        let (w, h) = self.color.dimensions();
        let Some((t0, t1)) = clip_rect(a.pos, b.pos, Vec2::splat(-1.0), Vec2::new(w as f32 + 1.0, h as f32 + 1.0))
        else {
            return;
        };

        let span = (b.pos - a.pos) * (t1 - t0);
        let steps = span.abs().max_element().ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = t0 + (t1 - t0) * (i as f32 / steps as f32);
            let pos = a.pos.lerp(b.pos, t);
            if pos.x < 0.0 || pos.y < 0.0 {
                continue;
            }
            let depth = a.depth + (b.depth - a.depth) * t;
            self.shade(
                pos.x as u32,
                pos.y as u32,
                depth,
                a.color.lerp(b.color, t),
                a.uv.lerp(b.uv, t),
                material,
            );
        }
        self.stats.lines += 1;
    }

    fn draw_point(&mut self, v: ClipVertex, material: &Material, scale: f32) {
        if v.clip.w <= f32::EPSILON {
            return;
        }
        let center = self.to_screen(&v);
        let size = if material.size_attenuation {
            material.size * scale / v.clip.w
        } else {
            material.size
        }
        .max(1.0);

        // Pixels whose centers fall inside the half-open square
        let half = size * 0.5;
        let (w, h) = self.color.dimensions();
        let span = |c: f32, limit: u32| {
            let start = (c - half - 0.5).ceil().clamp(0.0, limit as f32) as u32;
            let end = (c + half - 0.5).ceil().clamp(0.0, limit as f32) as u32;
            start..end
        };
        for y in span(center.pos.y, h) {
            for x in span(center.pos.x, w) {
                // Sprite coordinates with V up, like a textured quad
                let uv = Vec2::new(
                    (x as f32 + 0.5 - (center.pos.x - half)) / size,
                    1.0 - (y as f32 + 0.5 - (center.pos.y - half)) / size,
                );
                self.shade(x, y, center.depth, center.color, uv, material);
            }
        }
        self.stats.points += 1;
    }

    fn shade(&mut self, x: u32, y: u32, depth: f32, color: Vec4, uv: Vec2, material: &Material) {
        let (w, h) = self.color.dimensions();
        if x >= w || y >= h {
            return;
        }

        let mut color = color;
        // Baked light adds to the lit diffuse before the albedo map applies
        if material.kind.is_lit()
            && let Some(light_map) = &material.light_map
        {
            let baked = material.color * light_map.sample(uv).xyz() * material.light_map_intensity;
            color += baked.extend(0.0);
        }
        if let Some(map) = &material.map {
            color *= map.sample(uv);
        }
        if let Some(alpha_map) = &material.alpha_map {
            color.w *= alpha_map.sample(uv).y;
        }
        if material.alpha_test > 0.0 && color.w <= material.alpha_test {
            return;
        }

        if material.depth_test {
            if !self.depth.test(x, y, depth, material.depth_write) {
                return;
            }
        } else if !(0.0..=1.0).contains(&depth) {
            return;
        }

        let out = if material.transparent {
            let dst = from_rgba(*self.color.get_pixel(x, y));
            let a = color.w.clamp(0.0, 1.0);
            (color.xyz() * a + dst.xyz() * (1.0 - a)).extend(1.0)
        } else {
            color.xyz().extend(1.0)
        };
        self.color.put_pixel(x, y, to_rgba(out));
    }

    fn to_screen(&self, v: &ClipVertex) -> ScreenVertex {
        let (w, h) = self.color.dimensions();
        let ndc = v.clip.xyz() / v.clip.w;
        ScreenVertex {
            pos: Vec2::new((ndc.x * 0.5 + 0.5) * w as f32, (0.5 - ndc.y * 0.5) * h as f32),
            depth: ndc.z,
            color: v.color,
            uv: v.uv,
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.color.dimensions() {
            return;
        }
        self.color = RgbaImage::new(width, height);
        self.depth.resize(width, height);
        debug!("Surface resized to {}x{}", width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.color.dimensions()
    }

    fn render(&mut self, scene: &SceneGraph, camera: &Camera, time: &FrameTime) -> Result<()> {
        self.stats = FrameStats::default();
        self.clear(scene.background.unwrap_or(self.clear_color));

        let (w, h) = self.color.dimensions();
        if w == 0 || h == 0 {
            return Ok(());
        }

        let placed = scene.world_matrices();
        let mut pass = Pass::new(CameraUbo::from_camera(camera));
        for (id, world) in &placed {
            if let Some(Payload::Light(light)) = scene.node(*id).map(|n| &n.payload) {
                pass.add_light(light, *world);
            }
        }
        self.stats.lights = pass.lights.len();

        let mut transparent = Vec::new();
        for (id, world) in &placed {
            let Some(mesh) = scene.node(*id).and_then(|n| n.mesh()) else {
                continue;
            };
            if !mesh.material.visible {
                continue;
            }
            if mesh.material.transparent {
                transparent.push((*id, *world));
                continue;
            }
            self.draw_mesh(&mesh.geometry, &mesh.material, &ObjectUbo::new(*world), &pass);
            self.stats.meshes += 1;
        }

        // Back to front so blending composes
        let eye = pass.camera.camera_position;
        transparent.sort_by(|(_, a), (_, b)| {
            let da = a.transform_point3(Vec3::ZERO).distance_squared(eye);
            let db = b.transform_point3(Vec3::ZERO).distance_squared(eye);
            db.total_cmp(&da)
        });
        for (id, world) in transparent {
            if let Some(mesh) = scene.node(id).and_then(|n| n.mesh()) {
                self.draw_mesh(&mesh.geometry, &mesh.material, &ObjectUbo::new(world), &pass);
                self.stats.meshes += 1;
            }
        }

        self.frames_drawn += 1;
        trace!(
            "Frame {} drawn: {} meshes, {} lights, {} triangles",
            time.frame(),
            self.stats.meshes,
            self.stats.lights,
            self.stats.triangles
        );
        Ok(())
    }
}

/// Per-frame camera and lighting records.
struct Pass {
    camera: CameraUbo,
    scene: SceneUbo,
    lights: Vec<LightUbo>,
}

impl Pass {
    fn new(camera: CameraUbo) -> Self {
        Self {
            camera,
            scene: SceneUbo::new(Vec3::ZERO, 0),
            lights: Vec::new(),
        }
    }

    fn add_light(&mut self, light: &stage_scene::Light, world: Mat4) {
        match LightUbo::from_light(light, world) {
            Some(record) => {
                self.lights.push(record);
                self.scene.light_count = self.lights.len() as u32;
            }
            None => {
                let ambient = self.scene.ambient.truncate() + light.color() * light.intensity();
                self.scene.ambient = ambient.extend(1.0);
            }
        }
    }

    /// Pixels per world unit at unit clip depth.
    fn point_scale(&self, height: u32) -> f32 {
        height as f32 * 0.5 * self.camera.projection.y_axis.y
    }

    /// Incoming light at a surface point.
    fn irradiance(&self, position: Vec3, normal: Vec3) -> Vec3 {
        let mut total = self.scene.ambient.truncate();
        for light in &self.lights {
            let radiance = light.color.truncate();
            let kind = light.kind();
            let to_light = light.position.truncate() - position;
            let distance = to_light.length();

            let contribution = if kind == LIGHT_DIRECTIONAL {
                let l = -light.direction.truncate();
                radiance * normal.dot(l).max(0.0)
            } else if kind == LIGHT_POINT || kind == LIGHT_SPOT {
                let l = to_light / distance.max(f32::EPSILON);
                let mut c = radiance * normal.dot(l).max(0.0) * falloff(distance, light.params.x, light.params.y);
                if kind == LIGHT_SPOT {
                    let cos_angle = (-l).dot(light.direction.truncate());
                    c *= smoothstep(light.direction.w, light.color.w, cos_angle);
                }
                c
            } else if kind == LIGHT_RECT_AREA {
                let facing = light.direction.truncate();
                if to_light.dot(facing) >= 0.0 {
                    Vec3::ZERO
                } else {
                    radiance * normal.dot(-facing).max(0.0)
                }
            } else {
                Vec3::ZERO
            };
            total += contribution;
        }
        total
    }
}

fn falloff(distance: f32, range: f32, decay: f32) -> f32 {
    if range > 0.0 {
        (1.0 - distance / range).clamp(0.0, 1.0).powf(decay)
    } else {
        1.0
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x >= edge0 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Clone, Copy, Debug)]
struct ClipVertex {
    clip: Vec4,
    color: Vec4,
    uv: Vec2,
}

impl ClipVertex {
    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            clip: self.clip.lerp(other.clip, t),
            color: self.color.lerp(other.color, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    pos: Vec2,
    depth: f32,
    color: Vec4,
    uv: Vec2,
}

/// Signed distance of `clip` from the near plane (`z >= 0` in RH zero-to-one clip space).
fn near_distance(v: &ClipVertex) -> f32 {
    v.clip.z
}

/// Clip a triangle against the near plane, returning a convex polygon.
fn clip_near(tri: &[ClipVertex; 3]) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(4);
    for i in 0..3 {
        let a = tri[i];
        let b = tri[(i + 1) % 3];
        let (da, db) = (near_distance(&a), near_distance(&b));
        if da >= 0.0 {
            out.push(a);
        }
        if (da >= 0.0) != (db >= 0.0) {
            out.push(a.lerp(b, da / (da - db)));
        }
    }
    out
}

fn clip_segment(a: ClipVertex, b: ClipVertex) -> Option<(ClipVertex, ClipVertex)> {
    let (da, db) = (near_distance(&a), near_distance(&b));
    match (da >= 0.0, db >= 0.0) {
        (true, true) => Some((a, b)),
        (false, false) => None,
        (true, false) => Some((a, a.lerp(b, da / (da - db)))),
        (false, true) => Some((a.lerp(b, da / (da - db)), b)),
    }
}

/// Liang-Barsky clip of segment `a..b` to a rectangle, as a parameter range.
fn clip_rect(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> Option<(f32, f32)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn to_rgba(color: Vec4) -> Rgba<u8> {
    let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    Rgba([c.x as u8, c.y as u8, c.z as u8, c.w as u8])
}

fn from_rgba(Rgba([r, g, b, a]): Rgba<u8>) -> Vec4 {
    Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
}
