use log::warn;
use nalgebra as na;
use na::{vector, Matrix4, Vector2, Vector3, Vector4};

use crate::mesh::Mesh;
use crate::texture::MaterialMaps;
use crate::util::{
    from_hom_point, from_hom_vector, invert_transpose, normalize_or_zero, to_hom_point,
    to_hom_vector,
};

use super::framebuffer::{Color, BLACK, WHITE};
use super::transform::Transforms;

/// Light and material constants for one render pass.
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    /// Direction toward the light. May come in un-normalized, shaders
    /// normalize it on construction.
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub specular_exponent: f32,
    pub specular_intensity: f32,
}

impl Default for Lighting {
    fn default() -> Lighting {
        return Lighting {
            direction: vector![1.0, 1.0, 1.0],
            color: vector![1.0, 1.0, 1.0],
            ambient: vector![0.1, 0.1, 0.1],
            specular_exponent: 32.0,
            specular_intensity: 0.5,
        };
    }
}

/// The two programmable stages of the pipeline. The rasterizer drives any
/// implementation through this trait and knows nothing about the shading
/// model behind it.
///
/// Call protocol: all three corners of a triangle go through vertex before
/// fragment runs for any pixel of that triangle, and corners of two
/// triangles are never interleaved. Vertex overwrites the shader's internal
/// per-corner state, so breaking the protocol mixes attributes of different
/// triangles.
pub trait Shader {
    /// Transforms one corner of a face and records its attributes for
    /// interpolation. Returns viewport coordinates whose w component still
    /// holds the clip-space w.
    fn vertex(
        &mut self,
        transforms: &Transforms,
        mesh: &dyn Mesh,
        face: usize,
        corner: usize,
    ) -> Vector4<f32>;

    /// Shades one fragment. The barycentric weights are already
    /// perspective-corrected and sum to 1. None discards the fragment.
    fn fragment(&self, bar: Vector3<f32>) -> Option<Color>;
}

/// Derives the matrix that transforms normals for the given point
/// transform. Falls back to identity with a warning instead of feeding
/// NaN into the frame, and trips in debug builds.
fn normal_matrix(m: &Matrix4<f32>) -> Matrix4<f32> {
    match invert_transpose(m) {
        Some(it) => return it,
        None => {
            debug_assert!(false, "singular point transform, cannot derive a normal transform");
            warn!("projection * model_view is singular, normals use the identity transform");
            return Matrix4::identity();
        }
    }
}

/// Per-pixel Phong lighting with optional diffuse, normal and specular
/// maps. The primary shading model.
pub struct PhongShader<'a> {
    maps: &'a MaterialMaps,
    uniform_m: Matrix4<f32>,   // Projection * ModelView.
    uniform_mit: Matrix4<f32>, // Its invert-transpose, for normals.
    light_direction: Vector3<f32>,
    light_color: Vector3<f32>,
    ambient: Vector3<f32>,
    specular_exponent: f32,
    specular_intensity: f32,
    camera_position: Vector3<f32>,
    // Scratch state between the two stages, one slot per corner,
    // overwritten every triangle.
    varying_uv: [Vector2<f32>; 3],
    varying_normal: [Vector3<f32>; 3],
    varying_position: [Vector3<f32>; 3],
}

impl<'a> PhongShader<'a> {
    pub fn new(
        transforms: &Transforms,
        lighting: &Lighting,
        camera_position: Vector3<f32>,
        maps: &'a MaterialMaps,
    ) -> PhongShader<'a> {
        let uniform_m = transforms.projection * transforms.model_view;
        return PhongShader {
            maps,
            uniform_m,
            uniform_mit: normal_matrix(&uniform_m),
            light_direction: lighting.direction.normalize(),
            light_color: lighting.color,
            ambient: lighting.ambient,
            specular_exponent: lighting.specular_exponent,
            specular_intensity: lighting.specular_intensity,
            camera_position,
            varying_uv: [Vector2::zeros(); 3],
            varying_normal: [Vector3::zeros(); 3],
            varying_position: [Vector3::zeros(); 3],
        };
    }
}

impl Shader for PhongShader<'_> {
    fn vertex(
        &mut self,
        transforms: &Transforms,
        mesh: &dyn Mesh,
        face: usize,
        corner: usize,
    ) -> Vector4<f32> {
        self.varying_uv[corner] = mesh.uv_at(face, corner);

        let normal = mesh.normal_at(face, corner);
        self.varying_normal[corner] = from_hom_vector(self.uniform_mit * to_hom_vector(normal));

        let clip = self.uniform_m * to_hom_point(mesh.vertex_at(face, corner));
        // Corners with w <= 0 make this divide meaningless, but such
        // triangles are rejected whole before any fragment runs.
        self.varying_position[corner] = from_hom_point(clip);

        return transforms.viewport * clip;
    }

    fn fragment(&self, bar: Vector3<f32>) -> Option<Color> {
        let uv = self.varying_uv[0] * bar.x
            + self.varying_uv[1] * bar.y
            + self.varying_uv[2] * bar.z;

        // Interpolation does not preserve unit length, renormalize.
        let interpolated = self.varying_normal[0] * bar.x
            + self.varying_normal[1] * bar.y
            + self.varying_normal[2] * bar.z;
        let mut normal = normalize_or_zero(interpolated);

        if let Some(texel) = self.maps.normal.sample_wrapped(uv.x, uv.y) {
            // Channels encode [-1, 1] as [0, 255].
            normal = normalize_or_zero(vector![
                texel[0] as f32 / 255.0 * 2.0 - 1.0,
                texel[1] as f32 / 255.0 * 2.0 - 1.0,
                texel[2] as f32 / 255.0 * 2.0 - 1.0
            ]);
        }

        let position = self.varying_position[0] * bar.x
            + self.varying_position[1] * bar.y
            + self.varying_position[2] * bar.z;
        let to_camera = normalize_or_zero(self.camera_position - position);

        let diffuse = normal.dot(&self.light_direction).max(0.0);

        // No specular on surfaces facing away from the light.
        let mut specular = 0.0;
        if diffuse > 0.0 {
            let half = normalize_or_zero(self.light_direction + to_camera);
            specular = normal.dot(&half).max(0.0).powf(self.specular_exponent);
        }
        let map_factor = match self.maps.specular.sample_wrapped(uv.x, uv.y) {
            Some(texel) => texel[0] as f32 / 255.0,
            None => 1.0,
        };
        specular *= map_factor * self.specular_intensity;

        let albedo = match self.maps.diffuse.sample_wrapped(uv.x, uv.y) {
            Some(texel) => vector![
                texel[0] as f32 / 255.0,
                texel[1] as f32 / 255.0,
                texel[2] as f32 / 255.0
            ],
            None => vector![0.8, 0.8, 0.8],
        };

        let mut channels = [0u8; 3];
        for i in 0..3 {
            let value = albedo[i] * self.ambient[i]
                + albedo[i] * self.light_color[i] * diffuse
                + self.light_color[i] * specular;
            channels[i] = (value.clamp(0.0, 1.0) * 255.0) as u8;
        }

        return Some(Color {
            r: channels[0],
            g: channels[1],
            b: channels[2],
        });
    }
}

/// One diffuse intensity per triangle, computed from the face geometric
/// normal. Exists mostly to prove the rasterizer does not care which
/// shading model it drives.
pub struct FlatShader {
    uniform_m: Matrix4<f32>,
    uniform_mit: Matrix4<f32>,
    light_direction: Vector3<f32>,
    intensity: f32,
}

impl FlatShader {
    pub fn new(transforms: &Transforms, lighting: &Lighting) -> FlatShader {
        let uniform_m = transforms.projection * transforms.model_view;
        return FlatShader {
            uniform_m,
            uniform_mit: normal_matrix(&uniform_m),
            light_direction: lighting.direction.normalize(),
            intensity: 0.0,
        };
    }
}

impl Shader for FlatShader {
    fn vertex(
        &mut self,
        transforms: &Transforms,
        mesh: &dyn Mesh,
        face: usize,
        corner: usize,
    ) -> Vector4<f32> {
        if corner == 0 {
            let a = mesh.vertex_at(face, 0);
            let b = mesh.vertex_at(face, 1);
            let c = mesh.vertex_at(face, 2);
            let face_normal = (b - a).cross(&(c - a));
            let transformed =
                normalize_or_zero(from_hom_vector(self.uniform_mit * to_hom_vector(face_normal)));
            self.intensity = transformed.dot(&self.light_direction).max(0.0);
        }

        let clip = self.uniform_m * to_hom_point(mesh.vertex_at(face, corner));
        return transforms.viewport * clip;
    }

    fn fragment(&self, _bar: Vector3<f32>) -> Option<Color> {
        return Some(Color::blend(WHITE, BLACK, self.intensity));
    }
}
