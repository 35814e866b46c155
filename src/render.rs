pub mod framebuffer;
pub mod rasterizer;
pub mod shader;
pub mod transform;

use nalgebra as na;
use na::Vector4;

use crate::mesh::Mesh;

use framebuffer::Framebuffer;
use rasterizer::TriangleOutcome;
use shader::Shader;
use transform::Transforms;

/// Per-pass triangle tally. Skipped triangles are policy, not errors, so
/// they are counted instead of reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderStats {
    pub drawn: usize,
    pub behind_camera: usize,
    pub degenerate: usize,
}

/// Runs one full render pass: every face of the mesh goes through the
/// shader's vertex stage corner by corner, triangles with a corner behind
/// the camera are dropped whole, the rest are rasterized into the
/// framebuffer.
pub fn render_pass(
    mesh: &dyn Mesh,
    shader: &mut dyn Shader,
    transforms: &Transforms,
    fb: &mut Framebuffer,
) -> RenderStats {
    let mut stats = RenderStats::default();

    for face in 0..mesh.face_count() {
        let mut screen = [Vector4::zeros(); 3];
        let mut behind_camera = false;
        for corner in 0..3 {
            screen[corner] = shader.vertex(transforms, mesh, face, corner);
            if screen[corner].w <= 0.0 {
                behind_camera = true;
                break;
            }
        }
        if behind_camera {
            stats.behind_camera += 1;
            continue;
        }

        match rasterizer::draw_triangle(&screen, shader, fb) {
            TriangleOutcome::Filled => stats.drawn += 1,
            TriangleOutcome::BehindCamera => stats.behind_camera += 1,
            TriangleOutcome::Degenerate => stats.degenerate += 1,
        }
    }

    return stats;
}
