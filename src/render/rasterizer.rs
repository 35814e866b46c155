use nalgebra as na;
use na::{vector, Vector2, Vector3, Vector4};

use super::framebuffer::Framebuffer;
use super::shader::Shader;

/// What happened to one triangle handed to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleOutcome {
    /// Scanned and filled (possibly with zero visible pixels after the
    /// depth test).
    Filled,
    /// At least one corner had w <= 0. The whole triangle is dropped, not
    /// clipped, so geometry straddling the camera plane disappears.
    BehindCamera,
    /// Screen-space area below one pixel.
    Degenerate,
}

/// Barycentric coordinates of p with respect to the 2D triangle (a, b, c),
/// via the cross product of the edge difference vectors. Degenerate
/// triangles produce a negative coordinate, which callers treat as
/// "outside".
fn barycentric(
    a: Vector2<f32>,
    b: Vector2<f32>,
    c: Vector2<f32>,
    p: Vector2<f32>,
) -> Vector3<f32> {
    let raw_cross = vector![b.x - a.x, c.x - a.x, a.x - p.x]
        .cross(&vector![b.y - a.y, c.y - a.y, a.y - p.y]);
    if raw_cross.z.abs() < 1.0 {
        return vector![-1.0, 1.0, 1.0];
    }
    return vector![
        1.0 - (raw_cross.x + raw_cross.y) / raw_cross.z,
        raw_cross.x / raw_cross.z,
        raw_cross.y / raw_cross.z
    ];
}

/// Divides the raw screen-space weights by each corner's clip-space w and
/// renormalizes them to sum to 1. Linear interpolation in screen space is
/// not linear in object space under perspective; attributes interpolated
/// with the corrected weights are.
pub fn perspective_correct(bar: Vector3<f32>, w: [f32; 3]) -> Vector3<f32> {
    let corrected = vector![bar.x / w[0], bar.y / w[1], bar.z / w[2]];
    return corrected / corrected.sum();
}

/// Fills one triangle given its three viewport-space corners (w still
/// holding the clip-space value) and the shader whose vertex stage produced
/// them. For every covered pixel that survives the depth test the fragment
/// stage decides the color; a discarded fragment leaves color and depth
/// untouched.
///
/// Pixel ownership on shared edges is the naive inclusive rule: a pixel
/// exactly on the common edge of two triangles is visited by both, and at
/// equal depth the triangle drawn first keeps it.
pub fn draw_triangle(
    screen: &[Vector4<f32>; 3],
    shader: &dyn Shader,
    fb: &mut Framebuffer,
) -> TriangleOutcome {
    if screen.iter().any(|v| v.w <= 0.0) {
        return TriangleOutcome::BehindCamera;
    }

    let divided: [Vector3<f32>; 3] =
        [0usize, 1, 2].map(|i| vector![screen[i].x, screen[i].y, screen[i].z] / screen[i].w);
    let a = divided[0].xy();
    let b = divided[1].xy();
    let c = divided[2].xy();

    // Twice the signed area. Sub-pixel triangles are not worth scanning and
    // would break the barycentric divide.
    let double_area = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if double_area.abs() < 1.0 {
        return TriangleOutcome::Degenerate;
    }

    let max_x = (fb.width - 1) as f32;
    let max_y = (fb.height - 1) as f32;
    let x_low = a.x.min(b.x).min(c.x).clamp(0.0, max_x) as i32;
    let x_high = a.x.max(b.x).max(c.x).clamp(0.0, max_x) as i32;
    let y_low = a.y.min(b.y).min(c.y).clamp(0.0, max_y) as i32;
    let y_high = a.y.max(b.y).max(c.y).clamp(0.0, max_y) as i32;

    for x in x_low..=x_high {
        for y in y_low..=y_high {
            let bar = barycentric(a, b, c, vector![x as f32, y as f32]);
            if bar.x < 0.0 || bar.y < 0.0 || bar.z < 0.0 {
                continue;
            }

            // Depth interpolates linearly in screen space on the raw
            // weights. The test runs before the fragment stage.
            let z = bar.x * divided[0].z + bar.y * divided[1].z + bar.z * divided[2].z;
            if !fb.depth_test(x, y, z) {
                continue;
            }

            let corrected =
                perspective_correct(bar, [screen[0].w, screen[1].w, screen[2].w]);
            if let Some(color) = shader.fragment(corrected) {
                fb.put(x, y, z, color);
            }
        }
    }

    return TriangleOutcome::Filled;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use crate::render::framebuffer::{Color, BLACK, DEPTH_SENTINEL, WHITE};
    use crate::render::transform::Transforms;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    /// Fragment-only shader that paints a fixed color and counts calls.
    /// The vertex stage is never used in these tests, screen coordinates
    /// are constructed by hand.
    struct SolidShader {
        color: Color,
        calls: Cell<usize>,
    }

    impl SolidShader {
        fn new(color: Color) -> SolidShader {
            return SolidShader {
                color,
                calls: Cell::new(0),
            };
        }
    }

    impl Shader for SolidShader {
        fn vertex(
            &mut self,
            _transforms: &Transforms,
            _mesh: &dyn Mesh,
            _face: usize,
            _corner: usize,
        ) -> Vector4<f32> {
            unreachable!("these tests feed screen coordinates directly");
        }

        fn fragment(&self, _bar: Vector3<f32>) -> Option<Color> {
            self.calls.set(self.calls.get() + 1);
            return Some(self.color);
        }
    }

    fn screen_triangle(
        a: (f32, f32),
        b: (f32, f32),
        c: (f32, f32),
        z: f32,
        w: f32,
    ) -> [Vector4<f32>; 3] {
        // Coordinates are pre-multiplied by w so the rasterizer's divide
        // recovers the given screen positions.
        return [
            vector![a.0 * w, a.1 * w, z * w, w],
            vector![b.0 * w, b.1 * w, z * w, w],
            vector![c.0 * w, c.1 * w, z * w, w],
        ];
    }

    #[test]
    fn inside_pixels_shaded_exactly_once_outside_untouched() {
        let mut fb = Framebuffer::new(64, 64);
        let shader = SolidShader::new(WHITE);
        let screen = screen_triangle((10.0, 10.0), (30.0, 10.0), (10.0, 30.0), 5.0, 1.0);

        let outcome = draw_triangle(&screen, &shader, &mut fb);
        assert_eq!(outcome, TriangleOutcome::Filled);

        let mut colored = 0;
        for x in 0..64 {
            for y in 0..64 {
                if fb.color_at(x, y) == WHITE {
                    colored += 1;
                }
            }
        }
        // One fragment call per colored pixel.
        assert!(colored > 0);
        assert_eq!(shader.calls.get(), colored);

        // Strictly inside and strictly outside samples.
        assert_eq!(fb.color_at(12, 12), WHITE);
        assert_eq!(fb.color_at(40, 40), BLACK);
        assert_eq!(fb.depth_at(40, 40), DEPTH_SENTINEL);
    }

    #[test]
    fn depth_test_runs_before_the_fragment_stage() {
        let mut fb = Framebuffer::new(64, 64);
        let shader = SolidShader::new(WHITE);
        let screen = screen_triangle((10.0, 10.0), (30.0, 10.0), (10.0, 30.0), 5.0, 1.0);

        draw_triangle(&screen, &shader, &mut fb);
        let first_pass_calls = shader.calls.get();
        // Same geometry again: every pixel fails the strict depth test and
        // the fragment stage must not run at all.
        draw_triangle(&screen, &shader, &mut fb);
        assert_eq!(shader.calls.get(), first_pass_calls);
    }

    #[test]
    fn overlapping_triangles_resolve_independent_of_order() {
        let red = Color { r: 255, g: 0, b: 0 };
        let blue = Color { r: 0, g: 0, b: 255 };
        let near = screen_triangle((5.0, 5.0), (40.0, 5.0), (5.0, 40.0), 10.0, 1.0);
        let far = screen_triangle((5.0, 5.0), (45.0, 10.0), (10.0, 45.0), 2.0, 1.0);

        let mut fb_ab = Framebuffer::new(64, 64);
        draw_triangle(&near, &SolidShader::new(red), &mut fb_ab);
        draw_triangle(&far, &SolidShader::new(blue), &mut fb_ab);

        let mut fb_ba = Framebuffer::new(64, 64);
        draw_triangle(&far, &SolidShader::new(blue), &mut fb_ba);
        draw_triangle(&near, &SolidShader::new(red), &mut fb_ba);

        for x in 0..64 {
            for y in 0..64 {
                assert_eq!(fb_ab.color_at(x, y), fb_ba.color_at(x, y));
            }
        }
    }

    #[test]
    fn behind_camera_corner_drops_the_triangle() {
        let mut fb = Framebuffer::new(32, 32);
        let shader = SolidShader::new(WHITE);
        let mut screen = screen_triangle((5.0, 5.0), (20.0, 5.0), (5.0, 20.0), 1.0, 1.0);
        screen[1].w = -0.5;

        assert_eq!(
            draw_triangle(&screen, &shader, &mut fb),
            TriangleOutcome::BehindCamera
        );
        assert_eq!(shader.calls.get(), 0);
        assert_eq!(fb.color_at(6, 6), BLACK);
    }

    #[test]
    fn zero_area_triangle_is_degenerate() {
        let mut fb = Framebuffer::new(32, 32);
        let shader = SolidShader::new(WHITE);
        let screen = screen_triangle((5.0, 5.0), (20.0, 5.0), (12.0, 5.0), 1.0, 1.0);

        assert_eq!(
            draw_triangle(&screen, &shader, &mut fb),
            TriangleOutcome::Degenerate
        );
        assert_eq!(shader.calls.get(), 0);
    }

    #[test]
    fn bounding_box_is_clamped_to_the_raster() {
        let mut fb = Framebuffer::new(16, 16);
        let shader = SolidShader::new(WHITE);
        // Extends far past the raster on two sides; must neither panic nor
        // write out of bounds.
        let screen = screen_triangle((-20.0, 4.0), (40.0, 4.0), (8.0, 40.0), 1.0, 1.0);
        assert_eq!(draw_triangle(&screen, &shader, &mut fb), TriangleOutcome::Filled);
        assert_eq!(fb.color_at(8, 8), WHITE);
    }

    #[test]
    fn equal_ws_leave_weights_linear() {
        let bar = vector![0.2, 0.3, 0.5];
        assert_relative_eq!(perspective_correct(bar, [2.0, 2.0, 2.0]), bar, epsilon = 1e-6);
    }

    #[test]
    fn unequal_ws_bend_the_weights() {
        let bar = vector![1.0, 1.0, 1.0] / 3.0;
        let corrected = perspective_correct(bar, [1.0, 2.0, 4.0]);
        assert_relative_eq!(corrected.sum(), 1.0, epsilon = 1e-6);
        // Weight moves toward the near corner (small w).
        assert!(corrected.x > bar.x + 0.05);
        assert!(corrected.z < bar.z - 0.05);

        // An attribute interpolated with corrected weights differs from the
        // naive screen-space interpolation.
        let uv = [
            vector![0.0, 0.0],
            vector![1.0, 0.0],
            vector![0.0, 1.0],
        ];
        let naive = uv[0] * bar.x + uv[1] * bar.y + uv[2] * bar.z;
        let correct = uv[0] * corrected.x + uv[1] * corrected.y + uv[2] * corrected.z;
        assert!((naive - correct).norm() > 0.05);
    }
}
