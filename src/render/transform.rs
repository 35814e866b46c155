use nalgebra as na;
use na::{matrix, Matrix4};

/// Depth buffer resolution: the clip cube z range lands in [0, 255].
const DEPTH_RANGE: f32 = 255.0;

/// The three matrices a render pass is configured with. Built once before
/// the first triangle of a pass and passed by reference into every vertex
/// stage call; nothing in here changes mid-pass.
pub struct Transforms {
    pub model_view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub viewport: Matrix4<f32>,
}

impl Transforms {
    pub fn new(
        model_view: Matrix4<f32>,
        projection: Matrix4<f32>,
        viewport: Matrix4<f32>,
    ) -> Transforms {
        return Transforms {
            model_view,
            projection,
            viewport,
        };
    }

    /// Maps the clip cube [-1, 1]^3 onto pixel centers
    /// [x, x + w - 1] x [y, y + h - 1] and depth [0, 255]. The bottom row
    /// stays identity, so the w component of a transformed vertex keeps its
    /// clip-space value for the later perspective-correct division.
    pub fn viewport(x: u32, y: u32, w: u32, h: u32) -> Matrix4<f32> {
        let half_w = (w - 1) as f32 / 2.0;
        let half_h = (h - 1) as f32 / 2.0;
        let half_d = DEPTH_RANGE / 2.0;
        return matrix![
            half_w, 0.0,    0.0,    x as f32 + half_w;
            0.0,    half_h, 0.0,    y as f32 + half_h;
            0.0,    0.0,    half_d, half_d;
            0.0,    0.0,    0.0,    1.0
        ];
    }

    /// Minimal perspective transform: identity except for the single
    /// coefficient at row 3, column 2, making w' = 1 + coefficient * z for
    /// points. Calibrate the coefficient as -1 / (eye to center distance).
    /// Not a symmetric frustum, x and y are left untouched.
    pub fn projection(coefficient: f32) -> Matrix4<f32> {
        return matrix![
            1.0, 0.0, 0.0,         0.0;
            0.0, 1.0, 0.0,         0.0;
            0.0, 0.0, 1.0,         0.0;
            0.0, 0.0, coefficient, 1.0
        ];
    }
}
