use std::path::Path;

use log::info;
use nalgebra as na;
use na::{vector, Vector3};
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};

use crate::camera::Camera;
use crate::error::{RenderError, Result};
use crate::mesh::{Mesh, ObjMesh};
use crate::render::framebuffer::Framebuffer;
use crate::render::render_pass;
use crate::render::shader::{FlatShader, Lighting, PhongShader};
use crate::render::transform::Transforms;

// Camera placement around the model, in world units.
const ORBIT_RADIUS: f32 = 1.5;
const CAMERA_HEIGHT: f32 = 0.1;
const FOCAL_LENGTH: f32 = 1.0;

/// Execution parameters, assembled by the command line layer.
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub model_path: String,
    pub output_path: String,
    pub shader_name: String,
    pub orbit_angle: f32,
    pub preview: bool,
}

impl Default for Params {
    fn default() -> Params {
        return Params {
            width: 800,
            height: 800,
            model_path: String::from("obj/african_head.obj"),
            output_path: String::from("output.tga"),
            shader_name: String::from("phong"),
            orbit_angle: 0.0,
            preview: false,
        };
    }
}

/// Loads the model, places the camera, runs the pipeline exactly once and
/// writes the output image. Optionally keeps a preview window open until
/// Escape is pressed.
pub fn run(params: Params) -> Result<()> {
    let mesh = ObjMesh::load(Path::new(&params.model_path))?;
    info!(
        "loaded {}: {} vertices, {} faces",
        params.model_path,
        mesh.vertex_count(),
        mesh.face_count()
    );

    let model_center = match mesh.bounds() {
        Some((min, max)) => {
            let center = (min + max) * 0.5;
            let size = max - min;
            info!(
                "model center ({:.3}, {:.3}, {:.3}), radius {:.3}",
                center.x,
                center.y,
                center.z,
                size.norm() * 0.5
            );
            center
        }
        None => Vector3::zeros(),
    };

    // The camera looks at the world origin from a fixed orbit, shifted
    // sideways so it stays aligned with off-center models.
    let mut camera = Camera::new(
        vector![model_center.x, CAMERA_HEIGHT, model_center.z + ORBIT_RADIUS],
        Vector3::zeros(),
        vector![0.0, 1.0, 0.0],
    );
    if params.orbit_angle != 0.0 {
        camera.orbit_y(params.orbit_angle);
    }

    let distance = (camera.eye - camera.center).norm();
    let transforms = Transforms::new(
        camera.view_matrix(),
        Transforms::projection(-FOCAL_LENGTH / distance),
        Transforms::viewport(0, 0, params.width, params.height),
    );

    let lighting = Lighting::default();
    let mut fb = Framebuffer::new(params.width, params.height);

    let stats = match params.shader_name.as_str() {
        "phong" => {
            let mut shader = PhongShader::new(&transforms, &lighting, camera.eye, &mesh.maps);
            render_pass(&mesh, &mut shader, &transforms, &mut fb)
        }
        "flat" => {
            let mut shader = FlatShader::new(&transforms, &lighting);
            render_pass(&mesh, &mut shader, &transforms, &mut fb)
        }
        other => return Err(RenderError::UnknownShader(other.to_string())),
    };
    info!(
        "drew {} of {} faces ({} behind camera, {} degenerate)",
        stats.drawn,
        mesh.face_count(),
        stats.behind_camera,
        stats.degenerate
    );

    let image = fb.to_image();
    image.save(&params.output_path)?;
    info!("saved {}", params.output_path);

    if params.preview {
        preview(&image, params.width, params.height)?;
    }

    return Ok(());
}

/// Helper, defining exit event to be an Escape key press.
fn is_exit_event(window_event: event::WindowEvent) -> bool {
    if let event::WindowEvent::KeyboardInput(event) = window_event {
        if event.input.key_code == Some(event::VirtualKeyCode::Escape)
            && event.input.state.is_released()
        {
            return true;
        }
    }
    return false;
}

/// Shows the rendered image in a window and blocks until Escape.
fn preview(image: &image::RgbImage, width: u32, height: u32) -> Result<()> {
    let window_options = WindowOptions {
        size: Some([width, height]),
        ..Default::default()
    };
    let window = create_window("output", window_options)
        .map_err(|e| RenderError::Preview(e.to_string()))?;

    let image_view = ImageView::new(ImageInfo::rgb8(width, height), image.as_raw());
    window
        .set_image("render", image_view)
        .map_err(|e| RenderError::Preview(e.to_string()))?;

    let event_channel = window
        .event_channel()
        .map_err(|e| RenderError::Preview(e.to_string()))?;
    for window_event in event_channel {
        if is_exit_event(window_event) {
            break;
        }
    }

    return Ok(());
}
