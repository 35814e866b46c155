use std::env;

use soft_renderer::app;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 800;

#[show_image::main]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut params = app::Params {
        width: WIDTH,
        height: HEIGHT,
        ..Default::default()
    };

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-p" if i + 1 < args.len() => {
                params.model_path = args[i + 1].clone();
                i += 1;
            }
            "-o" if i + 1 < args.len() => {
                params.output_path = args[i + 1].clone();
                i += 1;
            }
            "-s" if i + 1 < args.len() => {
                params.shader_name = args[i + 1].clone();
                i += 1;
            }
            "-a" if i + 1 < args.len() => {
                params.orbit_angle = args[i + 1].parse().unwrap_or(0.0);
                i += 1;
            }
            "--preview" => {
                params.preview = true;
            }
            _ => (),
        }
        i += 1;
    }

    app::run(params)?;

    return Ok(());
}
