use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::debug;

/// A texture map that may be absent. Shaders treat a missing or zero-sized
/// map as a valid state and substitute constants, so loading never fails,
/// it just produces an empty texture.
pub struct Texture {
    image: Option<RgbaImage>,
}

impl Texture {
    pub fn empty() -> Texture {
        return Texture { image: None };
    }

    pub fn from_image(image: RgbaImage) -> Texture {
        return Texture { image: Some(image) };
    }

    /// Loads a texture, flipping it vertically so that v grows upward,
    /// matching the raster's bottom-up row order.
    pub fn open(path: &Path) -> Texture {
        match image::open(path) {
            Ok(image) => {
                debug!("loaded texture {}", path.display());
                return Texture {
                    image: Some(image.flipv().to_rgba8()),
                };
            }
            Err(_) => {
                return Texture { image: None };
            }
        }
    }

    pub fn width(&self) -> u32 {
        return self.image.as_ref().map_or(0, |image| image.width());
    }

    pub fn height(&self) -> u32 {
        return self.image.as_ref().map_or(0, |image| image.height());
    }

    pub fn is_empty(&self) -> bool {
        return self.width() == 0 || self.height() == 0;
    }

    /// Nearest-neighbor sample at (u, v). Coordinates are wrapped to [0, 1)
    /// by taking the fractional part and the texel index is clamped to the
    /// image bounds, so any finite uv is safe. None when the map is absent
    /// or zero-sized.
    pub fn sample_wrapped(&self, u: f32, v: f32) -> Option<[u8; 4]> {
        if self.is_empty() {
            return None;
        }
        let image = self.image.as_ref()?;
        let (width, height) = (image.width(), image.height());

        let u = u - u.floor();
        let v = v - v.floor();
        let x = ((u * width as f32) as u32).min(width - 1);
        let y = ((v * height as f32) as u32).min(height - 1);

        return Some(image.get_pixel(x, y).0);
    }
}

/// The three maps the lighting model knows about, all optional.
pub struct MaterialMaps {
    pub diffuse: Texture,
    pub normal: Texture,
    pub specular: Texture,
}

impl MaterialMaps {
    pub fn none() -> MaterialMaps {
        return MaterialMaps {
            diffuse: Texture::empty(),
            normal: Texture::empty(),
            specular: Texture::empty(),
        };
    }

    /// Looks for companion files next to the model: model.obj goes with
    /// model_diffuse.tga, model_nm.tga and model_spec.tga, with .png
    /// accepted as an alternative extension.
    pub fn discover(model_path: &Path) -> MaterialMaps {
        return MaterialMaps {
            diffuse: open_companion(model_path, "_diffuse"),
            normal: open_companion(model_path, "_nm"),
            specular: open_companion(model_path, "_spec"),
        };
    }
}

fn open_companion(model_path: &Path, suffix: &str) -> Texture {
    let stem = match model_path.file_stem() {
        Some(stem) => stem.to_string_lossy().into_owned(),
        None => return Texture::empty(),
    };
    let dir = model_path.parent().unwrap_or_else(|| Path::new(""));

    for extension in ["tga", "png"] {
        let candidate: PathBuf = dir.join(format!("{}{}.{}", stem, suffix, extension));
        if candidate.is_file() {
            return Texture::open(&candidate);
        }
    }
    debug!("no {} map next to {}", suffix, model_path.display());
    return Texture::empty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> Texture {
        // 2x2 image with distinct corner values. Sampling addresses row 0
        // at v near 0; open() pre-flips files so v grows upward there.
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([10, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([20, 0, 0, 255]));
        image.put_pixel(0, 1, Rgba([30, 0, 0, 255]));
        image.put_pixel(1, 1, Rgba([40, 0, 0, 255]));
        return Texture::from_image(image);
    }

    #[test]
    fn empty_texture_reports_itself() {
        let texture = Texture::empty();
        assert!(texture.is_empty());
        assert_eq!(texture.width(), 0);
        assert_eq!(texture.sample_wrapped(0.5, 0.5), None);
    }

    #[test]
    fn samples_nearest_texel() {
        let texture = checker();
        assert_eq!(texture.sample_wrapped(0.25, 0.25).unwrap()[0], 10);
        assert_eq!(texture.sample_wrapped(0.75, 0.25).unwrap()[0], 20);
        assert_eq!(texture.sample_wrapped(0.25, 0.75).unwrap()[0], 30);
        assert_eq!(texture.sample_wrapped(0.75, 0.75).unwrap()[0], 40);
    }

    #[test]
    fn wraps_coordinates_outside_unit_square() {
        let texture = checker();
        assert_eq!(
            texture.sample_wrapped(1.25, -0.75).unwrap(),
            texture.sample_wrapped(0.25, 0.25).unwrap()
        );
        assert_eq!(
            texture.sample_wrapped(-3.25, 7.75).unwrap(),
            texture.sample_wrapped(0.75, 0.75).unwrap()
        );
    }

    #[test]
    fn exact_one_wraps_to_zero() {
        let texture = checker();
        // u = 1.0 wraps to 0.0, not past the edge.
        assert_eq!(
            texture.sample_wrapped(1.0, 1.0).unwrap(),
            texture.sample_wrapped(0.0, 0.0).unwrap()
        );
    }
}
