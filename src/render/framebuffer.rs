use image::{GrayImage, Rgb, RgbImage};

/// Raw rgb8 pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

impl Color {
    /// Convex combination of two colors: t * c_1 + (1 - t) * c_2.
    /// t is unrestricted.
    pub fn blend(color_1: Color, color_2: Color, t: f32) -> Color {
        return Color {
            r: (t * color_1.r as f32 + (1.0 - t) * color_2.r as f32) as u8,
            g: (t * color_1.g as f32 + (1.0 - t) * color_2.g as f32) as u8,
            b: (t * color_1.b as f32 + (1.0 - t) * color_2.b as f32) as u8,
        };
    }
}

/// Depth value meaning no fragment has been written yet. Depth grows toward
/// the camera, so every real fragment compares greater than this.
pub const DEPTH_SENTINEL: f32 = f32::MIN;

/// Color raster plus the matching depth buffer. Row 0 is the bottom row;
/// the single vertical flip happens in to_image, when the buffer leaves the
/// rasterization domain.
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    color_data: Vec<u8>, // Flat rgb8 array.
    depth_data: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Framebuffer {
        let n_pixels = (width * height) as usize;
        return Framebuffer {
            width,
            height,
            color_data: vec![0; 3 * n_pixels],
            depth_data: vec![DEPTH_SENTINEL; n_pixels],
        };
    }

    /// Resets all pixels to black and the whole depth buffer to the
    /// sentinel.
    pub fn clear(&mut self) {
        self.color_data.fill(0);
        self.depth_data.fill(DEPTH_SENTINEL);
    }

    fn index(&self, x: i32, y: i32) -> usize {
        debug_assert!(x >= 0 && (x as u32) < self.width);
        debug_assert!(y >= 0 && (y as u32) < self.height);
        return x as usize + y as usize * self.width as usize;
    }

    /// Closer-wins visibility check. Strictly greater passes, so at equal
    /// depth the fragment already in the buffer survives.
    pub fn depth_test(&self, x: i32, y: i32, z: f32) -> bool {
        return z > self.depth_data[self.index(x, y)];
    }

    /// Writes color and depth together. Call only after depth_test passed
    /// and the fragment was not discarded.
    pub fn put(&mut self, x: i32, y: i32, z: f32, color: Color) {
        let index = self.index(x, y);
        self.depth_data[index] = z;
        self.color_data[3 * index + 0] = color.r;
        self.color_data[3 * index + 1] = color.g;
        self.color_data[3 * index + 2] = color.b;
    }

    pub fn color_at(&self, x: i32, y: i32) -> Color {
        let index = self.index(x, y);
        return Color {
            r: self.color_data[3 * index + 0],
            g: self.color_data[3 * index + 1],
            b: self.color_data[3 * index + 2],
        };
    }

    pub fn depth_at(&self, x: i32, y: i32) -> f32 {
        return self.depth_data[self.index(x, y)];
    }

    /// The raster with rows flipped to the top-down order image formats
    /// expect. This is the only place the flip happens.
    pub fn to_image(&self) -> RgbImage {
        return RgbImage::from_fn(self.width, self.height, |x, y| {
            let flipped_y = (self.height - 1 - y) as i32;
            let color = self.color_at(x as i32, flipped_y);
            return Rgb([color.r, color.g, color.b]);
        });
    }

    /// Grayscale rendering of the depth buffer, normalized over the range of
    /// written values. Pixels still at the sentinel come out black.
    pub fn depth_image(&self) -> GrayImage {
        let mut z_min = f32::MAX;
        let mut z_max = f32::MIN;
        for &z in &self.depth_data {
            if z == DEPTH_SENTINEL {
                continue;
            }
            z_min = z_min.min(z);
            z_max = z_max.max(z);
        }
        let scale = if z_max > z_min { z_max - z_min } else { 1.0 };

        return GrayImage::from_fn(self.width, self.height, |x, y| {
            let flipped_y = (self.height - 1 - y) as i32;
            let z = self.depth_at(x as i32, flipped_y);
            if z == DEPTH_SENTINEL {
                return image::Luma([0]);
            }
            return image::Luma([(255.0 * (z - z_min) / scale) as u8]);
        });
    }
}
