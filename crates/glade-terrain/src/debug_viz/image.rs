//! A 2D debug image represented as a flat array of RGBA pixels.

/// A debug image stored as row-major RGBA pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl DebugImage {
    /// Create a transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Set a pixel to an opaque RGB colour.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: (u8, u8, u8)) {
        let idx = self.offset(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&[rgb.0, rgb.1, rgb.2, 255]);
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let idx = self.offset(x, y);
        (
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// Paint a filled square of side `2 * radius + 1` centred on `(x, y)`,
    /// clipped to the image.
    pub fn mark(&mut self, x: i64, y: i64, radius: i64, rgb: (u8, u8, u8)) {
        for py in (y - radius)..=(y + radius) {
            for px in (x - radius)..=(x + radius) {
                if px >= 0 && py >= 0 && px < self.width as i64 && py < self.height as i64 {
                    self.set_pixel(px as u32, py as u32, rgb);
                }
            }
        }
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Count the distinct colours (ignoring alpha) in the image.
    pub fn unique_color_count(&self) -> usize {
        let mut colors = std::collections::HashSet::new();
        for chunk in self.pixels.chunks_exact(4) {
            colors.insert((chunk[0], chunk[1], chunk[2]));
        }
        colors.len()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        (y as usize * self.width as usize + x as usize) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_image_correct_dimensions() {
        let image = DebugImage::new(256, 128);
        assert_eq!(image.dimensions(), (256, 128));
        assert_eq!(image.pixels.len(), 256 * 128 * 4);
    }

    #[test]
    fn test_set_pixel_is_opaque() {
        let mut image = DebugImage::new(8, 8);
        image.set_pixel(2, 3, (10, 20, 30));
        assert_eq!(image.get_pixel(2, 3), (10, 20, 30, 255));
        assert_eq!(image.get_pixel(3, 2), (0, 0, 0, 0));
    }

    #[test]
    fn test_mark_clips_at_edges() {
        let mut image = DebugImage::new(4, 4);
        image.mark(0, 0, 1, (255, 0, 0));
        assert_eq!(image.get_pixel(0, 0).0, 255);
        assert_eq!(image.get_pixel(1, 1).0, 255);
        assert_eq!(image.get_pixel(2, 2).0, 0, "outside the marker radius");
    }

    #[test]
    fn test_unique_color_count() {
        let mut image = DebugImage::new(4, 1);
        image.set_pixel(0, 0, (255, 0, 0));
        image.set_pixel(1, 0, (0, 255, 0));
        image.set_pixel(2, 0, (255, 0, 0)); // duplicate
        image.set_pixel(3, 0, (0, 0, 255));
        assert_eq!(image.unique_color_count(), 3);
    }
}
