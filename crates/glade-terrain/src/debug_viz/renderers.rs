//! Debug renderers: elevation heightmap and scatter placement overlay.

use glade_mesh::{GridParams, TerrainSection};

use super::image::DebugImage;
use crate::scatter::ScatterPlacement;

/// Render a section's sampled grid as a colour-coded heightmap.
///
/// Each pixel takes the nearest grid vertex; image rows run along +Z and
/// columns along +X. Elevations at or below `water_level` are blue, above it
/// they move through beach, grass and rock to snow at the section maximum.
pub fn render_heightmap_debug(section: &TerrainSection, water_level: f64, width: u32, height: u32) -> DebugImage {
    let mut image = DebugImage::new(width, height);
    let grid = &section.grid;
    let side = grid.side();
    let (min, max) = (grid.min() as f64, grid.max() as f64);

    for py in 0..height {
        let row = nearest_vertex(py, height, side);
        for px in 0..width {
            let col = nearest_vertex(px, width, side);
            let elevation = grid.get(col, row) as f64;
            image.set_pixel(px, py, height_to_color(elevation, min, max, water_level));
        }
    }

    image
}

/// Overlay placements as small squares on an image of the section footprint.
pub fn render_placements(
    image: &mut DebugImage,
    params: &GridParams,
    placements: &[ScatterPlacement],
    rgb: (u8, u8, u8),
) {
    let (lo, _) = params.bounds();
    let extent = params.extent();
    let radius = (image.width.min(image.height) / 128) as i64;

    for placement in placements {
        let u = (placement.position.x - lo.x) / extent;
        let v = (placement.position.z - lo.y) / extent;
        let px = (u * image.width as f64).floor() as i64;
        let py = (v * image.height as f64).floor() as i64;
        image.mark(px, py, radius, rgb);
    }
}

/// Map an elevation to an RGB colour relative to the section range.
///
/// Bands: deep water, shallow water, beach, grass, rock, snow.
pub fn height_to_color(elevation: f64, min: f64, max: f64, water_level: f64) -> (u8, u8, u8) {
    if elevation <= water_level {
        let depth = water_level - min;
        let t = if depth > 0.0 {
            ((water_level - elevation) / depth).clamp(0.0, 1.0)
        } else {
            0.0
        };
        // Shallow blue fading to deep blue.
        return (
            (30.0 - t * 30.0) as u8,
            (110.0 - t * 80.0) as u8,
            (210.0 - t * 82.0) as u8,
        );
    }

    let rise = max - water_level;
    let n = if rise > 0.0 {
        ((elevation - water_level) / rise).clamp(0.0, 1.0)
    } else {
        0.0
    };

    if n < 0.04 {
        // Beach
        (220, 200, 130)
    } else if n < 0.55 {
        let t = (n - 0.04) / 0.51;
        (
            (30.0 + t * 80.0) as u8,
            (160.0 - t * 40.0) as u8,
            (30.0 + t * 20.0) as u8,
        )
    } else if n < 0.85 {
        let t = (n - 0.55) / 0.3;
        (
            (110.0 + t * 40.0) as u8,
            (120.0 - t * 50.0) as u8,
            (50.0 + t * 20.0) as u8,
        )
    } else {
        let t = ((n - 0.85) / 0.15).min(1.0);
        let base = (150.0 + t * 105.0) as u8;
        (base, base, base)
    }
}

/// Marker colour for the `index`-th scatter layer.
pub fn layer_color(index: usize) -> (u8, u8, u8) {
    const PALETTE: [(u8, u8, u8); 6] = [
        (20, 70, 20),
        (200, 40, 40),
        (240, 200, 40),
        (150, 60, 200),
        (40, 200, 200),
        (250, 130, 20),
    ];
    PALETTE[index % PALETTE.len()]
}

fn nearest_vertex(pixel: u32, pixels: u32, side: usize) -> usize {
    let t = (pixel as f64 + 0.5) / pixels as f64;
    ((t * side as f64) as usize).min(side - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_mesh::{MeshOptions, TerrainMeshBuilder};
    use glam::{DVec3, IVec2};

    fn section(height_fn: impl Fn(f64, f64) -> f64) -> TerrainSection {
        let params = GridParams::new(16, 1.0, IVec2::ZERO).unwrap();
        TerrainMeshBuilder::new(params, MeshOptions::default())
            .unwrap()
            .build(height_fn)
    }

    #[test]
    fn test_heightmap_dimensions_and_variety() {
        let s = section(|x, z| x - z);
        let image = render_heightmap_debug(&s, 0.0, 64, 32);
        assert_eq!(image.dimensions(), (64, 32));
        assert!(
            image.unique_color_count() > 4,
            "a sloped section should use several colour bands"
        );
        assert!(image.pixels.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_water_is_blue() {
        let (r, g, b) = height_to_color(-5.0, -10.0, 10.0, 0.0);
        assert!(b > r && b > g, "underwater elevations render blue");
    }

    #[test]
    fn test_peak_is_white() {
        let (r, g, b) = height_to_color(10.0, -10.0, 10.0, 0.0);
        assert!(r == g && g == b && r > 250, "the section maximum renders as snow");
    }

    #[test]
    fn test_flat_section_renders_single_colour() {
        let s = section(|_, _| 3.0);
        let image = render_heightmap_debug(&s, 0.0, 16, 16);
        assert_eq!(image.unique_color_count(), 1);
    }

    #[test]
    fn test_placements_are_marked() {
        let s = section(|_, _| 1.0);
        let mut image = render_heightmap_debug(&s, 0.0, 128, 128);
        let placement = ScatterPlacement {
            position: DVec3::new(8.0, 1.0, 4.0),
            scale: 1.0,
            rotation_y: 0.0,
            prototype_group_index: 0,
        };
        render_placements(&mut image, &s.params, &[placement], (255, 0, 255));
        assert_eq!(image.get_pixel(64, 32), (255, 0, 255, 255));
    }

    #[test]
    fn test_nearest_vertex_stays_in_range() {
        for pixel in 0..100 {
            assert!(nearest_vertex(pixel, 100, 17) < 17);
        }
        assert_eq!(nearest_vertex(0, 100, 17), 0);
        assert_eq!(nearest_vertex(99, 100, 17), 16);
    }
}
