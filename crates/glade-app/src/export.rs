//! PNG export of debug heightmaps.

use std::path::{Path, PathBuf};

use glade_terrain::debug_viz::layer_color;
use glade_terrain::{DebugImage, GeneratedSection, render_heightmap_debug, render_placements};

/// Errors raised while writing a heightmap image.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode png: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("failed to write heightmap: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode an RGBA debug image as PNG bytes.
pub fn encode_png(image: &DebugImage) -> Result<Vec<u8>, png::EncodingError> {
    let mut png_buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_buf, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.pixels)?;
        writer.finish()?;
    }
    Ok(png_buf)
}

/// Render the section heightmap with every scatter layer overlaid.
pub fn heightmap_image(generated: &GeneratedSection, water_level: f64, resolution: u32) -> DebugImage {
    let mut image = render_heightmap_debug(&generated.section, water_level, resolution, resolution);
    for (index, layer) in generated.layers.iter().enumerate() {
        render_placements(
            &mut image,
            &generated.section.params,
            &layer.placements,
            layer_color(index),
        );
    }
    image
}

/// Write `heightmap-<seed>.png` into `dir` and return its path.
pub fn write_heightmap(
    generated: &GeneratedSection,
    water_level: f64,
    resolution: u32,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let image = heightmap_image(generated, water_level, resolution);
    let bytes = encode_png(&image)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("heightmap-{}.png", generated.seed));
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), resolution, "exported heightmap");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_terrain::{SectionGenerator, SectionSpec};

    #[test]
    fn test_encode_png_signature() {
        let mut image = DebugImage::new(4, 3);
        image.set_pixel(1, 1, (200, 10, 10));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_write_heightmap_creates_file() {
        let generated = SectionGenerator::new(SectionSpec {
            size: 16,
            ..Default::default()
        })
        .unwrap()
        .generate(3)
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = write_heightmap(&generated, 0.0, 32, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "heightmap-3.png");
        assert!(std::fs::metadata(&path).unwrap().len() > 8);
    }
}
