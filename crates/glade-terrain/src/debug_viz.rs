//! Top-down debug images of generated sections.
//!
//! Provides [`DebugImage`] plus renderers for a colour-coded heightmap and a
//! placement overlay. The app encodes these to PNG on request; nothing here
//! touches the filesystem.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{height_to_color, layer_color, render_heightmap_debug, render_placements};
