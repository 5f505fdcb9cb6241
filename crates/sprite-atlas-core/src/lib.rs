//! Core library for generating sprite atlases.
//!
//! - Pipeline: `generate_atlas` takes in-memory images, trims and dedupes
//!   them, packs rectangles (iterative canvas sizing) or triangulated
//!   polygon meshes, and returns RGBA pages plus per-sprite frame metadata.
//! - The data model is serde-serializable; JSON/plist exporters are provided
//!   in `export` and wired up by the CLI crate.
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use sprite_atlas_core::{generate_atlas, AtlasConfig, SourceImage};
//! # fn main() -> anyhow::Result<()> {
//! let img1 = ImageReader::open("a.png")?.decode()?;
//! let img2 = ImageReader::open("b.png")?.decode()?;
//! let inputs = vec![
//!     SourceImage { name: "a.png".into(), image: img1 },
//!     SourceImage { name: "b.png".into(), image: img2 },
//! ];
//! let cfg = AtlasConfig { max_texture_size: 1024, ..Default::default() };
//! let pages = generate_atlas(inputs, cfg)?;
//! println!("pages: {}", pages.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod polygon;
pub mod progress;
pub mod sprite;

mod dedup;
mod poly_pack;
mod preprocess;
mod rect_pack;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pipeline::*;
pub use progress::*;
pub use sprite::*;

/// Convenience prelude for common types and functions.
/// Importing `sprite_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{Algorithm, AtlasConfig, AtlasConfigBuilder, PolygonMode};
    pub use crate::error::{AtlasError, Result};
    pub use crate::model::{OutputData, Placement, Point, Rect, SpriteFrameInfo, Triangles};
    pub use crate::progress::{NullProgress, ProgressSink};
    pub use crate::sprite::Sprite;
    pub use crate::{generate_atlas, generate_atlas_with_progress, SourceImage};
}
