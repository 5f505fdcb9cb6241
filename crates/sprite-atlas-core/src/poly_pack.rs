use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::model::Placement;
use crate::polygon::pack::{self, Content, PlaceError};
use crate::progress::ProgressSink;
use crate::sprite::Sprite;
use tracing::debug;

/// Solved polygon layout: container bounds plus placements.
pub(crate) struct PolyPage {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

/// Driver around the polygon container: converts sprite meshes to pack
/// contents, sorts by descending mesh area and places everything on a single
/// page. Rotation is never used on this path.
pub(crate) fn pack_polygon_page(
    sprites: &[Sprite],
    cfg: &AtlasConfig,
    progress: &dyn ProgressSink,
) -> Result<PolyPage> {
    progress.set_text("Build pack contents...");

    let mut contents: Vec<Content> = sprites
        .iter()
        .enumerate()
        .map(|(i, s)| Content::new(i, &s.triangles, cfg.sprite_border as f32))
        .collect();
    // Stable sort keeps ties in insertion order for deterministic packing.
    contents.sort_by(|a, b| b.area.partial_cmp(&a.area).unwrap_or(std::cmp::Ordering::Equal));
    for c in &contents {
        debug!(name = %sprites[c.id].name, area = c.area, "pack content");
    }

    let container = pack::place(&contents, cfg.max_texture_size, 5.0, |k, n| {
        progress.set_text(&format!("Placing: {}/{}", k, n));
        !progress.cancelled()
    })
    .map_err(|e| match e {
        PlaceError::Cancelled => AtlasError::Cancelled,
        PlaceError::OutOfSpace { id } => AtlasError::Packing(format!(
            "polygon content '{}' does not fit within max_texture_size {}",
            sprites[id].name, cfg.max_texture_size
        )),
    })?;

    Ok(PolyPage {
        width: container.width,
        height: container.height,
        placements: container
            .placements
            .iter()
            .map(|p| Placement {
                sprite: p.id,
                x: p.x,
                y: p.y,
                w: p.w,
                h: p.h,
                rotated: false,
            })
            .collect(),
    })
}
