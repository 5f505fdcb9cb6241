use crate::compositing::{blit_rgba, draw_clipped};
use crate::config::{Algorithm, AtlasConfig};
use crate::dedup::Deduper;
use crate::error::{AtlasError, Result};
use crate::model::{OutputData, Placement, Rect, SpriteFrameInfo};
use crate::poly_pack::{pack_polygon_page, PolyPage};
use crate::preprocess::preprocess;
use crate::progress::{NullProgress, ProgressSink};
use crate::rect_pack::{pack_rect_pages, RectPage};
use crate::sprite::Sprite;
use image::{DynamicImage, RgbaImage};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// In-memory image to pack (name + decoded image). Names become the
/// `sprite_frames` keys and must be unique.
pub struct SourceImage {
    pub name: String,
    pub image: DynamicImage,
}

type AliasMap = BTreeMap<String, Vec<String>>;

/// Packs `inputs` into one or more atlas pages and returns the RGBA bitmaps
/// plus per-sprite frame metadata.
pub fn generate_atlas(inputs: Vec<SourceImage>, cfg: AtlasConfig) -> Result<Vec<OutputData>> {
    generate_atlas_with_progress(inputs, cfg, &NullProgress)
}

/// Like `generate_atlas`, reporting textual progress to `progress` and
/// polling its cancel flag at every stable iteration boundary. A cancelled
/// run returns `AtlasError::Cancelled` and delivers no partial output.
#[instrument(skip_all)]
pub fn generate_atlas_with_progress(
    inputs: Vec<SourceImage>,
    cfg: AtlasConfig,
    progress: &dyn ProgressSink,
) -> Result<Vec<OutputData>> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(AtlasError::Empty);
    }
    let started = Instant::now();

    progress.set_text("Optimizing sprites...");
    let mut dedup = Deduper::new();
    for inp in &inputs {
        if progress.cancelled() {
            return Err(AtlasError::Cancelled);
        }
        dedup.push(preprocess(inp.name.clone(), &inp.image, &cfg));
    }
    if dedup.skipped() > 0 {
        debug!(skipped = dedup.skipped(), "total skipped duplicate sprites");
    }
    let (sprites, aliases) = dedup.into_parts();

    // Polygon packing needs the meshes produced during trimming; anything
    // else falls back to the rectangle path.
    let use_polygon = cfg.algorithm == Algorithm::Polygon
        && cfg.polygon_mode.enable
        && cfg.trim_threshold > 0;

    let outputs = if use_polygon {
        let page = pack_polygon_page(&sprites, &cfg, progress)?;
        vec![compose_poly_page(&sprites, &aliases, &page, &cfg, progress)?]
    } else {
        let pages = pack_rect_pages(&sprites, &cfg, progress)?;
        let mut outs = Vec::with_capacity(pages.len());
        for page in &pages {
            outs.push(compose_rect_page(&sprites, &aliases, page, &cfg, progress)?);
        }
        outs
    };

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        pages = outputs.len(),
        "atlas generated"
    );
    Ok(outputs)
}

fn compose_rect_page(
    sprites: &[Sprite],
    aliases: &AliasMap,
    page: &RectPage,
    cfg: &AtlasConfig,
    progress: &dyn ProgressSink,
) -> Result<OutputData> {
    let b = cfg.texture_border;
    let mut atlas = RgbaImage::new(page.width, page.height);
    let mut frames = BTreeMap::new();

    for pl in &page.placements {
        if progress.cancelled() {
            return Err(AtlasError::Cancelled);
        }
        let sp = &sprites[pl.sprite];
        blit_rgba(
            &sp.image,
            &mut atlas,
            pl.x + b,
            pl.y + b,
            sp.rect.x,
            sp.rect.y,
            sp.rect.w,
            sp.rect.h,
            pl.rotated,
        );
        insert_with_aliases(&mut frames, aliases, &sp.name, rect_frame_info(sp, pl, cfg));
    }

    Ok(OutputData {
        atlas_image: atlas,
        sprite_frames: frames,
    })
}

fn rect_frame_info(sp: &Sprite, pl: &Placement, cfg: &AtlasConfig) -> SpriteFrameInfo {
    let b = cfg.texture_border;
    let sb = cfg.sprite_border;

    let mut frame = Rect::new(pl.x + b, pl.y + b, pl.w - sb, pl.h - sb);
    let offset = if sp.triangles.is_empty() {
        // Centered trim offset; integer because rect parity matches the image.
        (
            sp.rect.x as i32 + (pl.w as i32 - sb as i32 - sp.image.width() as i32) / 2,
            -(sp.rect.y as i32) + (sp.image.height() as i32 - pl.h as i32 + sb as i32) / 2,
        )
    } else {
        // Mesh coordinates already encode the geometry: top-left anchor.
        (sp.rect.x as i32, sp.rect.y as i32)
    };
    if pl.rotated {
        // Rotated frames keep the packer position without the texture border
        // and swap dimensions.
        frame = Rect::new(pl.x, pl.y, pl.h - sb, pl.w - sb);
    }

    SpriteFrameInfo {
        frame,
        offset,
        rotated: pl.rotated,
        source_color_rect: sp.rect,
        source_size: sp.image.dimensions(),
        triangles: sp.triangles.clone(),
    }
}

fn compose_poly_page(
    sprites: &[Sprite],
    aliases: &AliasMap,
    page: &PolyPage,
    cfg: &AtlasConfig,
    progress: &dyn ProgressSink,
) -> Result<OutputData> {
    let b = cfg.texture_border;
    let mut atlas = RgbaImage::new(page.width + b * 2, page.height + b * 2);
    let mut frames = BTreeMap::new();

    for pl in &page.placements {
        if progress.cancelled() {
            return Err(AtlasError::Cancelled);
        }
        let sp = &sprites[pl.sprite];
        draw_clipped(
            &sp.image,
            &mut atlas,
            pl.x + b,
            pl.y + b,
            sp.rect.x,
            sp.rect.y,
            sp.rect.w,
            sp.rect.h,
            &sp.polygons,
        );
        let info = SpriteFrameInfo {
            frame: Rect::new(pl.x + b, pl.y + b, pl.w, pl.h),
            offset: (sp.rect.x as i32, sp.rect.y as i32),
            rotated: false,
            source_color_rect: sp.rect,
            source_size: sp.image.dimensions(),
            triangles: sp.triangles.clone(),
        };
        insert_with_aliases(&mut frames, aliases, &sp.name, info);
    }

    Ok(OutputData {
        atlas_image: atlas,
        sprite_frames: frames,
    })
}

/// Records `info` under the canonical name and under every duplicate alias.
fn insert_with_aliases(
    frames: &mut BTreeMap<String, SpriteFrameInfo>,
    aliases: &AliasMap,
    name: &str,
    info: SpriteFrameInfo,
) {
    if let Some(list) = aliases.get(name) {
        for alias in list {
            frames.insert(alias.clone(), info.clone());
        }
    }
    frames.insert(name.to_string(), info);
}
