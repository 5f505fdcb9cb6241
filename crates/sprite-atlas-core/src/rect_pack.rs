use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::model::Placement;
use crate::packer::{place, PackEntry, PlaceOutcome};
use crate::progress::ProgressSink;
use crate::sprite::Sprite;
use tracing::debug;

/// One solved canvas: final dimensions plus placements (pre-border coords).
pub(crate) struct RectPage {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

/// Canvas search driver: sorts sprites by descending trimmed area, finds the
/// tightest canvas per page and spills overflow onto further pages.
pub(crate) fn pack_rect_pages(
    sprites: &[Sprite],
    cfg: &AtlasConfig,
    progress: &dyn ProgressSink,
) -> Result<Vec<RectPage>> {
    progress.set_text("Optimizing atlas...");

    let mut pending: Vec<usize> = (0..sprites.len()).collect();
    // Stable sort keeps ties in insertion order for deterministic packing.
    pending.sort_by(|&a, &b| sprites[b].rect.area().cmp(&sprites[a].rect.area()));

    let mut pages = Vec::new();
    while !pending.is_empty() {
        let (page, remainder) = search_canvas(sprites, &pending, cfg, progress)?;
        if remainder.len() == pending.len() {
            return Err(AtlasError::Packing(format!(
                "unable to place any of {} remaining sprites within max_texture_size {}",
                pending.len(),
                cfg.max_texture_size
            )));
        }
        pages.push(page);
        pending = remainder;
    }
    Ok(pages)
}

/// Grows the canvas until everything fits (or both dimensions hit the
/// maximum), then shrinks each axis to the tightest size that still places
/// every sprite. Returns the page plus the overflow remainder.
fn search_canvas(
    sprites: &[Sprite],
    batch: &[usize],
    cfg: &AtlasConfig,
    progress: &dyn ProgressSink,
) -> Result<(RectPage, Vec<usize>)> {
    let entries: Vec<PackEntry> = batch
        .iter()
        .map(|&i| PackEntry {
            id: i,
            w: sprites[i].rect.w + cfg.sprite_border,
            h: sprites[i].rect.h + cfg.sprite_border,
        })
        .collect();

    let m = cfg.max_texture_size;
    let try_place = |w: u32, h: u32| -> PlaceOutcome {
        let uw = w.saturating_sub(cfg.texture_border * 2);
        let uh = h.saturating_sub(cfg.texture_border * 2);
        place(&entries, uw, uh, cfg.rotate_sprites)
    };

    let volume: u64 = batch.iter().map(|&i| sprites[i].rect.area()).sum();
    let guess = ((1.02 * volume as f64).sqrt().ceil() as u32).clamp(1, m);
    let mut w = guess;
    let mut h = guess;

    let mut placed;
    let mut overflow: Vec<usize> = Vec::new();

    if cfg.power_of_two {
        w = next_pow2(w).min(m);
        h = w;
        debug!(w, h, "volume size");

        let mut grow_w = true;
        loop {
            if progress.cancelled() {
                return Err(AtlasError::Cancelled);
            }
            let out = try_place(w, h);
            if out.success() {
                placed = out.placed;
                break;
            }
            if w == m && h == m {
                debug!(spilled = out.remainder.len(), "max size limit");
                placed = out.placed;
                overflow = out.remainder;
                break;
            }
            if grow_w || cfg.force_squared {
                grow_w = false;
                w = w.saturating_mul(2).min(m);
            } else {
                grow_w = true;
                h = h.saturating_mul(2).min(m);
            }
            if cfg.force_squared {
                h = w;
            }
            debug!(w, h, "resize for bigger");
        }

        if overflow.is_empty() {
            while w > 2 {
                if progress.cancelled() {
                    return Err(AtlasError::Cancelled);
                }
                let tw = w / 2;
                let th = if cfg.force_squared { tw } else { h };
                let out = try_place(tw, th);
                if !out.success() {
                    break;
                }
                w = tw;
                h = th;
                placed = out.placed;
                debug!(w, h, "optimize width");
            }
            if !cfg.force_squared {
                while h > 2 {
                    if progress.cancelled() {
                        return Err(AtlasError::Cancelled);
                    }
                    let th = h / 2;
                    let out = try_place(w, th);
                    if !out.success() {
                        break;
                    }
                    h = th;
                    placed = out.placed;
                    debug!(w, h, "optimize height");
                }
            }
        }
    } else {
        debug!(w, h, "volume size");

        let step = ((w + h) / 20).max(1);
        let mut grow_w = true;
        loop {
            if progress.cancelled() {
                return Err(AtlasError::Cancelled);
            }
            let out = try_place(w, h);
            if out.success() {
                placed = out.placed;
                break;
            }
            if w == m && h == m {
                debug!(spilled = out.remainder.len(), "max size limit");
                placed = out.placed;
                overflow = out.remainder;
                break;
            }
            if grow_w || cfg.force_squared {
                grow_w = false;
                w = w.saturating_add(step).min(m);
            } else {
                grow_w = true;
                h = h.saturating_add(step).min(m);
            }
            if cfg.force_squared {
                h = w;
            }
            debug!(w, h, step, "resize for bigger");
        }

        if overflow.is_empty() {
            let mut step = ((w + h) / 20).max(1);
            loop {
                if progress.cancelled() {
                    return Err(AtlasError::Cancelled);
                }
                let tw = w.saturating_sub(step);
                let th = if cfg.force_squared { tw } else { h };
                let ok = tw > 0 && {
                    let out = try_place(tw, th);
                    if out.success() {
                        placed = out.placed;
                        true
                    } else {
                        false
                    }
                };
                if ok {
                    w = tw;
                    h = th;
                    debug!(w, h, step, "optimize width");
                } else if step > 1 {
                    step = (step / 2).max(1);
                } else {
                    break;
                }
            }
            if !cfg.force_squared {
                let mut step = ((w + h) / 20).max(1);
                loop {
                    if progress.cancelled() {
                        return Err(AtlasError::Cancelled);
                    }
                    let th = h.saturating_sub(step);
                    let ok = th > 0 && {
                        let out = try_place(w, th);
                        if out.success() {
                            placed = out.placed;
                            true
                        } else {
                            false
                        }
                    };
                    if ok {
                        h = th;
                        debug!(w, h, step, "optimize height");
                    } else if step > 1 {
                        step = (step / 2).max(1);
                    } else {
                        break;
                    }
                }
            }
        }
    }

    debug!(w, h, "found optimize size");
    progress.set_text(&format!("Found optimize size: {}x{}", w, h));

    let placements = placed
        .iter()
        .map(|p| Placement {
            sprite: p.id,
            x: p.x,
            y: p.y,
            w: p.w,
            h: p.h,
            rotated: p.rotated,
        })
        .collect();
    Ok((
        RectPage {
            width: w,
            height: h,
            placements,
        },
        overflow,
    ))
}

/// Smallest power of two >= `v`, never below 2.
fn next_pow2(v: u32) -> u32 {
    let mut p = 2u32;
    while p < v {
        p = p.saturating_mul(2);
    }
    p
}
