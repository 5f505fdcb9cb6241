use crate::config::AtlasConfig;
use crate::polygon::extract::polygonize;
use crate::sprite::Sprite;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Builds a `Sprite` from one decoded image: scale, heuristic mask, trim,
/// mesh extraction, in that order.
pub(crate) fn preprocess(name: String, image: &DynamicImage, cfg: &AtlasConfig) -> Sprite {
    let mut rgba = image.to_rgba8();

    if cfg.scale != 1.0 {
        let (w, h) = rgba.dimensions();
        let nw = ((w as f32 * cfg.scale).ceil() as u32).max(1);
        let nh = ((h as f32 * cfg.scale).ceil() as u32).max(1);
        rgba = imageops::resize(&rgba, nw, nh, FilterType::Lanczos3);
    }

    if cfg.heuristic_mask {
        apply_heuristic_mask(&mut rgba);
    }

    let mut sprite = Sprite::new(name, rgba);
    if cfg.trim_threshold > 0 {
        sprite.trim(cfg.trim_threshold);
        if cfg.polygon_mode.enable {
            let mesh = polygonize(
                &sprite.image,
                &sprite.rect,
                cfg.polygon_mode.epsilon,
                cfg.trim_threshold,
            );
            debug!(
                name = %sprite.name,
                polygons = mesh.polygons.len(),
                triangles = mesh.triangles.indices.len(),
                "fitted outline mesh"
            );
            sprite.polygons = mesh.polygons;
            sprite.triangles = mesh.triangles;
        }
    }
    sprite
}

fn rgb_at(img: &RgbaImage, x: u32, y: u32) -> [u8; 3] {
    let p = img.get_pixel(x, y);
    [p[0], p[1], p[2]]
}

/// Infers an alpha mask from the image corners: the four corners vote on a
/// background color (ties go to the top-left), then every border-connected
/// pixel of that color is made fully transparent.
fn apply_heuristic_mask(rgba: &mut RgbaImage) {
    let (w, h) = rgba.dimensions();
    if w < 2 || h < 2 {
        return;
    }

    let corners = [
        rgb_at(rgba, 0, 0),
        rgb_at(rgba, w - 1, 0),
        rgb_at(rgba, 0, h - 1),
        rgb_at(rgba, w - 1, h - 1),
    ];
    let mut background = corners[0];
    let mut best_votes = 0usize;
    for c in &corners {
        let votes = corners.iter().filter(|o| *o == c).count();
        if votes > best_votes {
            best_votes = votes;
            background = *c;
        }
    }

    let mut visited = vec![false; (w * h) as usize];
    let mut stack: Vec<(u32, u32)> = Vec::new();
    let seed = |visited: &mut Vec<bool>, stack: &mut Vec<(u32, u32)>, x: u32, y: u32| {
        let idx = (y * w + x) as usize;
        if !visited[idx] {
            visited[idx] = true;
            stack.push((x, y));
        }
    };
    for x in 0..w {
        if rgb_at(rgba, x, 0) == background {
            seed(&mut visited, &mut stack, x, 0);
        }
        if rgb_at(rgba, x, h - 1) == background {
            seed(&mut visited, &mut stack, x, h - 1);
        }
    }
    for y in 0..h {
        if rgb_at(rgba, 0, y) == background {
            seed(&mut visited, &mut stack, 0, y);
        }
        if rgb_at(rgba, w - 1, y) == background {
            seed(&mut visited, &mut stack, w - 1, y);
        }
    }

    while let Some((x, y)) = stack.pop() {
        for (dx, dy) in [(0i64, -1i64), (0, 1), (-1, 0), (1, 0)] {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            let idx = (ny * w + nx) as usize;
            if !visited[idx] && rgb_at(rgba, nx, ny) == background {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        }
        rgba.get_pixel_mut(x, y)[3] = 0;
    }
}
