use crate::model::Point;
use image::RgbaImage;

/// Blit a sub-rectangle from `src` into `canvas` at destination (dx, dy),
/// optionally rotated 90° clockwise.
///
/// - (sx, sy, sw, sh): source rectangle within `src`
/// - (dx, dy): destination top-left in `canvas`
#[allow(clippy::too_many_arguments)]
pub fn blit_rgba(
    src: &RgbaImage,
    canvas: &mut RgbaImage,
    dx: u32,
    dy: u32,
    sx: u32,
    sy: u32,
    sw: u32,
    sh: u32,
    rotated: bool,
) {
    let (cw, ch) = canvas.dimensions();
    let (iw, ih) = src.dimensions();
    // destination (rendered) size differs when rotated
    let (rw, rh) = if rotated { (sh, sw) } else { (sw, sh) };

    for yy in 0..rh {
        for xx in 0..rw {
            let (ix, iy) = if rotated {
                (sx + yy, sy + (sh - 1 - xx))
            } else {
                (sx + xx, sy + yy)
            };
            if ix < iw && iy < ih && dx + xx < cw && dy + yy < ch {
                let px = *src.get_pixel(ix, iy);
                canvas.put_pixel(dx + xx, dy + yy, px);
            }
        }
    }
}

/// Copy a sub-rectangle from `src` into `canvas`, keeping only pixels whose
/// centers fall inside the union of `polygons` (even-odd rule). Polygons are
/// in source-rect-local coordinates, like the blit itself.
#[allow(clippy::too_many_arguments)]
pub fn draw_clipped(
    src: &RgbaImage,
    canvas: &mut RgbaImage,
    dx: u32,
    dy: u32,
    sx: u32,
    sy: u32,
    sw: u32,
    sh: u32,
    polygons: &[Vec<Point>],
) {
    let (cw, ch) = canvas.dimensions();
    let (iw, ih) = src.dimensions();

    for yy in 0..sh {
        for xx in 0..sw {
            let ix = sx + xx;
            let iy = sy + yy;
            if ix >= iw || iy >= ih || dx + xx >= cw || dy + yy >= ch {
                continue;
            }
            if !point_in_polygons(polygons, xx as f32 + 0.5, yy as f32 + 0.5) {
                continue;
            }
            let px = *src.get_pixel(ix, iy);
            canvas.put_pixel(dx + xx, dy + yy, px);
        }
    }
}

/// Even-odd point-in-polygon over the union of closed outlines.
fn point_in_polygons(polygons: &[Vec<Point>], x: f32, y: f32) -> bool {
    let mut inside = false;
    for poly in polygons {
        let n = poly.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let pi = poly[i];
            let pj = poly[j];
            if (pi.y > y) != (pj.y > y) {
                let x_hit = pi.x + (y - pi.y) / (pj.y - pi.y) * (pj.x - pi.x);
                if x < x_hit {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}
