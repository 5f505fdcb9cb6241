//! Polygonizer: fits simplified outlines and a triangulation to the opaque
//! pixels of a trimmed sprite.
//!
//! The mask is split into connected components, each outer boundary is traced
//! with marching squares, simplified with Douglas-Peucker at the configured
//! tolerance and triangulated by ear clipping. All coordinates are local to
//! the trimmed rect.

use crate::model::{Point, Rect, Triangles};
use image::RgbaImage;
use tracing::debug;

pub struct Polygonized {
    pub polygons: Vec<Vec<Point>>,
    pub triangles: Triangles,
}

pub fn polygonize(image: &RgbaImage, rect: &Rect, epsilon: f32, threshold: u8) -> Polygonized {
    let (iw, ih) = image.dimensions();
    let w = rect.w as usize;
    let h = rect.h as usize;

    let mut mask = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            let px = rect.x + x as u32;
            let py = rect.y + y as u32;
            if px < iw && py < ih && image.get_pixel(px, py)[3] >= threshold {
                mask[y * w + x] = true;
            }
        }
    }

    let labels = label_components(&mask, w, h);
    let component_count = *labels.iter().max().unwrap_or(&0);

    let mut polygons: Vec<Vec<Point>> = Vec::new();
    for label in 1..=component_count {
        let Some(outline) = trace_outline(&labels, w, h, label) else {
            continue;
        };
        let simplified = simplify_closed(&outline, epsilon);
        if simplified.len() >= 3 {
            polygons.push(simplified);
        }
    }

    // A sprite with no traceable outline (e.g. fully transparent after the
    // degenerate trim fallback) still needs a mesh downstream: use its rect.
    if polygons.is_empty() {
        polygons.push(vec![
            Point::new(0.0, 0.0),
            Point::new(rect.w as f32, 0.0),
            Point::new(rect.w as f32, rect.h as f32),
            Point::new(0.0, rect.h as f32),
        ]);
    }

    let mut triangles = Triangles::default();
    for poly in &polygons {
        let base = triangles.verts.len();
        if base + poly.len() > u16::MAX as usize {
            debug!("outline mesh exceeds u16 index range, dropping remaining components");
            break;
        }
        let tris = ear_clip(poly);
        triangles.verts.extend_from_slice(poly);
        triangles.indices.extend(tris.iter().map(|t| {
            [
                (t[0] + base) as u16,
                (t[1] + base) as u16,
                (t[2] + base) as u16,
            ]
        }));
    }

    Polygonized {
        polygons,
        triangles,
    }
}

/// 4-connected component labeling; labels start at 1. Diagonal-only contact
/// splits components, which keeps each traced outline a simple polygon.
fn label_components(mask: &[bool], w: usize, h: usize) -> Vec<u32> {
    let mut labels = vec![0u32; w * h];
    let mut next = 0u32;
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if !mask[y * w + x] || labels[y * w + x] != 0 {
                continue;
            }
            next += 1;
            labels[y * w + x] = next;
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                for (dx, dy) in [(0i64, -1i64), (0, 1), (-1, 0), (1, 0)] {
                    let nx = cx as i64 + dx;
                    let ny = cy as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let idx = ny as usize * w + nx as usize;
                    if mask[idx] && labels[idx] == 0 {
                        labels[idx] = next;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }
        }
    }
    labels
}

#[derive(Clone, Copy, PartialEq)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

/// Marching-squares boundary trace of one labeled component. Returns the
/// closed outline as pixel-corner coordinates, or `None` for degenerate
/// components.
fn trace_outline(labels: &[u32], w: usize, h: usize, label: u32) -> Option<Vec<Point>> {
    let filled = |x: i64, y: i64| -> bool {
        x >= 0 && y >= 0 && x < w as i64 && y < h as i64 && labels[y as usize * w + x as usize] == label
    };

    // Topmost-leftmost pixel; its top-left corner is the trace start.
    let mut start = None;
    'seek: for y in 0..h {
        for x in 0..w {
            if labels[y * w + x] == label {
                start = Some((x as i64, y as i64));
                break 'seek;
            }
        }
    }
    let (sx, sy) = start?;

    let mut points = Vec::new();
    let mut cx = sx;
    let mut cy = sy;
    let mut prev = Dir::Up;
    let mut closed = false;
    let limit = 4 * (w + 2) * (h + 2);

    for _ in 0..limit {
        let tl = filled(cx - 1, cy - 1);
        let tr = filled(cx, cy - 1);
        let bl = filled(cx - 1, cy);
        let br = filled(cx, cy);
        let case = (tl as u8) | (tr as u8) << 1 | (bl as u8) << 2 | (br as u8) << 3;

        let dir = match case {
            1 | 5 | 13 => Dir::Up,
            8 | 10 | 11 => Dir::Down,
            4 | 12 | 14 => Dir::Left,
            2 | 3 | 7 => Dir::Right,
            6 => {
                if prev == Dir::Up {
                    Dir::Left
                } else {
                    Dir::Right
                }
            }
            9 => {
                if prev == Dir::Right {
                    Dir::Up
                } else {
                    Dir::Down
                }
            }
            _ => return None, // 0 or 15: not on a boundary
        };

        points.push(Point::new(cx as f32, cy as f32));
        match dir {
            Dir::Up => cy -= 1,
            Dir::Down => cy += 1,
            Dir::Left => cx -= 1,
            Dir::Right => cx += 1,
        }
        prev = dir;
        if cx == sx && cy == sy {
            closed = true;
            break;
        }
    }

    if closed && points.len() >= 3 {
        Some(points)
    } else {
        None
    }
}

/// Douglas-Peucker over a closed loop: the loop is split at its two most
/// distant anchors and each open chain is simplified independently.
fn simplify_closed(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() < 4 {
        return points.to_vec();
    }
    let mut far = 1;
    let mut far_d = 0.0f32;
    for (i, p) in points.iter().enumerate().skip(1) {
        let d = dist2(points[0], *p);
        if d > far_d {
            far_d = d;
            far = i;
        }
    }

    let first = rdp(&points[..=far], epsilon);
    let mut tail: Vec<Point> = points[far..].to_vec();
    tail.push(points[0]);
    let second = rdp(&tail, epsilon);

    let mut out = first;
    out.pop(); // shared anchor
    out.extend_from_slice(&second[..second.len().saturating_sub(1)]);
    out
}

fn rdp(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let a = points[0];
    let b = points[points.len() - 1];
    let mut max_d = 0.0f32;
    let mut max_i = 0;
    for (i, p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = segment_distance(*p, a, b);
        if d > max_d {
            max_d = d;
            max_i = i;
        }
    }
    if max_d > epsilon {
        let mut left = rdp(&points[..=max_i], epsilon);
        let right = rdp(&points[max_i..], epsilon);
        left.pop();
        left.extend_from_slice(&right);
        left
    } else {
        vec![a, b]
    }
}

fn dist2(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let len2 = dist2(a, b);
    if len2 <= f32::EPSILON {
        return dist2(p, a).sqrt();
    }
    let t = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len2;
    let t = t.clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    dist2(p, proj).sqrt()
}

/// Ear-clipping triangulation of a simple polygon. Returns index triples into
/// the input slice.
fn ear_clip(poly: &[Point]) -> Vec<[usize; 3]> {
    let n = poly.len();
    if n < 3 {
        return Vec::new();
    }

    // Normalize orientation so the convexity test below is consistent.
    let mut idx: Vec<usize> = (0..n).collect();
    if signed_area(poly) < 0.0 {
        idx.reverse();
    }

    let mut out = Vec::with_capacity(n.saturating_sub(2));
    while idx.len() > 3 {
        let m = idx.len();
        let mut clipped = false;
        for i in 0..m {
            let ia = idx[(i + m - 1) % m];
            let ib = idx[i];
            let ic = idx[(i + 1) % m];
            let (a, b, c) = (poly[ia], poly[ib], poly[ic]);
            if cross(a, b, c) <= 0.0 {
                continue; // reflex or degenerate corner
            }
            let mut blocked = false;
            for &jo in &idx {
                if jo == ia || jo == ib || jo == ic {
                    continue;
                }
                if point_in_triangle(poly[jo], a, b, c) {
                    blocked = true;
                    break;
                }
            }
            if !blocked {
                out.push([ia, ib, ic]);
                idx.remove(i);
                clipped = true;
                break;
            }
        }
        if !clipped {
            // Numerically degenerate ring; drop the flattest corner and retry.
            let mut flattest = 0;
            let mut flattest_abs = f32::MAX;
            for i in 0..idx.len() {
                let m2 = idx.len();
                let a = poly[idx[(i + m2 - 1) % m2]];
                let b = poly[idx[i]];
                let c = poly[idx[(i + 1) % m2]];
                let ar = cross(a, b, c).abs();
                if ar < flattest_abs {
                    flattest_abs = ar;
                    flattest = i;
                }
            }
            idx.remove(flattest);
        }
    }
    if idx.len() == 3 {
        out.push([idx[0], idx[1], idx[2]]);
    }
    out
}

fn signed_area(poly: &[Point]) -> f32 {
    let mut sum = 0.0f32;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

fn cross(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
