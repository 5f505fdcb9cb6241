//! Polygon container: places triangulated contents inside a bounded canvas.
//!
//! Greedy bottom-left scan over a step grid; a candidate position is rejected
//! when any of its triangles intersects, or comes closer than the content
//! spacing to, a triangle that is already placed. Deterministic for equal
//! inputs.

use crate::model::{Point, Triangles};

/// One triangulated content to place; coordinates are local to the content
/// origin, with the AABB anchored at (0, 0).
pub struct Content {
    pub id: usize,
    pub tris: Vec<[Point; 3]>,
    /// AABB size (ceil of the outermost vertex).
    pub w: u32,
    pub h: u32,
    /// Summed triangle area, used for pack ordering.
    pub area: f64,
    /// Minimum gap kept between this content and its neighbors.
    pub spacing: f32,
}

impl Content {
    pub fn new(id: usize, triangles: &Triangles, spacing: f32) -> Self {
        let mut tris = Vec::with_capacity(triangles.indices.len());
        let mut area = 0.0f64;
        let mut max_x = 0.0f32;
        let mut max_y = 0.0f32;
        for t in &triangles.indices {
            let pick = |i: u16| triangles.verts.get(i as usize).copied().unwrap_or(Point::new(0.0, 0.0));
            let (a, b, c) = (pick(t[0]), pick(t[1]), pick(t[2]));
            area += (((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)) as f64 / 2.0).abs();
            for p in [a, b, c] {
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            tris.push([a, b, c]);
        }
        Self {
            id,
            tris,
            w: (max_x.ceil() as u32).max(1),
            h: (max_y.ceil() as u32).max(1),
            area,
            spacing,
        }
    }
}

/// A committed placement: content id plus its AABB on the canvas.
pub struct PlacedContent {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Result of a container run: overall bounds and placements in input order.
pub struct Container {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<PlacedContent>,
}

pub enum PlaceError {
    Cancelled,
    /// The content with this id cannot be placed within `max_size`.
    OutOfSpace { id: usize },
}

struct Occupied {
    tris: Vec<[Point; 3]>,
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
    spacing: f32,
}

/// Places `contents` (already sorted by the caller) inside a `max_size`
/// square. `progress(k, n)` runs before each placement and returns false to
/// cancel the run.
pub fn place<F>(
    contents: &[Content],
    max_size: u32,
    step: f32,
    mut progress: F,
) -> Result<Container, PlaceError>
where
    F: FnMut(usize, usize) -> bool,
{
    let stride = (step.round() as i64).max(1) as usize;
    let mut occupied: Vec<Occupied> = Vec::new();
    let mut out = Container {
        width: 0,
        height: 0,
        placements: Vec::with_capacity(contents.len()),
    };

    for (k, content) in contents.iter().enumerate() {
        if !progress(k + 1, contents.len()) {
            return Err(PlaceError::Cancelled);
        }
        if content.w > max_size || content.h > max_size {
            return Err(PlaceError::OutOfSpace { id: content.id });
        }

        let mut found = None;
        'scan: for oy in (0..=(max_size - content.h) as usize).step_by(stride) {
            for ox in (0..=(max_size - content.w) as usize).step_by(stride) {
                if fits(content, ox as f32, oy as f32, &occupied) {
                    found = Some((ox as u32, oy as u32));
                    break 'scan;
                }
            }
        }
        let (ox, oy) = found.ok_or(PlaceError::OutOfSpace { id: content.id })?;

        let tris: Vec<[Point; 3]> = content
            .tris
            .iter()
            .map(|t| t.map(|p| Point::new(p.x + ox as f32, p.y + oy as f32)))
            .collect();
        occupied.push(Occupied {
            tris,
            min_x: ox as f32,
            min_y: oy as f32,
            max_x: (ox + content.w) as f32,
            max_y: (oy + content.h) as f32,
            spacing: content.spacing,
        });
        out.placements.push(PlacedContent {
            id: content.id,
            x: ox,
            y: oy,
            w: content.w,
            h: content.h,
        });
        out.width = out.width.max(ox + content.w);
        out.height = out.height.max(oy + content.h);
    }

    Ok(out)
}

fn fits(content: &Content, ox: f32, oy: f32, occupied: &[Occupied]) -> bool {
    for occ in occupied {
        let margin = content.spacing.max(occ.spacing);
        // AABB prefilter with margin
        if ox - occ.max_x >= margin
            || occ.min_x - (ox + content.w as f32) >= margin
            || oy - occ.max_y >= margin
            || occ.min_y - (oy + content.h as f32) >= margin
        {
            continue;
        }
        for ta in &content.tris {
            let ta = ta.map(|p| Point::new(p.x + ox, p.y + oy));
            for tb in &occ.tris {
                if tri_too_close(&ta, tb, margin) {
                    return false;
                }
            }
        }
    }
    true
}

/// Separating-axis test over the edge normals of both triangles: true when
/// the triangles intersect or no axis separates them by at least `margin`.
/// Axis gaps are a lower bound on the true distance, so the test may reject a
/// position whose exact clearance already meets the margin.
fn tri_too_close(a: &[Point; 3], b: &[Point; 3], margin: f32) -> bool {
    for tri in [a, b] {
        for i in 0..3 {
            let p = tri[i];
            let q = tri[(i + 1) % 3];
            let ex = q.x - p.x;
            let ey = q.y - p.y;
            let len = (ex * ex + ey * ey).sqrt();
            if len <= f32::EPSILON {
                continue;
            }
            let nx = -ey / len;
            let ny = ex / len;
            let (min_a, max_a) = project(a, nx, ny);
            let (min_b, max_b) = project(b, nx, ny);
            let gap = (min_b - max_a).max(min_a - max_b);
            if gap >= margin {
                return false;
            }
        }
    }
    true
}

fn project(tri: &[Point; 3], nx: f32, ny: f32) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for p in tri {
        let d = p.x * nx + p.y * ny;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}
