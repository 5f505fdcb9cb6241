//! Rectangle bin-packing primitive used by the canvas search driver.
//!
//! The driver only depends on the `place` contract below; the MaxRects
//! free-list behind it is replaceable.

pub mod maxrects;

use maxrects::MaxRects;

/// One rectangle to place; sizes already include the sprite border.
#[derive(Debug, Clone, Copy)]
pub struct PackEntry {
    pub id: usize,
    pub w: u32,
    pub h: u32,
}

/// A successfully placed rectangle. `w,h` echo the entry size (original
/// orientation); `rotated` marks a 90 degree placement.
#[derive(Debug, Clone, Copy)]
pub struct PlacedRect {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub rotated: bool,
}

/// Result of one placement attempt over a fixed canvas.
pub struct PlaceOutcome {
    pub placed: Vec<PlacedRect>,
    /// Entry ids that did not fit, in input order.
    pub remainder: Vec<usize>,
}

impl PlaceOutcome {
    pub fn success(&self) -> bool {
        self.remainder.is_empty()
    }
}

/// Places `entries` (already sorted by the caller) into a `canvas_w` x
/// `canvas_h` canvas. Entries that do not fit are reported in `remainder`;
/// placement order and positions are fully deterministic.
pub fn place(entries: &[PackEntry], canvas_w: u32, canvas_h: u32, allow_rotation: bool) -> PlaceOutcome {
    let mut bin = MaxRects::new(canvas_w, canvas_h, allow_rotation);
    let mut placed = Vec::with_capacity(entries.len());
    let mut remainder = Vec::new();
    for e in entries {
        match bin.insert(e.w, e.h) {
            Some((node, rotated)) => placed.push(PlacedRect {
                id: e.id,
                x: node.x,
                y: node.y,
                w: e.w,
                h: e.h,
                rotated,
            }),
            None => remainder.push(e.id),
        }
    }
    PlaceOutcome { placed, remainder }
}
