use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// 2D point in pixels. Mesh vertices are local to the sprite's trimmed rect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Triangulated sprite outline: a shared vertex list plus index triples.
/// Empty `indices` means no mesh was produced for the sprite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Triangles {
    pub verts: Vec<Point>,
    pub indices: Vec<[u16; 3]>,
}

impl Triangles {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// One placed sprite on an atlas canvas.
///
/// `x,y` are canvas coordinates before the texture border is applied; `w,h`
/// are the packed size including the sprite border and are reported in the
/// sprite's original orientation even when `rotated`.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    /// Index of the placed sprite in the surviving (deduplicated) sprite list.
    pub sprite: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub rotated: bool,
}

/// Public per-sprite output record; one per input name, duplicates included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteFrameInfo {
    /// Rectangle on the final atlas image.
    pub frame: Rect,
    /// Draw-time displacement of the trimmed content relative to the original
    /// sprite (centered for plain frames, top-left anchored for meshes).
    pub offset: (i32, i32),
    pub rotated: bool,
    /// Opaque sub-rectangle within the original image.
    pub source_color_rect: Rect,
    /// Original (untrimmed) image size.
    pub source_size: (u32, u32),
    /// Sprite mesh; empty when polygon mode is off.
    pub triangles: Triangles,
}

/// One generated atlas page: the RGBA bitmap plus frame metadata keyed by
/// sprite name. Every distinct input name that survived preprocessing appears
/// exactly once across the returned pages.
#[derive(Debug)]
pub struct OutputData {
    pub atlas_image: RgbaImage,
    pub sprite_frames: BTreeMap<String, SpriteFrameInfo>,
}
