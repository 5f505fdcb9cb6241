use crate::model::{Point, Rect, Triangles};
use image::RgbaImage;

/// In-memory unit of work: a named RGBA image, its opaque sub-rectangle and,
/// in polygon mode, the fitted outline mesh.
pub struct Sprite {
    pub name: String,
    pub image: RgbaImage,
    /// Opaque sub-rectangle within `image`. Its width/height parity matches
    /// the image parity so the centered trim offset stays integer-valued.
    pub rect: Rect,
    /// Closed outlines in rect-local coordinates; empty unless polygon mode.
    pub polygons: Vec<Vec<Point>>,
    pub triangles: Triangles,
}

impl Sprite {
    pub fn new(name: String, image: RgbaImage) -> Self {
        let (w, h) = image.dimensions();
        Self {
            name,
            image,
            rect: Rect::new(0, 0, w, h),
            polygons: Vec::new(),
            triangles: Triangles::default(),
        }
    }

    /// Shrinks `rect` to the smallest rectangle containing every pixel with
    /// `alpha >= threshold`, then corrects each side's parity to match the
    /// image so trimmed offsets divide evenly. A fully transparent image
    /// degenerates to a 2x2 rect at the origin.
    pub fn trim(&mut self, threshold: u8) {
        let (iw, ih) = self.image.dimensions();
        let mut l = iw as i64;
        let mut t = ih as i64;
        let mut r = -1i64;
        let mut b = -1i64;
        for y in 0..ih {
            let mut row_filled = false;
            for x in 0..iw {
                if self.image.get_pixel(x, y)[3] >= threshold {
                    row_filled = true;
                    r = r.max(x as i64);
                    if l > x as i64 {
                        l = x as i64;
                    }
                }
            }
            if row_filled {
                t = t.min(y as i64);
                b = y as i64;
            }
        }

        if (r - l + 1).rem_euclid(2) != (iw as i64).rem_euclid(2) {
            if l > 0 {
                l -= 1;
            } else {
                r += 1;
            }
        }
        if (b - t + 1).rem_euclid(2) != (ih as i64).rem_euclid(2) {
            if t > 0 {
                t -= 1;
            } else {
                b += 1;
            }
        }

        self.rect = if r - l + 1 < 0 || b - t + 1 < 0 {
            Rect::new(0, 0, 2, 2)
        } else {
            Rect::new(l as u32, t as u32, (r - l + 1) as u32, (b - t + 1) as u32)
        };
    }

    /// Exact duplicate check: equal trim rects and identical RGBA for every
    /// pixel inside the rect.
    pub fn is_identical(&self, other: &Sprite) -> bool {
        if self.rect != other.rect {
            return false;
        }
        let (w, h) = self.image.dimensions();
        let (ow, oh) = other.image.dimensions();
        for y in self.rect.y..=self.rect.bottom() {
            for x in self.rect.x..=self.rect.right() {
                if x >= w || y >= h || x >= ow || y >= oh {
                    continue;
                }
                if self.image.get_pixel(x, y) != other.image.get_pixel(x, y) {
                    return false;
                }
            }
        }
        true
    }
}
