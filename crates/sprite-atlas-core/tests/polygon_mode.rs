use image::{DynamicImage, Rgba, RgbaImage};
use sprite_atlas_core::prelude::*;

/// 16x16 diamond: opaque where the manhattan distance from the center stays
/// under the radius. Concave-free but with staircase edges on all sides.
fn diamond(size: u32, radius: f32) -> DynamicImage {
    let mut img = RgbaImage::new(size, size);
    let c = (size as f32 - 1.0) / 2.0;
    for y in 0..size {
        for x in 0..size {
            let d = (x as f32 - c).abs() + (y as f32 - c).abs();
            if d <= radius {
                img.put_pixel(x, y, Rgba([220, 180, 40, 255]));
            }
        }
    }
    DynamicImage::ImageRgba8(img)
}

fn point_in_tri(px: f32, py: f32, a: Point, b: Point, c: Point) -> bool {
    let cross = |o: Point, u: Point, v: Point| (u.x - o.x) * (v.y - o.y) - (u.y - o.y) * (v.x - o.x);
    let p = Point::new(px, py);
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn point_in_mesh(tris: &Triangles, px: f32, py: f32) -> bool {
    tris.indices.iter().any(|t| {
        point_in_tri(
            px,
            py,
            tris.verts[t[0] as usize],
            tris.verts[t[1] as usize],
            tris.verts[t[2] as usize],
        )
    })
}

fn polygon_cfg() -> AtlasConfig {
    AtlasConfig::builder()
        .algorithm(Algorithm::Polygon)
        .polygon_mode(true, 0.5)
        .trim_threshold(1)
        .sprite_border(2)
        .build()
}

#[test]
fn mesh_covers_every_opaque_pixel() {
    let image = diamond(16, 7.0);
    let rgba = image.to_rgba8();
    let inputs = vec![SourceImage {
        name: "diamond".into(),
        image,
    }];
    let pages = generate_atlas(inputs, polygon_cfg()).expect("pack");
    assert_eq!(pages.len(), 1);

    let fr = &pages[0].sprite_frames["diamond"];
    assert!(!fr.rotated);
    assert!(!fr.triangles.is_empty());
    assert_eq!(
        fr.offset,
        (fr.source_color_rect.x as i32, fr.source_color_rect.y as i32)
    );

    let rect = fr.source_color_rect;
    for y in 0..rect.h {
        for x in 0..rect.w {
            if rgba.get_pixel(rect.x + x, rect.y + y)[3] == 0 {
                continue;
            }
            assert!(
                point_in_mesh(&fr.triangles, x as f32 + 0.5, y as f32 + 0.5),
                "opaque pixel ({x},{y}) outside mesh"
            );
        }
    }
}

#[test]
fn clip_masks_atlas_pixels_to_the_outline() {
    let image = diamond(16, 7.0);
    let rgba = image.to_rgba8();
    let inputs = vec![SourceImage {
        name: "diamond".into(),
        image,
    }];
    let pages = generate_atlas(inputs, polygon_cfg()).expect("pack");
    let page = &pages[0];
    let fr = &page.sprite_frames["diamond"];
    let rect = fr.source_color_rect;

    // Pixels inside the mesh carry the source color; the frame corners are
    // well outside the diamond and must stay transparent.
    for y in 0..rect.h.min(fr.frame.h) {
        for x in 0..rect.w.min(fr.frame.w) {
            let atlas_px = page.atlas_image.get_pixel(fr.frame.x + x, fr.frame.y + y);
            if point_in_mesh(&fr.triangles, x as f32 + 0.5, y as f32 + 0.5)
                && rgba.get_pixel(rect.x + x, rect.y + y)[3] != 0
            {
                assert_eq!(atlas_px, rgba.get_pixel(rect.x + x, rect.y + y));
            }
        }
    }
    assert_eq!(page.atlas_image.get_pixel(fr.frame.x, fr.frame.y)[3], 0);
    assert_eq!(
        page.atlas_image
            .get_pixel(fr.frame.x + fr.frame.w - 1, fr.frame.y)[3],
        0
    );
}

#[test]
fn polygon_contents_keep_their_spacing() {
    let inputs = vec![
        SourceImage {
            name: "a".into(),
            image: diamond(16, 7.0),
        },
        SourceImage {
            name: "b".into(),
            image: diamond(16, 7.0),
        },
        SourceImage {
            name: "c".into(),
            image: diamond(12, 5.0),
        },
    ];
    let pages = generate_atlas(inputs, polygon_cfg()).expect("pack");
    assert_eq!(pages.len(), 1, "polygon packing never spills pages");
    let frames = &pages[0].sprite_frames;
    assert_eq!(frames.len(), 3);
    // a and b are pixel-identical: deduped onto the same frame.
    assert_eq!(frames["a"].frame, frames["b"].frame);
    assert_ne!(frames["a"].frame, frames["c"].frame);
}

#[test]
fn rect_algorithm_ignores_polygon_mode_for_packing() {
    // Meshes are still extracted and reported, but placement is rectangular
    // and the offset uses the mesh anchor.
    let cfg = AtlasConfig::builder()
        .algorithm(Algorithm::Rect)
        .polygon_mode(true, 0.5)
        .trim_threshold(1)
        .build();
    let inputs = vec![SourceImage {
        name: "diamond".into(),
        image: diamond(16, 7.0),
    }];
    let pages = generate_atlas(inputs, cfg).expect("pack");
    let fr = &pages[0].sprite_frames["diamond"];
    assert!(!fr.triangles.is_empty());
    assert_eq!(
        fr.offset,
        (fr.source_color_rect.x as i32, fr.source_color_rect.y as i32)
    );
}
