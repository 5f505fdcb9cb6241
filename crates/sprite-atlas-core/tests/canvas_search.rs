use image::{DynamicImage, Rgba, RgbaImage};
use sprite_atlas_core::prelude::*;

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
    let mut img = RgbaImage::new(w, h);
    for p in img.pixels_mut() {
        *p = Rgba(rgba);
    }
    DynamicImage::ImageRgba8(img)
}

fn is_pow2(v: u32) -> bool {
    v != 0 && (v & (v - 1)) == 0
}

fn opaque_inputs(count: usize, w: u32, h: u32) -> Vec<SourceImage> {
    (0..count)
        .map(|i| SourceImage {
            name: format!("sprite_{i:02}.png"),
            image: solid(w, h, [i as u8, 64, 128, 255]),
        })
        .collect()
}

#[test]
fn overflow_spills_to_additional_pages() {
    // Five 64x64 sprites cannot fit one 128x128 page; the fifth spills onto a
    // second, tighter page.
    let cfg = AtlasConfig::builder()
        .trim_threshold(0)
        .sprite_border(0)
        .pow2(true)
        .force_squared(true)
        .max_texture_size(128)
        .build();
    let pages = generate_atlas(opaque_inputs(5, 64, 64), cfg).expect("pack");
    assert_eq!(pages.len(), 2);

    assert_eq!(pages[0].atlas_image.dimensions(), (128, 128));
    assert_eq!(pages[0].sprite_frames.len(), 4);
    assert_eq!(pages[1].atlas_image.dimensions(), (64, 64));
    assert_eq!(pages[1].sprite_frames.len(), 1);

    // Every input name appears exactly once across pages.
    let mut names: Vec<&String> = pages
        .iter()
        .flat_map(|p| p.sprite_frames.keys())
        .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 5);
}

#[test]
fn repeated_overflow_keeps_constraints_on_every_page() {
    let cfg = AtlasConfig::builder()
        .trim_threshold(0)
        .sprite_border(0)
        .pow2(true)
        .force_squared(true)
        .max_texture_size(128)
        .build();
    let pages = generate_atlas(opaque_inputs(10, 64, 64), cfg).expect("pack");
    assert_eq!(pages.len(), 3, "ten 64x64 sprites pack four to a page");

    let total: usize = pages.iter().map(|p| p.sprite_frames.len()).sum();
    assert_eq!(total, 10);
    for p in &pages {
        let (w, h) = p.atlas_image.dimensions();
        assert!(is_pow2(w) && is_pow2(h));
        assert_eq!(w, h);
        assert!(w <= 128 && h <= 128);
    }
}

#[test]
fn free_mode_shrinks_to_tightest_canvas() {
    // Three 30x30 sprites settle into a 60x60 canvas (two columns, then the
    // band below) after the alternating grow and per-axis shrink passes.
    let cfg = AtlasConfig::builder()
        .trim_threshold(0)
        .sprite_border(0)
        .build();
    let pages = generate_atlas(opaque_inputs(3, 30, 30), cfg).expect("pack");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].atlas_image.dimensions(), (60, 60));
    assert_eq!(pages[0].sprite_frames.len(), 3);
}

#[test]
fn force_squared_without_pow2_stays_square() {
    let cfg = AtlasConfig::builder()
        .trim_threshold(0)
        .sprite_border(0)
        .force_squared(true)
        .build();
    let pages = generate_atlas(opaque_inputs(3, 40, 20), cfg).expect("pack");
    for p in &pages {
        let (w, h) = p.atlas_image.dimensions();
        assert_eq!(w, h);
    }
}

#[test]
fn pow2_canvas_dimensions_are_powers_of_two() {
    let cfg = AtlasConfig::builder()
        .trim_threshold(0)
        .pow2(true)
        .build();
    let inputs = vec![
        SourceImage {
            name: "a".into(),
            image: solid(50, 20, [1, 2, 3, 255]),
        },
        SourceImage {
            name: "b".into(),
            image: solid(33, 47, [4, 5, 6, 255]),
        },
        SourceImage {
            name: "c".into(),
            image: solid(10, 60, [7, 8, 9, 255]),
        },
    ];
    let pages = generate_atlas(inputs, cfg).expect("pack");
    for p in &pages {
        let (w, h) = p.atlas_image.dimensions();
        assert!(is_pow2(w), "width {w} not a power of two");
        assert!(is_pow2(h), "height {h} not a power of two");
    }
}
