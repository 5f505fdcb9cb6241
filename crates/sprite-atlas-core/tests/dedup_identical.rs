use image::{DynamicImage, Rgba, RgbaImage};
use sprite_atlas_core::prelude::*;

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
    let mut img = RgbaImage::new(w, h);
    for p in img.pixels_mut() {
        *p = Rgba(rgba);
    }
    DynamicImage::ImageRgba8(img)
}

#[test]
fn identical_sprites_share_one_frame() {
    let inputs = vec![
        SourceImage {
            name: "first.png".into(),
            image: solid(16, 16, [255, 0, 0, 255]),
        },
        SourceImage {
            name: "second.png".into(),
            image: solid(16, 16, [255, 0, 0, 255]),
        },
    ];
    let cfg = AtlasConfig::builder().trim_threshold(0).build();
    let pages = generate_atlas(inputs, cfg).expect("pack");
    assert_eq!(pages.len(), 1);

    let frames = &pages[0].sprite_frames;
    assert_eq!(frames.len(), 2, "duplicate keeps its own public entry");
    let a = &frames["first.png"];
    let b = &frames["second.png"];
    assert_eq!(a.frame, b.frame);
    assert_eq!(a.offset, b.offset);
    assert_eq!(a.source_color_rect, b.source_color_rect);

    // Only one copy was actually placed: a single 16x16 content fits a page
    // that a second copy would have grown.
    let sb = 2u32; // default sprite border
    assert!(pages[0].atlas_image.width() <= 16 + sb + 2);
}

#[test]
fn different_pixels_are_not_deduplicated() {
    let inputs = vec![
        SourceImage {
            name: "red".into(),
            image: solid(16, 16, [255, 0, 0, 255]),
        },
        SourceImage {
            name: "blue".into(),
            image: solid(16, 16, [0, 0, 255, 255]),
        },
    ];
    let cfg = AtlasConfig::builder().trim_threshold(0).build();
    let pages = generate_atlas(inputs, cfg).expect("pack");
    let frames = &pages[0].sprite_frames;
    assert_eq!(frames.len(), 2);
    assert_ne!(frames["red"].frame, frames["blue"].frame);
}

#[test]
fn same_content_different_size_is_not_deduplicated() {
    let inputs = vec![
        SourceImage {
            name: "small".into(),
            image: solid(8, 8, [0, 255, 0, 255]),
        },
        SourceImage {
            name: "large".into(),
            image: solid(16, 16, [0, 255, 0, 255]),
        },
    ];
    let cfg = AtlasConfig::builder().trim_threshold(0).build();
    let pages = generate_atlas(inputs, cfg).expect("pack");
    let frames = &pages[0].sprite_frames;
    assert_ne!(frames["small"].frame, frames["large"].frame);
}

#[test]
fn every_duplicate_of_a_group_aliases_the_first() {
    let mut inputs = Vec::new();
    for i in 0..5 {
        inputs.push(SourceImage {
            name: format!("copy_{i}.png"),
            image: solid(12, 12, [9, 9, 9, 255]),
        });
    }
    let cfg = AtlasConfig::builder().trim_threshold(0).build();
    let pages = generate_atlas(inputs, cfg).expect("pack");
    let frames = &pages[0].sprite_frames;
    assert_eq!(frames.len(), 5);
    let canonical = frames["copy_0.png"].frame;
    for i in 1..5 {
        assert_eq!(frames[&format!("copy_{i}.png")].frame, canonical);
    }
}
