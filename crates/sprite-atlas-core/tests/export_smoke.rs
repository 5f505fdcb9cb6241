use image::{DynamicImage, Rgba, RgbaImage};
use sprite_atlas_core::export::{to_json_hash, to_plist_hash};
use sprite_atlas_core::prelude::*;

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
    let mut img = RgbaImage::new(w, h);
    for p in img.pixels_mut() {
        *p = Rgba(rgba);
    }
    DynamicImage::ImageRgba8(img)
}

fn sample_pages() -> Vec<OutputData> {
    let inputs = vec![
        SourceImage {
            name: "hero/idle.png".into(),
            image: solid(24, 16, [1, 2, 3, 255]),
        },
        SourceImage {
            name: "hero/run.png".into(),
            image: solid(18, 18, [4, 5, 6, 255]),
        },
    ];
    generate_atlas(inputs, AtlasConfig::builder().trim_threshold(0).build()).expect("pack")
}

#[test]
fn json_hash_lists_every_frame() {
    let pages = sample_pages();
    let v = to_json_hash(&pages);
    let frames = v["frames"].as_object().expect("frames object");
    assert!(frames.contains_key("hero/idle.png"));
    assert!(frames.contains_key("hero/run.png"));
    let fr = &frames["hero/idle.png"];
    assert!(fr["frame"]["w"].is_u64());
    assert_eq!(fr["sourceSize"]["w"], 24);
    assert_eq!(fr["rotated"], false);
    assert_eq!(v["meta"]["format"], "RGBA8888");
    assert_eq!(v["meta"]["pages"].as_array().map(|a| a.len()), Some(pages.len()));
}

#[test]
fn json_hash_includes_mesh_when_present() {
    let cfg = AtlasConfig::builder()
        .algorithm(Algorithm::Polygon)
        .polygon_mode(true, 2.0)
        .trim_threshold(1)
        .build();
    let inputs = vec![SourceImage {
        name: "blob".into(),
        image: solid(16, 16, [9, 9, 9, 255]),
    }];
    let pages = generate_atlas(inputs, cfg).expect("pack");
    let v = to_json_hash(&pages);
    let tri = &v["frames"]["blob"]["triangles"];
    assert!(tri["indices"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
    assert!(tri["verts"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
}

#[test]
fn plist_hash_is_wellformed_per_page() {
    let pages = sample_pages();
    let plist = to_plist_hash(&pages[0], "atlas.png");
    assert!(plist.starts_with("<?xml"));
    assert!(plist.contains("<key>frames</key>"));
    assert!(plist.contains("<key>hero/idle.png</key>"));
    assert!(plist.contains("<key>textureRect</key>"));
    assert!(plist.contains("<key>textureFileName</key><string>atlas.png</string>"));
    assert!(plist.ends_with("</plist>\n"));
}
