use crate::model::{OutputData, SpriteFrameInfo};
use serde_json::{json, Value};

/// Flatten frames keyed by name across all pages, with page id hints.
/// Shape: `{ frames: { name: { frame, offset, rotated, sourceColorRect,
/// sourceSize, triangles?, page } }, meta }`.
pub fn to_json_hash(pages: &[OutputData]) -> Value {
    let mut frames = serde_json::Map::new();
    for (page_id, page) in pages.iter().enumerate() {
        for (name, fr) in &page.sprite_frames {
            frames.insert(name.clone(), frame_value(fr, page_id));
        }
    }
    let meta_pages: Vec<Value> = pages
        .iter()
        .map(|p| json!({"w": p.atlas_image.width(), "h": p.atlas_image.height()}))
        .collect();
    json!({
        "frames": frames,
        "meta": {
            "app": "sprite-atlas",
            "version": env!("CARGO_PKG_VERSION"),
            "format": "RGBA8888",
            "pages": meta_pages,
        }
    })
}

fn frame_value(fr: &SpriteFrameInfo, page_id: usize) -> Value {
    let mut v = json!({
        "frame": {"x": fr.frame.x, "y": fr.frame.y, "w": fr.frame.w, "h": fr.frame.h},
        "offset": {"x": fr.offset.0, "y": fr.offset.1},
        "rotated": fr.rotated,
        "sourceColorRect": {
            "x": fr.source_color_rect.x, "y": fr.source_color_rect.y,
            "w": fr.source_color_rect.w, "h": fr.source_color_rect.h
        },
        "sourceSize": {"w": fr.source_size.0, "h": fr.source_size.1},
        "page": page_id,
    });
    if !fr.triangles.is_empty() {
        v["triangles"] = json!({
            "verts": fr.triangles.verts.iter().map(|p| json!([p.x, p.y])).collect::<Vec<_>>(),
            "indices": fr.triangles.indices,
        });
    }
    v
}

/// Build a cocos2d-style plist (XML) for one page, with frames in a dict
/// keyed by name. Mesh sprites additionally carry `vertices` (source image
/// coordinates), `verticesUV` (atlas coordinates) and `triangles` entries.
pub fn to_plist_hash(page: &OutputData, texture_name: &str) -> String {
    let mut s = String::new();
    s.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>frames</key>
  <dict>
"#,
    );
    for (name, fr) in &page.sprite_frames {
        let texture_rect = format!(
            "{{{{{},{}}},{{{},{}}}}}",
            fr.frame.x, fr.frame.y, fr.frame.w, fr.frame.h
        );
        let source_rect = format!(
            "{{{{{},{}}},{{{},{}}}}}",
            fr.source_color_rect.x, fr.source_color_rect.y, fr.source_color_rect.w, fr.source_color_rect.h
        );
        s.push_str(&format!(
            "    <key>{}</key>\n    <dict>\n      <key>spriteOffset</key><string>{{{}, {}}}</string>\n      <key>spriteSourceSize</key><string>{{{}, {}}}</string>\n      <key>sourceColorRect</key><string>{}</string>\n      <key>textureRect</key><string>{}</string>\n      <key>textureRotated</key><{} />\n",
            xml_escape(name),
            fr.offset.0,
            fr.offset.1,
            fr.source_size.0,
            fr.source_size.1,
            source_rect,
            texture_rect,
            if fr.rotated { "true" } else { "false" },
        ));
        if !fr.triangles.is_empty() {
            let indices = fr
                .triangles
                .indices
                .iter()
                .flat_map(|t| t.iter())
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            let vertices = fr
                .triangles
                .verts
                .iter()
                .map(|p| {
                    format!(
                        "{} {}",
                        p.x as i32 + fr.source_color_rect.x as i32,
                        p.y as i32 + fr.source_color_rect.y as i32
                    )
                })
                .collect::<Vec<_>>()
                .join(" ");
            let vertices_uv = fr
                .triangles
                .verts
                .iter()
                .map(|p| {
                    format!(
                        "{} {}",
                        p.x as i32 + fr.frame.x as i32,
                        p.y as i32 + fr.frame.y as i32
                    )
                })
                .collect::<Vec<_>>()
                .join(" ");
            s.push_str(&format!(
                "      <key>triangles</key><string>{}</string>\n      <key>vertices</key><string>{}</string>\n      <key>verticesUV</key><string>{}</string>\n",
                indices, vertices, vertices_uv
            ));
        }
        s.push_str("    </dict>\n");
    }
    s.push_str("  </dict>\n  <key>metadata</key>\n  <dict>\n");
    s.push_str(&format!(
        "    <key>format</key><integer>3</integer>\n    <key>pixelFormat</key><string>RGBA8888</string>\n    <key>premultiplyAlpha</key><false />\n    <key>textureFileName</key><string>{}</string>\n    <key>size</key><string>{{{}, {}}}</string>\n",
        xml_escape(texture_name),
        page.atlas_image.width(),
        page.atlas_image.height()
    ));
    s.push_str("  </dict>\n</dict>\n</plist>\n");
    s
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
