use image::{DynamicImage, Rgba, RgbaImage};
use sprite_atlas_core::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
    let mut img = RgbaImage::new(w, h);
    for p in img.pixels_mut() {
        *p = Rgba(rgba);
    }
    DynamicImage::ImageRgba8(img)
}

/// Reports cancellation from the n-th poll onward.
struct CancelAfter {
    polls: AtomicUsize,
    after: usize,
}

impl CancelAfter {
    fn new(after: usize) -> Self {
        Self {
            polls: AtomicUsize::new(0),
            after,
        }
    }
}

impl ProgressSink for CancelAfter {
    fn cancelled(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst) >= self.after
    }
}

fn inputs(count: usize) -> Vec<SourceImage> {
    (0..count)
        .map(|i| SourceImage {
            name: format!("s{i}"),
            image: solid(20 + i as u32, 20, [i as u8, 0, 0, 255]),
        })
        .collect()
}

#[test]
fn immediate_cancellation_returns_no_output() {
    let sink = CancelAfter::new(0);
    let err = generate_atlas_with_progress(inputs(4), AtlasConfig::default(), &sink)
        .expect_err("cancelled");
    assert!(matches!(err, AtlasError::Cancelled));
}

#[test]
fn cancellation_mid_run_returns_no_output() {
    let sink = CancelAfter::new(3);
    let err = generate_atlas_with_progress(inputs(8), AtlasConfig::default(), &sink)
        .expect_err("cancelled");
    assert!(matches!(err, AtlasError::Cancelled));
}

#[test]
fn cancellation_mid_polygon_run_returns_no_output() {
    let cfg = AtlasConfig::builder()
        .algorithm(Algorithm::Polygon)
        .polygon_mode(true, 2.0)
        .trim_threshold(1)
        .build();
    let sink = CancelAfter::new(10);
    let err = generate_atlas_with_progress(inputs(8), cfg, &sink).expect_err("cancelled");
    assert!(matches!(err, AtlasError::Cancelled));
}

#[test]
fn uncancelled_run_completes() {
    let sink = CancelAfter::new(usize::MAX);
    let pages = generate_atlas_with_progress(inputs(4), AtlasConfig::default(), &sink)
        .expect("pack");
    assert!(!pages.is_empty());
    assert!(sink.polls.load(Ordering::SeqCst) > 0, "cancel flag was polled");
}
