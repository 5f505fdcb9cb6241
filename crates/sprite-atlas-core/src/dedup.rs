use crate::sprite::Sprite;
use std::collections::BTreeMap;
use tracing::debug;

/// Collapses pixel-identical sprites into aliases of the first accepted one.
///
/// Linear scan, first match wins; quadratic in sprite count, which stays
/// negligible next to the per-pixel work elsewhere in the pipeline.
pub(crate) struct Deduper {
    sprites: Vec<Sprite>,
    aliases: BTreeMap<String, Vec<String>>,
    skipped: usize,
}

impl Deduper {
    pub fn new() -> Self {
        Self {
            sprites: Vec::new(),
            aliases: BTreeMap::new(),
            skipped: 0,
        }
    }

    /// Accepts `sprite` or records it as an alias of an earlier identical
    /// sprite. Returns false when the sprite was dropped as a duplicate.
    pub fn push(&mut self, sprite: Sprite) -> bool {
        for accepted in &self.sprites {
            if accepted.is_identical(&sprite) {
                debug!(duplicate = %sprite.name, canonical = %accepted.name, "identical sprite");
                self.aliases
                    .entry(accepted.name.clone())
                    .or_default()
                    .push(sprite.name);
                self.skipped += 1;
                return false;
            }
        }
        self.sprites.push(sprite);
        true
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_parts(self) -> (Vec<Sprite>, BTreeMap<String, Vec<String>>) {
        (self.sprites, self.aliases)
    }
}
