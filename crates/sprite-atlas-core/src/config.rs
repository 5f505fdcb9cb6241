use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Packing algorithms. A closed enum dispatched at the single fork in
/// `generate_atlas`: `Polygon` only takes effect when polygon mode is enabled
/// and meshes were produced (trimming on); everything else packs rectangles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Rect,
    Polygon,
}

impl FromStr for Algorithm {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rect" => Ok(Self::Rect),
            "polygon" => Ok(Self::Polygon),
            _ => Err(()),
        }
    }
}

/// Polygon outline fitting: `epsilon` is the Douglas-Peucker tolerance in
/// pixels used when simplifying traced outlines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolygonMode {
    pub enable: bool,
    pub epsilon: f32,
}

impl Default for PolygonMode {
    fn default() -> Self {
        Self {
            enable: false,
            epsilon: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Pixels kept empty on all four canvas edges.
    pub texture_border: u32,
    /// Pixels added to each sprite's packed size (gap between neighbors).
    pub sprite_border: u32,
    /// Alpha threshold in 0..=255; pixels with alpha >= threshold count as
    /// opaque when trimming. 0 disables trimming entirely.
    pub trim_threshold: u8,
    /// Derive an alpha mask from the dominant corner color before trimming.
    pub heuristic_mask: bool,
    /// Restrict canvas dimensions to powers of two.
    pub power_of_two: bool,
    /// Keep the canvas square; every width change mirrors to the height.
    pub force_squared: bool,
    /// Maximum canvas dimension in pixels.
    pub max_texture_size: u32,
    /// Uniform pre-scale applied to every source image.
    pub scale: f32,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    /// Allow the rect packer to rotate sprites 90 degrees.
    pub rotate_sprites: bool,
    #[serde(default)]
    pub polygon_mode: PolygonMode,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            texture_border: 0,
            sprite_border: 2,
            trim_threshold: 1,
            heuristic_mask: false,
            power_of_two: false,
            force_squared: false,
            max_texture_size: 2048,
            scale: 1.0,
            algorithm: default_algorithm(),
            rotate_sprites: false,
            polygon_mode: PolygonMode::default(),
        }
    }
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if dimensions or scale are unusable, or if the
    /// texture border consumes the whole canvas.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.max_texture_size == 0 {
            return Err(AtlasError::InvalidConfig(
                "max_texture_size must be greater than 0".into(),
            ));
        }

        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(AtlasError::InvalidConfig(format!(
                "scale must be a positive finite number (got {})",
                self.scale
            )));
        }

        let total_border = self.texture_border.saturating_mul(2);
        if total_border >= self.max_texture_size {
            return Err(AtlasError::InvalidConfig(format!(
                "texture_border ({}) * 2 exceeds max_texture_size ({})",
                self.texture_border, self.max_texture_size
            )));
        }

        if self.polygon_mode.enable
            && (!self.polygon_mode.epsilon.is_finite() || self.polygon_mode.epsilon <= 0.0)
        {
            return Err(AtlasError::InvalidConfig(format!(
                "polygon epsilon must be a positive finite number (got {})",
                self.polygon_mode.epsilon
            )));
        }

        Ok(())
    }

    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}

fn default_algorithm() -> Algorithm {
    Algorithm::Rect
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn texture_border(mut self, v: u32) -> Self {
        self.cfg.texture_border = v;
        self
    }
    pub fn sprite_border(mut self, v: u32) -> Self {
        self.cfg.sprite_border = v;
        self
    }
    pub fn trim_threshold(mut self, v: u8) -> Self {
        self.cfg.trim_threshold = v;
        self
    }
    pub fn heuristic_mask(mut self, v: bool) -> Self {
        self.cfg.heuristic_mask = v;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.cfg.power_of_two = v;
        self
    }
    pub fn force_squared(mut self, v: bool) -> Self {
        self.cfg.force_squared = v;
        self
    }
    pub fn max_texture_size(mut self, v: u32) -> Self {
        self.cfg.max_texture_size = v;
        self
    }
    pub fn scale(mut self, v: f32) -> Self {
        self.cfg.scale = v;
        self
    }
    pub fn algorithm(mut self, v: Algorithm) -> Self {
        self.cfg.algorithm = v;
        self
    }
    pub fn rotate_sprites(mut self, v: bool) -> Self {
        self.cfg.rotate_sprites = v;
        self
    }
    pub fn polygon_mode(mut self, enable: bool, epsilon: f32) -> Self {
        self.cfg.polygon_mode = PolygonMode { enable, epsilon };
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}
