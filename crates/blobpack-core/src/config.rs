use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ordering policy for records in the output table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrder {
    /// Keep the order inputs were supplied in (directory iteration order).
    Input,
    /// Sort by record name, ascending.
    NameAsc,
}

impl FromStr for RecordOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "input" | "none" => Ok(Self::Input),
            "name_asc" | "name" => Ok(Self::NameAsc),
            _ => Err(()),
        }
    }
}

/// Packaging configuration.
/// Key notes:
///   - `alpha_only` selects the alpha projection before compression (raw fallback still wins when smaller)
///   - `target_size` only drives the resize step performed by callers before packaging
///   - `order` and `parallel` affect batch packaging; the resulting table is deterministic either way
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackConfig {
    /// Store only the alpha channel of each image.
    #[serde(default = "default_alpha_only")]
    pub alpha_only: bool,
    /// Resize inputs to this size before packaging. `None` keeps source dimensions.
    #[serde(default = "default_target_size")]
    pub target_size: Option<(u32, u32)>,
    /// Record ordering in the output table.
    #[serde(default = "default_order")]
    pub order: RecordOrder,
    /// Package images in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            alpha_only: default_alpha_only(),
            target_size: default_target_size(),
            order: default_order(),
            parallel: false,
        }
    }
}

impl PackConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if `target_size` has a zero dimension.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PackError;

        if let Some((width, height)) = self.target_size {
            if width == 0 || height == 0 {
                return Err(PackError::InvalidDimensions { width, height });
            }
        }
        if self.parallel && !cfg!(feature = "parallel") {
            tracing::warn!("parallel requested but blobpack-core was built without the `parallel` feature");
        }
        Ok(())
    }
}

fn default_alpha_only() -> bool {
    true
}
fn default_target_size() -> Option<(u32, u32)> {
    Some((64, 64))
}
fn default_order() -> RecordOrder {
    RecordOrder::Input
}

/// Builder for `PackConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackConfigBuilder {
    cfg: PackConfig,
}

impl PackConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackConfig::default(),
        }
    }
    pub fn alpha_only(mut self, v: bool) -> Self {
        self.cfg.alpha_only = v;
        self
    }
    pub fn target_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.target_size = Some((w, h));
        self
    }
    pub fn no_resize(mut self) -> Self {
        self.cfg.target_size = None;
        self
    }
    pub fn order(mut self, v: RecordOrder) -> Self {
        self.cfg.order = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackConfig {
        self.cfg
    }
}

impl PackConfig {
    /// Create a fluent builder for `PackConfig`.
    pub fn builder() -> PackConfigBuilder {
        PackConfigBuilder::new()
    }
}
