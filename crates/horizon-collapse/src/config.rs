//! Item configuration and construction.
//!
//! Item configuration can be built in code with [`CollapseItemBuilder`] or
//! loaded from TOML:
//!
//! ```
//! use horizon_collapse::{CollapseItemConfig, Identity};
//!
//! let config = CollapseItemConfig::from_toml_str(r#"
//! name = "advanced"
//! disabled = true
//! "#).unwrap();
//!
//! assert_eq!(config.name, Some(Identity::from("advanced")));
//! assert!(config.disabled);
//! assert!(config.border);
//! ```

use std::sync::Arc;

use horizon_collapse_core::{FrameScheduler, ImmediateScheduler};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::Identity;
use crate::item::CollapseItem;
use crate::registry::Registry;
use crate::transition::RenderHost;

/// Per-item options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseItemConfig {
    /// Explicit identity. When absent the item is addressed by its ordinal.
    pub name: Option<Identity>,
    /// Whether title activation is ignored.
    pub disabled: bool,
    /// Whether the item draws borders.
    pub border: bool,
    /// Whether the title shows a link arrow.
    pub is_link: bool,
}

impl Default for CollapseItemConfig {
    fn default() -> Self {
        Self {
            name: None,
            disabled: false,
            border: true,
            is_link: true,
        }
    }
}

impl CollapseItemConfig {
    /// Parse a configuration from a TOML document.
    ///
    /// Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Builder for creating collapse items.
///
/// The render host is required. Without a registry the item is inert;
/// without a scheduler every deferred step runs inline.
pub struct CollapseItemBuilder {
    config: CollapseItemConfig,
    host: Arc<dyn RenderHost>,
    registry: Option<Arc<dyn Registry>>,
    scheduler: Option<Arc<dyn FrameScheduler>>,
}

impl CollapseItemBuilder {
    /// Create a builder for an item whose content lives in `host`.
    pub fn new(host: Arc<dyn RenderHost>) -> Self {
        Self {
            config: CollapseItemConfig::default(),
            host,
            registry: None,
            scheduler: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CollapseItemConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the explicit identity.
    pub fn name(mut self, name: impl Into<Identity>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Set whether title activation is ignored.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    /// Set whether the item draws borders.
    pub fn border(mut self, border: bool) -> Self {
        self.config.border = border;
        self
    }

    /// Set whether the title shows a link arrow.
    pub fn is_link(mut self, is_link: bool) -> Self {
        self.config.is_link = is_link;
        self
    }

    /// Attach the item to a group.
    pub fn registry(mut self, registry: Arc<dyn Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the scheduler used to sequence height writes.
    pub fn scheduler(mut self, scheduler: Arc<dyn FrameScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Build the item, registering it with its registry.
    pub fn build(self) -> CollapseItem {
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(ImmediateScheduler) as Arc<dyn FrameScheduler>);
        CollapseItem::new(self.config, self.registry, self.host, scheduler)
    }
}
