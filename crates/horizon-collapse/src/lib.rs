//! Collapsible panel items for Horizon Collapse.
//!
//! A [`CollapseItem`] is one expandable panel inside a collapse group. It
//! coordinates three things:
//!
//! - **Group relation**: the item's identity and expansion come from a
//!   [`Registry`] handed to it at construction ([`CollapseGroup`] is the
//!   provided implementation)
//! - **Height transition**: the [`TransitionController`] sequences wrapper
//!   height writes over microtask and frame boundaries so the host's height
//!   transition animates instead of snapping
//! - **Lazy rendering**: the [`LazyRender`] gate keeps content unmounted until
//!   the item is first opened, and mounted from then on
//!
//! Rendering is up to the host, through the [`RenderHost`] trait.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_collapse::{
//!     CollapseGroup, CollapseItemBuilder, Expansion, RenderHost, Visibility, WrapperHeight,
//! };
//! use horizon_collapse_core::FrameQueue;
//!
//! struct Panel;
//!
//! impl RenderHost for Panel {
//!     fn content_height(&self) -> Option<f32> {
//!         Some(240.0)
//!     }
//!
//!     fn set_wrapper_height(&self, height: WrapperHeight) {
//!         println!("wrapper height: {height:?}");
//!     }
//! }
//!
//! let group = Arc::new(CollapseGroup::new());
//! let frames = Arc::new(FrameQueue::new());
//!
//! let item = CollapseItemBuilder::new(Arc::new(Panel))
//!     .name("details")
//!     .registry(group.clone())
//!     .scheduler(frames.clone())
//!     .build();
//!
//! assert_eq!(item.is_expanded(), Expansion::Collapsed);
//! assert!(!item.content_visible());
//!
//! item.on_activate();
//! assert!(item.content_visible());
//!
//! frames.run_until_idle(4);
//! item.on_transition_end();
//! assert_eq!(item.visibility(), Visibility::Revealed { at_rest_open: true });
//! ```

mod config;
mod error;
mod group;
mod identity;
mod item;
mod lazy;
mod registry;
mod transition;

pub use config::{CollapseItemBuilder, CollapseItemConfig};
pub use error::{CollapseError, Result};
pub use group::{ActiveNames, CollapseGroup};
pub use identity::{Expansion, Identity, ItemKey};
pub use item::{CollapseItem, TitleState};
pub use lazy::LazyRender;
pub use registry::Registry;
pub use transition::{ExpansionSource, RenderHost, TransitionController, Visibility, WrapperHeight};
