//! The collapsible item facade.
//!
//! [`CollapseItem`] ties an item's identity and its group relation to a
//! [`TransitionController`]. It renders nothing: the host reads
//! [`content_visible`](CollapseItem::content_visible),
//! [`visibility`](CollapseItem::visibility) and
//! [`title_state`](CollapseItem::title_state) to decide what to draw, forwards
//! title activation to [`on_activate`](CollapseItem::on_activate), and reports
//! finished height transitions through
//! [`on_transition_end`](CollapseItem::on_transition_end).
//!
//! # Example
//!
//! ```ignore
//! use horizon_collapse::{CollapseGroup, CollapseItemBuilder};
//!
//! let group = CollapseGroup::new();
//! let item = CollapseItemBuilder::new(host)
//!     .name("settings")
//!     .registry(group.clone())
//!     .scheduler(frames.clone())
//!     .build();
//!
//! item.on_activate();
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_collapse_core::logging::targets;
use horizon_collapse_core::{Binding, ConnectionId, FrameScheduler, Property};

use crate::config::CollapseItemConfig;
use crate::identity::{Expansion, Identity, ItemKey};
use crate::registry::Registry;
use crate::transition::{RenderHost, TransitionController, Visibility, WrapperHeight};

/// The state a host needs to render an item's title cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleState {
    /// Whether the item is expanded. `false` while unknown.
    pub expanded: bool,
    /// Whether activation is ignored.
    pub disabled: bool,
    /// Keyboard focus order: `-1` when disabled, `0` otherwise.
    pub tab_index: i32,
    /// `"true"`, `"false"`, or `"null"` while the expansion is unknown.
    pub aria_expanded: &'static str,
    /// Whether the title shows a link arrow.
    pub is_link: bool,
    /// Whether the title cell draws its own bottom border.
    pub title_border: bool,
    /// Whether the item draws a border above itself. Only items after the
    /// first in their group do.
    pub border_top: bool,
}

/// The item's view of its group.
struct Relation {
    key: ItemKey,
    registry: Option<Arc<dyn Registry>>,
    /// Explicit name, or the current ordinal. Invalidated on membership change.
    identity: Binding<Option<Identity>>,
}

impl Relation {
    fn new(key: ItemKey, name: Option<Identity>, registry: Option<Arc<dyn Registry>>) -> Self {
        let lookup = registry.clone();
        let identity = Binding::new(move || match &name {
            Some(name) => Some(name.clone()),
            None => lookup
                .as_ref()
                .and_then(|registry| registry.index_of(key))
                .map(Identity::from_index),
        });
        Self {
            key,
            registry,
            identity,
        }
    }

    fn expansion(&self) -> Expansion {
        let Some(registry) = &self.registry else {
            return Expansion::Unknown;
        };
        match self.identity.get() {
            Some(identity) => Expansion::from(registry.is_expanded(&identity)),
            None => Expansion::Unknown,
        }
    }
}

/// State reachable from registry slots.
struct ItemShared {
    relation: Arc<Relation>,
    /// The last expansion fed to the controller.
    last_expansion: Property<Expansion>,
    controller: TransitionController,
}

impl ItemShared {
    fn sync_expansion(&self) {
        let new = self.relation.expansion();
        // Once known, the expansion never goes back to unknown
        if new.is_unknown() && !self.last_expansion.get().is_unknown() {
            tracing::debug!(target: targets::ITEM, key = self.relation.key.as_u64(), "identity unresolved, keeping last expansion");
            return;
        }
        let Some(old) = self.last_expansion.replace(new) else {
            return;
        };
        tracing::trace!(target: targets::ITEM, key = self.relation.key.as_u64(), ?old, ?new, "expansion changed");
        if old.is_unknown() {
            self.controller.adopt(new);
        } else {
            self.controller.on_expansion_changed(old, new);
        }
    }

    fn membership_changed(&self) {
        self.relation.identity.invalidate();
        self.sync_expansion();
    }
}

/// One collapsible panel in a collapse group.
///
/// Registers with its registry on construction and unregisters when dropped.
/// Without a registry the item is inert: its expansion stays
/// [`Expansion::Unknown`], it stays hidden, and activation does nothing.
pub struct CollapseItem {
    shared: Arc<ItemShared>,
    disabled: AtomicBool,
    border: bool,
    is_link: bool,
    connections: Option<RegistryConnections>,
}

/// The item's slots on its registry's signals.
struct RegistryConnections {
    expansion: ConnectionId,
    membership: ConnectionId,
}

impl CollapseItem {
    pub(crate) fn new(
        config: CollapseItemConfig,
        registry: Option<Arc<dyn Registry>>,
        host: Arc<dyn RenderHost>,
        scheduler: Arc<dyn FrameScheduler>,
    ) -> Self {
        let key = ItemKey::next();
        let relation = Arc::new(Relation::new(key, config.name.clone(), registry.clone()));

        let source = relation.clone();
        let controller =
            TransitionController::new(host, scheduler, Arc::new(move || source.expansion()));

        let shared = Arc::new(ItemShared {
            relation,
            last_expansion: Property::new(Expansion::Unknown),
            controller,
        });

        let connections = registry.as_ref().map(|registry| {
            let index = registry.register(key);
            tracing::debug!(target: targets::ITEM, key = key.as_u64(), index, "item registered");

            let weak: Weak<ItemShared> = Arc::downgrade(&shared);
            let expansion = registry.expansion_changed().connect(move |_| {
                if let Some(shared) = weak.upgrade() {
                    shared.sync_expansion();
                }
            });

            let weak: Weak<ItemShared> = Arc::downgrade(&shared);
            let membership = registry.membership_changed().connect(move |_| {
                if let Some(shared) = weak.upgrade() {
                    shared.membership_changed();
                }
            });

            RegistryConnections {
                expansion,
                membership,
            }
        });

        shared.sync_expansion();

        Self {
            shared,
            disabled: AtomicBool::new(config.disabled),
            border: config.border,
            is_link: config.is_link,
            connections,
        }
    }

    /// The handle this item registered with.
    pub fn key(&self) -> ItemKey {
        self.shared.relation.key
    }

    /// The identity the group addresses this item by.
    ///
    /// The explicit name if one was configured, otherwise the item's ordinal
    /// in its group. `None` for an unnamed item with no registry.
    pub fn current_identity(&self) -> Option<Identity> {
        self.shared.relation.identity.get()
    }

    /// The item's position in its group.
    pub fn index(&self) -> Option<usize> {
        let relation = &self.shared.relation;
        relation
            .registry
            .as_ref()
            .and_then(|registry| registry.index_of(relation.key))
    }

    /// Whether the group considers this item expanded.
    pub fn is_expanded(&self) -> Expansion {
        self.shared.relation.expansion()
    }

    /// Whether the item has a registry.
    pub fn is_attached(&self) -> bool {
        self.shared.relation.registry.is_some()
    }

    /// Whether activation is ignored.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    /// Enable or disable activation.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Release);
    }

    /// The title was activated (clicked, or triggered from the keyboard).
    ///
    /// Asks the group to flip this item's expansion. Does nothing when the
    /// item is disabled or has no registry.
    pub fn on_activate(&self) {
        if self.is_disabled() {
            tracing::trace!(target: targets::ITEM, key = self.key().as_u64(), "activation ignored, disabled");
            return;
        }
        let relation = &self.shared.relation;
        let Some(registry) = &relation.registry else {
            tracing::trace!(target: targets::ITEM, key = self.key().as_u64(), "activation ignored, no registry");
            return;
        };
        let Some(identity) = relation.identity.get() else {
            return;
        };

        let expanded = relation.expansion().is_expanded();
        tracing::debug!(target: targets::ITEM, %identity, expanded = !expanded, "toggle requested");
        registry.toggle(&identity, !expanded);
    }

    /// Whether the host should mount the content at all.
    ///
    /// `false` until the item is first revealed, `true` ever after.
    pub fn content_visible(&self) -> bool {
        self.shared.controller.content_visible()
    }

    /// Whether content has ever been mounted.
    pub fn is_rendered(&self) -> bool {
        self.shared.controller.is_rendered()
    }

    /// Whether the content wrapper is shown.
    pub fn visibility(&self) -> Visibility {
        self.shared.controller.visibility()
    }

    /// The height most recently written to the content wrapper.
    pub fn wrapper_height(&self) -> WrapperHeight {
        self.shared.controller.wrapper_height()
    }

    /// The host's height transition on the content wrapper finished.
    pub fn on_transition_end(&self) {
        self.shared.controller.on_transition_end();
    }

    /// Re-sample the expansion from the registry.
    ///
    /// Called automatically when the registry emits a change. Hosts with
    /// their own change tracking may call it directly; extra calls without an
    /// actual change do nothing.
    pub fn sync_expansion(&self) {
        self.shared.sync_expansion();
    }

    /// The state needed to render the title cell.
    pub fn title_state(&self) -> TitleState {
        let expansion = self.is_expanded();
        let disabled = self.is_disabled();
        TitleState {
            expanded: expansion.is_expanded(),
            disabled,
            tab_index: if disabled { -1 } else { 0 },
            aria_expanded: match expansion.known() {
                Some(true) => "true",
                Some(false) => "false",
                None => "null",
            },
            is_link: self.is_link,
            title_border: self.border,
            border_top: self.border && self.index().is_some_and(|index| index > 0),
        }
    }
}

impl Drop for CollapseItem {
    fn drop(&mut self) {
        let relation = &self.shared.relation;
        if let Some(registry) = &relation.registry {
            if let Some(connections) = self.connections.take() {
                registry.expansion_changed().disconnect(connections.expansion);
                registry.membership_changed().disconnect(connections.membership);
            }
            registry.unregister(relation.key);
            tracing::debug!(target: targets::ITEM, key = relation.key.as_u64(), "item unregistered");
        }
    }
}

impl fmt::Debug for CollapseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollapseItem")
            .field("key", &self.key())
            .field("identity", &self.current_identity())
            .field("expansion", &self.is_expanded())
            .field("disabled", &self.is_disabled())
            .field("controller", &self.shared.controller)
            .finish()
    }
}

static_assertions::assert_impl_all!(CollapseItem: Send, Sync);
