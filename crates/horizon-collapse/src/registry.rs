//! The relation between a collapse group and its items.
//!
//! An item never looks its group up. It is handed an `Arc<dyn Registry>` at
//! construction and talks to the group only through this trait. The group
//! owns the expansion set and any single-open policy; items only query it
//! and request toggles.

use horizon_collapse_core::Signal;

use crate::identity::{Identity, ItemKey};

/// The group-side contract a collapse item depends on.
///
/// Implementations must not hold internal locks while emitting
/// [`expansion_changed`](Self::expansion_changed) or
/// [`membership_changed`](Self::membership_changed): connected items call
/// back into [`index_of`](Self::index_of) and
/// [`is_expanded`](Self::is_expanded) from their slots.
pub trait Registry: Send + Sync {
    /// Add an item, returning its zero-based position among current members.
    fn register(&self, item: ItemKey) -> usize;

    /// Remove an item. Members after it shift down by one position.
    fn unregister(&self, item: ItemKey);

    /// The current position of a registered item.
    fn index_of(&self, item: ItemKey) -> Option<usize>;

    /// Whether the group currently considers `identity` expanded.
    ///
    /// Pure query: repeated calls return the same answer until the group's
    /// expansion set changes.
    fn is_expanded(&self, identity: &Identity) -> bool;

    /// Ask the group to set `identity` to `expanded`.
    ///
    /// The group may change other items too, for example to keep at most one
    /// item open.
    fn toggle(&self, identity: &Identity, expanded: bool);

    /// Emitted after the expansion set changes.
    fn expansion_changed(&self) -> &Signal<()>;

    /// Emitted after an item registers or unregisters.
    fn membership_changed(&self) -> &Signal<()>;
}
