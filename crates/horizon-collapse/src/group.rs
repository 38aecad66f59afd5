//! Collapse group implementation.
//!
//! [`CollapseGroup`] is a non-visual coordinator that owns the set of active
//! (expanded) item names and implements [`Registry`] for its items.
//!
//! # Modes
//!
//! - **Multi** (default): any number of items may be open. Active names are a
//!   list.
//! - **Accordion**: at most one item is open. Opening an item closes the
//!   previously open one.
//!
//! # Example
//!
//! ```
//! use horizon_collapse::{ActiveNames, CollapseGroup, Identity, Registry};
//!
//! let group = CollapseGroup::with_accordion(true);
//! group.change.connect(|names| println!("active: {:?}", names));
//!
//! group.toggle(&Identity::from("general"), true);
//! group.toggle(&Identity::from("advanced"), true);
//!
//! assert!(!group.is_expanded(&Identity::from("general")));
//! assert_eq!(group.active(), ActiveNames::Single(Some(Identity::from("advanced"))));
//! ```

use std::fmt;

use horizon_collapse_core::logging::targets;
use horizon_collapse_core::Signal;
use parking_lot::{Mutex, RwLock};

use crate::error::{CollapseError, Result};
use crate::identity::{Identity, ItemKey};
use crate::registry::Registry;

/// The names of the expanded items in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveNames {
    /// Accordion mode: the open item, if any.
    Single(Option<Identity>),
    /// Multi mode: every open item.
    Many(Vec<Identity>),
}

impl ActiveNames {
    /// Whether `name` is among the active names.
    pub fn contains(&self, name: &Identity) -> bool {
        match self {
            Self::Single(active) => active.as_ref() == Some(name),
            Self::Many(active) => active.contains(name),
        }
    }

    fn matches_mode(&self, accordion: bool) -> bool {
        matches!(
            (self, accordion),
            (Self::Single(_), true) | (Self::Many(_), false)
        )
    }
}

/// A group of collapse items.
///
/// # Signals
///
/// - `change(ActiveNames)`: Emitted when a toggle changes the active names
pub struct CollapseGroup {
    /// Whether at most one item may be open.
    accordion: bool,
    /// Registered items, in registration order.
    children: Mutex<Vec<ItemKey>>,
    /// Currently expanded names. Always matches the group's mode.
    active: RwLock<ActiveNames>,

    /// Signal emitted when a toggle changes the active names.
    pub change: Signal<ActiveNames>,

    expansion_changed: Signal<()>,
    membership_changed: Signal<()>,
}

impl CollapseGroup {
    /// Create a new multi-mode group with nothing expanded.
    pub fn new() -> Self {
        Self::with_accordion(false)
    }

    /// Create a new group with the given mode and nothing expanded.
    pub fn with_accordion(accordion: bool) -> Self {
        let active = if accordion {
            ActiveNames::Single(None)
        } else {
            ActiveNames::Many(Vec::new())
        };
        Self {
            accordion,
            children: Mutex::new(Vec::new()),
            active: RwLock::new(active),
            change: Signal::new(),
            expansion_changed: Signal::new(),
            membership_changed: Signal::new(),
        }
    }

    /// Check if the group keeps at most one item open.
    pub fn is_accordion(&self) -> bool {
        self.accordion
    }

    /// The currently expanded names.
    pub fn active(&self) -> ActiveNames {
        self.active.read().clone()
    }

    /// Replace the expanded names.
    ///
    /// Fails if `names` does not match the group's mode: a single name for
    /// accordion groups, a list otherwise. Does not emit `change`.
    pub fn set_active(&self, names: ActiveNames) -> Result<()> {
        if !names.matches_mode(self.accordion) {
            tracing::warn!(target: targets::GROUP, accordion = self.accordion, ?names, "active names do not match group mode");
            return Err(CollapseError::active_names_mismatch(self.accordion));
        }

        let changed = {
            let mut active = self.active.write();
            if *active != names {
                *active = names;
                true
            } else {
                false
            }
        };

        if changed {
            self.expansion_changed.emit(());
        }
        Ok(())
    }

    /// Get the number of registered items.
    pub fn item_count(&self) -> usize {
        self.children.lock().len()
    }

    fn next_active(&self, active: &ActiveNames, name: &Identity, expanded: bool) -> ActiveNames {
        match active {
            ActiveNames::Single(current) => {
                if expanded {
                    ActiveNames::Single(Some(name.clone()))
                } else if current.as_ref() == Some(name) {
                    ActiveNames::Single(None)
                } else {
                    ActiveNames::Single(current.clone())
                }
            }
            ActiveNames::Many(current) => {
                let mut next: Vec<Identity> =
                    current.iter().filter(|n| *n != name).cloned().collect();
                if expanded {
                    next.push(name.clone());
                }
                ActiveNames::Many(next)
            }
        }
    }
}

impl Registry for CollapseGroup {
    fn register(&self, item: ItemKey) -> usize {
        let index = {
            let mut children = self.children.lock();
            children.push(item);
            children.len() - 1
        };
        tracing::trace!(target: targets::GROUP, key = item.as_u64(), index, "item joined");
        self.membership_changed.emit(());
        index
    }

    fn unregister(&self, item: ItemKey) {
        let removed = {
            let mut children = self.children.lock();
            match children.iter().position(|key| *key == item) {
                Some(pos) => {
                    children.remove(pos);
                    true
                }
                None => false,
            }
        };
        if removed {
            tracing::trace!(target: targets::GROUP, key = item.as_u64(), "item left");
            self.membership_changed.emit(());
        }
    }

    fn index_of(&self, item: ItemKey) -> Option<usize> {
        self.children.lock().iter().position(|key| *key == item)
    }

    fn is_expanded(&self, identity: &Identity) -> bool {
        self.active.read().contains(identity)
    }

    fn toggle(&self, identity: &Identity, expanded: bool) {
        let next = {
            let mut active = self.active.write();
            let next = self.next_active(&active, identity, expanded);
            if next == *active {
                return;
            }
            *active = next.clone();
            next
        };

        tracing::debug!(target: targets::GROUP, %identity, expanded, active = ?next, "active names changed");
        self.change.emit(next);
        self.expansion_changed.emit(());
    }

    fn expansion_changed(&self) -> &Signal<()> {
        &self.expansion_changed
    }

    fn membership_changed(&self) -> &Signal<()> {
        &self.membership_changed
    }
}

impl Default for CollapseGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CollapseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollapseGroup")
            .field("accordion", &self.is_accordion())
            .field("items", &self.item_count())
            .field("active", &self.active())
            .finish()
    }
}

static_assertions::assert_impl_all!(CollapseGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn name(s: &str) -> Identity {
        Identity::from(s)
    }

    #[test]
    fn test_multi_toggle() {
        let group = CollapseGroup::new();

        group.toggle(&name("a"), true);
        group.toggle(&name("b"), true);
        assert!(group.is_expanded(&name("a")));
        assert!(group.is_expanded(&name("b")));

        group.toggle(&name("a"), false);
        assert!(!group.is_expanded(&name("a")));
        assert_eq!(group.active(), ActiveNames::Many(vec![name("b")]));
    }

    #[test]
    fn test_multi_toggle_does_not_duplicate() {
        let group = CollapseGroup::new();
        group.toggle(&name("a"), true);
        group.toggle(&name("a"), true);
        assert_eq!(group.active(), ActiveNames::Many(vec![name("a")]));
    }

    #[test]
    fn test_accordion_keeps_one_open() {
        let group = CollapseGroup::with_accordion(true);

        group.toggle(&name("a"), true);
        group.toggle(&name("b"), true);
        assert!(!group.is_expanded(&name("a")));
        assert!(group.is_expanded(&name("b")));

        // Collapsing an item that is not open leaves the open one alone
        group.toggle(&name("a"), false);
        assert!(group.is_expanded(&name("b")));

        group.toggle(&name("b"), false);
        assert_eq!(group.active(), ActiveNames::Single(None));
    }

    #[test]
    fn test_change_signal() {
        let group = CollapseGroup::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        group.change.connect(move |names| {
            received_clone.lock().push(names.clone());
        });

        group.toggle(&name("a"), true);
        group.toggle(&name("a"), true);
        group.toggle(&name("a"), false);

        assert_eq!(
            *received.lock(),
            vec![ActiveNames::Many(vec![name("a")]), ActiveNames::Many(vec![])]
        );
    }

    #[test]
    fn test_set_active_validates_mode() {
        let accordion = CollapseGroup::with_accordion(true);
        assert!(matches!(
            accordion.set_active(ActiveNames::Many(vec![name("a")])),
            Err(CollapseError::ActiveNamesMismatch { accordion: true })
        ));
        accordion
            .set_active(ActiveNames::Single(Some(name("a"))))
            .unwrap();
        assert!(accordion.is_expanded(&name("a")));

        let multi = CollapseGroup::new();
        assert!(multi.set_active(ActiveNames::Single(None)).is_err());
        assert_eq!(multi.active(), ActiveNames::Many(vec![]));
    }

    #[test]
    fn test_set_active_emits_expansion_changed_only() {
        let group = CollapseGroup::new();
        let expansion_events = Arc::new(Mutex::new(0));
        let change_events = Arc::new(Mutex::new(0));

        let counter = expansion_events.clone();
        group.expansion_changed().connect(move |_| *counter.lock() += 1);
        let counter = change_events.clone();
        group.change.connect(move |_| *counter.lock() += 1);

        group.set_active(ActiveNames::Many(vec![name("a")])).unwrap();
        group.set_active(ActiveNames::Many(vec![name("a")])).unwrap();

        assert_eq!(*expansion_events.lock(), 1);
        assert_eq!(*change_events.lock(), 0);
    }

    #[test]
    fn test_membership() {
        let group = CollapseGroup::new();
        let events = Arc::new(Mutex::new(0));
        let counter = events.clone();
        group.membership_changed().connect(move |_| *counter.lock() += 1);

        let a = ItemKey::next();
        let b = ItemKey::next();
        let c = ItemKey::next();
        assert_eq!(group.register(a), 0);
        assert_eq!(group.register(b), 1);
        assert_eq!(group.register(c), 2);

        group.unregister(b);
        assert_eq!(group.index_of(a), Some(0));
        assert_eq!(group.index_of(b), None);
        assert_eq!(group.index_of(c), Some(1));

        // Unknown keys are ignored
        group.unregister(b);
        assert_eq!(*events.lock(), 4);
        assert_eq!(group.item_count(), 2);
    }

    #[test]
    fn test_is_expanded_is_idempotent() {
        let group = CollapseGroup::new();
        group.toggle(&name("a"), true);
        let first = group.is_expanded(&name("a"));
        let second = group.is_expanded(&name("a"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_debug_reports_mode() {
        let group = CollapseGroup::with_accordion(true);
        group.toggle(&name("a"), true);
        let debug = format!("{:?}", group);
        assert!(debug.contains("accordion: true"));
        assert!(debug.contains("Single"));
    }
}
