//! Height transition state machine.
//!
//! The [`TransitionController`] animates an item's content wrapper between
//! zero height and the content's natural height. It does not animate anything
//! itself: it produces a sequence of height writes which, spaced out with the
//! right frame deferrals, let the host's CSS-style height transition run.
//!
//! # Write Sequence
//!
//! Opening (expansion becomes `true`):
//!
//! 1. Reveal the content immediately so it can be mounted and laid out.
//! 2. On the next microtask, measure the content height `H` and write `0`.
//! 3. Two frames later, write `H`.
//! 4. When the host reports the transition finished, clear the height to
//!    [`WrapperHeight::Auto`] so later content changes are not clipped.
//!
//! Closing (expansion becomes `false`):
//!
//! 1. On the next frame, measure `H` and write it.
//! 2. Two frames later, write `0`.
//! 3. When the host reports the transition finished, hide the content.
//!
//! # Live State
//!
//! Deferred callbacks re-read the live expansion when they run instead of
//! trusting the value that scheduled them. A callback whose premise no longer
//! holds (the item is hidden, or already settled open) does nothing. This is
//! what makes rapid toggling safe without any way to cancel a scheduled frame
//! callback.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_collapse_core::logging::{span_names, targets};
use horizon_collapse_core::{FrameScheduler, FrameTask, PerfSpan};
use parking_lot::Mutex;

use crate::identity::Expansion;
use crate::lazy::LazyRender;

/// Whether an item's content is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Content is not shown. No pixel height is ever written in this state.
    #[default]
    Hidden,
    /// Content is mounted and shown.
    Revealed {
        /// `true` once an opening transition has finished and the wrapper
        /// height is back to natural; `false` while a pixel height is in
        /// effect.
        at_rest_open: bool,
    },
}

impl Visibility {
    /// Whether content is shown.
    pub fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed { .. })
    }

    /// Whether content is shown with no transition in effect.
    pub fn is_at_rest_open(self) -> bool {
        matches!(self, Self::Revealed { at_rest_open: true })
    }
}

/// The height style of the wrapper around an item's content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WrapperHeight {
    /// No explicit height; the wrapper takes the content's natural height.
    #[default]
    Auto,
    /// An explicit height in device pixels.
    Pixels(f32),
}

impl WrapperHeight {
    /// The explicit pixel value, if any.
    pub fn pixels(self) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Pixels(px) => Some(px),
        }
    }
}

/// The rendering environment an item's content lives in.
///
/// The host mounts content while [`CollapseItem::content_visible`] is true,
/// shows the wrapper while the item is revealed, applies the heights written
/// here with a height transition, and calls
/// [`CollapseItem::on_transition_end`] when that transition finishes.
///
/// [`CollapseItem::content_visible`]: crate::CollapseItem::content_visible
/// [`CollapseItem::on_transition_end`]: crate::CollapseItem::on_transition_end
pub trait RenderHost: Send + Sync {
    /// The content's current rendered height in device pixels.
    ///
    /// `None` when the content has no box yet.
    fn content_height(&self) -> Option<f32>;

    /// Apply a height to the content wrapper.
    fn set_wrapper_height(&self, height: WrapperHeight);
}

/// Read access to an item's live expansion.
pub type ExpansionSource = Arc<dyn Fn() -> Expansion + Send + Sync>;

/// State shared between the controller and its scheduled callbacks.
struct ControllerState {
    visibility: Mutex<Visibility>,
    /// The last height written to the host.
    wrapper_height: Mutex<WrapperHeight>,
    gate: LazyRender,
    host: Arc<dyn RenderHost>,
    scheduler: Arc<dyn FrameScheduler>,
    expansion: ExpansionSource,
}

/// Drives one item's [`Visibility`] from changes of its expansion.
pub struct TransitionController {
    state: Arc<ControllerState>,
}

impl TransitionController {
    /// Create a controller for content hosted by `host`.
    ///
    /// `expansion` is consulted whenever a deferred step runs, so it must
    /// always report the item's current expansion.
    pub fn new(
        host: Arc<dyn RenderHost>,
        scheduler: Arc<dyn FrameScheduler>,
        expansion: ExpansionSource,
    ) -> Self {
        Self {
            state: Arc::new(ControllerState {
                visibility: Mutex::new(Visibility::Hidden),
                wrapper_height: Mutex::new(WrapperHeight::Auto),
                gate: LazyRender::new(),
                host,
                scheduler,
                expansion,
            }),
        }
    }

    /// The current visibility.
    pub fn visibility(&self) -> Visibility {
        *self.state.visibility.lock()
    }

    /// The height most recently written to the wrapper.
    pub fn wrapper_height(&self) -> WrapperHeight {
        *self.state.wrapper_height.lock()
    }

    /// Whether content should be mounted.
    pub fn content_visible(&self) -> bool {
        self.state.gate.should_render(self.visibility().is_revealed())
    }

    /// Whether content has ever been mounted.
    pub fn is_rendered(&self) -> bool {
        self.state.gate.is_armed()
    }

    /// Take the first known expansion as the starting state, with no
    /// transition.
    ///
    /// An item that starts expanded is revealed at rest; one that starts
    /// collapsed stays hidden.
    pub fn adopt(&self, expansion: Expansion) {
        if expansion.is_expanded() {
            *self.state.visibility.lock() = Visibility::Revealed { at_rest_open: true };
            self.state.gate.should_render(true);
            tracing::debug!(target: targets::TRANSITION, "starting expanded");
        }
    }

    /// React to the expansion changing from `old` to `new`.
    ///
    /// A change away from [`Expansion::Unknown`] is not a transition and is
    /// ignored.
    #[tracing::instrument(skip_all, fields(old = ?old, new = ?new), target = "horizon_collapse::transition", level = "trace")]
    pub fn on_expansion_changed(&self, old: Expansion, new: Expansion) {
        if old.is_unknown() {
            tracing::debug!(target: targets::TRANSITION, "initial expansion sample, no transition");
            return;
        }
        let Some(expanded) = new.known() else {
            return;
        };

        if expanded {
            self.state.reveal();
        }

        let weak = Arc::downgrade(&self.state);
        let task: FrameTask = Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.measure_and_start();
            }
        });

        // Opening only needs the content mounted; closing from rest needs a
        // committed frame so the natural height can be read back as pixels.
        if expanded {
            self.state.scheduler.run_as_microtask(task);
        } else {
            self.state.scheduler.run_on_next_frame(task);
        }
    }

    /// The host's height transition finished.
    pub fn on_transition_end(&self) {
        self.state.complete();
    }
}

impl ControllerState {
    fn live_expanded(&self) -> bool {
        (self.expansion)().is_expanded()
    }

    fn reveal(&self) {
        {
            let mut visibility = self.visibility.lock();
            if *visibility == Visibility::Hidden {
                *visibility = Visibility::Revealed { at_rest_open: false };
            }
        }
        self.gate.should_render(true);
    }

    fn write_height(&self, height: WrapperHeight) {
        if height.pixels().is_some() && !self.visibility.lock().is_revealed() {
            tracing::debug!(target: targets::TRANSITION, ?height, "refusing pixel height while hidden");
            return;
        }
        *self.wrapper_height.lock() = height;
        tracing::trace!(target: targets::TRANSITION, ?height, "wrapper height");
        self.host.set_wrapper_height(height);
    }

    fn measure(&self) -> Option<f32> {
        let _span = PerfSpan::new(span_names::MEASURE);
        self.host
            .content_height()
            .filter(|height| height.is_finite() && *height > 0.0)
    }

    /// Measure the content and write the starting height.
    fn measure_and_start(self: &Arc<Self>) {
        let visibility = *self.visibility.lock();
        let expanded = self.live_expanded();

        match visibility {
            Visibility::Hidden => {
                tracing::debug!(target: targets::TRANSITION, "stale start, item hidden");
                return;
            }
            Visibility::Revealed { at_rest_open: true } if expanded => {
                tracing::debug!(target: targets::TRANSITION, "stale start, already open");
                return;
            }
            Visibility::Revealed { .. } => {}
        }

        let Some(height) = self.measure() else {
            tracing::debug!(target: targets::TRANSITION, "no content height, skipping animation");
            self.complete();
            return;
        };

        *self.visibility.lock() = Visibility::Revealed { at_rest_open: false };
        self.write_height(WrapperHeight::Pixels(if expanded { 0.0 } else { height }));

        let weak: Weak<Self> = Arc::downgrade(self);
        self.scheduler.run_on_frame_after_next(Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.write_target(height);
            }
        }));
    }

    /// Write the target height once the starting height is committed.
    fn write_target(&self, height: f32) {
        match *self.visibility.lock() {
            Visibility::Hidden => {
                tracing::debug!(target: targets::TRANSITION, "stale target, item hidden");
                return;
            }
            Visibility::Revealed { at_rest_open: true } => {
                tracing::debug!(target: targets::TRANSITION, "stale target, already at rest");
                return;
            }
            Visibility::Revealed { .. } => {}
        }

        let target = if self.live_expanded() { height } else { 0.0 };
        self.write_height(WrapperHeight::Pixels(target));
    }

    fn complete(&self) {
        if !self.visibility.lock().is_revealed() {
            tracing::debug!(target: targets::TRANSITION, "transition end while hidden, ignoring");
            return;
        }

        if self.live_expanded() {
            *self.visibility.lock() = Visibility::Revealed { at_rest_open: true };
            self.write_height(WrapperHeight::Auto);
        } else {
            *self.visibility.lock() = Visibility::Hidden;
            let needs_clear = self.wrapper_height.lock().pixels().is_some();
            if needs_clear {
                self.write_height(WrapperHeight::Auto);
            }
            tracing::trace!(target: targets::TRANSITION, "hidden");
        }
    }
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("visibility", &self.visibility())
            .field("wrapper_height", &self.wrapper_height())
            .field("rendered", &self.is_rendered())
            .finish()
    }
}

static_assertions::assert_impl_all!(TransitionController: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_collapse_core::{FrameQueue, ImmediateScheduler, Property};

    #[derive(Default)]
    struct RecordingHost {
        height: Mutex<Option<f32>>,
        writes: Mutex<Vec<WrapperHeight>>,
    }

    impl RecordingHost {
        fn with_height(height: f32) -> Arc<Self> {
            let host = Self::default();
            *host.height.lock() = Some(height);
            Arc::new(host)
        }

        fn writes(&self) -> Vec<WrapperHeight> {
            self.writes.lock().clone()
        }
    }

    impl RenderHost for RecordingHost {
        fn content_height(&self) -> Option<f32> {
            *self.height.lock()
        }

        fn set_wrapper_height(&self, height: WrapperHeight) {
            self.writes.lock().push(height);
        }
    }

    struct Fixture {
        host: Arc<RecordingHost>,
        frames: Arc<FrameQueue>,
        expansion: Arc<Property<Expansion>>,
        controller: TransitionController,
    }

    impl Fixture {
        fn new(height: f32, initial: Expansion) -> Self {
            let host = RecordingHost::with_height(height);
            let frames = Arc::new(FrameQueue::new());
            let expansion = Arc::new(Property::new(initial));
            let source = expansion.clone();
            let controller = TransitionController::new(
                host.clone(),
                frames.clone(),
                Arc::new(move || source.get()),
            );
            controller.adopt(initial);
            Self {
                host,
                frames,
                expansion,
                controller,
            }
        }

        fn change(&self, new: Expansion) {
            if let Some(old) = self.expansion.replace(new) {
                self.controller.on_expansion_changed(old, new);
            }
        }
    }

    #[test]
    fn test_open_sequence() {
        let fx = Fixture::new(240.0, Expansion::Collapsed);
        fx.change(Expansion::Expanded);

        assert_eq!(
            fx.controller.visibility(),
            Visibility::Revealed { at_rest_open: false }
        );
        assert!(fx.controller.content_visible());
        assert!(fx.host.writes().is_empty());

        fx.frames.flush_microtasks();
        assert_eq!(fx.host.writes(), vec![WrapperHeight::Pixels(0.0)]);

        fx.frames.advance_frame();
        assert_eq!(fx.host.writes().len(), 1);
        fx.frames.advance_frame();
        assert_eq!(
            fx.host.writes(),
            vec![WrapperHeight::Pixels(0.0), WrapperHeight::Pixels(240.0)]
        );

        fx.controller.on_transition_end();
        assert_eq!(fx.controller.wrapper_height(), WrapperHeight::Auto);
        assert!(fx.controller.visibility().is_at_rest_open());
    }

    #[test]
    fn test_close_sequence() {
        let fx = Fixture::new(240.0, Expansion::Expanded);
        assert!(fx.controller.visibility().is_at_rest_open());

        fx.change(Expansion::Collapsed);
        fx.frames.flush_microtasks();
        assert!(fx.host.writes().is_empty());

        fx.frames.advance_frame();
        assert_eq!(fx.host.writes(), vec![WrapperHeight::Pixels(240.0)]);

        fx.frames.advance_frame();
        fx.frames.advance_frame();
        assert_eq!(
            fx.host.writes(),
            vec![WrapperHeight::Pixels(240.0), WrapperHeight::Pixels(0.0)]
        );

        fx.controller.on_transition_end();
        assert_eq!(fx.controller.visibility(), Visibility::Hidden);
        assert_eq!(fx.controller.wrapper_height(), WrapperHeight::Auto);
        assert!(fx.controller.is_rendered());
        assert!(fx.controller.content_visible());
    }

    #[test]
    fn test_initial_sample_is_not_a_transition() {
        let fx = Fixture::new(240.0, Expansion::Unknown);
        fx.change(Expansion::Collapsed);
        fx.frames.run_until_idle(8);

        assert_eq!(fx.controller.visibility(), Visibility::Hidden);
        assert!(!fx.controller.is_rendered());
        assert!(fx.host.writes().is_empty());
    }

    #[test]
    fn test_zero_height_skips_animation() {
        let fx = Fixture::new(0.0, Expansion::Collapsed);
        fx.change(Expansion::Expanded);
        fx.frames.run_until_idle(8);

        assert!(fx.controller.visibility().is_at_rest_open());
        assert_eq!(fx.host.writes(), vec![WrapperHeight::Auto]);

        fx.change(Expansion::Collapsed);
        fx.frames.run_until_idle(8);
        assert_eq!(fx.controller.visibility(), Visibility::Hidden);
        assert!(fx
            .host
            .writes()
            .iter()
            .all(|height| height.pixels().is_none()));
    }

    #[test]
    fn test_unmeasurable_content_skips_animation() {
        let fx = Fixture::new(240.0, Expansion::Collapsed);
        *fx.host.height.lock() = None;
        fx.change(Expansion::Expanded);
        fx.frames.run_until_idle(8);

        assert!(fx.controller.visibility().is_at_rest_open());
        assert!(fx.host.writes().iter().all(|h| h.pixels().is_none()));
    }

    #[test]
    fn test_transition_end_while_hidden_is_ignored() {
        let fx = Fixture::new(240.0, Expansion::Collapsed);
        fx.controller.on_transition_end();
        fx.controller.on_transition_end();

        assert_eq!(fx.controller.visibility(), Visibility::Hidden);
        assert!(fx.host.writes().is_empty());
    }

    #[test]
    fn test_reopen_before_close_starts_is_a_no_op() {
        let fx = Fixture::new(240.0, Expansion::Expanded);
        fx.change(Expansion::Collapsed);
        fx.change(Expansion::Expanded);
        fx.frames.run_until_idle(8);

        assert!(fx.controller.visibility().is_at_rest_open());
        assert!(fx.host.writes().is_empty());
    }

    #[test]
    fn test_stale_callbacks_after_drop_do_nothing() {
        let fx = Fixture::new(240.0, Expansion::Collapsed);
        fx.change(Expansion::Expanded);
        let Fixture {
            host,
            frames,
            controller,
            ..
        } = fx;
        drop(controller);

        frames.run_until_idle(8);
        assert!(host.writes().is_empty());
    }

    #[test]
    fn test_immediate_scheduler_writes_in_order() {
        let host = RecordingHost::with_height(120.0);
        let expansion = Arc::new(Property::new(Expansion::Collapsed));
        let source = expansion.clone();
        let controller = TransitionController::new(
            host.clone(),
            Arc::new(ImmediateScheduler),
            Arc::new(move || source.get()),
        );

        expansion.replace(Expansion::Expanded);
        controller.on_expansion_changed(Expansion::Collapsed, Expansion::Expanded);
        assert_eq!(
            host.writes(),
            vec![WrapperHeight::Pixels(0.0), WrapperHeight::Pixels(120.0)]
        );

        controller.on_transition_end();
        assert!(controller.visibility().is_at_rest_open());
    }
}
